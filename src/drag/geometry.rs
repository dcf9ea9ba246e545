//! Pointer hit-testing and insertion-point resolution.
//!
//! Every drag flow resolves the pointer the same way: find the element under
//! the pointer, then use the pointer's vertical position relative to that
//! element's midpoint to choose *before* or *after*. Horizontal position is
//! never considered. The view reports element bounds through a
//! [`LayoutSnapshot`]; nothing here knows how those elements are drawn.

use crate::domain::{Catalog, EntryId, GroupId};
use serde::{Deserialize, Serialize};

/// A pointer position in view coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An axis-aligned element bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    /// Which half of the box the pointer is in, by vertical midpoint.
    #[must_use]
    pub fn side_of(&self, p: Point) -> Side {
        if p.y < self.y + self.height / 2.0 {
            Side::Before
        } else {
            Side::After
        }
    }
}

/// Before/after half of a target element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Before,
    After,
}

impl Side {
    /// Offset to add to the target's index.
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Self::Before => 0,
            Self::After => 1,
        }
    }
}

/// A rendered group element in the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBox {
    pub id: GroupId,
    pub rect: Rect,
}

/// A rendered entry element in the content area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryBox {
    pub id: EntryId,
    pub rect: Rect,
}

/// Bounds of everything a drag can land on, as last reported by the view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSnapshot {
    pub groups: Vec<GroupBox>,
    pub entries: Vec<EntryBox>,
    pub sidebar: Option<Rect>,
    pub content: Option<Rect>,
}

/// What the pointer is over.
#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    Group { id: GroupId, side: Side },
    Entry { id: EntryId, side: Side },
    /// Empty sidebar space below or between groups.
    SidebarBlank,
    /// Empty content space around entries.
    ContentBlank,
    Outside,
}

impl LayoutSnapshot {
    /// Hit-tests a pointer against the reported elements.
    ///
    /// Group and entry elements take precedence over the blank regions that
    /// contain them.
    #[must_use]
    pub fn hit(&self, p: Point) -> Hit {
        if let Some(g) = self.groups.iter().find(|g| g.rect.contains(p)) {
            return Hit::Group {
                id: g.id.clone(),
                side: g.rect.side_of(p),
            };
        }
        if let Some(e) = self.entries.iter().find(|e| e.rect.contains(p)) {
            return Hit::Entry {
                id: e.id.clone(),
                side: e.rect.side_of(p),
            };
        }
        if self.sidebar.is_some_and(|r| r.contains(p)) {
            return Hit::SidebarBlank;
        }
        if self.content.is_some_and(|r| r.contains(p)) {
            return Hit::ContentBlank;
        }
        Hit::Outside
    }
}

/// A resolved place to insert an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertionPoint {
    pub group: GroupId,
    /// Index in the group's current (pre-removal) coordinates.
    pub index: usize,
    /// Entry the insertion lands before; `None` means end of list.
    pub before: Option<EntryId>,
}

impl InsertionPoint {
    fn at(catalog: &Catalog, group: &GroupId, index: usize) -> Option<Self> {
        let entries = &catalog.group(group)?.entries;
        let index = index.min(entries.len());
        Some(Self {
            group: group.clone(),
            index,
            before: entries.get(index).map(|e| e.id.clone()),
        })
    }

    /// End of a group's entry list.
    #[must_use]
    pub fn end_of(catalog: &Catalog, group: &GroupId) -> Option<Self> {
        Self::at(catalog, group, usize::MAX)
    }
}

/// Resolves a pointer into an entry insertion point.
///
/// - over a group: end of that group,
/// - over an entry: before or after it within its owning group,
/// - over blank content: end of the active group,
/// - otherwise `fallback_to_active` decides between the end of the active
///   group and no target at all.
///
/// Returns `None` when the resolved group no longer exists.
#[must_use]
pub fn resolve_entry_slot(
    layout: &LayoutSnapshot,
    catalog: &Catalog,
    p: Point,
    fallback_to_active: bool,
) -> Option<InsertionPoint> {
    match layout.hit(p) {
        Hit::Group { id, .. } => InsertionPoint::end_of(catalog, &id),
        Hit::Entry { id, side } => {
            let (gi, ei) = catalog.locate(&id)?;
            let group = catalog.groups()[gi].id.clone();
            InsertionPoint::at(catalog, &group, ei + side.offset())
        }
        Hit::ContentBlank => InsertionPoint::end_of(catalog, catalog.active_group_id()),
        Hit::SidebarBlank | Hit::Outside if fallback_to_active => {
            InsertionPoint::end_of(catalog, catalog.active_group_id())
        }
        Hit::SidebarBlank | Hit::Outside => None,
    }
}

/// Resolves a pointer into a group-list insertion index.
///
/// Over a group the midpoint chooses the side; over blank sidebar space the
/// target is the end of the list.
#[must_use]
pub fn resolve_group_slot(layout: &LayoutSnapshot, catalog: &Catalog, p: Point) -> Option<usize> {
    match layout.hit(p) {
        Hit::Group { id, side } => catalog.group_index(&id).map(|i| i + side.offset()),
        Hit::SidebarBlank => Some(catalog.groups().len()),
        Hit::Entry { .. } | Hit::ContentBlank | Hit::Outside => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewEntry;

    fn fixture() -> (Catalog, LayoutSnapshot, Vec<EntryId>) {
        let mut catalog = Catalog::default();
        let group = catalog.active_group_id().clone();
        let ids: Vec<EntryId> = catalog
            .add_entries(&group, vec![
                NewEntry::target("/a"),
                NewEntry::target("/b"),
                NewEntry::target("/c"),
            ], None)
            .into_iter()
            .map(|e| e.id)
            .collect();

        let layout = LayoutSnapshot {
            groups: catalog
                .groups()
                .iter()
                .enumerate()
                .map(|(i, g)| GroupBox {
                    id: g.id.clone(),
                    rect: Rect::new(0.0, i as f64 * 30.0, 100.0, 30.0),
                })
                .collect(),
            entries: ids
                .iter()
                .enumerate()
                .map(|(i, id)| EntryBox {
                    id: id.clone(),
                    rect: Rect::new(120.0, i as f64 * 40.0, 200.0, 40.0),
                })
                .collect(),
            sidebar: Some(Rect::new(0.0, 0.0, 100.0, 600.0)),
            content: Some(Rect::new(110.0, 0.0, 500.0, 600.0)),
        };
        (catalog, layout, ids)
    }

    #[test]
    fn vertical_midpoint_decides_side() {
        let r = Rect::new(0.0, 10.0, 50.0, 20.0);
        assert_eq!(r.side_of(Point::new(49.0, 19.9)), Side::Before);
        assert_eq!(r.side_of(Point::new(0.0, 20.0)), Side::After);
    }

    #[test]
    fn entry_slot_before_and_after() {
        let (catalog, layout, ids) = fixture();
        let group = catalog.active_group_id().clone();

        let before_c = resolve_entry_slot(&layout, &catalog, Point::new(150.0, 85.0), false).unwrap();
        assert_eq!(before_c, InsertionPoint { group: group.clone(), index: 2, before: Some(ids[2].clone()) });

        let after_c = resolve_entry_slot(&layout, &catalog, Point::new(150.0, 115.0), false).unwrap();
        assert_eq!(after_c, InsertionPoint { group, index: 3, before: None });
    }

    #[test]
    fn group_hit_targets_end_of_that_group() {
        let (catalog, layout, _) = fixture();
        let tools = catalog.groups()[2].id.clone();
        let slot = resolve_entry_slot(&layout, &catalog, Point::new(10.0, 65.0), false).unwrap();
        assert_eq!(slot.group, tools);
        assert_eq!(slot.index, 0);
    }

    #[test]
    fn outside_falls_back_only_when_asked() {
        let (catalog, layout, _) = fixture();
        let far = Point::new(5000.0, 5000.0);
        assert!(resolve_entry_slot(&layout, &catalog, far, false).is_none());
        let slot = resolve_entry_slot(&layout, &catalog, far, true).unwrap();
        assert_eq!(&slot.group, catalog.active_group_id());
        assert_eq!(slot.index, 3);
    }

    #[test]
    fn group_slot_uses_side_and_blank_sidebar() {
        let (catalog, layout, _) = fixture();
        assert_eq!(resolve_group_slot(&layout, &catalog, Point::new(10.0, 5.0)), Some(0));
        assert_eq!(resolve_group_slot(&layout, &catalog, Point::new(10.0, 50.0)), Some(2));
        assert_eq!(resolve_group_slot(&layout, &catalog, Point::new(10.0, 400.0)), Some(3));
        assert_eq!(resolve_group_slot(&layout, &catalog, Point::new(150.0, 5.0)), None);
    }
}

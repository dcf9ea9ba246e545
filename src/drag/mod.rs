//! Drag coordination for entries, groups, and external file drops.
//!
//! Three drag flows share one drop-preview surface and are mutually exclusive:
//! [`DragFlow`] holds at most one of them, so "only one flow is live" holds by
//! construction. Starting a flow while another is active is ignored.
//!
//! The coordinator never mutates the catalog. Releases produce a [`Commit`]
//! that the event handler applies, so persistence, search and icon follow-ups
//! stay in one place.
//!
//! # Modules
//!
//! - [`geometry`]: hit-testing and the shared pointer → insertion-point resolver
//! - [`entry_drag`]: distance-armed entry reorder/move
//! - [`group_drag`]: long-press-armed group reorder
//! - [`external`]: OS file-drop preview

pub mod entry_drag;
pub mod external;
pub mod geometry;
pub mod group_drag;

pub use entry_drag::{EntryDrag, EntryRelease};
pub use external::ExternalPreview;
pub use geometry::{EntryBox, GroupBox, Hit, InsertionPoint, LayoutSnapshot, Point, Rect, Side};
pub use group_drag::{GroupDrag, GroupMove};

use crate::domain::{Catalog, EntryId, GroupId};
use entry_drag::EntryDragPhase;
use group_drag::GroupDragPhase;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Thresholds shared by the drag flows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSettings {
    /// Pointer travel (px) that turns a press into a drag.
    pub threshold: f64,
    /// Hold time before a group press arms drag-sort.
    pub long_press: Duration,
    /// Window after a group drag during which group clicks are ignored.
    pub click_cooldown: Duration,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            threshold: 5.0,
            long_press: Duration::from_millis(350),
            click_cooldown: Duration::from_millis(250),
        }
    }
}

/// The single active drag flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragFlow {
    #[default]
    Idle,
    Entry(EntryDrag),
    Group(GroupDrag),
    External(ExternalPreview),
}

/// A structural change requested by a finished drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    MoveEntry { id: EntryId, target: InsertionPoint },
    MoveGroup { id: GroupId, index: usize },
}

/// What the view draws while a drag is in progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DropPreview {
    #[serde(rename_all = "camelCase")]
    Entry {
        dragged: EntryId,
        pointer: Point,
        target: Option<InsertionPoint>,
    },
    #[serde(rename_all = "camelCase")]
    Group {
        dragged: GroupId,
        pointer: Point,
        index: Option<usize>,
    },
    #[serde(rename_all = "camelCase")]
    External {
        pointer: Point,
        target: Option<InsertionPoint>,
    },
}

/// Owns the drag flow plus the click-suppression and drop single-flight flags.
#[derive(Debug, Clone, Default)]
pub struct DragCoordinator {
    settings: DragSettings,
    flow: DragFlow,
    suppress_entry_click: bool,
    group_clicks_blocked_until: Option<Instant>,
    drop_in_flight: bool,
}

impl DragCoordinator {
    #[must_use]
    pub fn new(settings: DragSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn flow(&self) -> &DragFlow {
        &self.flow
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.flow, DragFlow::Idle)
    }

    /// True while an entry is being dragged (pending or live).
    #[must_use]
    pub const fn entry_drag_active(&self) -> bool {
        matches!(self.flow, DragFlow::Entry(_))
    }

    /// Starts a potential entry drag. Ignored unless idle.
    pub fn begin_entry(&mut self, id: EntryId, p: Point) -> bool {
        if !self.is_idle() {
            tracing::debug!(entry = %id, "drag already active, ignoring entry press");
            return false;
        }
        self.suppress_entry_click = false;
        self.flow = DragFlow::Entry(EntryDrag::new(id, p));
        true
    }

    /// Starts a potential group drag-sort. Ignored unless idle.
    pub fn begin_group(&mut self, id: GroupId, p: Point, now: Instant) -> bool {
        if !self.is_idle() {
            tracing::debug!(group = %id, "drag already active, ignoring group press");
            return false;
        }
        self.flow = DragFlow::Group(GroupDrag::new(id, p, now + self.settings.long_press));
        true
    }

    /// When the pending group long press arms, if one is pending.
    #[must_use]
    pub const fn long_press_deadline(&self) -> Option<Instant> {
        match &self.flow {
            DragFlow::Group(g) => g.deadline(),
            _ => None,
        }
    }

    pub fn long_press_elapsed(&mut self, now: Instant) -> bool {
        match &mut self.flow {
            DragFlow::Group(g) => g.long_press_elapsed(now),
            _ => false,
        }
    }

    /// Routes pointer movement to the active flow. Returns true if the
    /// preview changed and should be re-rendered.
    pub fn pointer_moved(&mut self, p: Point, layout: &LayoutSnapshot, catalog: &Catalog) -> bool {
        let threshold = self.settings.threshold;
        match &mut self.flow {
            DragFlow::Entry(drag) => drag.pointer_moved(p, threshold, layout, catalog),
            DragFlow::Group(drag) => match drag.pointer_moved(p, threshold, layout, catalog) {
                GroupMove::Unchanged => false,
                GroupMove::Updated => true,
                GroupMove::Abandoned => {
                    tracing::debug!(group = %drag.id, "moved before long press, abandoning group drag");
                    self.flow = DragFlow::Idle;
                    false
                }
            },
            DragFlow::Idle | DragFlow::External(_) => false,
        }
    }

    /// Ends the pointer gesture and returns the commit it produced, if any.
    ///
    /// A live entry drag suppresses the following entry click; a real group
    /// drag blocks group clicks for the cooldown window.
    pub fn release(&mut self, p: Point, layout: &LayoutSnapshot, catalog: &Catalog, now: Instant) -> Option<Commit> {
        match std::mem::take(&mut self.flow) {
            DragFlow::Entry(drag) => match drag.release(p, layout, catalog) {
                EntryRelease::Click => None,
                EntryRelease::Dropped { id, target } => {
                    self.suppress_entry_click = true;
                    target.map(|target| Commit::MoveEntry { id, target })
                }
            },
            DragFlow::Group(drag) => {
                let (id, index) = drag.release(p, layout, catalog)?;
                self.group_clicks_blocked_until = Some(now + self.settings.click_cooldown);
                index.map(|index| Commit::MoveGroup { id, index })
            }
            external @ DragFlow::External(_) => {
                self.flow = external;
                None
            }
            DragFlow::Idle => None,
        }
    }

    /// Cancels an internal drag (pointer cancel, blur, teardown, Escape).
    ///
    /// External previews are cancelled separately by [`Self::external_leave`].
    pub fn cancel(&mut self) -> bool {
        if matches!(self.flow, DragFlow::Entry(_) | DragFlow::Group(_)) {
            tracing::debug!("internal drag cancelled");
            self.flow = DragFlow::Idle;
            return true;
        }
        false
    }

    /// Drops every flow, including an external preview.
    pub fn reset(&mut self) {
        self.flow = DragFlow::Idle;
    }

    /// Consumes the pending entry-click suppression.
    pub fn take_click_suppression(&mut self) -> bool {
        std::mem::take(&mut self.suppress_entry_click)
    }

    /// Whether a group click should switch groups right now.
    #[must_use]
    pub fn group_click_allowed(&self, now: Instant) -> bool {
        self.group_clicks_blocked_until.map_or(true, |until| now >= until)
    }

    /// Updates the external drop preview. Ignored while an internal drag is
    /// active.
    pub fn external_over(&mut self, p: Point, layout: &LayoutSnapshot, catalog: &Catalog) -> bool {
        if matches!(self.flow, DragFlow::Entry(_) | DragFlow::Group(_)) {
            return false;
        }
        let next = DragFlow::External(ExternalPreview::at(p, layout, catalog));
        let changed = self.flow != next;
        self.flow = next;
        changed
    }

    /// Clears the external preview without mutation.
    pub fn external_leave(&mut self) -> bool {
        if matches!(self.flow, DragFlow::External(_)) {
            self.flow = DragFlow::Idle;
            return true;
        }
        false
    }

    /// Resolves an external drop into an insertion point and raises the
    /// single-flight flag.
    ///
    /// Returns `None` (and inserts nothing) when an internal drag is active,
    /// another drop is still being ingested, or the active group is missing.
    pub fn external_drop(&mut self, p: Point, layout: &LayoutSnapshot, catalog: &Catalog) -> Option<InsertionPoint> {
        if matches!(self.flow, DragFlow::Entry(_) | DragFlow::Group(_)) {
            return None;
        }
        self.flow = DragFlow::Idle;
        if self.drop_in_flight {
            tracing::debug!("drop already in flight, ignoring");
            return None;
        }
        if catalog.active_group().is_none() {
            tracing::debug!("no active group, ignoring drop");
            return None;
        }
        let target = geometry::resolve_entry_slot(layout, catalog, p, true)?;
        self.drop_in_flight = true;
        Some(target)
    }

    /// Lowers the single-flight flag once a drop has been ingested.
    pub fn finish_drop(&mut self) {
        self.drop_in_flight = false;
    }

    #[must_use]
    pub const fn drop_in_flight(&self) -> bool {
        self.drop_in_flight
    }

    /// Current preview for the view, if a drag is visible.
    #[must_use]
    pub fn preview(&self) -> Option<DropPreview> {
        match &self.flow {
            DragFlow::Entry(EntryDrag {
                id,
                phase: EntryDragPhase::Live { pointer, target },
                ..
            }) => Some(DropPreview::Entry {
                dragged: id.clone(),
                pointer: *pointer,
                target: target.clone(),
            }),
            DragFlow::Group(GroupDrag {
                id,
                phase: GroupDragPhase::Dragging { pointer, target },
                ..
            }) => Some(DropPreview::Group {
                dragged: id.clone(),
                pointer: *pointer,
                index: *target,
            }),
            DragFlow::External(preview) => Some(DropPreview::External {
                pointer: preview.pointer,
                target: preview.target.clone(),
            }),
            _ => None,
        }
    }
}

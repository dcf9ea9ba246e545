//! Internal entry drag: reorder within a group or move between groups.
//!
//! ```text
//! Pending ──(moved past threshold)──▶ Live ──(release)──▶ commit + suppress click
//!    │                                  │
//!    └──(release)──▶ plain click        └──(cancel)──▶ idle, no mutation
//! ```

use super::geometry::{resolve_entry_slot, InsertionPoint, LayoutSnapshot, Point};
use crate::domain::{Catalog, EntryId};

#[derive(Debug, Clone, PartialEq)]
pub enum EntryDragPhase {
    /// Pointer is down but has not moved far enough to count as a drag.
    Pending,
    /// A real drag; `target` is the current insertion preview.
    Live {
        pointer: Point,
        target: Option<InsertionPoint>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryDrag {
    pub id: EntryId,
    origin: Point,
    pub phase: EntryDragPhase,
}

/// Outcome of releasing an entry drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryRelease {
    /// The pointer never crossed the threshold; the click proceeds.
    Click,
    /// A live drag ended; `target` is `None` when released over nothing.
    Dropped { id: EntryId, target: Option<InsertionPoint> },
}

impl EntryDrag {
    #[must_use]
    pub const fn new(id: EntryId, origin: Point) -> Self {
        Self {
            id,
            origin,
            phase: EntryDragPhase::Pending,
        }
    }

    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self.phase, EntryDragPhase::Live { .. })
    }

    /// Tracks pointer movement. Returns true if the drag preview changed.
    pub fn pointer_moved(&mut self, p: Point, threshold: f64, layout: &LayoutSnapshot, catalog: &Catalog) -> bool {
        if !self.is_live() && self.origin.distance(p) <= threshold {
            return false;
        }
        let target = resolve_entry_slot(layout, catalog, p, false);
        if !self.is_live() {
            tracing::debug!(entry = %self.id, "entry drag went live");
        }
        let next = EntryDragPhase::Live { pointer: p, target };
        let changed = self.phase != next;
        self.phase = next;
        changed
    }

    /// Ends the gesture, resolving the final target from the release point.
    #[must_use]
    pub fn release(self, p: Point, layout: &LayoutSnapshot, catalog: &Catalog) -> EntryRelease {
        match self.phase {
            EntryDragPhase::Pending => EntryRelease::Click,
            EntryDragPhase::Live { .. } => EntryRelease::Dropped {
                target: resolve_entry_slot(layout, catalog, p, false),
                id: self.id,
            },
        }
    }
}

//! Group drag-sort: reorder the sidebar group list.
//!
//! Groups are also click targets, so arming is time-based (long press), and a
//! second distance threshold separates "long press" from "drag":
//!
//! ```text
//! Pressed(deadline) ──(deadline elapsed)──▶ Armed ──(moved past threshold)──▶ Dragging
//!        │                                    │                                  │
//!        └──(moved past threshold)──▶ cancel  └──(release)──▶ no-op              └──(release)──▶ commit
//! ```

use super::geometry::{resolve_group_slot, LayoutSnapshot, Point};
use crate::domain::{Catalog, GroupId};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupDragPhase {
    Pressed { deadline: Instant },
    Armed,
    Dragging { pointer: Point, target: Option<usize> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupDrag {
    pub id: GroupId,
    origin: Point,
    pub phase: GroupDragPhase,
}

/// Effect of a pointer move on a group drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMove {
    Unchanged,
    /// The preview changed (entered dragging or the target moved).
    Updated,
    /// Moved before the long press elapsed; the gesture is abandoned.
    Abandoned,
}

impl GroupDrag {
    #[must_use]
    pub const fn new(id: GroupId, origin: Point, deadline: Instant) -> Self {
        Self {
            id,
            origin,
            phase: GroupDragPhase::Pressed { deadline },
        }
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        match self.phase {
            GroupDragPhase::Pressed { deadline } => Some(deadline),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.phase, GroupDragPhase::Dragging { .. })
    }

    /// Arms the drag once the long-press deadline has passed.
    pub fn long_press_elapsed(&mut self, now: Instant) -> bool {
        match self.phase {
            GroupDragPhase::Pressed { deadline } if now >= deadline => {
                tracing::debug!(group = %self.id, "group drag armed");
                self.phase = GroupDragPhase::Armed;
                true
            }
            _ => false,
        }
    }

    pub fn pointer_moved(&mut self, p: Point, threshold: f64, layout: &LayoutSnapshot, catalog: &Catalog) -> GroupMove {
        let far = self.origin.distance(p) > threshold;
        match self.phase {
            GroupDragPhase::Pressed { .. } if far => GroupMove::Abandoned,
            GroupDragPhase::Pressed { .. } => GroupMove::Unchanged,
            GroupDragPhase::Armed if !far => GroupMove::Unchanged,
            GroupDragPhase::Armed | GroupDragPhase::Dragging { .. } => {
                let next = GroupDragPhase::Dragging {
                    pointer: p,
                    target: resolve_group_slot(layout, catalog, p),
                };
                if self.phase == next {
                    GroupMove::Unchanged
                } else {
                    self.phase = next;
                    GroupMove::Updated
                }
            }
        }
    }

    /// Ends the gesture. Returns the group and its target index only if a
    /// real drag took place and landed on a slot.
    #[must_use]
    pub fn release(self, p: Point, layout: &LayoutSnapshot, catalog: &Catalog) -> Option<(GroupId, Option<usize>)> {
        match self.phase {
            GroupDragPhase::Dragging { .. } => Some((self.id, resolve_group_slot(layout, catalog, p))),
            GroupDragPhase::Pressed { .. } | GroupDragPhase::Armed => None,
        }
    }
}

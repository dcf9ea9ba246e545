//! Non-committing preview for files dragged in from the operating system.

use super::geometry::{resolve_entry_slot, InsertionPoint, LayoutSnapshot, Point};
use crate::domain::Catalog;

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalPreview {
    pub pointer: Point,
    pub target: Option<InsertionPoint>,
}

impl ExternalPreview {
    /// Computes a preview purely from pointer coordinates, falling back to
    /// the end of the active group when the pointer is over nothing.
    #[must_use]
    pub fn at(p: Point, layout: &LayoutSnapshot, catalog: &Catalog) -> Self {
        Self {
            pointer: p,
            target: resolve_entry_slot(layout, catalog, p, true),
        }
    }
}

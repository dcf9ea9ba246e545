//! Multi-select semantics over the visible entry list.
//!
//! The selection is a set of entry identities plus a "last clicked" anchor.
//! Range clicks are computed over the list that is visible *right now* (the
//! active group, or search results), never over stored group order.

use crate::domain::EntryId;
use std::collections::HashSet;

/// Keyboard modifiers held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
}

/// What a click on an entry asks the caller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Plain click: the selection was cleared; launch this entry.
    Launch(EntryId),
    /// The selection changed; nothing to launch.
    Selected,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: HashSet<EntryId>,
    anchor: Option<EntryId>,
}

impl Selection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn contains(&self, id: &EntryId) -> bool {
        self.selected.contains(id)
    }

    #[must_use]
    pub const fn anchor(&self) -> Option<&EntryId> {
        self.anchor.as_ref()
    }

    /// Selected identities in visible-list order; selected entries that are
    /// not visible follow in identity order.
    #[must_use]
    pub fn ordered(&self, visible: &[EntryId]) -> Vec<EntryId> {
        let mut out: Vec<EntryId> = visible.iter().filter(|id| self.selected.contains(*id)).cloned().collect();
        let mut hidden: Vec<EntryId> = self.selected.iter().filter(|id| !visible.contains(id)).cloned().collect();
        hidden.sort();
        out.extend(hidden);
        out
    }

    /// Applies a click on `id` against the visible list.
    ///
    /// - plain: clear, set anchor, launch
    /// - ctrl: toggle membership, set anchor
    /// - shift: add `[min(anchor, current), max(anchor, current)]`; a missing
    ///   or invisible anchor counts as index 0; the anchor is kept
    ///
    /// # Examples
    ///
    /// ```
    /// use quickdock::app::selection::{Modifiers, Selection};
    /// use quickdock::domain::EntryId;
    ///
    /// let visible: Vec<EntryId> = ["a", "b", "c", "d"].map(EntryId::from).to_vec();
    /// let mut selection = Selection::default();
    /// selection.click(&visible[0], &visible, Modifiers { ctrl: true, shift: false });
    /// selection.click(&visible[2], &visible, Modifiers { ctrl: false, shift: true });
    /// assert_eq!(selection.ordered(&visible), visible[..3].to_vec());
    /// ```
    pub fn click(&mut self, id: &EntryId, visible: &[EntryId], modifiers: Modifiers) -> ClickOutcome {
        if modifiers.shift {
            let Some(current) = visible.iter().position(|v| v == id) else {
                return ClickOutcome::Selected;
            };
            let anchor = self
                .anchor
                .as_ref()
                .and_then(|a| visible.iter().position(|v| v == a))
                .unwrap_or(0);
            let (lo, hi) = (anchor.min(current), anchor.max(current));
            self.selected.extend(visible[lo..=hi].iter().cloned());
            tracing::debug!(from = lo, to = hi, selected = self.selected.len(), "range selected");
            return ClickOutcome::Selected;
        }

        self.anchor = Some(id.clone());
        if modifiers.ctrl {
            if !self.selected.remove(id) {
                self.selected.insert(id.clone());
            }
            return ClickOutcome::Selected;
        }

        self.selected.clear();
        ClickOutcome::Launch(id.clone())
    }

    /// Replaces the selection with every visible entry.
    pub fn select_all(&mut self, visible: &[EntryId]) {
        self.selected = visible.iter().cloned().collect();
    }

    /// Empties the selection and drops the anchor. Returns true if anything
    /// was selected.
    pub fn clear(&mut self) -> bool {
        self.anchor = None;
        let had = !self.selected.is_empty();
        self.selected.clear();
        had
    }

    /// Drops identities that no longer exist.
    pub fn retain(&mut self, exists: impl Fn(&EntryId) -> bool) {
        self.selected.retain(|id| exists(id));
        if self.anchor.as_ref().is_some_and(|a| !exists(a)) {
            self.anchor = None;
        }
    }
}

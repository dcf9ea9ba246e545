//! Application state: the catalog plus all ephemeral interaction state.
//!
//! [`AppState`] pairs the persisted [`Catalog`] with the state that is never
//! persisted and is reset on session start, group switch, or search change:
//! the search query and index, the selection, the active drag flow, and icon
//! bookkeeping. It is mutated only by [`handle_event`](super::handle_event).
//!
//! # Visible List
//!
//! Selection, keyboard shortcuts, and range clicks all work against the
//! *visible* list: the active group's entries in stored order when the query is
//! blank, otherwise the search hits across every group in catalog order.

use crate::domain::{Catalog, Entry, EntryId};
use crate::drag::{DragCoordinator, DragSettings, LayoutSnapshot};
use crate::host::InstalledPackage;
use crate::icons::IconCache;
use crate::search::SearchIndex;
use super::selection::Selection;
use std::collections::HashSet;

/// Central application state container.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The persisted model. Mutated only through its own operations.
    pub catalog: Catalog,

    /// Raw search text as typed.
    pub search_query: String,

    /// Token index over entry names; rebuilt by [`AppState::catalog_changed`].
    pub search: SearchIndex,

    pub selection: Selection,

    pub drag: DragCoordinator,

    pub icons: IconCache,

    /// Element bounds last reported by the view, used for hit-testing.
    pub layout: LayoutSnapshot,

    /// Entries the last validation scan reported as missing.
    pub invalid_targets: HashSet<EntryId>,

    /// Installed packages offered by the last listing.
    pub packages: Vec<InstalledPackage>,

    /// False until the persisted catalog has been loaded (or defaulted).
    pub loaded: bool,
}

impl AppState {
    /// Creates state around a catalog with fresh ephemeral state.
    ///
    /// # Parameters
    ///
    /// * `catalog` - Initial catalog (the default until loading completes)
    /// * `drag` - Drag thresholds
    /// * `icon_size` - Edge length requested for icons
    #[must_use]
    pub fn new(catalog: Catalog, drag: DragSettings, icon_size: u32) -> Self {
        let search = SearchIndex::build(&catalog);
        Self {
            catalog,
            search_query: String::new(),
            search,
            selection: Selection::default(),
            drag: DragCoordinator::new(drag),
            icons: IconCache::new(icon_size),
            layout: LayoutSnapshot::default(),
            invalid_targets: HashSet::new(),
            packages: Vec::new(),
            loaded: false,
        }
    }

    /// Swaps in a freshly loaded catalog and resets all ephemeral state.
    pub fn replace_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
        self.search_query.clear();
        self.selection.clear();
        self.drag.reset();
        self.drag.finish_drop();
        self.icons.clear();
        self.invalid_targets.clear();
        self.loaded = true;
        self.search.rebuild(&self.catalog);
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        !self.search_query.trim().is_empty()
    }

    /// Identities of the visible entries, in display order.
    #[must_use]
    pub fn visible_ids(&self) -> Vec<EntryId> {
        self.search.query(&self.search_query).unwrap_or_else(|| {
            self.catalog
                .active_group()
                .map(|g| g.entries.iter().map(|e| e.id.clone()).collect())
                .unwrap_or_default()
        })
    }

    /// The visible entries, in display order.
    #[must_use]
    pub fn visible_entries(&self) -> Vec<&Entry> {
        self.visible_ids()
            .iter()
            .filter_map(|id| self.catalog.entry(id))
            .collect()
    }

    /// Updates the search text.
    ///
    /// Crossing between blank and non-blank clears the selection; a search
    /// becoming active cancels any entry drag. Returns true if the query
    /// changed.
    pub fn set_search(&mut self, query: &str) -> bool {
        if self.search_query == query {
            return false;
        }
        let was_searching = self.is_searching();
        self.search_query = query.to_string();
        let searching = self.is_searching();

        if was_searching != searching {
            self.selection.clear();
        }
        if searching && self.drag.entry_drag_active() {
            tracing::debug!("search started, cancelling entry drag");
            self.drag.cancel();
        }
        true
    }

    /// Resets ephemeral state after the active group changed.
    pub fn group_switched(&mut self) {
        self.selection.clear();
        self.search_query.clear();
        self.drag.cancel();
    }

    /// Re-derives everything that projects the catalog after a structural
    /// change: the search index and the selection's surviving members.
    pub fn catalog_changed(&mut self) {
        self.search.rebuild(&self.catalog);
        let catalog = &self.catalog;
        self.selection.retain(|id| catalog.entry(id).is_some());
        self.invalid_targets.retain(|id| catalog.entry(id).is_some());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewEntry;

    fn state() -> AppState {
        let mut catalog = Catalog::default();
        let first = catalog.groups()[0].id.clone();
        let second = catalog.groups()[1].id.clone();
        catalog.add_entries(&first, vec![NewEntry::named("/a", "Alpha"), NewEntry::named("/b", "Beta")], None);
        catalog.add_entries(&second, vec![NewEntry::named("/c", "Alphabet")], None);
        AppState::new(catalog, DragSettings::default(), 32)
    }

    #[test]
    fn visible_list_follows_search() {
        let mut state = state();
        let names = |s: &AppState| s.visible_entries().iter().map(|e| e.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&state), ["Alpha", "Beta"]);
        state.set_search("alp");
        assert_eq!(names(&state), ["Alpha", "Alphabet"]);
        state.set_search("  ");
        assert_eq!(names(&state), ["Alpha", "Beta"]);
    }

    #[test]
    fn search_transitions_clear_selection() {
        let mut state = state();
        let visible = state.visible_ids();
        state.selection.select_all(&visible);
        state.set_search("a");
        assert!(state.selection.is_empty());

        let visible = state.visible_ids();
        state.selection.select_all(&visible);
        state.set_search("al");
        assert!(!state.selection.is_empty());
        state.set_search("");
        assert!(state.selection.is_empty());
    }
}

//! View model types representing renderable launcher state.
//!
//! View models are computed from [`AppState`] on demand and serialized to the
//! view. They contain no business logic, only display-ready data: which group
//! is active, which entries are visible and selected, and what drop preview to
//! draw.

use super::AppState;
use crate::domain::{EntryId, GroupId, IconData, Settings};
use crate::drag::DropPreview;
use crate::host::InstalledPackage;
use serde::Serialize;

/// Complete view model for one render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub groups: Vec<GroupView>,
    pub active_group_id: GroupId,
    pub search_query: String,
    /// True while a non-blank search is active; entry drag is disabled.
    pub searching: bool,
    pub entries: Vec<EntryView>,
    pub selected_count: usize,
    pub drop_preview: Option<DropPreview>,
    pub settings: Settings,
    pub packages: Vec<InstalledPackage>,
    pub loaded: bool,
}

/// One sidebar row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub id: GroupId,
    pub name: String,
    pub entry_count: usize,
    pub active: bool,
}

/// One visible entry card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub id: EntryId,
    pub group_id: GroupId,
    pub name: String,
    pub target: String,
    pub args: Option<String>,
    pub icon: Option<IconData>,
    pub selected: bool,
    /// The last validation scan could not find the target.
    pub missing: bool,
}

impl ViewModel {
    /// Projects the current state.
    ///
    /// # Example
    ///
    /// ```rust
    /// use quickdock::app::{AppState, ViewModel};
    /// use quickdock::domain::Catalog;
    /// use quickdock::drag::DragSettings;
    ///
    /// let state = AppState::new(Catalog::default(), DragSettings::default(), 32);
    /// let vm = ViewModel::from_state(&state);
    /// assert_eq!(vm.groups.len(), 3);
    /// assert!(vm.groups[0].active);
    /// assert!(vm.entries.is_empty());
    /// ```
    #[must_use]
    pub fn from_state(state: &AppState) -> Self {
        let catalog = &state.catalog;
        let active = catalog.active_group_id();

        let groups = catalog
            .groups()
            .iter()
            .map(|g| GroupView {
                id: g.id.clone(),
                name: g.name.clone(),
                entry_count: g.entries.len(),
                active: &g.id == active,
            })
            .collect();

        let entries = state
            .visible_ids()
            .into_iter()
            .filter_map(|id| {
                let (gi, ei) = catalog.locate(&id)?;
                let group = &catalog.groups()[gi];
                let entry = &group.entries[ei];
                Some(EntryView {
                    group_id: group.id.clone(),
                    name: entry.name.clone(),
                    target: entry.target.to_string(),
                    args: entry.args.clone(),
                    icon: entry.icon.clone(),
                    selected: state.selection.contains(&id),
                    missing: state.invalid_targets.contains(&id),
                    id,
                })
            })
            .collect();

        Self {
            groups,
            active_group_id: active.clone(),
            search_query: state.search_query.clone(),
            searching: state.is_searching(),
            entries,
            selected_count: state.selection.len(),
            drop_preview: state.drag.preview(),
            settings: catalog.settings().clone(),
            packages: state.packages.clone(),
            loaded: state.loaded,
        }
    }
}

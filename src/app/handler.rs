//! Event handling and state transition logic.
//!
//! This module implements the core event handler that processes pointer,
//! keyboard, and command events from the view plus completions reported by the
//! orchestrator, translating them into state changes and action sequences.
//!
//! # Architecture
//!
//! The handler follows a unidirectional data flow pattern:
//! 1. Events arrive from the view (JSON) or from completed host calls
//! 2. [`handle_event`] pattern-matches the event type
//! 3. The catalog and ephemeral state are mutated synchronously
//! 4. Actions are collected and returned for the orchestrator to execute
//!
//! Two synchronous mutations can never interleave, and nothing here awaits.
//!
//! # Event Types
//!
//! - **Pointer**: `EntryPressed`, `GroupPressed`, `PointerMoved`, `PointerReleased`, `PointerCancelled`
//! - **Clicks**: `EntryClicked`, `GroupClicked`, `BlankDoubleClicked`
//! - **External drag**: `ExternalDragOver`, `ExternalDragLeave`, `ExternalDrop`
//! - **Keyboard**: `KeyPressed`
//! - **Commands**: catalog edits, settings, packages, validation, window chrome
//! - **Completions** (internal): `CatalogLoaded`, `IconResolved`, `InsertReady`, ...

use crate::app::actions::PendingInsert;
use crate::app::selection::{ClickOutcome, Modifiers};
use crate::app::{Action, AppState};
use crate::domain::error::Result;
use crate::domain::{Catalog, EntryId, EntryPatch, GroupId, IconData, NewEntry, Settings, APPS_FOLDER_PREFIX};
use crate::drag::{Commit, DragFlow, LayoutSnapshot, Point};
use crate::host::{InstalledPackage, WindowCommand};
use crate::icons::{IconKey, IconRequest};
use serde::Deserialize;
use std::time::Instant;

/// Keys with launcher-level meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Key {
    Escape,
    Enter,
    Delete,
    /// Any character key; only `a` with ctrl is bound.
    Char(char),
}

/// Events triggered by the view or by completed host operations.
///
/// View events deserialize from JSON objects tagged by `type`; completion
/// events are produced by the orchestrator only.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    /// Search text changed.
    SearchChanged { query: String },

    /// The view re-laid out; carries element bounds for hit-testing.
    LayoutChanged { layout: LayoutSnapshot },

    /// Entries scrolled into the viewport.
    EntriesVisible { ids: Vec<EntryId> },

    EntryPressed { id: EntryId, point: Point },
    GroupPressed { id: GroupId, point: Point },
    PointerMoved { point: Point },
    PointerReleased { point: Point },
    /// Pointer capture lost; any internal drag is abandoned.
    PointerCancelled,
    WindowBlurred,

    /// Synthetic click that follows a press/release on an entry.
    EntryClicked {
        id: EntryId,
        #[serde(default)]
        modifiers: Modifiers,
    },
    GroupClicked { id: GroupId },
    /// Double click on empty content space.
    BlankDoubleClicked,

    ExternalDragOver { point: Point },
    ExternalDragLeave,
    ExternalDrop { point: Point, paths: Vec<String> },

    KeyPressed {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },

    AddEntries {
        #[serde(default)]
        group: Option<GroupId>,
        entries: Vec<NewEntry>,
        #[serde(default)]
        index: Option<usize>,
    },
    RemoveEntry { id: EntryId },
    MoveEntry { id: EntryId, group: GroupId, index: usize },
    EditEntry { id: EntryId, patch: EntryPatch },
    LaunchEntry { id: EntryId },
    OpenContainingFolder { id: EntryId },
    DeleteSelected,
    MoveSelectedToGroup { group: GroupId },

    AddGroup {
        #[serde(default)]
        name: Option<String>,
    },
    RemoveGroup { id: GroupId },
    RenameGroup { id: GroupId, name: String },
    MoveGroup { id: GroupId, index: usize },

    UpdateSettings { settings: Settings },
    ListPackages,
    AddPackages { packages: Vec<InstalledPackage> },
    ValidateTargets,
    Window { command: WindowCommand },
    Shutdown,

    /// The persisted (or default) catalog is ready.
    #[serde(skip)]
    CatalogLoaded { catalog: Catalog },
    /// The long-press deadline of a group press passed.
    #[serde(skip)]
    LongPressElapsed,
    /// An icon lookup finished; `None` on failure or an empty result.
    #[serde(skip)]
    IconResolved { key: IconKey, icon: Option<IconData> },
    /// A pending insert finished path normalization.
    #[serde(skip)]
    InsertReady(PendingInsert),
    #[serde(skip)]
    PackagesListed { packages: Vec<InstalledPackage> },
    #[serde(skip)]
    TargetsValidated { results: Vec<(EntryId, bool)> },
}

type Outcome = Result<(bool, Vec<Action>)>;

/// Processes an event, mutates application state, and returns actions to execute.
///
/// This is the primary event handler. It pattern-matches on event types, calls
/// catalog and state mutators, and collects actions to be executed by the
/// orchestrator.
///
/// # Parameters
///
/// * `state` - Mutable reference to application state
/// * `event` - Event to process
/// * `now` - Current time, for long-press and click-cooldown decisions
///
/// # Returns
///
/// `(render, actions)`: whether the view needs a fresh view model, and the
/// side effects to run in order. Refused preconditions (removing the last
/// group, dropping with no active group, dragging while searching) return
/// `(false, [])` without error.
///
/// # Errors
///
/// Reserved for failures of state mutation; current event handling never fails.
///
/// # Example
///
/// ```rust
/// use quickdock::app::{handle_event, AppState, Event};
/// use quickdock::domain::Catalog;
/// use quickdock::drag::DragSettings;
/// use std::time::Instant;
///
/// let mut state = AppState::new(Catalog::default(), DragSettings::default(), 32);
/// let (render, actions) = handle_event(
///     &mut state,
///     &Event::AddPackages { packages: vec![] },
///     Instant::now(),
/// )?;
/// assert!(!render && actions.is_empty());
/// # Ok::<(), quickdock::LauncherError>(())
/// ```
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut AppState, event: &Event, now: Instant) -> Outcome {
    let _span = tracing::debug_span!("handle_event", event_type = event_name(event)).entered();

    match event {
        Event::SearchChanged { query } => Ok((state.set_search(query), vec![])),
        Event::LayoutChanged { layout } => {
            state.layout = layout.clone();
            Ok((false, vec![]))
        }
        Event::EntriesVisible { ids } => Ok(entries_visible(state, ids)),

        Event::EntryPressed { id, point } => {
            if state.is_searching() {
                tracing::debug!(entry = %id, "search active, entry drag disabled");
                return Ok((false, vec![]));
            }
            if state.catalog.entry(id).is_none() {
                return Ok((false, vec![]));
            }
            state.drag.begin_entry(id.clone(), *point);
            Ok((false, vec![]))
        }
        Event::GroupPressed { id, point } => {
            if !state.catalog.settings().enable_group_drag_sort || state.catalog.group(id).is_none() {
                return Ok((false, vec![]));
            }
            state.drag.begin_group(id.clone(), *point, now);
            Ok((false, vec![]))
        }
        Event::LongPressElapsed => Ok((state.drag.long_press_elapsed(now), vec![])),
        Event::PointerMoved { point } => {
            let changed = state.drag.pointer_moved(*point, &state.layout, &state.catalog);
            Ok((changed, vec![]))
        }
        Event::PointerReleased { point } => {
            let was_visible = state.drag.preview().is_some();
            let commit = state.drag.release(*point, &state.layout, &state.catalog, now);
            Ok(commit.map_or((was_visible, vec![]), |commit| apply_commit(state, commit)))
        }
        Event::PointerCancelled => Ok((state.drag.cancel(), vec![])),
        Event::WindowBlurred => {
            let cancelled = state.drag.cancel();
            let left = state.drag.external_leave();
            Ok((cancelled || left, vec![]))
        }

        Event::EntryClicked { id, modifiers } => Ok(entry_clicked(state, id, *modifiers)),
        Event::GroupClicked { id } => {
            if !state.drag.group_click_allowed(now) {
                tracing::debug!(group = %id, "group click inside drag cooldown, ignored");
                return Ok((false, vec![]));
            }
            if !state.catalog.set_active_group(id) {
                return Ok((false, vec![]));
            }
            state.group_switched();
            Ok((true, vec![]))
        }
        Event::BlankDoubleClicked => {
            if state.catalog.settings().dbl_click_blank_to_hide {
                Ok((false, vec![Action::Window(WindowCommand::Hide)]))
            } else {
                Ok((false, vec![]))
            }
        }

        Event::ExternalDragOver { point } => {
            Ok((state.drag.external_over(*point, &state.layout, &state.catalog), vec![]))
        }
        Event::ExternalDragLeave => Ok((state.drag.external_leave(), vec![])),
        Event::ExternalDrop { point, paths } => Ok(external_drop(state, *point, paths)),

        Event::KeyPressed { key, modifiers } => Ok(key_pressed(state, *key, *modifiers)),

        Event::AddEntries { group, entries, index } => {
            let group = group.clone().unwrap_or_else(|| state.catalog.active_group_id().clone());
            if state.catalog.group(&group).is_none() || entries.is_empty() {
                return Ok((false, vec![]));
            }
            Ok((false, vec![Action::PrepareInsert(PendingInsert {
                group,
                index: *index,
                entries: entries.clone(),
                normalize: state.catalog.settings().use_relative_path,
                from_drop: false,
            })]))
        }
        Event::InsertReady(insert) => Ok(insert_ready(state, insert)),
        Event::AddPackages { packages } => {
            let entries: Vec<NewEntry> = packages
                .iter()
                .filter(|p| !p.id.trim().is_empty())
                .map(|p| NewEntry::named(format!("{APPS_FOLDER_PREFIX}{}", p.id.trim()), p.name.clone()))
                .collect();
            if entries.is_empty() {
                return Ok((false, vec![]));
            }
            let group = state.catalog.active_group_id().clone();
            Ok(insert_ready(state, &PendingInsert {
                group,
                index: None,
                entries,
                normalize: false,
                from_drop: false,
            }))
        }
        Event::RemoveEntry { id } => {
            if state.catalog.remove_entry(id).is_none() {
                return Ok((false, vec![]));
            }
            state.icons.forget(id);
            state.catalog_changed();
            Ok((true, vec![Action::Persist]))
        }
        Event::MoveEntry { id, group, index } => {
            if !state.catalog.move_entry(id, group, *index) {
                return Ok((false, vec![]));
            }
            state.catalog_changed();
            Ok((true, vec![Action::Persist]))
        }
        Event::EditEntry { id, patch } => {
            let edit = state.catalog.edit_entry(id, patch.clone());
            if !edit.changed {
                return Ok((false, vec![]));
            }
            if edit.target_changed {
                state.icons.forget(id);
                state.invalid_targets.remove(id);
            }
            state.catalog_changed();
            Ok((true, vec![Action::Persist]))
        }
        Event::LaunchEntry { id } => Ok((false, launch(&state.catalog, id).into_iter().collect())),
        Event::OpenContainingFolder { id } => Ok((
            false,
            state
                .catalog
                .entry(id)
                .map(|e| Action::OpenContainingFolder(e.target.clone()))
                .into_iter()
                .collect(),
        )),
        Event::DeleteSelected => Ok(delete_selected(state)),
        Event::MoveSelectedToGroup { group } => {
            let ids = state.selection.ordered(&state.visible_ids());
            state.selection.clear();
            let moved = state.catalog.move_entries_to_group(&ids, group);
            if moved == 0 {
                return Ok((true, vec![]));
            }
            state.catalog_changed();
            Ok((true, vec![Action::Persist]))
        }

        Event::AddGroup { name } => {
            state.catalog.add_group(name.as_deref());
            state.group_switched();
            state.catalog_changed();
            Ok((true, vec![Action::Persist]))
        }
        Event::RemoveGroup { id } => {
            let active_before = state.catalog.active_group_id().clone();
            let Some(removed) = state.catalog.remove_group(id) else {
                return Ok((false, vec![]));
            };
            for entry in &removed.entries {
                state.icons.forget(&entry.id);
            }
            if state.catalog.active_group_id() != &active_before {
                state.group_switched();
            }
            state.catalog_changed();
            Ok((true, vec![Action::Persist]))
        }
        Event::RenameGroup { id, name } => {
            if !state.catalog.rename_group(id, name) {
                return Ok((false, vec![]));
            }
            Ok((true, vec![Action::Persist]))
        }
        Event::MoveGroup { id, index } => {
            if !state.catalog.move_group(id, *index) {
                return Ok((false, vec![]));
            }
            state.catalog_changed();
            Ok((true, vec![Action::Persist]))
        }

        Event::UpdateSettings { settings } => Ok(update_settings(state, settings.clone())),
        Event::ListPackages => Ok((false, vec![Action::ListPackages])),
        Event::PackagesListed { packages } => {
            state.packages = packages.clone();
            Ok((true, vec![]))
        }
        Event::ValidateTargets => {
            let targets = state
                .catalog
                .entries()
                .map(|(_, e)| (e.id.clone(), e.target.clone()))
                .collect();
            Ok((false, vec![Action::ValidateTargets(targets)]))
        }
        Event::TargetsValidated { results } => {
            state.invalid_targets = results
                .iter()
                .filter(|(id, exists)| !exists && state.catalog.entry(id).is_some())
                .map(|(id, _)| id.clone())
                .collect();
            tracing::debug!(invalid = state.invalid_targets.len(), "targets validated");
            Ok((true, vec![]))
        }
        Event::Window { command } => Ok((false, vec![Action::Window(*command)])),
        Event::Shutdown => {
            state.drag.reset();
            Ok((false, vec![Action::Shutdown]))
        }

        Event::CatalogLoaded { catalog } => {
            state.replace_catalog(catalog.clone());
            let settings = state.catalog.settings();
            let mut actions = Vec::new();
            if !settings.toggle_hotkey.is_empty() {
                actions.push(Action::ApplyHotkey(settings.toggle_hotkey.clone()));
            }
            actions.push(Action::ApplyAlwaysOnTop(settings.always_on_top));
            actions.push(Action::StartupComplete {
                hide_on_startup: settings.hide_on_startup,
            });
            tracing::info!(
                groups = state.catalog.groups().len(),
                entries = state.catalog.entry_count(),
                "catalog loaded"
            );
            Ok((true, actions))
        }
        Event::IconResolved { key, icon } => Ok(icon_resolved(state, key, icon.as_ref())),
    }
}

const fn event_name(event: &Event) -> &'static str {
    match event {
        Event::SearchChanged { .. } => "search_changed",
        Event::LayoutChanged { .. } => "layout_changed",
        Event::EntriesVisible { .. } => "entries_visible",
        Event::EntryPressed { .. } => "entry_pressed",
        Event::GroupPressed { .. } => "group_pressed",
        Event::LongPressElapsed => "long_press_elapsed",
        Event::PointerMoved { .. } => "pointer_moved",
        Event::PointerReleased { .. } => "pointer_released",
        Event::PointerCancelled => "pointer_cancelled",
        Event::WindowBlurred => "window_blurred",
        Event::EntryClicked { .. } => "entry_clicked",
        Event::GroupClicked { .. } => "group_clicked",
        Event::BlankDoubleClicked => "blank_double_clicked",
        Event::ExternalDragOver { .. } => "external_drag_over",
        Event::ExternalDragLeave => "external_drag_leave",
        Event::ExternalDrop { .. } => "external_drop",
        Event::KeyPressed { .. } => "key_pressed",
        Event::AddEntries { .. } => "add_entries",
        Event::InsertReady(_) => "insert_ready",
        Event::AddPackages { .. } => "add_packages",
        Event::RemoveEntry { .. } => "remove_entry",
        Event::MoveEntry { .. } => "move_entry",
        Event::EditEntry { .. } => "edit_entry",
        Event::LaunchEntry { .. } => "launch_entry",
        Event::OpenContainingFolder { .. } => "open_containing_folder",
        Event::DeleteSelected => "delete_selected",
        Event::MoveSelectedToGroup { .. } => "move_selected_to_group",
        Event::AddGroup { .. } => "add_group",
        Event::RemoveGroup { .. } => "remove_group",
        Event::RenameGroup { .. } => "rename_group",
        Event::MoveGroup { .. } => "move_group",
        Event::UpdateSettings { .. } => "update_settings",
        Event::ListPackages => "list_packages",
        Event::PackagesListed { .. } => "packages_listed",
        Event::ValidateTargets => "validate_targets",
        Event::TargetsValidated { .. } => "targets_validated",
        Event::Window { .. } => "window",
        Event::Shutdown => "shutdown",
        Event::CatalogLoaded { .. } => "catalog_loaded",
        Event::IconResolved { .. } => "icon_resolved",
    }
}

fn launch(catalog: &Catalog, id: &EntryId) -> Option<Action> {
    let entry = catalog.entry(id)?;
    tracing::debug!(entry = %id, path = %entry.target, "launch requested");
    Some(Action::Launch {
        target: entry.target.clone(),
        args: entry.argv(),
    })
}

fn entries_visible(state: &mut AppState, ids: &[EntryId]) -> (bool, Vec<Action>) {
    let actions = ids
        .iter()
        .filter_map(|id| state.catalog.entry(id))
        .filter_map(|entry| match state.icons.entry_visible(entry) {
            IconRequest::Issue(key) => Some(Action::ResolveIcon(key)),
            IconRequest::Joined | IconRequest::Skipped => None,
        })
        .collect();
    (false, actions)
}

fn icon_resolved(state: &mut AppState, key: &IconKey, icon: Option<&IconData>) -> (bool, Vec<Action>) {
    let waiters = state.icons.complete(key);
    let Some(icon) = icon.filter(|i| !i.is_empty()) else {
        tracing::debug!(lookup = %key.lookup, waiters = waiters.len(), "no icon resolved");
        return (false, vec![]);
    };
    let size = state.icons.size();
    let assigned = waiters
        .iter()
        .filter(|id| {
            state
                .catalog
                .entry(id)
                .is_some_and(|e| IconKey::for_target(&e.target, size) == *key)
                && state.catalog.set_icon(id, icon.clone())
        })
        .count();
    if assigned == 0 {
        return (false, vec![]);
    }
    (true, vec![Action::Persist])
}

fn apply_commit(state: &mut AppState, commit: Commit) -> (bool, Vec<Action>) {
    let moved = match commit {
        Commit::MoveEntry { id, target } => state.catalog.move_entry(&id, &target.group, target.index),
        Commit::MoveGroup { id, index } => state.catalog.move_group(&id, index),
    };
    if !moved {
        return (true, vec![]);
    }
    state.catalog_changed();
    (true, vec![Action::Persist])
}

fn entry_clicked(state: &mut AppState, id: &EntryId, modifiers: Modifiers) -> (bool, Vec<Action>) {
    if state.drag.take_click_suppression() {
        tracing::debug!(entry = %id, "click after drag suppressed");
        state.selection.clear();
        return (true, vec![]);
    }
    let visible = state.visible_ids();
    match state.selection.click(id, &visible, modifiers) {
        ClickOutcome::Launch(id) => (true, launch(&state.catalog, &id).into_iter().collect()),
        ClickOutcome::Selected => (true, vec![]),
    }
}

fn external_drop(state: &mut AppState, point: Point, paths: &[String]) -> (bool, Vec<Action>) {
    let entries: Vec<NewEntry> = paths
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(NewEntry::target)
        .collect();
    if entries.is_empty() {
        return (state.drag.external_leave(), vec![]);
    }
    let Some(target) = state.drag.external_drop(point, &state.layout, &state.catalog) else {
        return (true, vec![]);
    };
    tracing::debug!(group = %target.group, index = target.index, paths = entries.len(), "external drop accepted");
    (true, vec![Action::PrepareInsert(PendingInsert {
        group: target.group,
        index: Some(target.index),
        entries,
        normalize: state.catalog.settings().use_relative_path,
        from_drop: true,
    })])
}

fn insert_ready(state: &mut AppState, insert: &PendingInsert) -> (bool, Vec<Action>) {
    if insert.from_drop {
        state.drag.finish_drop();
    }
    let added = state.catalog.add_entries(&insert.group, insert.entries.clone(), insert.index);
    if added.is_empty() {
        return (false, vec![]);
    }
    state.catalog_changed();
    (true, vec![Action::Persist])
}

fn key_pressed(state: &mut AppState, key: Key, modifiers: Modifiers) -> (bool, Vec<Action>) {
    match key {
        Key::Escape => {
            if state.drag.cancel() || state.drag.external_leave() || state.selection.clear() {
                return (true, vec![]);
            }
            (state.set_search(""), vec![])
        }
        Key::Enter => {
            let visible = state.visible_ids();
            let target = match state.selection.len() {
                0 => visible.first().cloned(),
                1 => state.selection.ordered(&visible).into_iter().next(),
                _ => None,
            };
            (false, target.and_then(|id| launch(&state.catalog, &id)).into_iter().collect())
        }
        Key::Delete => delete_selected(state),
        Key::Char(c) if modifiers.ctrl && c.eq_ignore_ascii_case(&'a') => {
            let visible = state.visible_ids();
            state.selection.select_all(&visible);
            (true, vec![])
        }
        Key::Char(_) => (false, vec![]),
    }
}

fn delete_selected(state: &mut AppState) -> (bool, Vec<Action>) {
    let ids = state.selection.ordered(&state.visible_ids());
    state.selection.clear();
    if ids.is_empty() {
        return (false, vec![]);
    }
    let removed = state.catalog.remove_entries(&ids);
    for id in &ids {
        state.icons.forget(id);
    }
    if removed == 0 {
        return (true, vec![]);
    }
    state.catalog_changed();
    (true, vec![Action::Persist])
}

fn update_settings(state: &mut AppState, settings: Settings) -> (bool, Vec<Action>) {
    let before = state.catalog.settings().clone();
    state.catalog.set_settings(settings);
    let after = state.catalog.settings();
    if &before == after {
        return (false, vec![]);
    }

    let mut actions = Vec::new();
    if before.toggle_hotkey != after.toggle_hotkey {
        actions.push(Action::ApplyHotkey(after.toggle_hotkey.clone()));
    }
    if before.always_on_top != after.always_on_top {
        actions.push(Action::ApplyAlwaysOnTop(after.always_on_top));
    }
    if before.auto_start != after.auto_start {
        actions.push(Action::ApplyAutoStart(after.auto_start));
    }
    if !after.enable_group_drag_sort && matches!(state.drag.flow(), DragFlow::Group(_)) {
        state.drag.cancel();
    }
    actions.push(Action::Persist);
    (true, actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::{DragSettings, EntryBox, Rect};

    fn state_with(names: &[&str]) -> (AppState, Vec<EntryId>) {
        let mut catalog = Catalog::default();
        let group = catalog.active_group_id().clone();
        let ids = catalog
            .add_entries(&group, names.iter().map(|n| NewEntry::named(format!("/apps/{n}"), *n)).collect(), None)
            .into_iter()
            .map(|e| e.id)
            .collect::<Vec<_>>();
        let mut state = AppState::new(catalog, DragSettings::default(), 32);
        state.layout = LayoutSnapshot {
            entries: ids
                .iter()
                .enumerate()
                .map(|(i, id)| EntryBox { id: id.clone(), rect: Rect::new(100.0, 40.0 * i as f64, 100.0, 40.0) })
                .collect(),
            content: Some(Rect::new(100.0, 0.0, 400.0, 400.0)),
            ..LayoutSnapshot::default()
        };
        (state, ids)
    }

    fn run(state: &mut AppState, event: Event) -> (bool, Vec<Action>) {
        handle_event(state, &event, Instant::now()).unwrap()
    }

    fn names(state: &AppState) -> Vec<String> {
        state.visible_entries().iter().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn plain_click_launches_with_split_args() {
        let (mut state, ids) = state_with(&["A"]);
        run(&mut state, Event::EditEntry {
            id: ids[0].clone(),
            patch: EntryPatch { args: Some(r#"-p "two words""#.into()), ..EntryPatch::default() },
        });
        let (_, actions) = run(&mut state, Event::EntryClicked { id: ids[0].clone(), modifiers: Modifiers::default() });
        assert_eq!(actions, vec![Action::Launch {
            target: crate::domain::LaunchTarget::parse("/apps/A"),
            args: vec!["-p".into(), "two words".into()],
        }]);
    }

    #[test]
    fn drag_reorders_and_swallows_the_click() {
        let (mut state, ids) = state_with(&["A", "B", "C"]);
        run(&mut state, Event::EntryPressed { id: ids[0].clone(), point: Point::new(110.0, 10.0) });
        run(&mut state, Event::PointerMoved { point: Point::new(110.0, 85.0) });
        let (_, actions) = run(&mut state, Event::PointerReleased { point: Point::new(110.0, 85.0) });
        assert_eq!(actions, vec![Action::Persist]);
        assert_eq!(names(&state), ["B", "A", "C"]);

        let (_, actions) = run(&mut state, Event::EntryClicked { id: ids[0].clone(), modifiers: Modifiers::default() });
        assert!(actions.is_empty());
    }

    #[test]
    fn entry_drag_is_refused_while_searching() {
        let (mut state, ids) = state_with(&["A", "B"]);
        run(&mut state, Event::SearchChanged { query: "a".into() });
        run(&mut state, Event::EntryPressed { id: ids[0].clone(), point: Point::new(110.0, 10.0) });
        assert!(state.drag.is_idle());
    }

    #[test]
    fn external_drop_goes_through_prepare_insert() {
        let (mut state, _) = state_with(&["A", "B"]);
        let (_, actions) = run(&mut state, Event::ExternalDrop {
            point: Point::new(110.0, 50.0),
            paths: vec!["/x/new.exe".into(), "  ".into()],
        });
        let [Action::PrepareInsert(insert)] = actions.as_slice() else {
            panic!("expected a single insert, got {actions:?}");
        };
        assert_eq!(insert.index, Some(1));
        assert!(insert.from_drop);
        assert!(state.drag.drop_in_flight());

        let (_, actions) = run(&mut state, Event::ExternalDrop { point: Point::new(110.0, 50.0), paths: vec!["/x/other".into()] });
        assert!(actions.is_empty());

        run(&mut state, Event::InsertReady(insert.clone()));
        assert!(!state.drag.drop_in_flight());
        assert_eq!(names(&state), ["A", "new", "B"]);
    }

    #[test]
    fn keyboard_shortcuts() {
        let (mut state, ids) = state_with(&["A", "B", "C"]);
        let ctrl = Modifiers { ctrl: true, shift: false };

        let (_, actions) = run(&mut state, Event::KeyPressed { key: Key::Enter, modifiers: Modifiers::default() });
        assert!(matches!(&actions[..], [Action::Launch { .. }]));

        run(&mut state, Event::KeyPressed { key: Key::Char('a'), modifiers: ctrl });
        assert_eq!(state.selection.len(), 3);
        run(&mut state, Event::KeyPressed { key: Key::Escape, modifiers: Modifiers::default() });
        assert!(state.selection.is_empty());

        run(&mut state, Event::EntryClicked { id: ids[1].clone(), modifiers: ctrl });
        let (_, actions) = run(&mut state, Event::KeyPressed { key: Key::Delete, modifiers: Modifiers::default() });
        assert_eq!(actions, vec![Action::Persist]);
        assert_eq!(names(&state), ["A", "C"]);
    }

    #[test]
    fn settings_changes_emit_side_effects() {
        let (mut state, _) = state_with(&[]);
        let mut settings = state.catalog.settings().clone();
        settings.toggle_hotkey = " Alt+Space ".into();
        settings.always_on_top = false;
        let (_, actions) = run(&mut state, Event::UpdateSettings { settings });
        assert_eq!(actions, vec![
            Action::ApplyHotkey("Alt+Space".into()),
            Action::ApplyAlwaysOnTop(false),
            Action::Persist,
        ]);
    }

    #[test]
    fn group_switch_resets_ephemeral_state() {
        let (mut state, ids) = state_with(&["A"]);
        run(&mut state, Event::SearchChanged { query: "a".into() });
        run(&mut state, Event::EntryClicked { id: ids[0].clone(), modifiers: Modifiers { ctrl: true, shift: false } });
        let second = state.catalog.groups()[1].id.clone();
        let (render, _) = run(&mut state, Event::GroupClicked { id: second.clone() });
        assert!(render);
        assert_eq!(state.catalog.active_group_id(), &second);
        assert!(state.selection.is_empty());
        assert!(!state.is_searching());
    }

    #[test]
    fn stale_icon_results_skip_retargeted_entries() {
        let (mut state, ids) = state_with(&["old"]);
        let (_, actions) = run(&mut state, Event::EntriesVisible { ids: ids.clone() });
        let [Action::ResolveIcon(old_key)] = actions.as_slice() else {
            panic!("expected one icon lookup, got {actions:?}");
        };
        let old_key = old_key.clone();

        run(&mut state, Event::EditEntry {
            id: ids[0].clone(),
            patch: EntryPatch { target: Some("/apps/new".into()), ..EntryPatch::default() },
        });
        let (render, actions) = run(&mut state, Event::IconResolved {
            key: old_key,
            icon: Some(IconData::new("data:image/png;base64,OLD")),
        });
        assert!(!render && actions.is_empty());
        assert!(state.catalog.entry(&ids[0]).is_some_and(|e| e.icon.is_none()));

        let (_, actions) = run(&mut state, Event::EntriesVisible { ids: ids.clone() });
        assert!(matches!(actions.as_slice(), [Action::ResolveIcon(key)] if key.lookup == "/apps/new"));
    }

    #[test]
    fn moving_a_group_reorders_search_hits() {
        let (mut state, _) = state_with(&["app one"]);
        let second = state.catalog.groups()[1].id.clone();
        state.catalog.add_entries(&second, vec![NewEntry::named("/apps/two", "app two")], None);
        state.catalog_changed();

        let (_, actions) = run(&mut state, Event::MoveGroup { id: second, index: 0 });
        assert_eq!(actions, vec![Action::Persist]);
        run(&mut state, Event::SearchChanged { query: "app".into() });
        assert_eq!(names(&state), ["app two", "app one"]);
    }

    #[test]
    fn view_events_deserialize_from_tagged_json() {
        let event: Event = serde_json::from_str(r#"{"type":"entryClicked","id":"e1","modifiers":{"shift":true}}"#).unwrap();
        assert_eq!(event, Event::EntryClicked {
            id: EntryId::from("e1"),
            modifiers: Modifiers { ctrl: false, shift: true },
        });
        let event: Event = serde_json::from_str(r#"{"type":"keyPressed","key":{"char":"a"}}"#).unwrap();
        assert!(matches!(event, Event::KeyPressed { key: Key::Char('a'), .. }));
        assert!(serde_json::from_str::<Event>(r#"{"type":"catalogLoaded"}"#).is_err());
    }
}

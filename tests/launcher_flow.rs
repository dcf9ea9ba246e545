//! End-to-end tests driving the orchestrator loop against an in-memory host.
//!
//! All tests run on a paused clock so debounce and icon latency are exact.

mod common;

use common::{active_names, notices, spawn, RecordingHost};
use quickdock::domain::{Catalog, EntryId, EntryPatch, GroupId, IconData, NewEntry, Settings};
use quickdock::drag::{EntryBox, GroupBox, LayoutSnapshot, Point, Rect};
use quickdock::host::WindowCommand;
use quickdock::{Event, ViewUpdate};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn catalog_with(names: &[&str]) -> (Catalog, Vec<EntryId>) {
    let mut catalog = Catalog::default();
    let group = catalog.active_group_id().clone();
    let added = catalog.add_entries(
        &group,
        names.iter().map(|n| NewEntry::named(format!("/apps/{n}"), *n)).collect(),
        None,
    );
    (catalog, added.into_iter().map(|e| e.id).collect())
}

fn column_layout(ids: &[EntryId]) -> LayoutSnapshot {
    LayoutSnapshot {
        entries: ids
            .iter()
            .enumerate()
            .map(|(i, id)| EntryBox {
                id: id.clone(),
                rect: Rect::new(100.0, 40.0 * i as f64, 100.0, 40.0),
            })
            .collect(),
        content: Some(Rect::new(100.0, 0.0, 400.0, 400.0)),
        ..LayoutSnapshot::default()
    }
}

#[tokio::test(start_paused = true)]
async fn bursts_of_edits_produce_one_save_of_the_final_state() {
    let host = Arc::new(RecordingHost::default());
    let harness = spawn(Arc::clone(&host));

    for target in ["/apps/one", "/apps/two", "/apps/three"] {
        harness.send(Event::AddEntries {
            group: None,
            entries: vec![NewEntry::target(target)],
            index: None,
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(host.save_count(), 0);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(host.save_count(), 1);
    let saved = host.last_save().unwrap();
    assert_eq!(saved.entry_count(), 3);
    // Index defaults to the front of the group.
    assert_eq!(active_names(&saved), ["three", "two", "one"]);

    let (_, updates) = harness.shutdown().await;
    assert_eq!(host.save_count(), 1);
    assert!(notices(&updates).is_empty());
}

#[tokio::test(start_paused = true)]
async fn pending_save_is_flushed_on_shutdown() {
    let host = Arc::new(RecordingHost::default());
    let harness = spawn(Arc::clone(&host));

    harness.send(Event::AddGroup { name: Some("Work".to_string()) });
    let (state, _) = harness.shutdown().await;

    assert_eq!(host.save_count(), 1);
    let saved = host.last_save().unwrap();
    assert_eq!(saved.groups().len(), 4);
    assert_eq!(saved.groups()[3].name, "Work");
    assert_eq!(state.catalog, saved);
}

#[tokio::test(start_paused = true)]
async fn shared_icon_lookups_are_resolved_once() {
    let mut catalog = Catalog::default();
    let first = catalog.groups()[0].id.clone();
    let second = catalog.groups()[1].id.clone();
    let a = catalog.add_entries(&first, vec![NewEntry::target("/apps/tool")], None);
    let b = catalog.add_entries(&second, vec![NewEntry::target("/apps/tool")], None);
    let ids = vec![a[0].id.clone(), b[0].id.clone()];

    let host = Arc::new(RecordingHost {
        icon: Some(IconData::new("data:image/png;base64,AAAA")),
        icon_delay: Duration::from_millis(50),
        ..RecordingHost::with_catalog(catalog)
    });
    let harness = spawn(Arc::clone(&host));

    harness.send(Event::EntriesVisible { ids: ids.clone() });
    harness.send(Event::EntriesVisible { ids: vec![ids[0].clone()] });
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Entries that already hold an icon are never looked up again.
    harness.send(Event::EntriesVisible { ids: ids.clone() });
    let (state, _) = harness.shutdown().await;

    assert_eq!(host.icon_lookups.lock().unwrap().as_slice(), ["/apps/tool"]);
    for id in &ids {
        assert_eq!(
            state.catalog.entry(id).and_then(|e| e.icon.as_ref()).map(IconData::as_str),
            Some("data:image/png;base64,AAAA")
        );
    }
    assert_eq!(state.icons.in_flight(), 0);
}

#[tokio::test(start_paused = true)]
async fn slow_lookups_for_an_old_target_do_not_overwrite_the_new_icon() {
    let (catalog, ids) = catalog_with(&["old"]);
    let old_icon = IconData::new("data:image/png;base64,T0xE");
    let new_icon = IconData::new("data:image/png;base64,TkVX");
    let host = Arc::new(RecordingHost {
        lookup_icons: HashMap::from([
            ("/apps/old".to_string(), (old_icon, Duration::from_millis(200))),
            ("/apps/new".to_string(), (new_icon.clone(), Duration::from_millis(20))),
        ]),
        ..RecordingHost::with_catalog(catalog)
    });
    let harness = spawn(Arc::clone(&host));

    harness.send(Event::EntriesVisible { ids: ids.clone() });
    harness.send(Event::EditEntry {
        id: ids[0].clone(),
        patch: EntryPatch { target: Some("/apps/new".to_string()), ..EntryPatch::default() },
    });
    harness.send(Event::EntriesVisible { ids: ids.clone() });
    tokio::time::sleep(Duration::from_millis(300)).await;
    let (state, _) = harness.shutdown().await;

    let mut lookups = host.icon_lookups.lock().unwrap().clone();
    lookups.sort();
    assert_eq!(lookups, ["/apps/new", "/apps/old"]);
    let entry = state.catalog.entry(&ids[0]).unwrap();
    assert_eq!(entry.target.as_str(), "/apps/new");
    assert_eq!(entry.icon.as_ref(), Some(&new_icon));
    assert_eq!(state.icons.in_flight(), 0);
    assert_eq!(host.last_save().and_then(|c| c.entry(&ids[0]).and_then(|e| e.icon.clone())), Some(new_icon));
}

#[tokio::test(start_paused = true)]
async fn a_failed_save_is_retried_until_it_lands() {
    let host = Arc::new(RecordingHost::default().failing_saves(1));
    let harness = spawn(Arc::clone(&host));

    harness.send(Event::AddGroup { name: Some("Precious".to_string()) });
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(host.attempt_count(), 2);
    assert_eq!(host.save_count(), 1);
    let saved = host.last_save().unwrap();
    assert_eq!(saved.groups().last().map(|g| g.name.as_str()), Some("Precious"));

    let (_, updates) = harness.shutdown().await;
    assert_eq!(host.attempt_count(), 2);
    assert_eq!(notices(&updates), ["Failed to save: saveCatalog failed: disk full"]);
}

#[tokio::test(start_paused = true)]
async fn long_pressing_a_group_drags_it_and_swallows_the_trailing_click() {
    let mut catalog = Catalog::default();
    catalog.set_settings(Settings {
        enable_group_drag_sort: true,
        ..Settings::default()
    });
    let groups: Vec<GroupId> = catalog.groups().iter().map(|g| g.id.clone()).collect();
    let layout = LayoutSnapshot {
        groups: groups
            .iter()
            .enumerate()
            .map(|(i, id)| GroupBox {
                id: id.clone(),
                rect: Rect::new(0.0, 30.0 * i as f64, 100.0, 30.0),
            })
            .collect(),
        sidebar: Some(Rect::new(0.0, 0.0, 100.0, 600.0)),
        ..LayoutSnapshot::default()
    };
    let host = Arc::new(RecordingHost::with_catalog(catalog));
    let harness = spawn(Arc::clone(&host));

    harness.send(Event::LayoutChanged { layout });
    harness.send(Event::GroupPressed { id: groups[0].clone(), point: Point::new(10.0, 10.0) });
    // The loop's own timer arms the drag once the long press elapses.
    tokio::time::sleep(Duration::from_millis(400)).await;
    harness.send(Event::PointerMoved { point: Point::new(10.0, 80.0) });
    harness.send(Event::PointerReleased { point: Point::new(10.0, 80.0) });
    harness.send(Event::GroupClicked { id: groups[2].clone() });
    tokio::time::sleep(Duration::from_millis(300)).await;
    harness.send(Event::GroupClicked { id: groups[1].clone() });
    let (state, updates) = harness.shutdown().await;

    let order: Vec<GroupId> = state.catalog.groups().iter().map(|g| g.id.clone()).collect();
    assert_eq!(order, [groups[1].clone(), groups[2].clone(), groups[0].clone()]);
    let saved: Vec<GroupId> = host.last_save().unwrap().groups().iter().map(|g| g.id.clone()).collect();
    assert_eq!(saved, order);

    assert_eq!(state.catalog.active_group_id(), &groups[1]);
    let rendered_active: Vec<&GroupId> = updates
        .iter()
        .filter_map(|u| match u {
            ViewUpdate::Render { view } => Some(&view.active_group_id),
            _ => None,
        })
        .collect();
    assert!(!rendered_active.contains(&&groups[2]), "the click right after the drop was ignored");
}

#[tokio::test(start_paused = true)]
async fn dragging_an_entry_reorders_and_persists() {
    let (catalog, ids) = catalog_with(&["A", "B", "C"]);
    let host = Arc::new(RecordingHost::with_catalog(catalog));
    let harness = spawn(Arc::clone(&host));

    harness.send(Event::LayoutChanged { layout: column_layout(&ids) });
    harness.send(Event::EntryPressed { id: ids[0].clone(), point: Point::new(110.0, 10.0) });
    harness.send(Event::PointerMoved { point: Point::new(110.0, 85.0) });
    harness.send(Event::PointerReleased { point: Point::new(110.0, 85.0) });
    let (state, updates) = harness.shutdown().await;

    assert_eq!(active_names(&state.catalog), ["B", "A", "C"]);
    assert_eq!(active_names(&host.last_save().unwrap()), ["B", "A", "C"]);
    let previews: Vec<_> = updates
        .iter()
        .filter_map(|u| match u {
            ViewUpdate::Render { view } => Some(view.drop_preview.is_some()),
            _ => None,
        })
        .collect();
    assert!(previews.contains(&true), "a drop preview was rendered during the drag");
    assert_eq!(previews.last(), Some(&false));
}

#[tokio::test(start_paused = true)]
async fn dropped_files_are_normalized_when_relative_paths_are_on() {
    let mut catalog = Catalog::default();
    catalog.set_settings(Settings {
        use_relative_path: true,
        ..Settings::default()
    });
    let host = Arc::new(RecordingHost::with_catalog(catalog));
    let harness = spawn(Arc::clone(&host));

    harness.send(Event::LayoutChanged { layout: column_layout(&[]) });
    harness.send(Event::ExternalDragOver { point: Point::new(300.0, 300.0) });
    harness.send(Event::ExternalDrop {
        point: Point::new(300.0, 300.0),
        paths: vec!["/opt/quickdock/tools/a.exe".to_string(), "  ".to_string()],
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    let (state, _) = harness.shutdown().await;

    let targets: Vec<_> = state
        .catalog
        .active_group()
        .unwrap()
        .entries
        .iter()
        .map(|e| e.target.as_str().to_string())
        .collect();
    assert_eq!(targets, ["tools/a.exe"]);
    assert!(!state.drag.drop_in_flight());
    assert_eq!(host.save_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn startup_applies_stored_hotkey_and_reports_hide_on_startup() {
    let mut catalog = Catalog::default();
    catalog.set_settings(Settings {
        toggle_hotkey: "Ctrl+Alt+Space".to_string(),
        hide_on_startup: true,
        ..Settings::default()
    });
    let host = Arc::new(RecordingHost::with_catalog(catalog));
    let harness = spawn(Arc::clone(&host));

    tokio::time::sleep(Duration::from_millis(10)).await;
    let (state, updates) = harness.shutdown().await;

    assert!(state.loaded);
    assert_eq!(host.hotkeys.lock().unwrap().len(), 1);
    assert!(updates
        .iter()
        .any(|u| matches!(u, ViewUpdate::Started { hide_on_startup: true })));
    assert_eq!(host.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn launch_failures_surface_the_raw_error() {
    let (catalog, ids) = catalog_with(&["Editor"]);
    let host = Arc::new(RecordingHost {
        launch_error: Some("The system cannot find the file specified.".to_string()),
        ..RecordingHost::with_catalog(catalog)
    });
    let harness = spawn(Arc::clone(&host));

    harness.send(Event::LaunchEntry { id: ids[0].clone() });
    harness.send(Event::LaunchEntry { id: EntryId::from("nope") });
    tokio::time::sleep(Duration::from_millis(10)).await;
    let (_, updates) = harness.shutdown().await;

    assert_eq!(notices(&updates), ["The system cannot find the file specified."]);
}

#[tokio::test(start_paused = true)]
async fn blank_double_click_hides_the_window() {
    let host = Arc::new(RecordingHost::default());
    let harness = spawn(Arc::clone(&host));

    harness.send(Event::BlankDoubleClicked);
    harness.send(Event::Window { command: WindowCommand::Minimize });
    harness.shutdown().await;

    assert_eq!(
        host.windows.lock().unwrap().as_slice(),
        [WindowCommand::Hide, WindowCommand::Minimize]
    );
}

#[tokio::test(start_paused = true)]
async fn validation_marks_missing_targets() {
    let mut catalog = Catalog::default();
    let group = catalog.active_group_id().clone();
    let added = catalog.add_entries(
        &group,
        vec![NewEntry::target("/apps/present"), NewEntry::target("/apps/missing")],
        None,
    );
    let host = Arc::new(RecordingHost::with_catalog(catalog));
    let harness = spawn(Arc::clone(&host));

    harness.send(Event::ValidateTargets);
    tokio::time::sleep(Duration::from_millis(10)).await;
    let (state, _) = harness.shutdown().await;

    assert!(!state.invalid_targets.contains(&added[0].id));
    assert!(state.invalid_targets.contains(&added[1].id));
}

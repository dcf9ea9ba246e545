//! Persistence through the desktop host's JSON store.

mod common;

use common::{active_names, spawn_with};
use quickdock::domain::{NewEntry, Settings};
use quickdock::infrastructure::DesktopHost;
use quickdock::storage::{JsonStorage, Storage};
use quickdock::{Config, Event};
use std::sync::Arc;
use tempfile::TempDir;

fn config(dir: &TempDir) -> Config {
    Config {
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    }
}

fn host(dir: &TempDir) -> Arc<DesktopHost> {
    Arc::new(
        DesktopHost::new(dir.path().to_path_buf())
            .unwrap()
            .with_autostart_dir(dir.path().join("autostart")),
    )
}

#[tokio::test(start_paused = true)]
async fn session_state_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    let harness = spawn_with(host(&dir), &config);
    harness.send(Event::AddEntries {
        group: None,
        entries: vec![
            NewEntry::named("/usr/bin/gimp", "GIMP"),
            NewEntry {
                target: "/usr/bin/code".to_string(),
                name: None,
                args: Some("  --new-window ".to_string()),
            },
        ],
        index: None,
    });
    harness.send(Event::AddGroup { name: Some("Games".to_string()) });
    harness.send(Event::UpdateSettings {
        settings: Settings {
            theme: "light".to_string(),
            card_width: 140,
            ..Settings::default()
        },
    });
    let (first, _) = harness.shutdown().await;

    let harness = spawn_with(host(&dir), &config);
    let (second, _) = harness.shutdown().await;

    assert_eq!(second.catalog, first.catalog);
    assert!(active_names(&second.catalog).is_empty());
    assert_eq!(second.catalog.active_group().map(|g| g.name.as_str()), Some("Games"));

    let apps = &second.catalog.groups()[0];
    let names: Vec<&str> = apps.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["GIMP", "code"]);
    assert_eq!(apps.entries[1].args.as_deref(), Some("--new-window"));
    assert_eq!(second.catalog.settings().theme, "light");
    assert_eq!(second.catalog.groups().last().map(|g| g.name.as_str()), Some("Games"));
}

#[tokio::test(start_paused = true)]
async fn legacy_store_is_imported_on_first_start() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("apps.json"),
        r#"[{"name": "Notes", "path": "/usr/bin/notes"}, {"name": "Term", "path": "/usr/bin/term", "args": "-e"}]"#,
    )
    .unwrap();

    let harness = spawn_with(host(&dir), &config(&dir));
    let (state, _) = harness.shutdown().await;

    assert_eq!(active_names(&state.catalog), ["Notes", "Term"]);
    assert!(!dir.path().join("apps.json").exists());

    let mut storage = JsonStorage::new(dir.path().to_path_buf()).unwrap();
    let stored = storage.load().unwrap().unwrap();
    assert_eq!(stored, state.catalog);
}

#[tokio::test(start_paused = true)]
async fn corrupt_catalog_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("catalog.json"), "{ not json").unwrap();

    let harness = spawn_with(host(&dir), &config(&dir));
    let (state, updates) = harness.shutdown().await;

    assert_eq!(state.catalog.groups().len(), 3);
    assert_eq!(state.catalog.entry_count(), 0);
    assert!(state.loaded);
    assert!(common::notices(&updates).is_empty());
}

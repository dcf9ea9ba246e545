//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use quickdock::domain::{Catalog, IconData, LaunchTarget, LauncherError, Result};
use quickdock::host::{InstalledPackage, WindowCommand};
use quickdock::{Event, Host, Orchestrator, ViewUpdate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// In-memory host that records every call it receives.
#[derive(Default)]
pub struct RecordingHost {
    pub stored: Mutex<Option<Catalog>>,
    pub saves: Mutex<Vec<Catalog>>,
    /// Every save attempt, including failed ones.
    pub save_attempts: Mutex<usize>,
    /// Number of upcoming saves that fail with "disk full".
    pub failing_saves: Mutex<usize>,
    pub icon_lookups: Mutex<Vec<String>>,
    pub launches: Mutex<Vec<(String, Vec<String>)>>,
    pub hotkeys: Mutex<Vec<String>>,
    pub windows: Mutex<Vec<WindowCommand>>,
    /// Icon returned by every lookup.
    pub icon: Option<IconData>,
    /// Simulated latency of an icon lookup.
    pub icon_delay: Duration,
    /// Per-lookup icon and latency, overriding `icon` and `icon_delay`.
    pub lookup_icons: HashMap<String, (IconData, Duration)>,
    /// Error text returned by `launch`, if any.
    pub launch_error: Option<String>,
}

impl RecordingHost {
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            stored: Mutex::new(Some(catalog)),
            ..Self::default()
        }
    }

    pub fn failing_saves(self, count: usize) -> Self {
        *self.failing_saves.lock().unwrap() = count;
        self
    }

    pub fn attempt_count(&self) -> usize {
        *self.save_attempts.lock().unwrap()
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub fn last_save(&self) -> Option<Catalog> {
        self.saves.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn load_catalog(&self) -> Result<Option<Catalog>> {
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        *self.save_attempts.lock().unwrap() += 1;
        {
            let mut failing = self.failing_saves.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                return Err(LauncherError::host("saveCatalog", "disk full"));
            }
        }
        self.saves.lock().unwrap().push(catalog.clone());
        *self.stored.lock().unwrap() = Some(catalog.clone());
        Ok(())
    }

    async fn resolve_icon(&self, lookup: &str, _size: u32) -> Result<Option<IconData>> {
        self.icon_lookups.lock().unwrap().push(lookup.to_string());
        if let Some((icon, delay)) = self.lookup_icons.get(lookup) {
            tokio::time::sleep(*delay).await;
            return Ok(Some(icon.clone()));
        }
        tokio::time::sleep(self.icon_delay).await;
        Ok(self.icon.clone())
    }

    async fn launch(&self, target: &LaunchTarget, args: &[String]) -> Result<()> {
        if let Some(message) = &self.launch_error {
            return Err(LauncherError::Launch(message.clone()));
        }
        self.launches.lock().unwrap().push((target.as_str().to_string(), args.to_vec()));
        Ok(())
    }

    async fn open_containing_folder(&self, _target: &LaunchTarget) -> Result<()> {
        Ok(())
    }

    async fn normalize_relative_path(&self, path: &str) -> Result<String> {
        Ok(path.trim_start_matches("/opt/quickdock/").to_string())
    }

    async fn set_global_hotkey(&self, combo: &str) -> Result<()> {
        self.hotkeys.lock().unwrap().push(combo.to_string());
        Ok(())
    }

    async fn set_always_on_top(&self, _on: bool) -> Result<()> {
        Ok(())
    }

    async fn set_auto_start(&self, _on: bool) -> Result<()> {
        Ok(())
    }

    async fn list_installed_packages(&self) -> Result<Vec<InstalledPackage>> {
        Ok(Vec::new())
    }

    async fn validate_targets(&self, targets: &[LaunchTarget]) -> Result<Vec<bool>> {
        Ok(targets.iter().map(|t| !t.as_str().contains("missing")).collect())
    }

    fn window_command(&self, command: WindowCommand) {
        self.windows.lock().unwrap().push(command);
    }
}

/// A running orchestrator plus the ends of its channels.
pub struct Harness {
    pub events: UnboundedSender<Event>,
    pub updates: UnboundedReceiver<ViewUpdate>,
    pub run: JoinHandle<quickdock::AppState>,
}

impl Harness {
    pub fn send(&self, event: Event) {
        self.events.send(event).unwrap();
    }

    /// Sends `Shutdown` and waits for the loop to exit.
    pub async fn shutdown(self) -> (quickdock::AppState, Vec<ViewUpdate>) {
        let Self { events, mut updates, run } = self;
        events.send(Event::Shutdown).unwrap();
        let state = run.await.unwrap();
        let mut drained = Vec::new();
        while let Ok(update) = updates.try_recv() {
            drained.push(update);
        }
        (state, drained)
    }
}

pub fn spawn(host: Arc<RecordingHost>) -> Harness {
    spawn_with(host, &quickdock::Config::default())
}

pub fn spawn_with<H: Host + 'static>(host: Arc<H>, config: &quickdock::Config) -> Harness {
    let (updates_tx, updates) = mpsc::unbounded_channel();
    let (events, inbox) = mpsc::unbounded_channel();
    let run = tokio::spawn(Orchestrator::new(host, config, updates_tx).run(inbox));
    Harness { events, updates, run }
}

pub fn notices(updates: &[ViewUpdate]) -> Vec<String> {
    updates
        .iter()
        .filter_map(|u| match u {
            ViewUpdate::Notify { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// Names of the active group's entries, in order.
pub fn active_names(catalog: &Catalog) -> Vec<String> {
    catalog
        .active_group()
        .map(|g| g.entries.iter().map(|e| e.name.clone()).collect())
        .unwrap_or_default()
}

//! Quickdock: the interactive state engine of a grouped desktop app launcher.
//!
//! Quickdock owns a catalog of launchable entries organized into named groups
//! and mediates every mutation to it:
//! - Ordered groups and entries with de-duplicated insertion and moves
//! - Entry reorder, group drag-sort and OS file drops with live drop preview
//! - Debounced persistence that always writes the latest catalog snapshot
//! - Lazy, de-duplicated icon resolution driven by viewport visibility
//! - Token search across all groups with single/ctrl/shift multi-select
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Headless shell (main.rs)                           │  ← JSON lines in/out
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Orchestrator (orchestrator.rs)                     │  ← Async run loop
//! │  - Debounce / long-press timers                     │
//! │  - Host calls and completion events                 │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Event handling, selection, view model            │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ drag/         │   │ search/       │   │ icons/        │
//! │ - Hit-testing │   │ - Token index │   │ - Lookup keys │
//! │ - Drag flows  │   │               │   │ - In-flight   │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (domain/)  · persistence/ · storage/        │
//! │  host/ (collaborator trait) · infrastructure/       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Application state machine with event/action model
//! - [`domain`]: Catalog, groups, entries, settings, errors
//! - [`drag`]: Drag coordination and pointer hit-testing
//! - [`host`]: The collaborator surface (storage, icons, launch, hotkey, window)
//! - [`icons`]: Icon request de-duplication
//! - [`infrastructure`]: Launch-path utilities and the desktop host
//! - [`orchestrator`]: Async loop executing actions against a host
//! - [`persistence`]: Save debounce and failure latch
//! - [`search`]: Search index
//! - [`storage`]: JSON file persistence with legacy migration
//! - `observability`: OpenTelemetry tracing (internal)
//!
//! # Configuration
//!
//! Read from a TOML file and overridden by `key=value` pairs:
//!
//! ```toml
//! data_dir = "/home/me/.local/share/quickdock"
//! save_debounce = 400
//! icon_size = 32
//! trace_level = "debug"
//! ```
//!
//! # Example
//!
//! ```rust
//! use quickdock::{handle_event, AppState, Event};
//! use quickdock::domain::Catalog;
//! use std::time::Instant;
//!
//! let config = quickdock::Config::default();
//! let mut state = AppState::new(Catalog::default(), config.drag_settings(), config.icon_size);
//!
//! let (render, actions) = handle_event(&mut state, &Event::AddGroup { name: None }, Instant::now())?;
//! assert!(render);
//! assert_eq!(state.catalog.groups().len(), 4);
//! assert_eq!(actions, vec![quickdock::Action::Persist]);
//! # Ok::<(), quickdock::LauncherError>(())
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod domain;
pub mod drag;
pub mod host;
pub mod icons;
pub mod infrastructure;
pub mod orchestrator;
pub mod persistence;
pub mod search;
pub mod storage;

pub mod observability;

pub use app::{handle_event, Action, AppState, Event, ViewModel};
pub use domain::{LauncherError, Result};
pub use host::Host;
pub use orchestrator::{Orchestrator, ViewUpdate};

use drag::DragSettings;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime configuration.
///
/// Every field has a default, so a partial TOML file or an empty pair list
/// both yield a usable configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `catalog.json` and the trace output.
    ///
    /// Default: [`infrastructure::default_data_dir`]
    pub data_dir: PathBuf,

    /// Quiet period (ms) after the last mutation before the catalog is saved.
    pub save_debounce: u64,

    /// Edge length (px) requested for entry icons.
    pub icon_size: u32,

    /// Pointer travel (px) that turns a press into a drag.
    pub drag_threshold: f64,

    /// Hold time (ms) before a group press arms drag-sort.
    pub group_long_press: u64,

    /// Time (ms) after a group drag during which group clicks are ignored.
    pub group_click_cooldown: u64,

    /// Tracing level for OpenTelemetry spans.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`. Default: `"info"`
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: infrastructure::default_data_dir(),
            save_debounce: 400,
            icon_size: 32,
            drag_threshold: 5.0,
            group_long_press: 350,
            group_click_cooldown: 250,
            trace_level: None,
        }
    }
}

impl Config {
    /// Reads a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LauncherError::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&text).map_err(|e| LauncherError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Builds a configuration from `key=value` pairs over the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use quickdock::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("save_debounce".to_string(), "250".to_string());
    /// map.insert("icon_size".to_string(), "huge".to_string());
    ///
    /// let config = Config::from_pairs(&map);
    /// assert_eq!(config.save_debounce, 250);
    /// assert_eq!(config.icon_size, 32);
    /// ```
    #[must_use]
    pub fn from_pairs(pairs: &BTreeMap<String, String>) -> Self {
        Self::default().with_pairs(pairs)
    }

    /// Overrides fields from `key=value` pairs.
    ///
    /// Unknown keys are ignored and values that fail to parse keep the current
    /// value of that field.
    #[must_use]
    pub fn with_pairs(mut self, pairs: &BTreeMap<String, String>) -> Self {
        fn parsed<T: std::str::FromStr>(pairs: &BTreeMap<String, String>, key: &str, current: T) -> T {
            match pairs.get(key).map(|v| v.trim().parse::<T>()) {
                Some(Ok(value)) => value,
                Some(Err(_)) => {
                    tracing::debug!(key = key, "invalid configuration value, keeping current");
                    current
                }
                None => current,
            }
        }

        if let Some(dir) = pairs.get("data_dir").map(|d| d.trim()).filter(|d| !d.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        self.save_debounce = parsed(pairs, "save_debounce", self.save_debounce);
        self.icon_size = parsed(pairs, "icon_size", self.icon_size);
        self.drag_threshold = parsed(pairs, "drag_threshold", self.drag_threshold);
        self.group_long_press = parsed(pairs, "group_long_press", self.group_long_press);
        self.group_click_cooldown = parsed(pairs, "group_click_cooldown", self.group_click_cooldown);
        if let Some(level) = pairs.get("trace_level") {
            self.trace_level = Some(level.trim().to_string()).filter(|l| !l.is_empty());
        }
        self
    }

    #[must_use]
    pub const fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_debounce)
    }

    #[must_use]
    pub const fn drag_settings(&self) -> DragSettings {
        DragSettings {
            threshold: self.drag_threshold,
            long_press: Duration::from_millis(self.group_long_press),
            click_cooldown: Duration::from_millis(self.group_click_cooldown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("icon_size = 48\ntrace_level = \"debug\"").unwrap();
        assert_eq!(config.icon_size, 48);
        assert_eq!(config.save_debounce, 400);
        assert_eq!(config.trace_level.as_deref(), Some("debug"));
    }

    #[test]
    fn pairs_override_file_values() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("quickdock.toml");
        std::fs::write(&path, "save_debounce = 900\ngroup_long_press = 500").unwrap();

        let mut pairs = BTreeMap::new();
        pairs.insert("save_debounce".to_string(), "100".to_string());
        let config = Config::from_file(&path).unwrap().with_pairs(&pairs);

        assert_eq!(config.save_delay(), Duration::from_millis(100));
        assert_eq!(config.drag_settings().long_press, Duration::from_millis(500));
    }

    #[test]
    fn unreadable_file_is_a_config_error() {
        let err = Config::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, LauncherError::Config(_)));
    }
}

//! Domain layer for the quickdock launcher engine.
//!
//! This module contains the persisted data model and its structural rules,
//! independent of the event surface, storage format, or OS integration.
//!
//! # Organization
//!
//! - [`catalog`]: the root aggregate and every structural mutation
//! - [`entry`]: launchable entries, launch targets, argument splitting
//! - [`group`]: named, ordered entry containers
//! - [`settings`]: the independently validated preferences bag
//! - [`error`]: error types and result aliases
//!
//! # Examples
//!
//! ```
//! use quickdock::domain::{Catalog, NewEntry};
//!
//! let mut catalog = Catalog::default();
//! let group = catalog.active_group_id().clone();
//! let added = catalog.add_entries(&group, vec![NewEntry::target("/usr/bin/htop")], None);
//! assert_eq!(added[0].name, "htop");
//! ```

pub mod catalog;
pub mod entry;
pub mod error;
pub mod group;
pub mod settings;

pub use catalog::{Catalog, EntryEdit, EntryPatch, NewEntry, DEFAULT_GROUP_NAMES, SCHEMA_VERSION};
pub use entry::{Entry, EntryId, IconData, LaunchTarget, APPS_FOLDER_PREFIX};
pub use error::{LauncherError, Result};
pub use group::{Group, GroupId};
pub use settings::Settings;

//! JSON file-based storage backend.
//!
//! The catalog is stored as one human-readable JSON document. Writes go to a
//! temporary file that is then renamed over the target, so a crash mid-write
//! leaves the previous document in place.
//!
//! # Files
//!
//! - `<data_dir>/catalog.json`: the current document
//! - `<data_dir>/apps.json`: legacy flat store, migrated once and removed

use crate::domain::{Catalog, IconData, LauncherError, NewEntry, Result};
use crate::storage::backend::Storage;
use crate::storage::models::{CatalogRecord, LegacyAppRecord};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File name of the catalog document inside the data directory.
pub const CATALOG_FILE: &str = "catalog.json";

/// File name of the legacy flat store inside the data directory.
pub const LEGACY_FILE: &str = "apps.json";

/// JSON file storage backend.
///
/// # Thread Safety
///
/// All I/O is synchronous. The desktop host shares it as an
/// `Arc<Mutex<JsonStorage>>` and only calls it from `spawn_blocking` tasks.
#[derive(Debug)]
pub struct JsonStorage {
    file_path: PathBuf,
    legacy_path: PathBuf,
}

impl JsonStorage {
    /// Opens the storage rooted at `data_dir`, creating the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use quickdock::storage::JsonStorage;
    /// use std::path::PathBuf;
    ///
    /// let storage = JsonStorage::new(PathBuf::from("/tmp/quickdock"))?;
    /// assert!(storage.path().ends_with("catalog.json"));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?data_dir, "initializing JSON storage");
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self {
            file_path: data_dir.join(CATALOG_FILE),
            legacy_path: data_dir.join(LEGACY_FILE),
        })
    }

    /// Path of the catalog document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load_from_file(path: &Path) -> Result<Option<Catalog>> {
        let contents = std::fs::read_to_string(path)?;
        match serde_json::from_str::<CatalogRecord>(&contents) {
            Ok(record) => {
                tracing::debug!(
                    version = record.schema_version,
                    groups = record.groups.len(),
                    "loaded catalog document"
                );
                Ok(Some(record.into_catalog()))
            }
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "catalog document is invalid, starting from defaults");
                Ok(None)
            }
        }
    }

    /// Migrates the legacy flat store into the first default group.
    ///
    /// Returns `Ok(None)` when there is no legacy store or it cannot be parsed.
    fn migrate_legacy(&mut self) -> Result<Option<Catalog>> {
        if !self.legacy_path.exists() {
            return Ok(None);
        }
        let _span = tracing::info_span!("migrate_legacy", path = ?self.legacy_path).entered();

        let contents = std::fs::read_to_string(&self.legacy_path)?;
        let apps: Vec<LegacyAppRecord> = match serde_json::from_str(&contents) {
            Ok(apps) => apps,
            Err(e) => {
                tracing::warn!(error = %e, "legacy store is invalid, skipping migration");
                return Ok(None);
            }
        };

        let mut catalog = Catalog::default();
        let Some(first) = catalog.groups().first().map(|g| g.id.clone()) else {
            return Ok(None);
        };

        let mut icons: HashMap<String, String> = HashMap::new();
        let batch: Vec<NewEntry> = apps
            .into_iter()
            .map(|app| {
                if let Some(icon) = app.icon {
                    icons.entry(app.path.trim().to_string()).or_insert(icon);
                }
                NewEntry {
                    target: app.path,
                    name: Some(app.name),
                    args: app.args,
                }
            })
            .collect();

        let added = catalog.add_entries(&first, batch, Some(0));
        for entry in &added {
            if let Some(icon) = icons.remove(entry.target.as_str()) {
                catalog.set_icon(&entry.id, IconData::new(icon));
            }
        }

        self.save(&catalog)?;
        std::fs::remove_file(&self.legacy_path)?;

        tracing::info!(migrated = added.len(), "legacy store migrated");
        Ok(Some(catalog))
    }
}

impl Storage for JsonStorage {
    fn load(&mut self) -> Result<Option<Catalog>> {
        let _span = tracing::debug_span!("json_load", path = ?self.file_path).entered();

        if self.file_path.exists() {
            return Self::load_from_file(&self.file_path);
        }

        tracing::debug!("no catalog document, checking legacy store");
        self.migrate_legacy()
    }

    fn save(&mut self, catalog: &Catalog) -> Result<()> {
        let _span = tracing::debug_span!("json_save",
            path = ?self.file_path,
            groups = catalog.groups().len(),
            entries = catalog.entry_count()
        ).entered();

        let json = serde_json::to_string_pretty(&CatalogRecord::from(catalog))
            .map_err(|e| LauncherError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, json)?;

        tracing::trace!("renaming temporary file to final location");
        std::fs::rename(&tmp_path, &self.file_path)?;

        tracing::debug!("catalog saved");
        Ok(())
    }
}

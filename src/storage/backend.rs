//! Storage backend abstraction.
//!
//! The [`Storage`] trait covers exactly what the launcher needs from a
//! persistence backend: read the whole catalog once at startup and write the
//! whole catalog whenever the save debounce fires.

use crate::domain::{Catalog, Result};

/// Abstraction over persistent catalog backends.
///
/// # Implementations
///
/// - [`JsonStorage`](super::JsonStorage): one JSON document with atomic writes
///
/// # Examples
///
/// ```no_run
/// use quickdock::storage::{JsonStorage, Storage};
/// use std::path::PathBuf;
///
/// let mut storage = JsonStorage::new(PathBuf::from("/tmp/quickdock"))?;
/// let catalog = storage.load()?.unwrap_or_default();
/// storage.save(&catalog)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Storage: Send {
    /// Loads the persisted catalog.
    ///
    /// Returns `Ok(None)` when nothing usable is stored yet, including when the
    /// stored document cannot be parsed; the caller then starts from the
    /// default catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store exists but cannot be read.
    fn load(&mut self) -> Result<Option<Catalog>>;

    /// Replaces the persisted catalog with `catalog`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails. A failed write
    /// must leave the previously stored catalog intact.
    fn save(&mut self, catalog: &Catalog) -> Result<()>;
}

//! Error types for the launcher engine.
//!
//! This module defines the centralized error type [`LauncherError`] and a type alias
//! [`Result`] used throughout the crate. Only I/O and host-collaborator failures are
//! represented here: precondition failures on the catalog (removing the last group,
//! moving an unknown entry) are refused silently by the model and never become errors.

use thiserror::Error;

/// The main error type for launcher operations.
///
/// Variants map onto the failure taxonomy of the engine:
/// - validation failures on load are recovered locally and never escape,
/// - transient I/O failures (`Storage`, `Io`, `Json`, `Host`) are either
///   degraded silently or reported once through the save latch,
/// - user-action failures (`Launch`, `Host`) are surfaced with their raw text.
///
/// # Examples
///
/// ```
/// use quickdock::LauncherError;
///
/// let err = LauncherError::host("setGlobalHotkey", "already registered");
/// assert_eq!(err.to_string(), "setGlobalHotkey failed: already registered");
/// ```
#[derive(Debug, Error)]
pub enum LauncherError {
    /// Storage operation failed.
    ///
    /// Occurs when the persisted catalog cannot be read, parsed, or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration is invalid or could not be read.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A named out-of-process collaborator operation failed.
    ///
    /// `operation` is the collaborator's name (`saveCatalog`, `resolveIcon`, ...)
    /// and `message` the raw error text it reported.
    #[error("{operation} failed: {message}")]
    Host {
        /// Name of the collaborator operation.
        operation: &'static str,
        /// Raw error text from the collaborator.
        message: String,
    },

    /// Spawning a launch target failed.
    #[error("{0}")]
    Launch(String),
}

impl LauncherError {
    /// Builds a [`LauncherError::Host`] from an operation name and any displayable error.
    pub fn host(operation: &'static str, message: impl ToString) -> Self {
        Self::Host {
            operation,
            message: message.to_string(),
        }
    }
}

/// A specialized `Result` type for launcher operations.
pub type Result<T> = std::result::Result<T, LauncherError>;

//! Debounced save scheduling.
//!
//! [`SaveScheduler`] only tracks *when* a save is due and whether the last
//! failure was already reported. It never holds a catalog snapshot: the
//! orchestrator serializes the current catalog at send time.

pub mod scheduler;

pub use scheduler::{SaveScheduler, MAX_RETRY_DELAY};

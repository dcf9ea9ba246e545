//! Application layer coordinating state, events, and actions.
//!
//! This module sits between the orchestrator and the domain/drag/search/icon
//! layers. It implements the event-driven core of the launcher.
//!
//! # Architecture
//!
//! The application layer follows a unidirectional data flow pattern:
//!
//! ```text
//! View Input → Events → Event Handler → State Mutations → Actions → Host Calls
//!                           ↑                                          ↓
//!                           └──────────── Completion Events ───────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands emitted by the event handler
//! - [`handler`]: Event processing logic and state transition coordinator
//! - [`selection`]: Single/ctrl/shift multi-select over the visible list
//! - [`state`]: Central application state container
//! - [`viewmodel`]: Serializable projection consumed by the view

pub mod actions;
pub mod handler;
pub mod selection;
pub mod state;
pub mod viewmodel;

pub use actions::{Action, PendingInsert};
pub use handler::{handle_event, Event, Key};
pub use selection::{Modifiers, Selection};
pub use state::AppState;
pub use viewmodel::ViewModel;

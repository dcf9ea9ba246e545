//! Side effects requested by the event handler.
//!
//! [`handle_event`](super::handle_event) is synchronous and pure with respect
//! to the outside world: anything that needs a host call, a timer, or the
//! persistence scheduler is returned as an [`Action`] for the orchestrator to
//! execute. Actions carry identities and values, never references into the
//! catalog, so executing them later cannot observe stale state.

use crate::domain::{EntryId, GroupId, LaunchTarget, NewEntry};
use crate::host::WindowCommand;
use crate::icons::IconKey;

/// An insertion waiting for optional path normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInsert {
    pub group: GroupId,
    /// `None` inserts at the front of the group.
    pub index: Option<usize>,
    pub entries: Vec<NewEntry>,
    /// Rewrite filesystem targets relative to the application directory.
    pub normalize: bool,
    /// The insert came from an external drop and must lower the drop
    /// single-flight flag when it lands.
    pub from_drop: bool,
}

/// Commands produced by the event handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The catalog changed; (re)start the save debounce window.
    Persist,
    /// Look up an icon; the result returns as `Event::IconResolved`.
    ResolveIcon(IconKey),
    Launch {
        target: LaunchTarget,
        args: Vec<String>,
    },
    OpenContainingFolder(LaunchTarget),
    /// Normalize paths if requested, then return as `Event::InsertReady`.
    PrepareInsert(PendingInsert),
    ApplyHotkey(String),
    ApplyAlwaysOnTop(bool),
    ApplyAutoStart(bool),
    ListPackages,
    ValidateTargets(Vec<(EntryId, LaunchTarget)>),
    Window(WindowCommand),
    /// Startup finished; tells the view whether to stay hidden.
    StartupComplete {
        hide_on_startup: bool,
    },
    /// Flush pending work and stop the run loop.
    Shutdown,
}

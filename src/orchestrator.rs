//! Async run loop wiring the state machine to a [`Host`].
//!
//! The orchestrator owns the [`AppState`] and feeds it events one at a time,
//! so every model mutation runs to completion before the next event is looked
//! at. Actions returned by [`handle_event`] are executed here: host calls run
//! as futures in a [`FuturesUnordered`] set and report back as completion
//! events, and `Persist` only restarts the save debounce.
//!
//! # Loop
//!
//! ```text
//! view events ──┐
//! completions ──┼──► handle_event ──► actions ──► host futures / timers
//! save timer ───┤                         │
//! long press ───┘                         └──► ViewUpdate (render, notify)
//! ```
//!
//! # Saves
//!
//! At most one save is in flight. The catalog is cloned when the save is
//! issued, never when it is scheduled, so a save always carries the state as
//! of the last mutation before it was sent. A debounce deadline that passes
//! while a save is running fires as soon as that save completes. A failed save
//! is retried after a growing back-off until one succeeds.

use crate::app::{handle_event, Action, AppState, Event, PendingInsert, ViewModel};
use crate::domain::{Catalog, LaunchTarget, NewEntry, Result};
use crate::host::Host;
use crate::persistence::SaveScheduler;
use crate::Config;
use futures_util::future::BoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Output consumed by the view.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewUpdate {
    /// A fresh projection of the state.
    Render { view: ViewModel },
    /// A user-facing error message.
    Notify { message: String },
    /// Startup finished.
    Started {
        #[serde(rename = "hideOnStartup")]
        hide_on_startup: bool,
    },
}

/// Result of a finished host future.
enum Completion {
    Event(Event),
    Notify(String),
    Saved(Result<()>),
    Done,
}

/// Drives an [`AppState`] against a host.
pub struct Orchestrator<H: Host + 'static> {
    host: Arc<H>,
    state: AppState,
    saves: SaveScheduler,
    save_in_flight: bool,
    updates: UnboundedSender<ViewUpdate>,
    tasks: FuturesUnordered<BoxFuture<'static, Completion>>,
    running: bool,
}

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

impl<H: Host + 'static> Orchestrator<H> {
    /// Creates an orchestrator over the default catalog.
    ///
    /// Nothing is loaded until [`start`](Self::start) (or [`run`](Self::run)).
    #[must_use]
    pub fn new(host: Arc<H>, config: &Config, updates: UnboundedSender<ViewUpdate>) -> Self {
        Self {
            host,
            state: AppState::new(Catalog::default(), config.drag_settings(), config.icon_size),
            saves: SaveScheduler::new(config.save_delay()),
            save_in_flight: false,
            updates,
            tasks: FuturesUnordered::new(),
            running: true,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// True while a debounced save is waiting for its deadline.
    #[must_use]
    pub const fn save_pending(&self) -> bool {
        self.saves.is_pending()
    }

    /// Loads the persisted catalog (or the default) and reports startup.
    ///
    /// A load failure is surfaced to the view and the default catalog is used.
    pub async fn start(&mut self) {
        tracing::info!("loading catalog");
        let catalog = match self.host.load_catalog().await {
            Ok(Some(catalog)) => catalog,
            Ok(None) => {
                tracing::info!("no stored catalog, using defaults");
                Catalog::default()
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load catalog");
                self.notify(format!("Failed to load: {e}"));
                Catalog::default()
            }
        };
        self.dispatch(&Event::CatalogLoaded { catalog });
    }

    /// Runs until a `Shutdown` event arrives or `events` closes, then flushes
    /// any pending save.
    ///
    /// Returns the final state.
    pub async fn run(mut self, mut events: UnboundedReceiver<Event>) -> AppState {
        self.start().await;

        while self.running {
            let save_at = self.saves.deadline().filter(|_| !self.save_in_flight);
            let press_at = self.state.drag.long_press_deadline();

            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.dispatch(&event),
                    None => break,
                },
                Some(done) = self.tasks.next(), if !self.tasks.is_empty() => self.complete(done),
                () = wait_until(save_at) => self.save_if_due(),
                () = wait_until(press_at) => self.dispatch(&Event::LongPressElapsed),
            }
        }

        self.shutdown().await;
        self.state
    }

    /// Feeds one event through the state machine and executes its actions.
    pub fn dispatch(&mut self, event: &Event) {
        let at = now();
        match handle_event(&mut self.state, event, at) {
            Ok((render, actions)) => {
                if render {
                    self.render();
                }
                for action in actions {
                    self.execute(action, at);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "event handling failed");
                self.notify(e.to_string());
            }
        }
    }

    fn render(&self) {
        self.send(ViewUpdate::Render {
            view: ViewModel::from_state(&self.state),
        });
    }

    fn notify(&self, message: String) {
        self.send(ViewUpdate::Notify { message });
    }

    fn send(&self, update: ViewUpdate) {
        if self.updates.send(update).is_err() {
            tracing::debug!("view receiver dropped");
        }
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: std::future::Future<Output = Completion> + Send + 'static,
    {
        self.tasks.push(Box::pin(task));
    }

    #[allow(clippy::too_many_lines)]
    fn execute(&mut self, action: Action, at: Instant) {
        let host = Arc::clone(&self.host);
        match action {
            Action::Persist => self.saves.schedule(at),
            Action::ResolveIcon(key) => self.spawn(async move {
                let icon = match host.resolve_icon(&key.lookup, key.size).await {
                    Ok(icon) => icon,
                    Err(e) => {
                        tracing::warn!(lookup = %key.lookup, error = %e, "icon resolution failed");
                        None
                    }
                };
                Completion::Event(Event::IconResolved { key, icon })
            }),
            Action::Launch { target, args } => self.spawn(async move {
                match host.launch(&target, &args).await {
                    Ok(()) => Completion::Done,
                    Err(e) => {
                        tracing::warn!(path = %target, error = %e, "launch failed");
                        Completion::Notify(e.to_string())
                    }
                }
            }),
            Action::OpenContainingFolder(target) => self.spawn(async move {
                match host.open_containing_folder(&target).await {
                    Ok(()) => Completion::Done,
                    Err(e) => Completion::Notify(e.to_string()),
                }
            }),
            Action::PrepareInsert(insert) if insert.normalize => self.spawn(async move {
                Completion::Event(Event::InsertReady(normalize_insert(host.as_ref(), insert).await))
            }),
            Action::PrepareInsert(insert) => self.dispatch(&Event::InsertReady(insert)),
            Action::ApplyHotkey(combo) => self.spawn(async move {
                settle(host.set_global_hotkey(&combo).await)
            }),
            Action::ApplyAlwaysOnTop(on) => self.spawn(async move {
                settle(host.set_always_on_top(on).await)
            }),
            Action::ApplyAutoStart(on) => self.spawn(async move {
                settle(host.set_auto_start(on).await)
            }),
            Action::ListPackages => self.spawn(async move {
                match host.list_installed_packages().await {
                    Ok(packages) => Completion::Event(Event::PackagesListed { packages }),
                    Err(e) => Completion::Notify(e.to_string()),
                }
            }),
            Action::ValidateTargets(pairs) => self.spawn(async move {
                let (ids, targets): (Vec<_>, Vec<LaunchTarget>) = pairs.into_iter().unzip();
                match host.validate_targets(&targets).await {
                    Ok(found) => Completion::Event(Event::TargetsValidated {
                        results: ids.into_iter().zip(found).collect(),
                    }),
                    Err(e) => Completion::Notify(e.to_string()),
                }
            }),
            Action::Window(command) => host.window_command(command),
            Action::StartupComplete { hide_on_startup } => self.send(ViewUpdate::Started { hide_on_startup }),
            Action::Shutdown => self.running = false,
        }
    }

    fn complete(&mut self, done: Completion) {
        match done {
            Completion::Event(event) => self.dispatch(&event),
            Completion::Notify(message) => self.notify(message),
            Completion::Saved(result) => {
                self.save_in_flight = false;
                if let Some(message) = self.saves.record_result(&result, now()) {
                    self.notify(message);
                }
            }
            Completion::Done => {}
        }
    }

    fn save_if_due(&mut self) {
        if !self.save_in_flight && self.saves.take_due(now()) {
            self.issue_save();
        }
    }

    fn issue_save(&mut self) {
        let host = Arc::clone(&self.host);
        let snapshot = self.state.catalog.clone();
        tracing::debug!(entries = snapshot.entry_count(), "issuing catalog save");
        self.save_in_flight = true;
        self.spawn(async move { Completion::Saved(host.save_catalog(&snapshot).await) });
    }

    /// Waits for a running save, then flushes a pending one.
    ///
    /// A save that failed earlier is still pending as a retry, so the flush
    /// covers it too. The flush is attempted once.
    async fn shutdown(&mut self) {
        tracing::info!(pending = self.saves.is_pending(), in_flight = self.save_in_flight, "shutting down");

        while self.save_in_flight {
            match self.tasks.next().await {
                Some(done) => self.complete(done),
                None => self.save_in_flight = false,
            }
        }

        if self.saves.take_pending() {
            let result = self.host.save_catalog(&self.state.catalog).await;
            if let Some(message) = self.saves.record_result(&result, now()) {
                self.notify(message);
            }
        }
    }
}

fn settle(result: Result<()>) -> Completion {
    match result {
        Ok(()) => Completion::Done,
        Err(e) => {
            tracing::warn!(error = %e, "host setting failed");
            Completion::Notify(e.to_string())
        }
    }
}

/// Rewrites filesystem targets relative to the application directory.
///
/// A failed rewrite keeps the raw target.
async fn normalize_insert<H: Host + ?Sized>(host: &H, mut insert: PendingInsert) -> PendingInsert {
    let mut entries = Vec::with_capacity(insert.entries.len());
    for entry in insert.entries {
        let target = match host.normalize_relative_path(&entry.target).await {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(path = %entry.target, error = %e, "path normalization failed, keeping raw path");
                entry.target.clone()
            }
        };
        entries.push(NewEntry { target, ..entry });
    }
    insert.entries = entries;
    insert
}

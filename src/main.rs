//! Headless launcher shell and binary entry point.
//!
//! The view layer lives in another process. This binary connects it to the
//! engine over stdio:
//!
//! - stdin: one JSON [`Event`] per line (`{"type":"entryClicked","id":"…"}`)
//! - stdout: one JSON [`ViewUpdate`] per line, plus
//!   `{"type":"window","command":"hide"}` for window chrome commands
//!
//! # Usage
//!
//! ```text
//! quickdock [--config <file.toml>] [key=value ...]
//! ```
//!
//! Pairs override values from the configuration file, e.g.
//! `quickdock save_debounce=250 trace_level=debug`.
//!
//! # Lifecycle
//!
//! 1. Parse configuration and initialize tracing
//! 2. Open the desktop host (creates the data directory)
//! 3. Load the catalog and report startup
//! 4. Process events until `{"type":"shutdown"}` or end of input
//! 5. Flush any pending save and exit

#![allow(clippy::multiple_crate_versions)]

use quickdock::host::WindowCommand;
use quickdock::infrastructure::DesktopHost;
use quickdock::observability::init_tracing;
use quickdock::{Config, Event, Orchestrator, ViewUpdate};
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

fn parse_args(mut args: impl Iterator<Item = String>) -> quickdock::Result<Config> {
    let mut config_file: Option<PathBuf> = None;
    let mut pairs = BTreeMap::new();

    while let Some(arg) = args.next() {
        if arg == "--config" {
            let path = args
                .next()
                .ok_or_else(|| quickdock::LauncherError::Config("--config needs a path".to_string()))?;
            config_file = Some(PathBuf::from(path));
        } else if let Some((key, value)) = arg.split_once('=') {
            pairs.insert(key.trim().to_string(), value.to_string());
        } else {
            return Err(quickdock::LauncherError::Config(format!("unexpected argument: {arg}")));
        }
    }

    let base = match config_file {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };
    Ok(base.with_pairs(&pairs))
}

/// Reads events on a plain thread so a blocked stdin never holds up exit.
fn spawn_stdin_reader(events: UnboundedSender<Event>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Event>(&line) {
                Ok(event) => {
                    if events.send(event).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "ignoring malformed event line"),
            }
        }
        tracing::debug!("stdin closed");
    });
}

async fn write_updates(mut updates: UnboundedReceiver<ViewUpdate>, mut window: UnboundedReceiver<WindowCommand>) {
    let mut stdout = tokio::io::stdout();
    let mut window_open = true;

    loop {
        let line = tokio::select! {
            update = updates.recv() => match update {
                Some(update) => serde_json::to_string(&update),
                None => break,
            },
            command = window.recv(), if window_open => match command {
                Some(command) => serde_json::to_string(&serde_json::json!({ "type": "window", "command": command })),
                None => {
                    window_open = false;
                    continue;
                }
            },
        };

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize view update");
                continue;
            }
        };
        if stdout.write_all(format!("{line}\n").as_bytes()).await.is_err() || stdout.flush().await.is_err() {
            break;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match parse_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("quickdock: {e}");
            return ExitCode::from(2);
        }
    };

    init_tracing(&config);
    tracing::info!(data_dir = ?config.data_dir, "starting quickdock");

    let (window_tx, window_rx) = mpsc::unbounded_channel();
    let host = match DesktopHost::new(config.data_dir.clone()) {
        Ok(host) => host.with_window_channel(window_tx),
        Err(e) => {
            eprintln!("quickdock: {e}");
            return ExitCode::FAILURE;
        }
    };

    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_updates(updates_rx, window_rx));
    spawn_stdin_reader(events_tx);

    let state = Orchestrator::new(Arc::new(host), &config, updates_tx)
        .run(events_rx)
        .await;
    tracing::info!(entries = state.catalog.entry_count(), "quickdock stopped");

    if writer.await.is_err() {
        tracing::error!("view writer task failed");
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| (*s).to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn pairs_override_defaults() {
        let config = parse_args(args(&["icon_size=48", "trace_level=debug"])).unwrap();
        assert_eq!(config.icon_size, 48);
        assert_eq!(config.trace_level.as_deref(), Some("debug"));
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        assert!(parse_args(args(&["--verbose"])).is_err());
        assert!(parse_args(args(&["--config"])).is_err());
    }
}

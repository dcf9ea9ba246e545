//! Desktop implementation of the [`Host`] collaborator surface.
//!
//! `DesktopHost` persists the catalog through [`JsonStorage`], spawns launch
//! targets with `std::process::Command`, and keeps the bookkeeping for the
//! global hotkey, always-on-top and autostart preferences. Window chrome
//! commands are forwarded to whoever owns the window through an optional
//! channel. Icon extraction has no backend here and always reports no icon.
//!
//! Filesystem and process work runs on tokio's blocking pool. Launched
//! children are handed to a detached reaper thread so they never linger as
//! zombies.

use super::paths::{make_relative, resolve_launch_path, target_exists};
use crate::domain::{Catalog, IconData, LaunchTarget, LauncherError, Result};
use crate::host::{Host, InstalledPackage, WindowCommand};
use crate::storage::{JsonStorage, Storage};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use tokio::sync::mpsc::UnboundedSender;

const AUTOSTART_FILE: &str = "quickdock.desktop";

const MODIFIERS: [&str; 11] = [
    "ctrl", "control", "alt", "option", "shift", "super", "meta", "cmd", "command", "cmdorctrl", "commandorcontrol",
];

/// Host backed by the local filesystem and process table.
pub struct DesktopHost {
    storage: Arc<Mutex<JsonStorage>>,
    base_dir: Option<PathBuf>,
    autostart_dir: Option<PathBuf>,
    hotkey: Mutex<Option<String>>,
    always_on_top: AtomicBool,
    window: Option<UnboundedSender<WindowCommand>>,
}

impl DesktopHost {
    /// Creates a host storing its catalog under `data_dir`.
    ///
    /// The base directory for relative targets defaults to the executable's
    /// directory and the autostart directory to the XDG autostart folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        Ok(Self {
            storage: Arc::new(Mutex::new(JsonStorage::new(data_dir)?)),
            base_dir: super::paths::app_base_dir(),
            autostart_dir: default_autostart_dir(),
            hotkey: Mutex::new(None),
            always_on_top: AtomicBool::new(false),
            window: None,
        })
    }

    /// Overrides the directory relative targets resolve against.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Overrides where the autostart entry is written.
    #[must_use]
    pub fn with_autostart_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.autostart_dir = Some(dir.into());
        self
    }

    /// Forwards window chrome commands to `sender`.
    #[must_use]
    pub fn with_window_channel(mut self, sender: UnboundedSender<WindowCommand>) -> Self {
        self.window = Some(sender);
        self
    }

    /// Currently registered hotkey, lowercased.
    #[must_use]
    pub fn hotkey(&self) -> Option<String> {
        self.hotkey.lock().ok().and_then(|h| h.clone())
    }

    #[must_use]
    pub fn always_on_top(&self) -> bool {
        self.always_on_top.load(Ordering::Relaxed)
    }
}

fn lock_storage<'a>(storage: &'a Mutex<JsonStorage>, operation: &'static str) -> Result<MutexGuard<'a, JsonStorage>> {
    storage
        .lock()
        .map_err(|_| LauncherError::host(operation, "storage lock poisoned"))
}

/// Runs `work` on the blocking pool, reporting a panicked task as a host error.
async fn blocking<T, F>(operation: &'static str, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| LauncherError::host(operation, e))?
}

/// Waits for `child` on a detached thread so its exit status is collected.
///
/// Falls back to a blocking-pool task if the thread cannot be created.
pub fn reap(mut child: Child) -> Option<JoinHandle<std::io::Result<ExitStatus>>> {
    let pid = child.id();
    let spawned = std::thread::Builder::new()
        .name(format!("reap-{pid}"))
        .spawn(move || {
            let status = child.wait();
            tracing::debug!(pid = pid, status = ?status, "launched process exited");
            status
        });
    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(pid = pid, error = %e, "could not start reaper thread");
            None
        }
    }
}

fn default_autostart_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .map(|dir| dir.join("autostart"))
}

/// Program that opens documents and folders with their default handler.
const fn opener() -> &'static str {
    if cfg!(windows) {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

/// Builds the command that launches `target`.
///
/// # Errors
///
/// Returns [`LauncherError::Launch`] for package references outside Windows.
pub fn launch_command(target: &LaunchTarget, args: &[String], base: Option<&Path>) -> Result<Command> {
    match target {
        LaunchTarget::Package(raw) => {
            if !cfg!(windows) {
                return Err(LauncherError::Launch(format!("Failed to launch {raw}: package targets need the Windows shell")));
            }
            let mut command = Command::new("explorer");
            command.arg(raw);
            Ok(command)
        }
        LaunchTarget::Path(raw) => {
            let resolved = resolve_launch_path(raw, base);
            let opens_with_handler = if cfg!(windows) {
                args.is_empty()
            } else {
                Path::new(&resolved).is_dir()
            };
            let mut command = if opens_with_handler {
                let mut c = Command::new(opener());
                c.arg(&resolved);
                c
            } else {
                let mut c = Command::new(&resolved);
                c.args(args);
                c
            };
            if let Some(dir) = Path::new(&resolved).parent().filter(|d| d.is_dir()) {
                command.current_dir(dir);
            }
            Ok(command)
        }
    }
}

/// Builds the command that reveals `target` in the file manager.
///
/// # Errors
///
/// Returns a host error for package references, which have no folder.
pub fn reveal_command(target: &LaunchTarget, base: Option<&Path>) -> Result<Command> {
    let LaunchTarget::Path(raw) = target else {
        return Err(LauncherError::host("openContainingFolder", "package targets have no containing folder"));
    };
    let resolved = resolve_launch_path(raw, base);

    if cfg!(windows) {
        let mut command = Command::new("explorer");
        command.arg(format!("/select,{resolved}"));
        return Ok(command);
    }

    let folder = Path::new(&resolved)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let mut command = Command::new(opener());
    command.arg(folder);
    Ok(command)
}

/// Validates and lowercases a hotkey combination such as `Ctrl+Alt+Space`.
///
/// # Errors
///
/// Returns a host error unless the combination has exactly one non-modifier key.
pub fn parse_hotkey(combo: &str) -> Result<String> {
    let normalized = combo.trim().to_lowercase();
    let parts: Vec<&str> = normalized.split('+').map(str::trim).collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(LauncherError::host("setGlobalHotkey", format!("invalid hotkey: {combo}")));
    }
    let keys = parts.iter().filter(|p| !MODIFIERS.contains(p)).count();
    if keys != 1 {
        return Err(LauncherError::host("setGlobalHotkey", format!("invalid hotkey: {combo}")));
    }
    Ok(parts.join("+"))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StartApps {
    Many(Vec<StartApp>),
    One(StartApp),
}

#[derive(Deserialize)]
struct StartApp {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "AppID")]
    app_id: String,
}

/// Parses `Get-StartApps | ConvertTo-Json` output.
///
/// # Errors
///
/// Returns a host error if the output is not the expected JSON shape.
pub fn parse_start_apps(json: &str) -> Result<Vec<InstalledPackage>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let apps = match serde_json::from_str::<StartApps>(json) {
        Ok(StartApps::Many(apps)) => apps,
        Ok(StartApps::One(app)) => vec![app],
        Err(e) => return Err(LauncherError::host("listInstalledPackages", e)),
    };
    let mut packages: Vec<InstalledPackage> = apps
        .into_iter()
        .filter(|a| !a.app_id.trim().is_empty())
        .map(|a| InstalledPackage {
            name: a.name,
            id: a.app_id,
        })
        .collect();
    packages.sort_by_key(|p| p.name.to_lowercase());
    Ok(packages)
}

fn autostart_entry(exe: &Path) -> String {
    format!(
        "[Desktop Entry]\nType=Application\nName=quickdock\nExec=\"{}\"\nX-GNOME-Autostart-enabled=true\n",
        exe.display()
    )
}

#[async_trait]
impl Host for DesktopHost {
    async fn load_catalog(&self) -> Result<Option<Catalog>> {
        let storage = Arc::clone(&self.storage);
        blocking("loadCatalog", move || lock_storage(&storage, "loadCatalog")?.load()).await
    }

    async fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        let storage = Arc::clone(&self.storage);
        let catalog = catalog.clone();
        blocking("saveCatalog", move || lock_storage(&storage, "saveCatalog")?.save(&catalog)).await
    }

    async fn resolve_icon(&self, lookup: &str, size: u32) -> Result<Option<IconData>> {
        tracing::trace!(lookup = %lookup, size = size, "no icon backend on this platform");
        Ok(None)
    }

    async fn launch(&self, target: &LaunchTarget, args: &[String]) -> Result<()> {
        let target = target.clone();
        let args = args.to_vec();
        let base = self.base_dir.clone();
        blocking("launch", move || {
            let _span = tracing::info_span!("launch", path = %target, args = args.len()).entered();
            let child = launch_command(&target, &args, base.as_deref())?
                .spawn()
                .map_err(|e| LauncherError::Launch(format!("Failed to launch {target}: {e}")))?;
            reap(child);
            Ok(())
        })
        .await
    }

    async fn open_containing_folder(&self, target: &LaunchTarget) -> Result<()> {
        let target = target.clone();
        let base = self.base_dir.clone();
        blocking("openContainingFolder", move || {
            let child = reveal_command(&target, base.as_deref())?
                .spawn()
                .map_err(|e| LauncherError::host("openContainingFolder", e))?;
            reap(child);
            Ok(())
        })
        .await
    }

    async fn normalize_relative_path(&self, path: &str) -> Result<String> {
        let base = self
            .base_dir
            .as_deref()
            .ok_or_else(|| LauncherError::host("makeRelativePath", "base dir not found"))?;
        Ok(make_relative(path, base))
    }

    async fn set_global_hotkey(&self, combo: &str) -> Result<()> {
        let requested = if combo.trim().is_empty() {
            None
        } else {
            Some(parse_hotkey(combo)?)
        };

        let mut current = self
            .hotkey
            .lock()
            .map_err(|_| LauncherError::host("setGlobalHotkey", "lock failed"))?;
        if *current == requested {
            return Ok(());
        }

        tracing::info!(previous = ?*current, next = ?requested, "global hotkey changed");
        *current = requested;
        Ok(())
    }

    async fn set_always_on_top(&self, on: bool) -> Result<()> {
        self.always_on_top.store(on, Ordering::Relaxed);
        tracing::debug!(on = on, "always on top");
        Ok(())
    }

    async fn set_auto_start(&self, on: bool) -> Result<()> {
        let dir = self
            .autostart_dir
            .clone()
            .ok_or_else(|| LauncherError::host("setAutoStart", "autostart directory unavailable"))?;

        blocking("setAutoStart", move || {
            let file = dir.join(AUTOSTART_FILE);
            if on {
                let exe = std::env::current_exe().map_err(|e| LauncherError::host("setAutoStart", e))?;
                std::fs::create_dir_all(&dir).map_err(|e| LauncherError::host("setAutoStart", e))?;
                std::fs::write(&file, autostart_entry(&exe)).map_err(|e| LauncherError::host("setAutoStart", e))?;
            } else if file.exists() {
                std::fs::remove_file(&file).map_err(|e| LauncherError::host("setAutoStart", e))?;
            }
            tracing::debug!(on = on, path = ?file, "autostart updated");
            Ok(())
        })
        .await
    }

    async fn list_installed_packages(&self) -> Result<Vec<InstalledPackage>> {
        if !cfg!(windows) {
            return Ok(Vec::new());
        }
        blocking("listInstalledPackages", || {
            let output = Command::new("powershell")
                .args(["-NoProfile", "-Command", "Get-StartApps | ConvertTo-Json -Compress"])
                .output()
                .map_err(|e| LauncherError::host("listInstalledPackages", e))?;
            if !output.status.success() {
                return Err(LauncherError::host(
                    "listInstalledPackages",
                    String::from_utf8_lossy(&output.stderr).trim(),
                ));
            }
            parse_start_apps(&String::from_utf8_lossy(&output.stdout))
        })
        .await
    }

    async fn validate_targets(&self, targets: &[LaunchTarget]) -> Result<Vec<bool>> {
        let targets = targets.to_vec();
        let base = self.base_dir.clone();
        blocking("validateTargets", move || {
            Ok(targets.iter().map(|t| target_exists(t.as_str(), base.as_deref())).collect())
        })
        .await
    }

    fn window_command(&self, command: WindowCommand) {
        match &self.window {
            Some(sender) => {
                if sender.send(command).is_err() {
                    tracing::debug!(command = ?command, "window channel closed");
                }
            }
            None => tracing::debug!(command = ?command, "no window attached"),
        }
    }
}

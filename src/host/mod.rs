//! Out-of-process collaborators.
//!
//! Everything the engine cannot do itself (persist bytes, extract an icon,
//! spawn a process, register a global hotkey, drive window chrome) is reached
//! through the [`Host`] trait. Each operation is independently failable and
//! reports failures as [`LauncherError::Host`](crate::LauncherError::Host)
//! or [`LauncherError::Launch`](crate::LauncherError::Launch) with the raw
//! error text.
//!
//! The orchestrator holds the host behind an `Arc` and invokes operations as
//! asynchronous actions; there is no timeout on any of them.

use crate::domain::{Catalog, IconData, LaunchTarget, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An installed OS package that can be added as a launch target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    pub name: String,
    /// Application user-model id, appended to the apps-folder shell reference.
    pub id: String,
}

/// Fire-and-forget window chrome commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowCommand {
    Minimize,
    ToggleMaximize,
    Close,
    Hide,
    Show,
    ToggleVisibility,
}

/// The collaborator surface consumed by the orchestrator.
#[async_trait]
pub trait Host: Send + Sync {
    /// Loads the persisted catalog; `Ok(None)` when nothing was ever saved.
    async fn load_catalog(&self) -> Result<Option<Catalog>>;

    async fn save_catalog(&self, catalog: &Catalog) -> Result<()>;

    /// Resolves an icon for a lookup key; `Ok(None)` when the backend has none.
    async fn resolve_icon(&self, lookup: &str, size: u32) -> Result<Option<IconData>>;

    async fn launch(&self, target: &LaunchTarget, args: &[String]) -> Result<()>;

    async fn open_containing_folder(&self, target: &LaunchTarget) -> Result<()>;

    /// Rewrites an absolute path relative to the application base directory.
    async fn normalize_relative_path(&self, path: &str) -> Result<String>;

    /// Registers a global toggle hotkey; an empty combination unregisters.
    async fn set_global_hotkey(&self, combo: &str) -> Result<()>;

    async fn set_always_on_top(&self, on: bool) -> Result<()>;

    async fn set_auto_start(&self, on: bool) -> Result<()>;

    async fn list_installed_packages(&self) -> Result<Vec<InstalledPackage>>;

    /// Reports, per target, whether it still exists.
    async fn validate_targets(&self, targets: &[LaunchTarget]) -> Result<Vec<bool>>;

    fn window_command(&self, command: WindowCommand);
}

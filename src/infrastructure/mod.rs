//! Infrastructure layer for filesystem, process and environment interactions.
//!
//! - [`paths`]: data directory and launch-target path resolution
//! - [`desktop`]: [`DesktopHost`], the local implementation of [`Host`](crate::host::Host)

pub mod desktop;
pub mod paths;

pub use desktop::DesktopHost;
pub use paths::{app_base_dir, default_data_dir, make_relative, resolve_launch_path, target_exists};

//! Path utilities for launch targets and the data directory.
//!
//! Launch targets are stored as the raw strings the user supplied. Package
//! references (`shell:` / `uwp:`) are passed through untouched; relative paths
//! are resolved against the application base directory, which is the directory
//! containing the running executable.

use crate::domain::entry::is_package_reference;
use std::path::{Component, Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "QUICKDOCK_DATA_DIR";

/// Returns the default data directory for the catalog and trace output.
///
/// Resolution order: `$QUICKDOCK_DATA_DIR`, `$XDG_DATA_HOME/quickdock`,
/// `%APPDATA%\quickdock`, `$HOME/.local/share/quickdock`, and finally a
/// `quickdock-data` directory next to the executable.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    let env = |key: &str| std::env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from);

    if let Some(dir) = env(DATA_DIR_ENV) {
        return dir;
    }
    if let Some(dir) = env("XDG_DATA_HOME") {
        return dir.join("quickdock");
    }
    if let Some(dir) = env("APPDATA") {
        return dir.join("quickdock");
    }
    if let Some(home) = env("HOME") {
        return home.join(".local").join("share").join("quickdock");
    }
    app_base_dir().unwrap_or_default().join("quickdock-data")
}

/// Directory containing the running executable.
#[must_use]
pub fn app_base_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
}

/// Resolves a raw target into the string handed to the process spawner.
///
/// # Examples
///
/// ```
/// use quickdock::infrastructure::resolve_launch_path;
/// use std::path::Path;
///
/// let base = Path::new("/opt/quickdock");
/// assert_eq!(resolve_launch_path("tools/run.sh", Some(base)), "/opt/quickdock/tools/run.sh");
/// assert_eq!(resolve_launch_path("/usr/bin/vim", Some(base)), "/usr/bin/vim");
/// assert_eq!(resolve_launch_path("shell:AppsFolder\\Paint", Some(base)), "shell:AppsFolder\\Paint");
/// ```
#[must_use]
pub fn resolve_launch_path(raw: &str, base: Option<&Path>) -> String {
    if raw.trim().is_empty() || is_package_reference(raw) {
        return raw.to_string();
    }
    let path = Path::new(raw);
    if path.is_absolute() {
        return raw.to_string();
    }
    base.map_or_else(|| raw.to_string(), |b| b.join(path).to_string_lossy().into_owned())
}

/// Computes `path` relative to `base`.
///
/// Returns `None` when either path is empty or they sit on different
/// filesystem prefixes (drive letters).
#[must_use]
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();
    if path_parts.is_empty() || base_parts.is_empty() {
        return None;
    }
    if let (Some(Component::Prefix(a)), Some(Component::Prefix(b))) = (path_parts.first(), base_parts.first()) {
        if a.kind() != b.kind() {
            return None;
        }
    }

    let shared = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel: PathBuf = std::iter::repeat("..").take(base_parts.len() - shared).collect();
    rel.extend(path_parts[shared..].iter().map(|c| c.as_os_str()));
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    Some(rel)
}

/// Rewrites an absolute filesystem target relative to `base`.
///
/// Blank strings, package references and already-relative paths are returned
/// unchanged, as is any path [`relative_to`] cannot express.
///
/// # Examples
///
/// ```
/// use quickdock::infrastructure::make_relative;
/// use std::path::Path;
///
/// let base = Path::new("/opt/quickdock");
/// assert_eq!(make_relative("/opt/quickdock/tools/a.sh", base), "tools/a.sh");
/// assert_eq!(make_relative("/usr/bin/vim", base), "../../usr/bin/vim");
/// assert_eq!(make_relative("uwp:Foo", base), "uwp:Foo");
/// ```
#[must_use]
pub fn make_relative(raw: &str, base: &Path) -> String {
    if raw.trim().is_empty() || is_package_reference(raw) {
        return raw.to_string();
    }
    let path = Path::new(raw);
    if !path.is_absolute() {
        return raw.to_string();
    }
    relative_to(path, base).map_or_else(|| raw.to_string(), |p| p.to_string_lossy().into_owned())
}

/// Reports whether a raw target still exists.
///
/// Package references are assumed to exist; blank targets never do.
#[must_use]
pub fn target_exists(raw: &str, base: Option<&Path>) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    if is_package_reference(trimmed) {
        return true;
    }
    Path::new(&resolve_launch_path(trimmed, base)).exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_to_same_directory_is_dot() {
        let base = Path::new("/a/b");
        assert_eq!(relative_to(Path::new("/a/b"), base), Some(PathBuf::from(".")));
    }

    #[test]
    fn relative_to_walks_up_to_the_shared_ancestor() {
        let base = Path::new("/opt/quickdock/bin");
        assert_eq!(
            relative_to(Path::new("/opt/tools/edit.sh"), base),
            Some(PathBuf::from("../../tools/edit.sh"))
        );
        assert_eq!(
            relative_to(Path::new("/opt/quickdock/bin/sub/a"), base),
            Some(PathBuf::from("sub/a"))
        );
    }

    #[test]
    fn relative_paths_pass_through_make_relative() {
        assert_eq!(make_relative("tools/x", Path::new("/base")), "tools/x");
        assert_eq!(make_relative("  ", Path::new("/base")), "  ");
    }

    #[test]
    fn resolve_without_base_keeps_raw() {
        assert_eq!(resolve_launch_path("rel/x", None), "rel/x");
    }

    #[test]
    fn existence_checks() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("tool.sh"), "").unwrap();

        assert!(target_exists("tool.sh", Some(dir.path())));
        assert!(!target_exists("missing.sh", Some(dir.path())));
        assert!(target_exists("shell:AppsFolder\\X", None));
        assert!(!target_exists("", None));
    }
}

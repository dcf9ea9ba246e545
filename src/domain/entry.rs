//! Launchable entry model.
//!
//! An [`Entry`] is a single item in the catalog: a display name, a launch target
//! (a filesystem path or an OS-package reference), an optional argument string,
//! an optional cached icon, and its creation timestamp. Identity is a globally
//! unique [`EntryId`]; the catalog guarantees no two entries share one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Target prefixes that denote OS-package references rather than paths.
const PACKAGE_PREFIXES: [&str; 2] = ["shell:", "uwp:"];

/// Shell folder that hosts installed packaged applications.
pub const APPS_FOLDER_PREFIX: &str = "shell:AppsFolder\\";

/// Stable, globally unique identity of an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Generates a fresh random identity.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an entry launches.
///
/// Stored and compared as the raw string the user supplied; duplicate detection
/// uses exact string equality of that raw form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LaunchTarget {
    /// An executable, document, or folder path (absolute or relative).
    Path(String),
    /// A tagged OS-package reference (`shell:...` or `uwp:...`).
    Package(String),
}

impl LaunchTarget {
    /// Classifies a raw target string.
    ///
    /// # Examples
    ///
    /// ```
    /// use quickdock::domain::LaunchTarget;
    ///
    /// assert!(LaunchTarget::parse("shell:AppsFolder\\Microsoft.Paint").is_package());
    /// assert!(!LaunchTarget::parse("C:\\Tools\\app.exe").is_package());
    /// ```
    #[must_use]
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if is_package_reference(&raw) {
            Self::Package(raw)
        } else {
            Self::Path(raw)
        }
    }

    /// Returns the raw target string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Path(s) | Self::Package(s) => s,
        }
    }

    #[must_use]
    pub const fn is_package(&self) -> bool {
        matches!(self, Self::Package(_))
    }

    /// Returns true when the target is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_str().trim().is_empty()
    }

    /// Derives a display name from the target.
    ///
    /// Paths yield their file stem (`C:\Tools\Code.exe` → `Code`); package
    /// references yield the last segment after the shell folder.
    #[must_use]
    pub fn display_name(&self) -> String {
        let raw = self.as_str().trim().trim_end_matches(['/', '\\']);
        let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
        let name = match self {
            Self::Path(_) => match last.rfind('.') {
                Some(dot) if dot > 0 => &last[..dot],
                _ => last,
            },
            Self::Package(_) => {
                let last = last.split_once(':').map_or(last, |(_, rest)| rest);
                last.split('!').next().unwrap_or(last)
            }
        };
        if name.is_empty() {
            raw.to_string()
        } else {
            name.to_string()
        }
    }
}

impl From<String> for LaunchTarget {
    fn from(value: String) -> Self {
        Self::parse(value)
    }
}

impl From<LaunchTarget> for String {
    fn from(value: LaunchTarget) -> Self {
        match value {
            LaunchTarget::Path(s) | LaunchTarget::Package(s) => s,
        }
    }
}

impl fmt::Display for LaunchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true for `shell:` / `uwp:` references (case-insensitive).
#[must_use]
pub fn is_package_reference(raw: &str) -> bool {
    let lower = raw.trim().to_ascii_lowercase();
    PACKAGE_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Opaque icon payload (a `data:` URL produced by the icon backend).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconData(String);

impl IconData {
    #[must_use]
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank payloads are treated as "no icon".
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// A single launchable item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub target: LaunchTarget,
    /// Raw argument string, split with [`split_args`] at launch time.
    pub args: Option<String>,
    /// Cached icon; cleared whenever the target changes.
    pub icon: Option<IconData>,
    /// Creation time in Unix milliseconds.
    pub added_at: i64,
}

impl Entry {
    /// Creates an entry with a fresh identity stamped with the current time.
    ///
    /// The display name defaults to [`LaunchTarget::display_name`] when `name`
    /// is blank.
    #[must_use]
    pub fn new(target: LaunchTarget, name: Option<&str>, args: Option<&str>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| target.display_name(), str::to_string);
        Self {
            id: EntryId::generate(),
            name,
            target,
            args: normalize_args(args),
            icon: None,
            added_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Launch arguments split into argv form.
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        self.args.as_deref().map(split_args).unwrap_or_default()
    }
}

/// Trims an argument string, mapping blank input to `None`.
#[must_use]
pub fn normalize_args(args: Option<&str>) -> Option<String> {
    args.map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
}

/// Splits an argument string into argv, honouring double quotes.
///
/// # Examples
///
/// ```
/// use quickdock::domain::entry::split_args;
///
/// assert_eq!(
///     split_args(r#"--profile "Work Space" -v"#),
///     vec!["--profile", "Work Space", "-v"],
/// );
/// ```
#[must_use]
pub fn split_args(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in args.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    out.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_strips_directory_and_extension() {
        assert_eq!(LaunchTarget::parse("C:\\Tools\\Code.exe").display_name(), "Code");
        assert_eq!(LaunchTarget::parse("/usr/bin/firefox").display_name(), "firefox");
        assert_eq!(LaunchTarget::parse("D:\\Games\\").display_name(), "Games");
        assert_eq!(LaunchTarget::parse(".bashrc").display_name(), ".bashrc");
    }

    #[test]
    fn package_display_name_uses_last_segment() {
        let target = LaunchTarget::parse("shell:AppsFolder\\Microsoft.WindowsCalculator_8wekyb3d8bbwe!App");
        assert!(target.is_package());
        assert_eq!(target.display_name(), "Microsoft.WindowsCalculator_8wekyb3d8bbwe");
    }

    #[test]
    fn package_detection_is_case_insensitive() {
        assert!(is_package_reference("  SHELL:Downloads"));
        assert!(is_package_reference("uwp:Foo"));
        assert!(!is_package_reference("C:\\shell:odd"));
    }

    #[test]
    fn split_args_handles_quotes_and_empties() {
        assert_eq!(split_args(""), Vec::<String>::new());
        assert_eq!(split_args("  a   b "), vec!["a", "b"]);
        assert_eq!(split_args(r#""" x"#), vec!["", "x"]);
        assert_eq!(split_args(r#"--path="C:\Program Files""#), vec![r"--path=C:\Program Files"]);
    }

    #[test]
    fn new_entry_falls_back_to_derived_name() {
        let entry = Entry::new(LaunchTarget::parse("/opt/app/tool.sh"), Some("   "), Some("  "));
        assert_eq!(entry.name, "tool");
        assert!(entry.args.is_none());
        assert!(entry.added_at > 0);
    }

    #[test]
    fn target_serializes_as_raw_string() {
        let target = LaunchTarget::parse("uwp:Contoso.App");
        let json = serde_json::to_string(&target).unwrap();
        assert_eq!(json, "\"uwp:Contoso.App\"");
        let back: LaunchTarget = serde_json::from_str(&json).unwrap();
        assert_eq!(back, target);
    }
}

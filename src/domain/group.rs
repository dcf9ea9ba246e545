//! Named, ordered containers of entries.

use super::entry::{Entry, EntryId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of auto-generated group names (`Group-1`, `Group-2`, ...).
pub const DEFAULT_GROUP_PREFIX: &str = "Group-";

/// Stable identity of a [`Group`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GroupId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for GroupId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named, ordered sequence of entries.
///
/// Order is meaningful: it is both the render order and the launch-list order.
/// A group may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub entries: Vec<Entry>,
}

impl Group {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: GroupId::generate(),
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Position of an entry within this group.
    #[must_use]
    pub fn position_of(&self, id: &EntryId) -> Option<usize> {
        self.entries.iter().position(|e| &e.id == id)
    }

    /// Returns true if an entry with exactly this raw target exists here.
    #[must_use]
    pub fn contains_target(&self, raw_target: &str) -> bool {
        self.entries.iter().any(|e| e.target.as_str() == raw_target)
    }
}

/// Parses the numeric suffix of an auto-generated group name.
///
/// Returns `None` for names that do not follow the `Group-N` scheme.
#[must_use]
pub fn default_name_index(name: &str) -> Option<u32> {
    name.trim()
        .strip_prefix(DEFAULT_GROUP_PREFIX)
        .and_then(|n| n.parse::<u32>().ok())
}

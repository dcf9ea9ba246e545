//! Storage record models for the persistence layer.
//!
//! These types are the on-disk representation of the catalog and are separate
//! from the domain model, so schema aliases and lenient decoding stay out of
//! the domain. Records accept older field names (`version`, `apps`, `path`)
//! and read empty `args`/`icon` strings back as absent.

use crate::domain::{Catalog, Entry, EntryId, Group, GroupId, IconData, LaunchTarget, Settings, SCHEMA_VERSION};
use serde::{Deserialize, Deserializer, Serialize};

/// Top-level persisted document.
///
/// ```json
/// {
///   "schemaVersion": 1,
///   "activeGroupId": "…",
///   "groups": [{ "id": "…", "name": "Common", "entries": [
///     { "id": "…", "name": "Code", "target": "C:\\Tools\\Code.exe", "addedAt": 1700000000000 }
///   ]}],
///   "settings": { "cardWidth": 120, "theme": "dark" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    #[serde(alias = "version", default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub active_group_id: String,

    pub groups: Vec<GroupRecord>,

    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    #[serde(default = "generated_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(alias = "apps", default)]
    pub entries: Vec<EntryRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    #[serde(default = "generated_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(alias = "path")]
    pub target: String,

    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Creation time in Unix milliseconds.
    #[serde(alias = "added_at", default)]
    pub added_at: i64,
}

/// One item of the legacy flat `apps.json` store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LegacyAppRecord {
    #[serde(default)]
    pub name: String,

    pub path: String,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub args: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub icon: Option<String>,
}

const fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

fn generated_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

impl From<&Catalog> for CatalogRecord {
    fn from(catalog: &Catalog) -> Self {
        Self {
            schema_version: catalog.schema_version(),
            active_group_id: catalog.active_group_id().to_string(),
            groups: catalog.groups().iter().map(GroupRecord::from).collect(),
            settings: catalog.settings().clone(),
        }
    }
}

impl From<&Group> for GroupRecord {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.to_string(),
            name: group.name.clone(),
            entries: group.entries.iter().map(EntryRecord::from).collect(),
        }
    }
}

impl From<&Entry> for EntryRecord {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id.to_string(),
            name: entry.name.clone(),
            target: entry.target.to_string(),
            args: entry.args.clone(),
            icon: entry.icon.as_ref().map(|i| i.as_str().to_string()),
            added_at: entry.added_at,
        }
    }
}

impl CatalogRecord {
    /// Converts the record into a repaired domain catalog.
    ///
    /// Blank group names become "Group" and blank entry names fall back to the
    /// name derived from the target. Structural repair is delegated to
    /// [`Catalog::from_parts`].
    #[must_use]
    pub fn into_catalog(self) -> Catalog {
        let groups = self.groups.into_iter().map(GroupRecord::into_group).collect();
        Catalog::from_parts(GroupId::from(self.active_group_id), groups, self.settings)
    }
}

impl GroupRecord {
    fn into_group(self) -> Group {
        let name = self.name.trim();
        Group {
            id: GroupId::from(self.id),
            name: if name.is_empty() { "Group".to_string() } else { name.to_string() },
            entries: self.entries.into_iter().map(EntryRecord::into_entry).collect(),
        }
    }
}

impl EntryRecord {
    fn into_entry(self) -> Entry {
        let target = LaunchTarget::parse(self.target.trim());
        let name = self.name.trim();
        Entry {
            id: EntryId::from(self.id),
            name: if name.is_empty() { target.display_name() } else { name.to_string() },
            target,
            args: crate::domain::entry::normalize_args(self.args.as_deref()),
            icon: self.icon.map(IconData::new),
            added_at: self.added_at,
        }
    }
}

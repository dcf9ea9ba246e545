//! The catalog: groups, entries, settings, and every structural mutation.
//!
//! [`Catalog`] is the root aggregate and the single source of truth for persisted
//! launcher data. All mutation goes through its methods, which uphold the
//! structural invariants:
//!
//! - entry identities are unique across the whole catalog,
//! - every entry belongs to exactly one group,
//! - there is always at least one group,
//! - the active group identity references an existing group.
//!
//! Mutators never trigger side effects themselves. They report what changed
//! (inserted entries, whether a position moved) and the caller decides whether
//! to schedule a save, rebuild the search index, or request icons.
//!
//! # Index Arithmetic
//!
//! Index arguments are clamped to the valid insertion range. Move targets are
//! expressed in *pre-removal* coordinates: moving to index `i` means "land
//! before the item that currently sits at `i`". The move operations correct for
//! the shift caused by detaching the moved item first, so a same-group move can
//! land anywhere, including past its own original slot.

use super::entry::{normalize_args, Entry, EntryId, LaunchTarget};
use super::group::{default_name_index, Group, GroupId, DEFAULT_GROUP_PREFIX};
use super::settings::Settings;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Current persisted schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Names of the groups created for a fresh catalog.
pub const DEFAULT_GROUP_NAMES: [&str; 3] = ["Common", "Work", "Tools"];

/// A target to insert through [`Catalog::add_entries`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub target: String,
    /// Display name; derived from the target when absent or blank.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub args: Option<String>,
}

impl NewEntry {
    /// A bare target with derived name and no arguments.
    #[must_use]
    pub fn target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            name: None,
            args: None,
        }
    }

    #[must_use]
    pub fn named(target: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            name: Some(name.into()),
            args: None,
        }
    }
}

/// Field-level update for [`Catalog::edit_entry`].
///
/// `None` leaves a field untouched. Blank `name`/`target` fall back to the
/// previous value; blank `args` clears the arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryPatch {
    pub name: Option<String>,
    pub target: Option<String>,
    pub args: Option<String>,
}

/// What [`Catalog::edit_entry`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryEdit {
    pub changed: bool,
    /// The target changed and the cached icon was cleared.
    pub target_changed: bool,
}

/// Root aggregate of persisted launcher data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    schema_version: u32,
    active_group_id: GroupId,
    groups: Vec<Group>,
    settings: Settings,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::with_groups(DEFAULT_GROUP_NAMES.iter().map(|n| Group::new(*n)).collect(), Settings::default())
    }
}

impl Catalog {
    /// Builds a catalog from groups and settings, repairing invariants.
    ///
    /// An empty group list is replaced by the default groups; the first group
    /// becomes active.
    #[must_use]
    pub fn with_groups(groups: Vec<Group>, settings: Settings) -> Self {
        let active = groups.first().map_or_else(GroupId::generate, |g| g.id.clone());
        let mut catalog = Self {
            schema_version: SCHEMA_VERSION,
            active_group_id: active,
            groups,
            settings,
        };
        catalog.repair();
        catalog
    }

    /// Builds a catalog from loaded parts, repairing invariants.
    #[must_use]
    pub fn from_parts(active_group_id: GroupId, groups: Vec<Group>, settings: Settings) -> Self {
        let mut catalog = Self {
            schema_version: SCHEMA_VERSION,
            active_group_id,
            groups,
            settings,
        };
        catalog.repair();
        catalog
    }

    /// Restores the structural invariants after loading untrusted data.
    ///
    /// - replaces an empty group list with the default groups,
    /// - drops entries with blank targets,
    /// - regenerates colliding entry and group identities,
    /// - points the active group at the first group if it dangles.
    ///
    /// Returns true if anything was changed.
    pub fn repair(&mut self) -> bool {
        let _span = tracing::debug_span!("catalog_repair", groups = self.groups.len()).entered();
        let mut repaired = false;

        if self.groups.is_empty() {
            tracing::debug!("catalog has no groups, installing defaults");
            self.groups = DEFAULT_GROUP_NAMES.iter().map(|n| Group::new(*n)).collect();
            repaired = true;
        }

        let mut seen_groups = HashSet::new();
        let mut seen_entries = HashSet::new();
        for group in &mut self.groups {
            if !seen_groups.insert(group.id.clone()) {
                group.id = GroupId::generate();
                seen_groups.insert(group.id.clone());
                repaired = true;
            }

            let before = group.entries.len();
            group.entries.retain(|e| !e.target.is_empty());
            if group.entries.len() != before {
                tracing::debug!(dropped = before - group.entries.len(), "dropped entries with blank targets");
                repaired = true;
            }

            for entry in &mut group.entries {
                if !seen_entries.insert(entry.id.clone()) {
                    entry.id = EntryId::generate();
                    seen_entries.insert(entry.id.clone());
                    repaired = true;
                }
            }
        }

        if !self.groups.iter().any(|g| g.id == self.active_group_id) {
            self.active_group_id = self.groups[0].id.clone();
            repaired = true;
        }

        repaired
    }

    #[must_use]
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the settings bag after normalizing it.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings.normalized();
    }

    #[must_use]
    pub const fn active_group_id(&self) -> &GroupId {
        &self.active_group_id
    }

    /// The active group, if its identity resolves.
    #[must_use]
    pub fn active_group(&self) -> Option<&Group> {
        self.group(&self.active_group_id)
    }

    #[must_use]
    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == id)
    }

    #[must_use]
    pub fn group_index(&self, id: &GroupId) -> Option<usize> {
        self.groups.iter().position(|g| &g.id == id)
    }

    /// Locates an entry: `(group index, entry index)`.
    #[must_use]
    pub fn locate(&self, id: &EntryId) -> Option<(usize, usize)> {
        self.groups
            .iter()
            .enumerate()
            .find_map(|(gi, g)| g.position_of(id).map(|ei| (gi, ei)))
    }

    #[must_use]
    pub fn entry(&self, id: &EntryId) -> Option<&Entry> {
        self.locate(id).map(|(gi, ei)| &self.groups[gi].entries[ei])
    }

    /// The group currently owning an entry.
    #[must_use]
    pub fn owner_of(&self, id: &EntryId) -> Option<&GroupId> {
        self.locate(id).map(|(gi, _)| &self.groups[gi].id)
    }

    /// Iterates every entry in group order, then entry order.
    pub fn entries(&self) -> impl Iterator<Item = (&GroupId, &Entry)> {
        self.groups
            .iter()
            .flat_map(|g| g.entries.iter().map(move |e| (&g.id, e)))
    }

    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    /// Switches the active group. Returns false if the group is unknown or
    /// already active.
    pub fn set_active_group(&mut self, id: &GroupId) -> bool {
        if &self.active_group_id == id || self.group(id).is_none() {
            return false;
        }
        self.active_group_id = id.clone();
        true
    }

    /// Inserts new entries into a group.
    ///
    /// Targets already present in the group (exact string equality) and
    /// repeated targets within `targets` are skipped. The survivors receive
    /// fresh identities and the current timestamp and are inserted at `index`
    /// (default: the front), keeping their relative order.
    ///
    /// Returns exactly the inserted entries; empty if the group is unknown or
    /// every target was a duplicate.
    ///
    /// # Examples
    ///
    /// ```
    /// use quickdock::domain::{Catalog, NewEntry};
    ///
    /// let mut catalog = Catalog::default();
    /// let group = catalog.active_group_id().clone();
    /// let added = catalog.add_entries(&group, vec![NewEntry::target("/bin/a"), NewEntry::target("/bin/a")], None);
    /// assert_eq!(added.len(), 1);
    /// assert!(catalog.add_entries(&group, vec![NewEntry::target("/bin/a")], None).is_empty());
    /// ```
    pub fn add_entries(&mut self, group_id: &GroupId, targets: Vec<NewEntry>, index: Option<usize>) -> Vec<Entry> {
        let _span = tracing::debug_span!("add_entries",
            group = %group_id,
            requested = targets.len(),
            index = ?index
        ).entered();

        let Some(gi) = self.group_index(group_id) else {
            tracing::debug!("target group not found, nothing inserted");
            return Vec::new();
        };
        let group = &mut self.groups[gi];

        let mut batch_targets = HashSet::new();
        let fresh: Vec<Entry> = targets
            .into_iter()
            .filter_map(|new| {
                let raw = new.target.trim().to_string();
                if raw.is_empty() || group.contains_target(&raw) || !batch_targets.insert(raw.clone()) {
                    return None;
                }
                Some(Entry::new(LaunchTarget::parse(raw), new.name.as_deref(), new.args.as_deref()))
            })
            .collect();

        if fresh.is_empty() {
            tracing::debug!("all targets were duplicates");
            return fresh;
        }

        let at = index.unwrap_or(0).min(group.entries.len());
        group.entries.splice(at..at, fresh.iter().cloned());

        tracing::debug!(inserted = fresh.len(), at = at, "entries inserted");
        fresh
    }

    /// Removes an entry from whichever group owns it.
    pub fn remove_entry(&mut self, id: &EntryId) -> Option<Entry> {
        let (gi, ei) = self.locate(id)?;
        tracing::debug!(entry = %id, "entry removed");
        Some(self.groups[gi].entries.remove(ei))
    }

    /// Removes several entries, spanning any number of groups.
    ///
    /// Returns how many entries were actually removed.
    pub fn remove_entries(&mut self, ids: &[EntryId]) -> usize {
        let wanted: HashSet<&EntryId> = ids.iter().collect();
        let mut removed = 0;
        for group in &mut self.groups {
            let before = group.entries.len();
            group.entries.retain(|e| !wanted.contains(&e.id));
            removed += before - group.entries.len();
        }
        tracing::debug!(requested = ids.len(), removed = removed, "entries removed");
        removed
    }

    /// Moves an entry into `target_group` at `target_index` (pre-removal
    /// coordinates, clamped).
    ///
    /// Ownership moves atomically: the entry is detached only once the target
    /// group is known to exist. Returns true if the entry's position changed.
    pub fn move_entry(&mut self, id: &EntryId, target_group: &GroupId, target_index: usize) -> bool {
        let _span = tracing::debug_span!("move_entry",
            entry = %id,
            target_group = %target_group,
            target_index = target_index
        ).entered();

        let Some(to_gi) = self.group_index(target_group) else {
            tracing::debug!("target group not found");
            return false;
        };
        let Some((from_gi, from_ei)) = self.locate(id) else {
            tracing::debug!("entry not found");
            return false;
        };

        let mut index = target_index.min(self.groups[to_gi].entries.len());
        if from_gi == to_gi {
            if index > from_ei {
                index -= 1;
            }
            if index == from_ei {
                tracing::debug!("entry already in place");
                return false;
            }
        }

        let entry = self.groups[from_gi].entries.remove(from_ei);
        self.groups[to_gi].entries.insert(index, entry);
        tracing::debug!(final_index = index, "entry moved");
        true
    }

    /// Moves several entries to the end of a group, preserving their catalog
    /// order. Returns how many entries changed position.
    pub fn move_entries_to_group(&mut self, ids: &[EntryId], target_group: &GroupId) -> usize {
        if self.group(target_group).is_none() {
            return 0;
        }
        let wanted: HashSet<&EntryId> = ids.iter().collect();
        let ordered: Vec<EntryId> = self
            .entries()
            .filter(|(_, e)| wanted.contains(&e.id))
            .map(|(_, e)| e.id.clone())
            .collect();

        let mut moved = 0;
        for id in ordered {
            if self.owner_of(&id) == Some(target_group) {
                continue;
            }
            let end = self.group(target_group).map_or(0, |g| g.entries.len());
            if self.move_entry(&id, target_group, end) {
                moved += 1;
            }
        }
        moved
    }

    /// Adds a group and makes it active.
    ///
    /// A blank or absent name becomes `Group-N`, where `N` is one past the
    /// highest existing `Group-N` suffix.
    pub fn add_group(&mut self, name: Option<&str>) -> GroupId {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| self.next_default_group_name(), str::to_string);

        let group = Group::new(name);
        let id = group.id.clone();
        tracing::debug!(group = %id, name = %group.name, "group added");
        self.groups.push(group);
        self.active_group_id = id.clone();
        id
    }

    fn next_default_group_name(&self) -> String {
        let next = self
            .groups
            .iter()
            .filter_map(|g| default_name_index(&g.name))
            .max()
            .map_or(1, |n| n.saturating_add(1));
        format!("{DEFAULT_GROUP_PREFIX}{next}")
    }

    /// Removes a group with all its entries.
    ///
    /// Refuses (returns `None`) when it is the last remaining group. If the
    /// removed group was active, the first remaining group becomes active.
    pub fn remove_group(&mut self, id: &GroupId) -> Option<Group> {
        if self.groups.len() <= 1 {
            tracing::debug!(group = %id, "refusing to remove the last group");
            return None;
        }
        let index = self.group_index(id)?;
        let removed = self.groups.remove(index);
        if &self.active_group_id == id {
            self.active_group_id = self.groups[0].id.clone();
        }
        tracing::debug!(group = %id, entries = removed.entries.len(), "group removed");
        Some(removed)
    }

    /// Reorders the group list.
    ///
    /// `target_index` is clamped to `[0, len]` in pre-removal coordinates.
    /// Returns true only if the group's position actually changed.
    pub fn move_group(&mut self, id: &GroupId, target_index: usize) -> bool {
        let Some(from) = self.group_index(id) else {
            return false;
        };
        let mut index = target_index.min(self.groups.len());
        if index > from {
            index -= 1;
        }
        if index == from {
            return false;
        }
        let group = self.groups.remove(from);
        self.groups.insert(index, group);
        tracing::debug!(group = %id, from = from, to = index, "group moved");
        true
    }

    /// Renames a group. Blank names keep the previous name.
    pub fn rename_group(&mut self, id: &GroupId, name: &str) -> bool {
        let Some(gi) = self.group_index(id) else {
            return false;
        };
        let trimmed = name.trim();
        if trimmed.is_empty() || self.groups[gi].name == trimmed {
            return false;
        }
        self.groups[gi].name = trimmed.to_string();
        true
    }

    /// Applies a field-level update to an entry.
    ///
    /// Changing the target clears the cached icon so it is resolved again.
    pub fn edit_entry(&mut self, id: &EntryId, patch: EntryPatch) -> EntryEdit {
        let Some((gi, ei)) = self.locate(id) else {
            return EntryEdit::default();
        };
        let entry = &mut self.groups[gi].entries[ei];
        let mut edit = EntryEdit::default();

        if let Some(name) = patch.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            if entry.name != name {
                entry.name = name.to_string();
                edit.changed = true;
            }
        }

        if let Some(target) = patch.target.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            if entry.target.as_str() != target {
                entry.target = LaunchTarget::parse(target);
                entry.icon = None;
                edit.changed = true;
                edit.target_changed = true;
            }
        }

        if let Some(args) = patch.args.as_deref() {
            let args = normalize_args(Some(args));
            if entry.args != args {
                entry.args = args;
                edit.changed = true;
            }
        }

        edit
    }

    /// Stores a resolved icon on an entry.
    ///
    /// Blank payloads are ignored. Returns true if the entry exists and the
    /// icon was stored.
    pub fn set_icon(&mut self, id: &EntryId, icon: super::entry::IconData) -> bool {
        if icon.is_empty() {
            return false;
        }
        let Some((gi, ei)) = self.locate(id) else {
            return false;
        };
        self.groups[gi].entries[ei].icon = Some(icon);
        true
    }

    /// Test-only escape hatch producing a catalog whose active group dangles.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_dangling_active_group(mut self) -> Self {
        self.active_group_id = GroupId::from("missing-group");
        self
    }
}

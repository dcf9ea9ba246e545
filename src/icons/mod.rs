//! On-demand icon resolution bookkeeping.
//!
//! The cache decides *when* an icon should be fetched and *who* receives the
//! result; the fetch itself is a host call executed by the orchestrator.
//!
//! - Entries are observed once: the first time an entry becomes visible it is
//!   considered for resolution, later sightings are ignored.
//! - Entries that already carry an icon are skipped.
//! - Requests are de-duplicated by [`IconKey`]: while a key is in flight, new
//!   requesters join its waiter list instead of issuing another call.
//! - On completion the key is removed *before* the waiters are handed back, so
//!   failure paths cannot leak in-flight entries.

use crate::domain::{Entry, EntryId, LaunchTarget, APPS_FOLDER_PREFIX};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// De-duplication key for one external icon lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconKey {
    /// Normalized target path or OS-package shell reference.
    pub lookup: String,
    /// Requested edge length in pixels.
    pub size: u32,
}

impl IconKey {
    /// Computes the lookup key for a target.
    ///
    /// # Examples
    ///
    /// ```
    /// use quickdock::domain::LaunchTarget;
    /// use quickdock::icons::IconKey;
    ///
    /// let key = IconKey::for_target(&LaunchTarget::parse("uwp:Contoso.App!Main"), 32);
    /// assert_eq!(key.lookup, "shell:AppsFolder\\Contoso.App!Main");
    ///
    /// let key = IconKey::for_target(&LaunchTarget::parse("  /usr/bin/gimp "), 48);
    /// assert_eq!(key.lookup, "/usr/bin/gimp");
    /// ```
    #[must_use]
    pub fn for_target(target: &LaunchTarget, size: u32) -> Self {
        let raw = target.as_str().trim();
        let lookup = match target {
            LaunchTarget::Package(_) => shell_reference(raw),
            LaunchTarget::Path(_) => raw.to_string(),
        };
        Self { lookup, size }
    }
}

fn shell_reference(raw: &str) -> String {
    match raw.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("uwp:") => format!("{APPS_FOLDER_PREFIX}{}", &raw[4..]),
        _ => raw.to_string(),
    }
}

/// Outcome of asking the cache for an entry's icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconRequest {
    /// A new external lookup must be issued for this key.
    Issue(IconKey),
    /// An identical lookup is already running; the entry will share it.
    Joined,
    /// Already has an icon, already observed, or nothing to resolve.
    Skipped,
}

#[derive(Debug, Clone, Default)]
pub struct IconCache {
    size: u32,
    observed: HashSet<EntryId>,
    in_flight: HashMap<IconKey, Vec<EntryId>>,
}

impl IconCache {
    #[must_use]
    pub fn new(size: u32) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Handles an entry becoming visible.
    pub fn entry_visible(&mut self, entry: &Entry) -> IconRequest {
        if entry.icon.is_some() || entry.target.is_empty() {
            return IconRequest::Skipped;
        }
        if !self.observed.insert(entry.id.clone()) {
            return IconRequest::Skipped;
        }

        let key = IconKey::for_target(&entry.target, self.size);
        if let Some(waiters) = self.in_flight.get_mut(&key) {
            tracing::debug!(entry = %entry.id, lookup = %key.lookup, "joining in-flight icon lookup");
            waiters.push(entry.id.clone());
            return IconRequest::Joined;
        }

        tracing::debug!(entry = %entry.id, lookup = %key.lookup, "issuing icon lookup");
        self.in_flight.insert(key.clone(), vec![entry.id.clone()]);
        IconRequest::Issue(key)
    }

    /// Finishes a lookup and returns every entry waiting on it.
    ///
    /// The key is removed first, so a later request for the same key issues a
    /// fresh lookup regardless of how this one ended.
    pub fn complete(&mut self, key: &IconKey) -> Vec<EntryId> {
        self.in_flight.remove(key).unwrap_or_default()
    }

    /// Makes an entry eligible again (its target changed or its icon was
    /// cleared).
    ///
    /// The entry also leaves any lookup it is waiting on, so a result for a
    /// stale key is never assigned to it.
    pub fn forget(&mut self, id: &EntryId) {
        self.observed.remove(id);
        for waiters in self.in_flight.values_mut() {
            waiters.retain(|w| w != id);
        }
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Drops all bookkeeping.
    pub fn clear(&mut self) {
        self.observed.clear();
        self.in_flight.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IconData;

    fn entry(target: &str) -> Entry {
        Entry::new(LaunchTarget::parse(target), None, None)
    }

    #[test]
    fn same_key_is_requested_once() {
        let mut cache = IconCache::new(32);
        let a = entry("/bin/app");
        let b = entry("/bin/app");
        let IconRequest::Issue(key) = cache.entry_visible(&a) else {
            panic!("first request should issue");
        };
        assert_eq!(cache.entry_visible(&b), IconRequest::Joined);
        assert_eq!(cache.in_flight(), 1);
        assert_eq!(cache.complete(&key), vec![a.id.clone(), b.id.clone()]);
        assert_eq!(cache.in_flight(), 0);
        assert!(cache.complete(&key).is_empty());
    }

    #[test]
    fn observation_happens_once_until_forgotten() {
        let mut cache = IconCache::new(32);
        let a = entry("/bin/app");
        let IconRequest::Issue(key) = cache.entry_visible(&a) else {
            panic!("first request should issue");
        };
        cache.complete(&key);
        assert_eq!(cache.entry_visible(&a), IconRequest::Skipped);
        cache.forget(&a.id);
        assert!(matches!(cache.entry_visible(&a), IconRequest::Issue(_)));
    }

    #[test]
    fn forgotten_entries_leave_pending_lookups() {
        let mut cache = IconCache::new(32);
        let mut a = entry("/apps/old");
        let IconRequest::Issue(old) = cache.entry_visible(&a) else {
            panic!("first request should issue");
        };

        a.target = LaunchTarget::parse("/apps/new");
        cache.forget(&a.id);
        let IconRequest::Issue(new) = cache.entry_visible(&a) else {
            panic!("a retargeted entry should issue a fresh lookup");
        };

        assert_eq!(new.lookup, "/apps/new");
        assert!(cache.complete(&old).is_empty());
        assert_eq!(cache.complete(&new), vec![a.id.clone()]);
    }

    #[test]
    fn entries_with_icons_are_skipped() {
        let mut cache = IconCache::new(32);
        let mut a = entry("/bin/app");
        a.icon = Some(IconData::new("data:image/png;base64,AAAA"));
        assert_eq!(cache.entry_visible(&a), IconRequest::Skipped);
        assert_eq!(cache.in_flight(), 0);
    }

    #[test]
    fn shell_references_pass_through() {
        let key = IconKey::for_target(&LaunchTarget::parse("shell:Downloads"), 16);
        assert_eq!(key.lookup, "shell:Downloads");
        let key = IconKey::for_target(&LaunchTarget::parse("UWP:Foo"), 16);
        assert_eq!(key.lookup, "shell:AppsFolder\\Foo");
    }
}

//! Inverted token index over entry names.
//!
//! The index is a pure projection of the [`Catalog`]: it carries no state of
//! its own beyond what [`SearchIndex::rebuild`] derives, so the only sync rule
//! is "rebuild after a structural change".
//!
//! Tokens are the lower-cased name split on whitespace and punctuation, plus the
//! full lower-cased name. A query matches every token that *contains* it, which
//! keeps per-keystroke work proportional to the token vocabulary rather than to
//! `entries × query`.

use crate::domain::{Catalog, EntryId, GroupId};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Where an indexed entry lives, for ordering and projection.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Located {
    group: GroupId,
    /// Position in catalog order (groups, then entries).
    ordinal: usize,
}

/// Token → entry identity index with a parallel identity lookup table.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    tokens: BTreeMap<String, HashSet<EntryId>>,
    lookup: HashMap<EntryId, Located>,
}

impl SearchIndex {
    /// Builds an index for the given catalog.
    #[must_use]
    pub fn build(catalog: &Catalog) -> Self {
        let mut index = Self::default();
        index.rebuild(catalog);
        index
    }

    /// Discards the index and recomputes it from the catalog.
    pub fn rebuild(&mut self, catalog: &Catalog) {
        let _span = tracing::debug_span!("search_rebuild", entries = catalog.entry_count()).entered();

        self.tokens.clear();
        self.lookup.clear();

        for (ordinal, (group, entry)) in catalog.entries().enumerate() {
            for token in tokenize(&entry.name) {
                self.tokens.entry(token).or_default().insert(entry.id.clone());
            }
            self.lookup.insert(entry.id.clone(), Located {
                group: group.clone(),
                ordinal,
            });
        }

        tracing::debug!(tokens = self.tokens.len(), "search index rebuilt");
    }

    /// Number of distinct indexed tokens.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Returns the entries whose tokens contain `query`, in catalog order.
    ///
    /// Returns `None` for a blank query: callers fall back to the active group
    /// in stored order instead of consulting the index.
    ///
    /// # Examples
    ///
    /// ```
    /// use quickdock::domain::{Catalog, NewEntry};
    /// use quickdock::search::SearchIndex;
    ///
    /// let mut catalog = Catalog::default();
    /// let group = catalog.active_group_id().clone();
    /// catalog.add_entries(&group, vec![NewEntry::named("/opt/vsc", "Visual Studio Code")], None);
    ///
    /// let index = SearchIndex::build(&catalog);
    /// assert_eq!(index.query("stud").map(|hits| hits.len()), Some(1));
    /// assert_eq!(index.query("o c").map(|hits| hits.len()), Some(1));
    /// assert!(index.query("   ").is_none());
    /// ```
    #[must_use]
    pub fn query(&self, query: &str) -> Option<Vec<EntryId>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        let hits: HashSet<&EntryId> = self
            .tokens
            .iter()
            .filter(|(token, _)| token.contains(&needle))
            .flat_map(|(_, ids)| ids.iter())
            .collect();

        let mut ordered: Vec<(&EntryId, usize)> = hits
            .into_iter()
            .filter_map(|id| self.lookup.get(id).map(|loc| (id, loc.ordinal)))
            .collect();
        ordered.sort_by_key(|(_, ordinal)| *ordinal);

        Some(ordered.into_iter().map(|(id, _)| id.clone()).collect())
    }

    /// Group that owned an entry when the index was built.
    #[must_use]
    pub fn group_of(&self, id: &EntryId) -> Option<&GroupId> {
        self.lookup.get(id).map(|loc| &loc.group)
    }
}

/// Splits a name into lower-cased search tokens.
///
/// Always includes the full lower-cased, trimmed name.
#[must_use]
pub fn tokenize(name: &str) -> Vec<String> {
    let lower = name.trim().to_lowercase();
    if lower.is_empty() {
        return Vec::new();
    }
    let mut tokens: Vec<String> = lower
        .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    tokens.push(lower);
    tokens.sort_unstable();
    tokens.dedup();
    tokens
}

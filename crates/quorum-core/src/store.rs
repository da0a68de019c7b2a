//! # Chained Store
//!
//! A primary `ClauseIndex` over base clauses plus one secondary
//! `ClauseIndex` per qualifier key.
//!
//! Each insertion allocates one `EntryId` and writes that same id into the
//! primary index and into the secondary index of every qualifier it carries.
//! Lookups intersect primary hits with qualifier hits by id.
//!
//! Secondary indices are created by `add` only. Looking up an unseen key
//! yields nothing and leaves the store untouched.

use crate::index::ClauseIndex;
use crate::pattern::Pattern;
use crate::{Clause, EntryId, ExtendedClause};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How the qualifiers of a query combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualifierMode {
    /// Union the hits of every qualifier, then intersect with the primary
    /// hits. An entry matching any one qualifier passes.
    #[default]
    Pooled,
    /// Intersect the primary hits with the hits of each qualifier in turn.
    /// An entry must match every qualifier.
    PerKey,
}

#[derive(Debug, Clone, Default)]
pub struct ChainedStore {
    mode: QualifierMode,
    primary: ClauseIndex,
    secondary: BTreeMap<String, ClauseIndex>,
    /// Entry storage: EntryId -> the fact it was allocated for.
    entries: BTreeMap<EntryId, ExtendedClause>,
    next_entry_id: u64,
}

impl ChainedStore {
    /// Create an empty store using pooled qualifier matching.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_mode(mode: QualifierMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn mode(&self) -> QualifierMode {
        self.mode
    }

    /// Store `ec` unless something already matches it.
    ///
    /// Returns the new id, or `None` when the fact was already present.
    pub fn add(&mut self, ec: &ExtendedClause) -> Option<EntryId> {
        if !self.get(ec).is_empty() {
            return None;
        }

        let id = EntryId(self.next_entry_id);
        self.next_entry_id = self.next_entry_id.saturating_add(1);

        self.primary.add(id, &ec.clause);
        for q in &ec.qualifiers {
            self.secondary
                .entry(q.key.clone())
                .or_default()
                .add(id, &q.value);
        }
        self.entries.insert(id, ec.clone());

        Some(id)
    }

    /// Entries matching `ec`: its base clause as a pattern, narrowed by its
    /// qualifiers according to the store's `QualifierMode`.
    #[must_use]
    pub fn get(&self, ec: &ExtendedClause) -> BTreeSet<EntryId> {
        let primary = self.primary.get(&Pattern::from_clause(&ec.clause));
        if ec.qualifiers.is_empty() || primary.is_empty() {
            return primary;
        }

        let hits = |key: &str, value: &Clause| {
            self.secondary
                .get(key)
                .map(|index| index.get(&Pattern::from_clause(value)))
                .unwrap_or_default()
        };

        match self.mode {
            QualifierMode::Pooled => {
                let pooled: BTreeSet<EntryId> = ec
                    .qualifiers
                    .iter()
                    .flat_map(|q| hits(&q.key, &q.value))
                    .collect();
                primary.intersection(&pooled).copied().collect()
            }
            QualifierMode::PerKey => ec.qualifiers.iter().fold(primary, |acc, q| {
                let keyed = hits(&q.key, &q.value);
                acc.intersection(&keyed).copied().collect()
            }),
        }
    }

    /// Entries whose base clause matches `pattern`, qualifiers ignored.
    #[must_use]
    pub fn matching(&self, pattern: &Pattern) -> BTreeSet<EntryId> {
        self.primary.get(pattern)
    }

    /// The fact stored under `id`.
    #[must_use]
    pub fn entry(&self, id: EntryId) -> Option<&ExtendedClause> {
        self.entries.get(&id)
    }

    /// Every stored fact, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &ExtendedClause)> + '_ {
        self.entries.iter().map(|(id, ec)| (*id, ec))
    }

    /// Look up the facts behind a set of ids.
    pub fn resolve<'a>(
        &'a self,
        ids: impl IntoIterator<Item = &'a EntryId> + 'a,
    ) -> impl Iterator<Item = (EntryId, &'a ExtendedClause)> + 'a {
        ids.into_iter()
            .filter_map(move |id| self.entries.get(id).map(|ec| (*id, ec)))
    }

    /// Qualifier keys that have at least one secondary index.
    pub fn qualifier_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.secondary.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ec(s: &str) -> ExtendedClause {
        s.parse().expect("statement")
    }

    #[test]
    fn add_is_idempotent() {
        let mut store = ChainedStore::new();
        assert!(store.add(&ec("alice likes cake")).is_some());
        assert!(store.add(&ec("alice likes cake")).is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&ec("* * *")).len(), 1);
    }

    #[test]
    fn qualified_variants_are_distinct_entries() {
        let mut store = ChainedStore::new();
        let sunny = store.add(&ec("alice likes cake | when: weather is sunny"));
        let party = store.add(&ec("alice likes cake | at: party is on"));

        assert!(sunny.is_some());
        assert!(party.is_some());
        assert_ne!(sunny, party);
        assert_eq!(store.get(&ec("alice likes cake")).len(), 2);
    }

    #[test]
    fn plain_clause_after_qualified_variant_is_a_duplicate() {
        let mut store = ChainedStore::new();
        store.add(&ec("alice likes cake | when: weather is sunny"));
        // An unqualified query matches the qualified entry, so this is a no-op.
        assert!(store.add(&ec("alice likes cake")).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn qualifier_query_selects_its_variant() {
        let mut store = ChainedStore::new();
        let sunny = store
            .add(&ec("alice likes cake | when: weather is sunny"))
            .expect("add");
        store.add(&ec("alice likes cake | at: party is on"));

        let hits = store.get(&ec("alice likes cake | when: weather is *"));
        assert_eq!(hits, BTreeSet::from([sunny]));
    }

    #[test]
    fn unseen_key_yields_nothing_and_allocates_nothing() {
        let mut store = ChainedStore::new();
        store.add(&ec("alice likes cake | when: weather is sunny"));

        assert!(store.get(&ec("alice likes cake | during: * * *")).is_empty());
        let keys: Vec<_> = store.qualifier_keys().collect();
        assert_eq!(keys, vec!["when"]);
    }

    #[test]
    fn pooled_mode_accepts_any_matching_qualifier() {
        let mut store = ChainedStore::with_mode(QualifierMode::Pooled);
        let id = store
            .add(&ec("alice likes cake | when: weather is sunny"))
            .expect("add");

        // "at" never matches, "when" does: pooled union still hits.
        let hits = store.get(&ec("alice likes cake | when: weather is sunny | at: party is on"));
        assert_eq!(hits, BTreeSet::from([id]));
    }

    #[test]
    fn per_key_mode_requires_every_qualifier() {
        let mut store = ChainedStore::with_mode(QualifierMode::PerKey);
        store.add(&ec("alice likes cake | when: weather is sunny"));

        let hits = store.get(&ec("alice likes cake | when: weather is sunny | at: party is on"));
        assert!(hits.is_empty());
    }

    #[test]
    fn resolve_returns_stored_facts() {
        let mut store = ChainedStore::new();
        let id = store.add(&ec("bob isa person")).expect("add");
        let ids = store.get(&ec("bob * *"));
        let facts: Vec<_> = store.resolve(&ids).collect();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].0, id);
        assert_eq!(facts[0].1.clause.node, "person");
    }
}

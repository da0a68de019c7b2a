//! # Clause Index
//!
//! Wildcard-queryable index of entries keyed by three literal fields.
//!
//! Every field has its own `value -> entries` posting map. A query
//! intersects the postings of its literal positions, starting with the
//! smallest; a query with no literals returns every entry.

use crate::pattern::Pattern;
use crate::{Clause, EntryId, Field};
use std::collections::{BTreeMap, BTreeSet};

/// Posting lists for one field.
type Postings = BTreeMap<String, BTreeSet<EntryId>>;

#[derive(Debug, Clone, Default)]
pub struct ClauseIndex {
    /// One posting map per field, in positional order.
    fields: [Postings; 3],
    /// Every entry ever added.
    entries: BTreeSet<EntryId>,
}

impl ClauseIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `entry` under the literal field values of `clause`.
    ///
    /// Several entries may share an identical clause.
    pub fn add(&mut self, entry: EntryId, clause: &Clause) {
        for field in Field::ALL {
            self.fields[field.position()]
                .entry(clause.field(field).to_string())
                .or_default()
                .insert(entry);
        }
        self.entries.insert(entry);
    }

    /// All entries whose clause matches `pattern`.
    ///
    /// Never fails: an empty index or a pattern matching nothing yields an
    /// empty set.
    #[must_use]
    pub fn get(&self, pattern: &Pattern) -> BTreeSet<EntryId> {
        let mut postings = Vec::with_capacity(3);
        for (field, literal) in pattern.literals() {
            match self.fields[field.position()].get(literal) {
                Some(set) => postings.push(set),
                None => return BTreeSet::new(),
            }
        }

        postings.sort_by_key(|set| set.len());
        let Some((smallest, rest)) = postings.split_first() else {
            return self.entries.clone();
        };

        smallest
            .iter()
            .filter(|entry| rest.iter().all(|set| set.contains(*entry)))
            .copied()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct values seen in `field`, in sorted order.
    pub fn values(&self, field: Field) -> impl Iterator<Item = &str> + '_ {
        self.fields[field.position()].keys().map(String::as_str)
    }
}

// =============================================================================
// TESTS
// =============================================================================

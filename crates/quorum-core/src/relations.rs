//! # Relation Table
//!
//! Registry of relation labels seen in asserted clauses. Append-only.

use std::collections::BTreeSet;

/// Records relation labels. There is no removal.
pub trait RelationRegistry {
    fn add(&mut self, relation: &str);
}

/// Default `RelationRegistry`: a sorted set of labels.
#[derive(Debug, Clone, Default)]
pub struct RelationTable {
    relations: BTreeSet<String>,
}

impl RelationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, relation: &str) -> bool {
        self.relations.contains(relation)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.relations.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl RelationRegistry for RelationTable {
    fn add(&mut self, relation: &str) {
        if !self.relations.contains(relation) {
            self.relations.insert(relation.to_string());
        }
    }
}

//! # Classifier Module
//!
//! Frequency scoring of `(relation, node)` features for a class.
//!
//! A feature scores by how often it occurs among the class members minus
//! how often it occurs on entities outside the class. Features with a
//! score of zero or less are dropped.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

/// A `(relation, node)` pair attached to an entity.
pub type Feature = (String, String);

/// The outcome of `KnowledgeMap::build_classifier`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// The class name that was classified.
    pub class: String,
    /// Entities that satisfied the class query.
    pub members: BTreeSet<String>,
    /// Occurrences of each feature across the members.
    pub matches: BTreeMap<Feature, u64>,
    /// Clauses carrying each feature whose name is not a member.
    pub non_exclusive: BTreeMap<Feature, u64>,
    /// `matches - non_exclusive`, positive scores only.
    pub scores: BTreeMap<Feature, u64>,
}

impl Classification {
    /// Combine the two counters into the final scores.
    #[must_use]
    pub fn new(
        class: impl Into<String>,
        members: BTreeSet<String>,
        matches: BTreeMap<Feature, u64>,
        non_exclusive: BTreeMap<Feature, u64>,
    ) -> Self {
        let scores = matches
            .iter()
            .filter_map(|(feature, &count)| {
                let penalty = non_exclusive.get(feature).copied().unwrap_or(0);
                let score = count.saturating_sub(penalty);
                (score > 0).then(|| (feature.clone(), score))
            })
            .collect();

        Self {
            class: class.into(),
            members,
            matches,
            non_exclusive,
            scores,
        }
    }

    #[must_use]
    pub fn score(&self, relation: &str, node: &str) -> Option<u64> {
        self.scores
            .get(&(relation.to_string(), node.to_string()))
            .copied()
    }

    /// Scores, highest first. Ties are ordered by feature.
    #[must_use]
    pub fn ranked(&self) -> Vec<(&Feature, u64)> {
        let mut ranked: Vec<_> = self.scores.iter().map(|(f, &s)| (f, s)).collect();
        ranked.sort_by_key(|&(feature, score)| (Reverse(score), feature));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(r: &str, n: &str) -> Feature {
        (r.to_string(), n.to_string())
    }

    #[test]
    fn scores_subtract_and_drop_non_positive() {
        let matches = BTreeMap::from([
            (feature("likes", "cake"), 2),
            (feature("isa", "person"), 2),
            (feature("owns", "car"), 1),
        ]);
        let non_exclusive = BTreeMap::from([
            (feature("likes", "cake"), 1),
            (feature("owns", "car"), 3),
        ]);

        let c = Classification::new("person", BTreeSet::new(), matches, non_exclusive);
        assert_eq!(c.score("likes", "cake"), Some(1));
        assert_eq!(c.score("isa", "person"), Some(2));
        assert_eq!(c.score("owns", "car"), None);
    }

    #[test]
    fn ranked_breaks_ties_by_feature() {
        let matches = BTreeMap::from([
            (feature("likes", "tea"), 1),
            (feature("likes", "cake"), 1),
            (feature("isa", "person"), 2),
        ]);
        let c = Classification::new("person", BTreeSet::new(), matches, BTreeMap::new());
        let order: Vec<_> = c.ranked().into_iter().map(|(f, _)| f.1.as_str()).collect();
        assert_eq!(order, vec!["person", "cake", "tea"]);
    }
}

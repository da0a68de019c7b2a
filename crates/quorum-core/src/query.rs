//! # Query Module
//!
//! Structured read operations over a `KnowledgeMap`.
//!
//! - One closed enumeration of everything a caller can ask
//! - One entry point, `KnowledgeMap::execute`
//! - Results carry resolved facts rather than bare entry ids

use crate::classifier::Classification;
use crate::inference::InferencePatterns;
use crate::knowledge_map::{KnowledgeMap, ReferenceLayers, SharedProperties};
use crate::pattern::PatternTemplate;
use crate::projection::{Projection, Reference};
use crate::relations::RelationRegistry;
use crate::symbols::SymbolExpander;
use crate::{EntryId, ExtendedClause, QuorumError};
use std::collections::BTreeSet;

/// Query operation types supported by the knowledge map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Facts matching a pattern and its qualifiers.
    Get(ExtendedClause),

    /// Projected facts exactly `depth` hops from `root`.
    References {
        root: String,
        depth: usize,
        projection: Projection,
    },

    /// One unprojected hop layer per depth in `0..depth`.
    Layers { root: String, depth: usize },

    /// Feature scores for a class.
    Classify {
        class: String,
        template: PatternTemplate,
    },

    /// What two entities both reach.
    Intersect {
        a: String,
        b: String,
        depth: usize,
        projection: Projection,
    },

    /// `Intersect` under the four standard projections.
    Shared { a: String, b: String, depth: usize },

    /// What one entity has in common with all others.
    Compare {
        a: String,
        others: Vec<String>,
        depth: usize,
    },
}

impl Query {
    /// Get helper.
    pub fn get(text: &str) -> Result<Self, QuorumError> {
        Ok(Self::Get(text.parse()?))
    }

    /// References helper.
    #[must_use]
    pub fn references(root: impl Into<String>, depth: usize, projection: Projection) -> Self {
        Self::References {
            root: root.into(),
            depth,
            projection,
        }
    }

    /// Classify helper using the `* isa {}` membership query.
    #[must_use]
    pub fn classify(class: impl Into<String>) -> Self {
        Self::Classify {
            class: class.into(),
            template: PatternTemplate::class_membership(),
        }
    }

    /// Compare helper.
    #[must_use]
    pub fn compare(a: impl Into<String>, others: Vec<String>, depth: usize) -> Self {
        Self::Compare {
            a: a.into(),
            others,
            depth,
        }
    }
}

/// The answer to a `Query`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Facts(Vec<(EntryId, ExtendedClause)>),
    References(BTreeSet<Reference>),
    Layers(ReferenceLayers),
    Classification(Classification),
    Shared(SharedProperties),
}

impl<S, R, P> KnowledgeMap<S, R, P>
where
    S: SymbolExpander,
    R: RelationRegistry,
    P: InferencePatterns,
{
    /// Run a structured query.
    pub fn execute(&self, query: &Query) -> Result<QueryResult, QuorumError> {
        match query {
            Query::Get(ec) => {
                let ids = self.get(ec);
                Ok(QueryResult::Facts(
                    self.store()
                        .resolve(&ids)
                        .map(|(id, ec)| (id, ec.clone()))
                        .collect(),
                ))
            }
            Query::References {
                root,
                depth,
                projection,
            } => Ok(QueryResult::References(
                self.references(root, *depth, projection)?,
            )),
            Query::Layers { root, depth } => {
                Ok(QueryResult::Layers(self.reference_dict(root, *depth)?))
            }
            Query::Classify { class, template } => Ok(QueryResult::Classification(
                self.build_classifier(class, template)?,
            )),
            Query::Intersect {
                a,
                b,
                depth,
                projection,
            } => Ok(QueryResult::References(
                self.intersect(a, b, *depth, projection)?,
            )),
            Query::Shared { a, b, depth } => Ok(QueryResult::Shared(self.shared(a, b, *depth)?)),
            Query::Compare { a, others, depth } => {
                Ok(QueryResult::Shared(self.compare(a, others.as_slice(), *depth)?))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

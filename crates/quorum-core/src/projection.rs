//! # Projection Module
//!
//! Turning sets of entries into sets of field values.
//!
//! A `Projection` says what to read from each matched clause: the entry
//! itself, one field, or an ordered tuple of fields. Tuples keep per-clause
//! correspondence, so `(relation, node)` yields one pair per clause.

use crate::store::ChainedStore;
use crate::{EntryId, Field, QuorumError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// How matched entries are reported.
///
/// Variant order is significant: tuples sort ahead of single fields, so
/// keyed results list `(relation, node)` first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Return the matched entries unchanged.
    Entries,
    /// An ordered tuple of fields per clause.
    Tuple(Vec<Field>),
    /// One field per clause.
    Single(Field),
}

impl Projection {
    /// `(relation, node)`, the pair used by classifiers and comparisons.
    #[must_use]
    pub fn relation_node() -> Self {
        Self::Tuple(vec![Field::Relation, Field::Node])
    }

    /// Build a tuple projection, rejecting an empty field list.
    pub fn tuple(fields: Vec<Field>) -> Result<Self, QuorumError> {
        if fields.is_empty() {
            return Err(QuorumError::InvalidProjection(
                "a tuple projection needs at least one field".to_string(),
            ));
        }
        Ok(Self::Tuple(fields))
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entries => f.write_str("entries"),
            Self::Single(field) => write!(f, "{}", field),
            Self::Tuple(fields) => {
                let names: Vec<&str> = fields.iter().map(|field| field.as_str()).collect();
                write!(f, "({})", names.join(", "))
            }
        }
    }
}

impl FromStr for Projection {
    type Err = QuorumError;

    /// `entries`, a single field name, or comma-separated field names,
    /// optionally parenthesised: `relation,node` or `(relation, node)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "entries" {
            return Ok(Self::Entries);
        }

        let inner = trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'));
        let is_tuple = inner.is_some() || trimmed.contains(',');
        let body = inner.unwrap_or(trimmed);

        if !is_tuple {
            return Ok(Self::Single(body.parse()?));
        }

        let fields = body
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse::<Field>)
            .collect::<Result<Vec<_>, _>>()?;
        Self::tuple(fields)
    }
}

/// One projected value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Entry(EntryId),
    Value(String),
    Tuple(Vec<String>),
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry(id) => write!(f, "{}", id),
            Self::Value(value) => f.write_str(value),
            Self::Tuple(values) => write!(f, "({})", values.join(", ")),
        }
    }
}

/// Project every entry in `ids` through `projection`.
///
/// Ids that do not resolve to a stored fact are skipped.
#[must_use]
pub fn project(
    store: &ChainedStore,
    ids: &BTreeSet<EntryId>,
    projection: &Projection,
) -> BTreeSet<Reference> {
    match projection {
        Projection::Entries => ids.iter().copied().map(Reference::Entry).collect(),
        Projection::Single(field) => store
            .resolve(ids)
            .map(|(_, ec)| Reference::Value(ec.clause.field(*field).to_string()))
            .collect(),
        Projection::Tuple(fields) => store
            .resolve(ids)
            .map(|(_, ec)| {
                Reference::Tuple(
                    fields
                        .iter()
                        .map(|field| ec.clause.field(*field).to_string())
                        .collect(),
                )
            })
            .collect(),
    }
}

/// Values of a single field, as plain strings.
#[must_use]
pub fn field_values(store: &ChainedStore, ids: &BTreeSet<EntryId>, field: Field) -> BTreeSet<String> {
    store
        .resolve(ids)
        .map(|(_, ec)| ec.clause.field(field).to_string())
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

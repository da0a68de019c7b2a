//! # Core Type Definitions
//!
//! This module contains the data model shared by every layer of Quorum:
//! - Entry identity (`EntryId`)
//! - Positional fields (`Field`)
//! - Facts (`Clause`, `Qualifier`, `ExtendedClause`)
//! - Error types (`QuorumError`)
//!
//! ## Statement Text
//!
//! Extended clauses are written as a base clause followed by zero or more
//! `|`-separated qualifiers, each a key and a three-token pattern:
//!
//! ```text
//! alice likes cake | when: weather is sunny | where: * at home
//! ```
//!
//! ## Determinism Guarantees
//!
//! All types implement `Ord` so they can live in `BTreeMap`/`BTreeSet`.

use crate::primitives::{
    CLAUSE_ARITY, QUALIFIER_KEY_SEPARATOR, QUALIFIER_SEPARATOR, WILDCARD,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// ENTRY IDENTITY
// =============================================================================

/// Identity of one stored extended clause.
///
/// Allocated by the store on insertion. The same `EntryId` is written into
/// the primary index and into every qualifier index, so results coming from
/// different indices can be intersected by identity instead of by value.
/// Two ids are equal iff they were allocated for the same insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// FIELD
// =============================================================================

/// One of the three positional fields of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Relation,
    Node,
}

impl Field {
    /// All fields in positional order.
    pub const ALL: [Field; CLAUSE_ARITY] = [Field::Name, Field::Relation, Field::Node];

    /// Zero-based position of this field in a clause or pattern.
    #[must_use]
    pub const fn position(self) -> usize {
        match self {
            Field::Name => 0,
            Field::Relation => 1,
            Field::Node => 2,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Relation => "relation",
            Field::Node => "node",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = QuorumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "name" => Ok(Field::Name),
            "relation" => Ok(Field::Relation),
            "node" => Ok(Field::Node),
            other => Err(QuorumError::InvalidProjection(format!(
                "unknown field '{}'",
                other
            ))),
        }
    }
}

// =============================================================================
// CLAUSE
// =============================================================================

/// A `name relation node` triple.
///
/// Fields are plain strings. A clause parsed from query text may carry the
/// wildcard token in any position; the ingestor refuses to store one that
/// does.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Clause {
    pub name: String,
    pub relation: String,
    pub node: String,
}

impl Clause {
    /// Create a new clause.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        relation: impl Into<String>,
        node: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            relation: relation.into(),
            node: node.into(),
        }
    }

    /// Read one field by its enumerated name.
    #[must_use]
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Relation => &self.relation,
            Field::Node => &self.node,
        }
    }

    /// The three fields in positional order.
    #[must_use]
    pub fn fields(&self) -> [&str; CLAUSE_ARITY] {
        [&self.name, &self.relation, &self.node]
    }

    /// True if any field is the wildcard token.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.fields().iter().any(|f| *f == WILDCARD)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.relation, self.node)
    }
}

impl FromStr for Clause {
    type Err = QuorumError;

    /// Parse exactly three whitespace-separated tokens.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        match tokens.as_slice() {
            [name, relation, node] => Ok(Self::new(*name, *relation, *node)),
            _ => Err(QuorumError::InvalidPattern(format!(
                "expected {} tokens, found {} in '{}'",
                CLAUSE_ARITY,
                tokens.len(),
                s.trim()
            ))),
        }
    }
}

// =============================================================================
// QUALIFIER
// =============================================================================

/// A contextual condition attached to a clause: `key: v1 v2 v3`.
///
/// The value is indexed under its literal fields on insertion and used as a
/// pattern on lookup.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Qualifier {
    pub key: String,
    pub value: Clause,
}

impl Qualifier {
    #[must_use]
    pub fn new(key: impl Into<String>, value: Clause) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {}", self.key, QUALIFIER_KEY_SEPARATOR, self.value)
    }
}

impl FromStr for Qualifier {
    type Err = QuorumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s.split_once(QUALIFIER_KEY_SEPARATOR).ok_or_else(|| {
            QuorumError::InvalidStatement(format!(
                "qualifier '{}' is missing '{}'",
                s.trim(),
                QUALIFIER_KEY_SEPARATOR
            ))
        })?;

        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(QuorumError::InvalidStatement(format!(
                "qualifier key '{}' must be a single non-empty token",
                key
            )));
        }

        Ok(Self::new(key, value.parse()?))
    }
}

// =============================================================================
// EXTENDED CLAUSE
// =============================================================================

/// A clause plus an ordered list of qualifiers.
///
/// Two extended clauses with the same base clause but different qualifiers
/// are different facts and are stored separately.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExtendedClause {
    pub clause: Clause,
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
}

impl ExtendedClause {
    /// An extended clause with no qualifiers.
    #[must_use]
    pub fn new(clause: Clause) -> Self {
        Self {
            clause,
            qualifiers: Vec::new(),
        }
    }

    /// Append a qualifier, builder style.
    #[must_use]
    pub fn with_qualifier(mut self, key: impl Into<String>, value: Clause) -> Self {
        self.qualifiers.push(Qualifier::new(key, value));
        self
    }

    #[must_use]
    pub fn is_qualified(&self) -> bool {
        !self.qualifiers.is_empty()
    }
}

impl From<Clause> for ExtendedClause {
    fn from(clause: Clause) -> Self {
        Self::new(clause)
    }
}

impl fmt::Display for ExtendedClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.clause)?;
        for q in &self.qualifiers {
            write!(f, " {} {}", QUALIFIER_SEPARATOR, q)?;
        }
        Ok(())
    }
}

impl FromStr for ExtendedClause {
    type Err = QuorumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(QUALIFIER_SEPARATOR);
        // split always yields at least one item
        let base = parts.next().unwrap_or_default();
        let clause: Clause = base.parse()?;

        let qualifiers = parts
            .map(str::parse::<Qualifier>)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { clause, qualifiers })
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Quorum system.
///
/// - No silent failures
/// - No internal retries
/// - The core never logs; callers decide what to do with an error
#[derive(Debug, Error)]
pub enum QuorumError {
    /// A query pattern did not have exactly three tokens.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Statement text could not be parsed into an extended clause.
    #[error("Invalid statement: {0}")]
    InvalidStatement(String),

    /// A clause was rejected before reaching the store.
    #[error("Invalid clause: {0}")]
    InvalidClause(String),

    /// A projection named an unknown field or no field at all.
    #[error("Invalid projection: {0}")]
    InvalidProjection(String),

    /// Rule text could not be parsed.
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// A rule conclusion uses a variable that no premise binds.
    #[error("Unbound variable in rule conclusion: {0}")]
    UnboundVariable(String),

    /// `compare` was called without anything to compare against.
    #[error("Comparison requires at least one other entity")]
    EmptyComparison,

    /// A traversal asked for more hops than the core allows.
    #[error("Traversal depth {depth} exceeds maximum {max}")]
    DepthExceeded { depth: usize, max: usize },

    /// An I/O error occurred (binary only).
    #[error("I/O error: {0}")]
    IoError(String),

    /// A configuration file was unreadable or invalid (binary only).
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// =============================================================================
// TESTS
// =============================================================================

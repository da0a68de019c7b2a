//! # Pattern Module
//!
//! The three-token query grammar.
//!
//! - Exactly three whitespace-separated tokens
//! - `*` matches any value in its position
//! - Any other token must equal the field exactly (case-sensitive)
//! - No partial matching, no escaping of the wildcard
//!
//! `PatternTemplate` adds a `{}` hole that is filled in with an entity name
//! before the pattern is run, e.g. `{} * *` or `* isa {}`.

use crate::primitives::{CLAUSE_ARITY, HOLE, WILDCARD};
use crate::{Clause, Field, QuorumError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// TOKEN
// =============================================================================

/// One position of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Token {
    /// Matches any value.
    Any,
    /// Matches exactly this value.
    Literal(String),
}

impl Token {
    /// Classify a raw token string.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        if raw == WILDCARD {
            Self::Any
        } else {
            Self::Literal(raw.to_string())
        }
    }

    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Literal(lit) => lit == value,
        }
    }

    /// The literal value, or `None` for a wildcard.
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::Literal(lit) => Some(lit),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(WILDCARD),
            Self::Literal(lit) => f.write_str(lit),
        }
    }
}

// =============================================================================
// PATTERN
// =============================================================================

/// A query over the three positional fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pattern {
    tokens: [Token; CLAUSE_ARITY],
}

impl Pattern {
    #[must_use]
    pub fn new(name: Token, relation: Token, node: Token) -> Self {
        Self {
            tokens: [name, relation, node],
        }
    }

    /// `* * *`
    #[must_use]
    pub fn any() -> Self {
        Self::new(Token::Any, Token::Any, Token::Any)
    }

    /// Treat every field of a clause as a pattern token.
    ///
    /// A clause field holding `*` becomes a wildcard.
    #[must_use]
    pub fn from_clause(clause: &Clause) -> Self {
        let [name, relation, node] = clause.fields();
        Self::new(Token::new(name), Token::new(relation), Token::new(node))
    }

    #[must_use]
    pub fn token(&self, field: Field) -> &Token {
        &self.tokens[field.position()]
    }

    #[must_use]
    pub fn matches(&self, clause: &Clause) -> bool {
        Field::ALL
            .into_iter()
            .all(|field| self.token(field).matches(clause.field(field)))
    }

    /// Literal positions only, paired with their field.
    pub fn literals(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL
            .into_iter()
            .filter_map(move |field| self.token(field).literal().map(|lit| (field, lit)))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = &self.tokens;
        write!(f, "{} {} {}", a, b, c)
    }
}

impl FromStr for Pattern {
    type Err = QuorumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let clause: Clause = s.parse()?;
        Ok(Self::from_clause(&clause))
    }
}

// =============================================================================
// PATTERN TEMPLATE
// =============================================================================

/// One position of a template: a hole or a fixed token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Slot {
    Hole,
    Fixed(Token),
}

/// A pattern with holes that are filled with a single value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PatternTemplate {
    slots: [Slot; CLAUSE_ARITY],
}

impl PatternTemplate {
    #[must_use]
    pub fn new(name: Slot, relation: Slot, node: Slot) -> Self {
        Self {
            slots: [name, relation, node],
        }
    }

    /// `* isa {}`: the entities declared to be members of a class.
    #[must_use]
    pub fn class_membership() -> Self {
        Self::new(
            Slot::Fixed(Token::Any),
            Slot::Fixed(Token::new("isa")),
            Slot::Hole,
        )
    }

    /// A template with a hole at `field` and wildcards elsewhere.
    #[must_use]
    pub fn hole_at(field: Field) -> Self {
        let mut slots = [
            Slot::Fixed(Token::Any),
            Slot::Fixed(Token::Any),
            Slot::Fixed(Token::Any),
        ];
        slots[field.position()] = Slot::Hole;
        Self { slots }
    }

    /// Fill every hole with `value`.
    #[must_use]
    pub fn fill(&self, value: &str) -> Pattern {
        let resolve = |slot: &Slot| match slot {
            Slot::Hole => Token::new(value),
            Slot::Fixed(token) => token.clone(),
        };
        let [a, b, c] = &self.slots;
        Pattern::new(resolve(a), resolve(b), resolve(c))
    }

    #[must_use]
    pub fn hole_count(&self) -> usize {
        self.slots.iter().filter(|s| **s == Slot::Hole).count()
    }
}

impl fmt::Display for PatternTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Hole => HOLE.to_string(),
                Slot::Fixed(token) => token.to_string(),
            })
            .collect();
        f.write_str(&parts.join(" "))
    }
}

impl FromStr for PatternTemplate {
    type Err = QuorumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let clause: Clause = s.parse()?;
        let slot = |raw: &str| {
            if raw == HOLE {
                Slot::Hole
            } else {
                Slot::Fixed(Token::new(raw))
            }
        };
        let template = Self {
            slots: [slot(&clause.name), slot(&clause.relation), slot(&clause.node)],
        };

        if template.hole_count() == 0 {
            return Err(QuorumError::InvalidPattern(format!(
                "template '{}' has no '{}' hole",
                s.trim(),
                HOLE
            )));
        }
        Ok(template)
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! # Ingestor Module
//!
//! Validation of extended clauses before they reach the store.
//!
//! - Reject malformed input
//! - No semantic inference or enrichment
//! - Deduplication is the store's job, not the ingestor's

use crate::primitives::{
    MAX_FIELD_LENGTH, MAX_QUALIFIERS, MAX_QUALIFIER_KEY_LENGTH, WILDCARD,
};
use crate::{Clause, ExtendedClause, QuorumError};

/// The Ingestor checks facts before they are asserted.
pub struct Ingestor;

impl Ingestor {
    /// Validate a single clause field.
    pub(crate) fn validate_field(label: &str, value: &str) -> Result<(), QuorumError> {
        if value.is_empty() {
            return Err(QuorumError::InvalidClause(format!("{} is empty", label)));
        }
        if value.len() > MAX_FIELD_LENGTH {
            return Err(QuorumError::InvalidClause(format!(
                "{} exceeds {} bytes",
                label, MAX_FIELD_LENGTH
            )));
        }
        // Fields are single tokens; whitespace would break the pattern grammar.
        if value.contains(char::is_whitespace) {
            return Err(QuorumError::InvalidClause(format!(
                "{} '{}' contains whitespace",
                label, value
            )));
        }
        Ok(())
    }

    fn validate_clause(label: &str, clause: &Clause) -> Result<(), QuorumError> {
        Self::validate_field(&format!("{} name", label), &clause.name)?;
        Self::validate_field(&format!("{} relation", label), &clause.relation)?;
        Self::validate_field(&format!("{} node", label), &clause.node)
    }

    /// Validate an extended clause.
    ///
    /// An extended clause is valid if:
    /// - Every base field is a non-empty single token within length limits
    /// - No base field is the wildcard (a stored `*` could only ever be
    ///   reached by a wildcard query)
    /// - Every qualifier key is non-empty and within length limits
    /// - Every qualifier value is a valid clause (wildcards allowed)
    /// - There are at most `MAX_QUALIFIERS` qualifiers
    pub fn validate(ec: &ExtendedClause) -> Result<(), QuorumError> {
        Self::validate_clause("clause", &ec.clause)?;

        if ec.clause.has_wildcard() {
            return Err(QuorumError::InvalidClause(format!(
                "'{}' contains the wildcard '{}'",
                ec.clause, WILDCARD
            )));
        }

        if ec.qualifiers.len() > MAX_QUALIFIERS {
            return Err(QuorumError::InvalidClause(format!(
                "{} qualifiers exceed maximum {}",
                ec.qualifiers.len(),
                MAX_QUALIFIERS
            )));
        }

        for q in &ec.qualifiers {
            if q.key.is_empty() || q.key.len() > MAX_QUALIFIER_KEY_LENGTH {
                return Err(QuorumError::InvalidClause(format!(
                    "qualifier key '{}' must be 1..={} bytes",
                    q.key, MAX_QUALIFIER_KEY_LENGTH
                )));
            }
            Self::validate_clause(&format!("qualifier '{}'", q.key), &q.value)?;
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

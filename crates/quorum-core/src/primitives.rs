//! # Innate Primitives
//!
//! Hardcoded constants for the Quorum core.
//!
//! These are compiled into the binary and are immutable at runtime.
//! Everything that can be tuned per deployment lives in the app's
//! configuration file instead, bounded by the limits below.

/// The wildcard token. Matches any value in its position.
///
/// Wildcards are whole-field only: `ca*` is a literal, not a prefix match.
pub const WILDCARD: &str = "*";

/// The substitution hole used by pattern templates (`{} * *`).
pub const HOLE: &str = "{}";

/// Every clause and every pattern has exactly this many positional fields.
pub const CLAUSE_ARITY: usize = 3;

/// Separates the base clause from its qualifiers in statement text.
///
/// `alice likes cake | when: weather is sunny`
pub const QUALIFIER_SEPARATOR: char = '|';

/// Separates a qualifier key from its pattern value.
pub const QUALIFIER_KEY_SEPARATOR: char = ':';

/// Separates rule premises from each other.
pub const PREMISE_SEPARATOR: char = ';';

/// Separates rule premises from the conclusion.
pub const RULE_ARROW: &str = "=>";

/// Prefix that marks a rule token as a variable.
pub const VARIABLE_PREFIX: char = '?';

/// The default classifier query. `{}` is replaced by the class name.
pub const DEFAULT_CLASS_QUERY: &str = "* isa {}";

/// Maximum traversal depth for `references`.
///
/// Each hop fans out over every discovered name, so the cost grows
/// exponentially with depth. Requests above this are rejected.
pub const MAX_TRAVERSAL_DEPTH: usize = 16;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for a single clause field.
pub const MAX_FIELD_LENGTH: usize = 256;

/// Maximum length for a qualifier key.
pub const MAX_QUALIFIER_KEY_LENGTH: usize = 64;

/// Maximum number of qualifiers on one extended clause.
pub const MAX_QUALIFIERS: usize = 32;

/// Maximum number of premises in one rule.
///
/// Premises are joined by nested lookup, so this bounds the join depth.
pub const MAX_RULE_PREMISES: usize = 8;

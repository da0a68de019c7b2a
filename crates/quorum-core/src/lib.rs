//! # quorum-core
//!
//! The in-memory fact store and reasoning layer for Quorum - THE LOGIC.
//!
//! Facts are `name relation node` triples, optionally narrowed by
//! qualifiers (`alice likes cake | when: weather is sunny`). On top of the
//! store sit wildcard queries, hop-layer traversal, co-occurrence
//! classifiers, set comparisons and single-pass forward chaining.
//!
//! ## Layers
//!
//! - `index`: one wildcard-queryable triple index
//! - `store`: primary index plus one index per qualifier key
//! - `knowledge_map`: the facade, with traversal and analytics
//! - `symbols`, `relations`, `inference`: the collaborators it drives
//!
//! ## Architectural Constraints
//!
//! - Single-threaded: mutation only through `&mut KnowledgeMap`
//! - Deterministic: `BTreeMap`/`BTreeSet` everywhere, no floats
//! - Reads never mutate, including lookups of unseen qualifier keys
//! - NO async, NO I/O, NO logging (the binary does that)

// =============================================================================
// MODULES
// =============================================================================

pub mod classifier;
pub mod index;
pub mod inference;
pub mod ingestor;
pub mod knowledge_map;
pub mod pattern;
pub mod primitives;
pub mod projection;
pub mod query;
pub mod relations;
pub mod store;
pub mod symbols;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Clause, EntryId, ExtendedClause, Field, Qualifier, QuorumError};

// =============================================================================
// RE-EXPORTS: Store & Knowledge Map
// =============================================================================

pub use classifier::{Classification, Feature};
pub use index::ClauseIndex;
pub use inference::{InferencePatterns, PatternLibrary, Rule};
pub use ingestor::Ingestor;
pub use knowledge_map::{KnowledgeMap, ReferenceLayers, SearchField, SharedProperties};
pub use pattern::{Pattern, PatternTemplate, Slot, Token};
pub use projection::{Projection, Reference};
pub use query::{Query, QueryResult};
pub use relations::{RelationRegistry, RelationTable};
pub use store::{ChainedStore, QualifierMode};
pub use symbols::{SymbolExpander, SymbolTable};

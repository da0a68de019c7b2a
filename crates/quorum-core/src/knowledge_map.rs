//! # Knowledge Map
//!
//! The top-level aggregate: one `ChainedStore` plus the three collaborators
//! (symbols, relations, inference rules), with traversal and analytics on
//! top.
//!
//! A `KnowledgeMap` is an explicit value. Construct it once, pass it by
//! reference; nothing is global.
//!
//! ## Hop Layers
//!
//! `references(root, depth)` returns the facts exactly `depth` name-hops
//! away from `root`, not everything within `depth` hops. Layers at
//! different depths are in general neither subsets nor supersets of each
//! other.

use crate::classifier::{Classification, Feature};
use crate::inference::{InferencePatterns, PatternLibrary, Rule};
use crate::ingestor::Ingestor;
use crate::pattern::{Pattern, PatternTemplate, Token};
use crate::primitives::{MAX_TRAVERSAL_DEPTH, WILDCARD};
use crate::projection::{Projection, Reference, field_values, project};
use crate::relations::{RelationRegistry, RelationTable};
use crate::store::{ChainedStore, QualifierMode};
use crate::symbols::{SymbolExpander, SymbolTable};
use crate::{EntryId, ExtendedClause, Field, QuorumError};
use std::collections::{BTreeMap, BTreeSet};

/// Per-projection result of `shared` and `compare`.
pub type SharedProperties = BTreeMap<Projection, BTreeSet<Reference>>;

/// Per-depth result of `reference_dict`.
pub type ReferenceLayers = BTreeMap<usize, BTreeSet<Reference>>;

// =============================================================================
// SEARCH FIELDS
// =============================================================================

/// How a traversal finds the clauses around an entity.
///
/// `template` locates clauses mentioning the entity; `carries` is the field
/// of those clauses that names the next hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchField {
    pub template: PatternTemplate,
    pub carries: Field,
}

impl SearchField {
    /// The entity appears as the name: `{} * *`, next hop is the name.
    #[must_use]
    pub fn as_name() -> Self {
        Self {
            template: PatternTemplate::hole_at(Field::Name),
            carries: Field::Name,
        }
    }

    /// The entity appears as the node: `* * {}`, next hop is the node.
    #[must_use]
    pub fn as_node() -> Self {
        Self {
            template: PatternTemplate::hole_at(Field::Node),
            carries: Field::Node,
        }
    }

    /// Both default search fields.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![Self::as_name(), Self::as_node()]
    }
}

// =============================================================================
// KNOWLEDGE MAP
// =============================================================================

#[derive(Debug, Default)]
pub struct KnowledgeMap<S = SymbolTable, R = RelationTable, P = PatternLibrary> {
    store: ChainedStore,
    symbols: S,
    relations: R,
    patterns: P,
}

impl KnowledgeMap {
    /// An empty map with the default collaborators and pooled qualifiers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty map with the default collaborators.
    #[must_use]
    pub fn with_mode(mode: QualifierMode) -> Self {
        Self::with_collaborators(
            ChainedStore::with_mode(mode),
            SymbolTable::new(),
            RelationTable::new(),
            PatternLibrary::new(),
        )
    }
}

impl<S, R, P> KnowledgeMap<S, R, P>
where
    S: SymbolExpander,
    R: RelationRegistry,
    P: InferencePatterns,
{
    #[must_use]
    pub fn with_collaborators(store: ChainedStore, symbols: S, relations: R, patterns: P) -> Self {
        Self {
            store,
            symbols,
            relations,
            patterns,
        }
    }

    pub fn store(&self) -> &ChainedStore {
        &self.store
    }

    pub fn symbols(&self) -> &S {
        &self.symbols
    }

    pub fn relations(&self) -> &R {
        &self.relations
    }

    pub fn patterns(&self) -> &P {
        &self.patterns
    }

    // -------------------------------------------------------------------------
    // ASSERTION & LOOKUP
    // -------------------------------------------------------------------------

    /// Assert a fact.
    ///
    /// The name and relation are registered with the collaborators even
    /// when the fact itself is already stored. Returns the new entry, or
    /// `None` for a duplicate.
    pub fn add(&mut self, ec: &ExtendedClause) -> Result<Option<EntryId>, QuorumError> {
        Ingestor::validate(ec)?;
        self.symbols.add(&ec.clause.name, None);
        self.relations.add(&ec.clause.relation);
        Ok(self.store.add(ec))
    }

    /// Parse statement text and assert it.
    pub fn add_statement(&mut self, text: &str) -> Result<Option<EntryId>, QuorumError> {
        self.add(&text.parse()?)
    }

    /// Entries matching an extended clause used as a query.
    #[must_use]
    pub fn get(&self, ec: &ExtendedClause) -> BTreeSet<EntryId> {
        self.store.get(ec)
    }

    /// Parse query text (`* likes cake | when: * * *`) and run it.
    pub fn query(&self, text: &str) -> Result<BTreeSet<EntryId>, QuorumError> {
        Ok(self.get(&text.parse()?))
    }

    /// Register component aliases for `name`.
    pub fn add_components(&mut self, name: &str, components: Vec<String>) {
        self.symbols.add(name, Some(components));
    }

    pub fn get_components(&self, name: &str, filter: &Token) -> Vec<String> {
        self.symbols.get(name, filter)
    }

    /// Project `ids`, or every stored entry when `ids` is `None`.
    #[must_use]
    pub fn attrs(
        &self,
        projection: &Projection,
        ids: Option<&BTreeSet<EntryId>>,
    ) -> BTreeSet<Reference> {
        match ids {
            Some(ids) => project(&self.store, ids, projection),
            None => project(&self.store, &self.store.matching(&Pattern::any()), projection),
        }
    }

    // -------------------------------------------------------------------------
    // INFERENCE
    // -------------------------------------------------------------------------

    pub fn teach(&mut self, rule: Rule) {
        self.patterns.teach(rule);
    }

    /// Run one forward-chaining pass.
    ///
    /// The rules see the store as it was before the pass; facts inferred
    /// here are only visible to the next call. Returns the facts that were
    /// new. An empty result means the rules have nothing left to add.
    ///
    /// Every inferred fact is validated before any is asserted, so a failing
    /// pass leaves the store untouched.
    pub fn infer(&mut self) -> Result<Vec<ExtendedClause>, QuorumError> {
        let inferred: Vec<ExtendedClause> = self.patterns.inferences(&self.store).collect();
        for ec in &inferred {
            Ingestor::validate(ec)?;
        }

        let mut added = Vec::new();
        for ec in inferred {
            if self.add(&ec)?.is_some() {
                added.push(ec);
            }
        }
        Ok(added)
    }

    // -------------------------------------------------------------------------
    // TRAVERSAL
    // -------------------------------------------------------------------------

    /// Projected facts exactly `depth` hops from `root`, using the default
    /// search fields.
    pub fn references(
        &self,
        root: &str,
        depth: usize,
        projection: &Projection,
    ) -> Result<BTreeSet<Reference>, QuorumError> {
        self.references_with(root, depth, projection, &SearchField::defaults())
    }

    /// `references` with caller-supplied search fields.
    pub fn references_with(
        &self,
        root: &str,
        depth: usize,
        projection: &Projection,
        search_fields: &[SearchField],
    ) -> Result<BTreeSet<Reference>, QuorumError> {
        check_depth(depth)?;
        check_entity(root)?;
        let mut memo = BTreeMap::new();
        Ok(self.hop(root, depth, projection, search_fields, &mut memo))
    }

    fn hop(
        &self,
        root: &str,
        depth: usize,
        projection: &Projection,
        search_fields: &[SearchField],
        memo: &mut BTreeMap<(String, usize), BTreeSet<Reference>>,
    ) -> BTreeSet<Reference> {
        if let Some(cached) = memo.get(&(root.to_string(), depth)) {
            return cached.clone();
        }

        let clauses = self.around(root, search_fields);
        let result = if depth == 0 {
            project(&self.store, &clauses, projection)
        } else {
            let names: BTreeSet<String> = search_fields
                .iter()
                .flat_map(|sf| field_values(&self.store, &clauses, sf.carries))
                .collect();

            let mut result = BTreeSet::new();
            for name in &names {
                result.extend(self.hop(name, depth - 1, projection, search_fields, memo));
            }
            result
        };

        memo.insert((root.to_string(), depth), result.clone());
        result
    }

    /// Every entry mentioning `root` under any of the search fields.
    fn around(&self, root: &str, search_fields: &[SearchField]) -> BTreeSet<EntryId> {
        search_fields
            .iter()
            .flat_map(|sf| self.store.matching(&sf.template.fill(root)))
            .collect()
    }

    /// `references(root, k)` for every `k` in `0..depth`, unprojected.
    pub fn reference_dict(&self, root: &str, depth: usize) -> Result<ReferenceLayers, QuorumError> {
        (0..depth)
            .map(|k| {
                self.references(root, k, &Projection::Entries)
                    .map(|layer| (k, layer))
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // CLASSIFICATION
    // -------------------------------------------------------------------------

    /// Score `(relation, node)` features of the members of `class`.
    ///
    /// Members are the names of clauses matching `template` with `class`
    /// in its hole (`* isa {}` by default). Each member contributes its
    /// depth-0 features once; each distinct feature is then penalised once
    /// per clause carrying it on a non-member.
    pub fn build_classifier(
        &self,
        class: &str,
        template: &PatternTemplate,
    ) -> Result<Classification, QuorumError> {
        check_entity(class)?;
        let examples = self.store.matching(&template.fill(class));
        let members = field_values(&self.store, &examples, Field::Name);

        let search_fields = SearchField::defaults();
        let mut matches: BTreeMap<Feature, u64> = BTreeMap::new();
        for member in &members {
            let around = self.around(member, &search_fields);
            let features: BTreeSet<Feature> = self
                .store
                .resolve(&around)
                .map(|(_, ec)| (ec.clause.relation.clone(), ec.clause.node.clone()))
                .collect();
            for feature in features {
                *matches.entry(feature).or_insert(0) += 1;
            }
        }

        let mut non_exclusive: BTreeMap<Feature, u64> = BTreeMap::new();
        for (relation, node) in matches.keys() {
            let pattern = Pattern::new(
                Token::Any,
                Token::Literal(relation.clone()),
                Token::Literal(node.clone()),
            );
            let carriers = self.store.matching(&pattern);
            let outside = self
                .store
                .resolve(&carriers)
                .filter(|(_, ec)| !members.contains(&ec.clause.name))
                .count() as u64;
            if outside > 0 {
                non_exclusive.insert((relation.clone(), node.clone()), outside);
            }
        }

        Ok(Classification::new(class, members, matches, non_exclusive))
    }

    /// `build_classifier` with the default `* isa {}` membership query.
    pub fn classify(&self, class: &str) -> Result<Classification, QuorumError> {
        self.build_classifier(class, &PatternTemplate::class_membership())
    }

    // -------------------------------------------------------------------------
    // COMPARISON
    // -------------------------------------------------------------------------

    /// What `a` and `b` both reach at `depth`.
    pub fn intersect(
        &self,
        a: &str,
        b: &str,
        depth: usize,
        projection: &Projection,
    ) -> Result<BTreeSet<Reference>, QuorumError> {
        let a_refs = self.references(a, depth, projection)?;
        let b_refs = self.references(b, depth, projection)?;
        Ok(a_refs.intersection(&b_refs).cloned().collect())
    }

    /// `intersect` under `(relation, node)`, `name`, `relation` and `node`.
    pub fn shared(&self, a: &str, b: &str, depth: usize) -> Result<SharedProperties, QuorumError> {
        let projections = [
            Projection::relation_node(),
            Projection::Single(Field::Name),
            Projection::Single(Field::Relation),
            Projection::Single(Field::Node),
        ];

        projections
            .into_iter()
            .map(|p| self.intersect(a, b, depth, &p).map(|elements| (p, elements)))
            .collect()
    }

    /// What `a` has in common with every one of `others` at `depth`.
    pub fn compare<T: AsRef<str>>(
        &self,
        a: &str,
        others: &[T],
        depth: usize,
    ) -> Result<SharedProperties, QuorumError> {
        let (first, rest) = others.split_first().ok_or(QuorumError::EmptyComparison)?;

        let mut common = self.shared(a, first.as_ref(), depth)?;
        for other in rest {
            let next = self.shared(a, other.as_ref(), depth)?;
            common = common
                .into_iter()
                .map(|(key, values)| {
                    let kept = match next.get(&key) {
                        Some(other_values) => values.intersection(other_values).cloned().collect(),
                        None => BTreeSet::new(),
                    };
                    (key, kept)
                })
                .collect();
        }
        Ok(common)
    }
}

fn check_depth(depth: usize) -> Result<(), QuorumError> {
    if depth > MAX_TRAVERSAL_DEPTH {
        return Err(QuorumError::DepthExceeded {
            depth,
            max: MAX_TRAVERSAL_DEPTH,
        });
    }
    Ok(())
}

/// A traversal root or class fills a template hole, so it must be a single
/// literal token.
fn check_entity(value: &str) -> Result<(), QuorumError> {
    if value.is_empty() || value == WILDCARD || value.chars().any(char::is_whitespace) {
        return Err(QuorumError::InvalidPattern(format!(
            "'{}' is not a literal entity",
            value
        )));
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

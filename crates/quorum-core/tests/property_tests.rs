//! # Property-Based Tests
//!
//! Determinism and matching invariants of the store and the knowledge map.

use proptest::collection::vec;
use proptest::prelude::*;
use quorum_core::{
    ChainedStore, Clause, ExtendedClause, Field, KnowledgeMap, Pattern, Projection, QualifierMode,
    Token,
};
use std::collections::BTreeSet;

const NAMES: [&str; 4] = ["alice", "bob", "carol", "cake"];
const RELATIONS: [&str; 3] = ["isa", "likes", "owns"];

fn clause_strategy() -> impl Strategy<Value = Clause> {
    (0usize..NAMES.len(), 0usize..RELATIONS.len(), 0usize..NAMES.len())
        .prop_map(|(n, r, o)| Clause::new(NAMES[n], RELATIONS[r], NAMES[o]))
}

fn token_strategy(values: &'static [&'static str]) -> impl Strategy<Value = Token> {
    prop_oneof![
        Just(Token::Any),
        (0usize..values.len()).prop_map(move |i| Token::new(values[i])),
    ]
}

fn pattern_strategy() -> impl Strategy<Value = Pattern> {
    (
        token_strategy(&NAMES),
        token_strategy(&RELATIONS),
        token_strategy(&NAMES),
    )
        .prop_map(|(a, b, c)| Pattern::new(a, b, c))
}

fn store_of(clauses: &[Clause]) -> ChainedStore {
    let mut store = ChainedStore::new();
    for clause in clauses {
        store.add(&ExtendedClause::new(clause.clone()));
    }
    store
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Asserting the same fact twice leaves exactly one entry.
    #[test]
    fn add_is_idempotent(clause in clause_strategy()) {
        let mut store = ChainedStore::new();
        let ec = ExtendedClause::new(clause);

        prop_assert!(store.add(&ec).is_some());
        prop_assert!(store.add(&ec).is_none());
        prop_assert_eq!(store.len(), 1);
    }

    /// `* * *` returns every stored entry.
    #[test]
    fn wildcard_returns_everything(clauses in vec(clause_strategy(), 0..40)) {
        let store = store_of(&clauses);
        let distinct: BTreeSet<&Clause> = clauses.iter().collect();

        let all = store.matching(&Pattern::any());
        prop_assert_eq!(all.len(), store.len());
        prop_assert_eq!(all.len(), distinct.len());
    }

    /// The index returns exactly the entries a linear scan would.
    #[test]
    fn index_agrees_with_scan(
        clauses in vec(clause_strategy(), 0..40),
        pattern in pattern_strategy()
    ) {
        let store = store_of(&clauses);

        let indexed = store.matching(&pattern);
        let scanned: BTreeSet<_> = store
            .entries()
            .filter(|(_, ec)| pattern.matches(&ec.clause))
            .map(|(id, _)| id)
            .collect();

        prop_assert_eq!(indexed, scanned);
    }

    /// Qualifiers only ever narrow a query.
    #[test]
    fn qualifiers_narrow_results(
        clauses in vec(clause_strategy(), 1..20),
        qualifiers in vec(clause_strategy(), 1..20),
        pattern in pattern_strategy()
    ) {
        for mode in [QualifierMode::Pooled, QualifierMode::PerKey] {
            let mut store = ChainedStore::with_mode(mode);
            for (clause, qualifier) in clauses.iter().zip(qualifiers.iter().cycle()) {
                store.add(&ExtendedClause::new(clause.clone()).with_qualifier("when", qualifier.clone()));
            }

            let base = Clause::new(
                pattern.token(Field::Name).to_string(),
                pattern.token(Field::Relation).to_string(),
                pattern.token(Field::Node).to_string(),
            );
            let plain = store.get(&ExtendedClause::new(base.clone()));
            let narrowed = store.get(
                &ExtendedClause::new(base).with_qualifier("when", Clause::new("*", "*", "*")),
            );

            prop_assert!(narrowed.is_subset(&plain));
        }
    }

    /// Traversal from the same root gives the same result on an identically
    /// built map.
    #[test]
    fn traversal_deterministic(
        clauses in vec(clause_strategy(), 1..30),
        root in 0usize..NAMES.len(),
        depth in 0usize..4
    ) {
        let build = || {
            let mut kmap = KnowledgeMap::new();
            for clause in &clauses {
                kmap.add(&ExtendedClause::new(clause.clone())).expect("add");
            }
            kmap
        };
        let first = build();
        let second = build();

        let a = first.references(NAMES[root], depth, &Projection::Entries).expect("refs");
        let b = second.references(NAMES[root], depth, &Projection::Entries).expect("refs");
        prop_assert_eq!(a, b);
    }

    /// `reference_dict(root, d)` has exactly the keys `0..d`.
    #[test]
    fn layer_keys_cover_depth(
        clauses in vec(clause_strategy(), 0..20),
        depth in 0usize..5
    ) {
        let mut kmap = KnowledgeMap::new();
        for clause in &clauses {
            kmap.add(&ExtendedClause::new(clause.clone())).expect("add");
        }

        let layers = kmap.reference_dict("alice", depth).expect("layers");
        let keys: Vec<usize> = layers.keys().copied().collect();
        prop_assert_eq!(keys, (0..depth).collect::<Vec<_>>());
    }

    /// Every classifier score is bounded by the member count.
    #[test]
    fn classifier_scores_bounded(clauses in vec(clause_strategy(), 0..40)) {
        let mut kmap = KnowledgeMap::new();
        for clause in &clauses {
            kmap.add(&ExtendedClause::new(clause.clone())).expect("add");
        }

        let classification = kmap.classify("cake").expect("classify");
        let members = classification.members.len() as u64;
        for score in classification.scores.values() {
            prop_assert!(*score > 0);
            prop_assert!(*score <= members);
        }
    }
}

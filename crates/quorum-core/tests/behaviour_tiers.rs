//! # Behaviour Tiers
//!
//! End-to-end checks of the knowledge map, grouped by layer.
//!
//! | Tier | Area |
//! |------|------|
//! | T1 | Storage: idempotence, wildcard identity |
//! | T2 | Chained qualifiers: exclusion, pooled vs per-key |
//! | T3 | Traversal: depth 0, hop layers, layer map |
//! | T4 | Classification and comparison |
//! | T5 | Inference passes |
//! | T6 | Error surface |

use quorum_core::{
    Clause, EntryId, ExtendedClause, Field, KnowledgeMap, PatternTemplate, Projection,
    QualifierMode, QuorumError, Reference, Rule, SearchField,
};
use std::collections::BTreeSet;

fn kmap_with(mode: QualifierMode, facts: &[&str]) -> KnowledgeMap {
    let mut kmap = KnowledgeMap::with_mode(mode);
    for fact in facts {
        kmap.add_statement(fact).expect("add");
    }
    kmap
}

fn kmap(facts: &[&str]) -> KnowledgeMap {
    kmap_with(QualifierMode::default(), facts)
}

fn values(items: &[&str]) -> BTreeSet<Reference> {
    items.iter().map(|s| Reference::Value(s.to_string())).collect()
}

// =============================================================================
// TIER T1: STORAGE
// =============================================================================

mod t1_storage {
    use super::*;

    /// T1.1: Asserting twice changes nothing observable.
    #[test]
    fn repeated_assertion_is_invisible() {
        let once = kmap(&["alice likes cake", "bob isa person"]);
        let twice = kmap(&[
            "alice likes cake",
            "bob isa person",
            "alice likes cake",
            "bob isa person",
        ]);

        for query in ["* * *", "alice * *", "* isa person"] {
            assert_eq!(
                once.query(query).expect("query"),
                twice.query(query).expect("query")
            );
        }
        assert_eq!(twice.store().len(), 2);
    }

    /// T1.2: `* * *` returns each qualifier-set variant once.
    #[test]
    fn wildcard_returns_every_variant() {
        let kmap = kmap(&[
            "alice likes cake",
            "alice likes cake | when: alice at party",
            "bob likes tea",
        ]);
        // "when" has no index yet, so the qualified variant is new.
        let all = kmap.query("* * *").expect("query");
        assert_eq!(all.len(), kmap.store().len());
        assert_eq!(all, (0..3).map(EntryId).collect::<BTreeSet<_>>());
    }

    /// T1.3: Entry ids are handed out in assertion order.
    #[test]
    fn entry_ids_are_sequential() {
        let mut kmap = KnowledgeMap::new();
        let a = kmap.add_statement("alice likes cake").expect("add");
        let b = kmap.add_statement("bob likes cake").expect("add");
        let dup = kmap.add_statement("alice likes cake").expect("add");

        assert_eq!(a, Some(EntryId(0)));
        assert_eq!(b, Some(EntryId(1)));
        assert_eq!(dup, None);
    }
}

// =============================================================================
// TIER T2: CHAINED QUALIFIERS
// =============================================================================

mod t2_qualifiers {
    use super::*;

    /// T2.1: Disjoint keys keep two variants apart.
    #[test]
    fn disjoint_keys_exclude() {
        for mode in [QualifierMode::Pooled, QualifierMode::PerKey] {
            let kmap = kmap_with(
                mode,
                &[
                    "alice likes cake | when: alice at party",
                    "alice likes cake | where: alice in kitchen",
                ],
            );

            assert_eq!(kmap.query("alice likes cake").expect("q").len(), 2);
            assert_eq!(
                kmap.query("alice likes cake | when: * * *").expect("q"),
                BTreeSet::from([EntryId(0)])
            );
            assert_eq!(
                kmap.query("alice likes cake | where: * * *").expect("q"),
                BTreeSet::from([EntryId(1)])
            );
        }
    }

    /// T2.2: Coinciding keys return both unless the value tells them apart.
    #[test]
    fn coinciding_keys_return_both() {
        for mode in [QualifierMode::Pooled, QualifierMode::PerKey] {
            let kmap = kmap_with(
                mode,
                &[
                    "alice likes cake | when: alice at party",
                    "alice likes cake | when: alice at home",
                ],
            );

            assert_eq!(kmap.query("alice likes cake | when: * * *").expect("q").len(), 2);
            assert_eq!(
                kmap.query("alice likes cake | when: * at party").expect("q"),
                BTreeSet::from([EntryId(0)])
            );
        }
    }

    /// T2.3: Pooled unions qualifier hits, per-key requires every key.
    #[test]
    fn pooled_and_per_key_differ() {
        let facts = [
            "alice likes cake | when: alice at party",
            "alice likes cake | where: alice in kitchen",
        ];
        let query = "alice likes cake | when: * at party | where: * in kitchen";

        let pooled = kmap_with(QualifierMode::Pooled, &facts);
        assert_eq!(pooled.query(query).expect("q").len(), 2);

        let per_key = kmap_with(QualifierMode::PerKey, &facts);
        assert!(per_key.query(query).expect("q").is_empty());
    }

    /// T2.4: An unseen key matches nothing and creates no index.
    #[test]
    fn unseen_key_is_read_only() {
        let kmap = kmap(&["alice likes cake | when: alice at party"]);
        assert!(kmap.query("alice likes cake | why: * * *").expect("q").is_empty());

        let keys: Vec<&str> = kmap.store().qualifier_keys().collect();
        assert_eq!(keys, vec!["when"]);
    }

    /// T2.5: A plain clause after a qualified variant is a duplicate.
    #[test]
    fn plain_after_qualified_is_duplicate() {
        let mut kmap = kmap(&["alice likes cake | when: alice at party"]);
        let plain = ExtendedClause::new(Clause::new("alice", "likes", "cake"));
        assert_eq!(kmap.add(&plain).expect("add"), None);
    }
}

// =============================================================================
// TIER T3: TRAVERSAL
// =============================================================================

mod t3_traversal {
    use super::*;

    /// T3.1: Depth 0 is the names of clauses mentioning the root.
    #[test]
    fn depth_zero_names() {
        let kmap = kmap(&[
            "alice likes cake",
            "bob knows alice",
            "carol likes cake",
            "dave owns car",
        ]);
        let names = kmap
            .references("alice", 0, &Projection::Single(Field::Name))
            .expect("refs");
        assert_eq!(names, values(&["alice", "bob"]));
    }

    /// T3.2: Layers are separate hops, not a growing frontier.
    #[test]
    fn hop_layers_are_not_monotone() {
        let kmap = kmap(&["a next b", "b next c", "c next d"]);
        let outgoing = [SearchField {
            template: PatternTemplate::hole_at(Field::Name),
            carries: Field::Node,
        }];
        let node = Projection::Single(Field::Node);

        let layer = |depth| {
            kmap.references_with("a", depth, &node, &outgoing)
                .expect("refs")
        };
        assert_eq!(layer(0), values(&["b"]));
        assert_eq!(layer(1), values(&["c"]));
        assert_eq!(layer(2), values(&["d"]));
        assert!(layer(3).is_empty());
    }

    /// T3.3: `reference_dict(root, 3)` is three separate calls.
    #[test]
    fn reference_dict_matches_individual_calls() {
        let kmap = kmap(&["alice likes cake", "bob likes cake", "bob owns car"]);
        let layers = kmap.reference_dict("alice", 3).expect("layers");

        assert_eq!(layers.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
        for (depth, layer) in &layers {
            let direct = kmap
                .references("alice", *depth, &Projection::Entries)
                .expect("refs");
            assert_eq!(layer, &direct);
        }
    }

    /// T3.4: Tuple projection keeps fields of the same clause together.
    #[test]
    fn tuple_projection() {
        let kmap = kmap(&["alice likes cake", "alice owns car"]);
        let pairs = kmap
            .references("alice", 0, &Projection::relation_node())
            .expect("refs");
        let expected: BTreeSet<Reference> = [("likes", "cake"), ("owns", "car")]
            .into_iter()
            .map(|(r, n)| Reference::Tuple(vec![r.to_string(), n.to_string()]))
            .collect();
        assert_eq!(pairs, expected);
    }
}

// =============================================================================
// TIER T4: CLASSIFICATION AND COMPARISON
// =============================================================================

mod t4_classification {
    use super::*;

    /// T4.1: An exclusive feature scores its raw frequency.
    #[test]
    fn exclusive_feature_scores_frequency() {
        let kmap = kmap(&[
            "alice isa person",
            "bob isa person",
            "alice likes tea",
            "bob likes tea",
            "rex isa dog",
        ]);
        let c = kmap.classify("person").expect("classify");
        assert_eq!(c.matches.get(&("likes".into(), "tea".into())), Some(&2));
        assert_eq!(c.score("likes", "tea"), Some(2));
    }

    /// T4.2: An outside occurrence reduces but does not erase the score.
    #[test]
    fn alice_bob_carol() {
        let kmap = kmap(&[
            "alice isa person",
            "bob isa person",
            "alice likes cake",
            "bob likes cake",
            "carol likes cake",
        ]);
        let c = kmap.classify("person").expect("classify");

        assert_eq!(c.members.len(), 2);
        assert_eq!(c.score("likes", "cake"), Some(1));
        assert_eq!(c.score("isa", "person"), Some(2));
        assert_eq!(c.ranked()[0].0, &("isa".to_string(), "person".to_string()));
    }

    /// T4.3: `compare` keeps only what every other entity shares.
    #[test]
    fn compare_intersects_pairwise_results() {
        let kmap = kmap(&[
            "alice likes cake",
            "alice likes tea",
            "bob likes cake",
            "bob likes tea",
            "carol likes cake",
        ]);
        let common = kmap.compare("alice", &["bob", "carol"], 0).expect("compare");

        assert_eq!(common.len(), 4);
        assert_eq!(
            common[&Projection::Single(Field::Node)],
            values(&["cake"])
        );
        assert_eq!(
            common[&Projection::Single(Field::Relation)],
            values(&["likes"])
        );
    }
}

// =============================================================================
// TIER T5: INFERENCE
// =============================================================================

mod t5_inference {
    use super::*;

    /// T5.1: Passes chain until nothing new is derived.
    #[test]
    fn passes_reach_fixpoint() {
        let mut kmap = kmap(&["a next b", "b next c", "c next d"]);
        let rule: Rule = "?x next ?y => ?x reaches ?y".parse().expect("rule");
        let transitive: Rule = "?x reaches ?y ; ?y next ?z => ?x reaches ?z"
            .parse()
            .expect("rule");
        kmap.teach(rule);
        kmap.teach(transitive);

        let mut passes = 0;
        while !kmap.infer().expect("infer").is_empty() {
            passes += 1;
            assert!(passes < 10, "inference did not settle");
        }

        let reaches = kmap.query("a reaches *").expect("query");
        assert_eq!(reaches.len(), 3);
    }
}

// =============================================================================
// TIER T6: ERROR SURFACE
// =============================================================================

mod t6_errors {
    use super::*;

    /// T6.1: Wrong token counts are rejected, not guessed at.
    #[test]
    fn malformed_query() {
        let kmap = kmap(&["alice likes cake"]);
        assert!(matches!(
            kmap.query("alice likes"),
            Err(QuorumError::InvalidPattern(_))
        ));
    }

    /// T6.2: Wildcards cannot be asserted.
    #[test]
    fn wildcard_fact_rejected() {
        let mut kmap = KnowledgeMap::new();
        assert!(matches!(
            kmap.add_statement("* likes cake"),
            Err(QuorumError::InvalidClause(_))
        ));
        assert!(kmap.store().is_empty());
    }

    /// T6.3: Traversal depth is capped.
    #[test]
    fn depth_cap() {
        let kmap = kmap(&["alice likes cake"]);
        assert!(matches!(
            kmap.reference_dict("alice", quorum_core::primitives::MAX_TRAVERSAL_DEPTH + 2),
            Err(QuorumError::DepthExceeded { .. })
        ));
    }

    /// T6.4: Comparing against nobody is an error.
    #[test]
    fn empty_comparison() {
        let kmap = kmap(&["alice likes cake"]);
        let none: [&str; 0] = [];
        assert!(matches!(
            kmap.compare("alice", &none, 1),
            Err(QuorumError::EmptyComparison)
        ));
    }

    /// T6.5: A traversal root must be one literal token.
    #[test]
    fn non_literal_root() {
        let kmap = kmap(&["alice likes cake", "bob likes tea"]);
        for root in ["*", "alice bob", ""] {
            assert!(matches!(
                kmap.references(root, 0, &Projection::Entries),
                Err(QuorumError::InvalidPattern(_))
            ));
        }
        assert!(matches!(
            kmap.shared("*", "bob", 0),
            Err(QuorumError::InvalidPattern(_))
        ));
    }

    /// T6.6: A class name must be one literal token.
    #[test]
    fn non_literal_class() {
        let kmap = kmap(&["alice isa person", "bob isa robot"]);
        assert!(matches!(
            kmap.classify("*"),
            Err(QuorumError::InvalidPattern(_))
        ));
        assert!(matches!(
            kmap.classify("big person"),
            Err(QuorumError::InvalidPattern(_))
        ));
    }
}

//! Property tests for yearly registry composition.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;
use rulebook_model::{Registry, RuleDefinition, YearConfig};
use rulebook_registry::{Rulesets, compose, discover};

fn rule(code: &str, message: &str) -> RuleDefinition {
    RuleDefinition::builder(code, "learners")
        .message(message)
        .field("learner_id")
        .check(|_, _| Ok(()))
        .build()
        .expect("rule")
}

fn registry(codes: &BTreeSet<u16>) -> Registry {
    discover(codes.iter().map(|code| rule(&code.to_string(), "base"))).expect("registry")
}

fn code_set() -> impl Strategy<Value = BTreeSet<u16>> {
    prop::collection::btree_set(0u16..40, 0..20)
}

proptest! {
    #[test]
    fn compose_applies_delta(
        base_codes in code_set(),
        added in code_set(),
        delete_picks in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let base = registry(&base_codes);
        let base_list: Vec<u16> = base_codes.iter().copied().collect();
        let deleted: BTreeSet<String> = if base_list.is_empty() {
            BTreeSet::new()
        } else {
            delete_picks
                .iter()
                .map(|pick| pick.get(&base_list).to_string())
                .collect()
        };

        let mut delta = YearConfig::new().delete_all(deleted.iter().cloned());
        for code in &added {
            delta = delta.upsert(rule(&code.to_string(), "delta"));
        }

        let composed = compose(&base, &delta).expect("compose");

        for code in &deleted {
            if delta.upserts(code) {
                prop_assert!(composed.contains(code));
            } else {
                prop_assert!(!composed.contains(code));
            }
        }
        for definition in delta.added_or_modified() {
            let stored = composed.get(definition.code()).expect("added code present");
            prop_assert!(Arc::ptr_eq(stored, definition));
        }
        for code in base.codes() {
            if !deleted.contains(code) && !delta.upserts(code) {
                prop_assert!(Arc::ptr_eq(
                    composed.get(code).expect("kept"),
                    base.get(code).expect("base"),
                ));
            }
        }
        let untouched: BTreeSet<String> = base.codes().map(str::to_string).collect();
        let expected: BTreeSet<String> = base_codes.iter().map(u16::to_string).collect();
        prop_assert_eq!(untouched, expected);
    }

    #[test]
    fn empty_delta_is_identity(base_codes in code_set()) {
        let base = registry(&base_codes);
        prop_assert_eq!(compose(&base, &YearConfig::new()).expect("compose"), base);
    }
}

#[test]
fn resolution_is_deterministic_across_calls() {
    let mut rulesets = Rulesets::new();
    rulesets
        .publish_base("2023", discover([rule("100", "a"), rule("200", "b")]).expect("base"))
        .expect("publish base");
    rulesets
        .publish("2024", "2023", &YearConfig::new().upsert(rule("300", "c")))
        .expect("publish 2024");

    let first = rulesets.resolve("2024").expect("resolve");
    for _ in 0..10 {
        let again = rulesets.resolve("2024").expect("resolve");
        assert_eq!(*again, *first);
        assert_eq!(
            again.codes().collect::<Vec<_>>(),
            first.codes().collect::<Vec<_>>()
        );
    }
}

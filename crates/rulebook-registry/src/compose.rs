//! Yearly registry composition.
//!
//! `compose(base, delta)` copies the base mapping, applies the delta's
//! additions as a right-biased union and then removes the deleted codes that
//! the same delta did not re-add. The base registry is never touched, so one
//! base can feed several derived cycles.

use std::sync::Arc;

use rulebook_model::{Registry, YearConfig};
use tracing::{debug, warn};

use crate::error::{RegistryError, Result};

/// How to treat a deleted code that the base registry does not contain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeltaPolicy {
    /// Fail the composition with [`RegistryError::InvalidDelta`].
    #[default]
    Strict,
    /// Skip the code and log a warning.
    Lenient,
}

/// Compose `base` with `delta` under [`DeltaPolicy::Strict`].
pub fn compose(base: &Registry, delta: &YearConfig) -> Result<Registry> {
    compose_with(base, delta, DeltaPolicy::Strict)
}

pub fn compose_with(base: &Registry, delta: &YearConfig, policy: DeltaPolicy) -> Result<Registry> {
    for code in delta.deleted() {
        if base.contains(code) {
            continue;
        }
        match policy {
            DeltaPolicy::Strict => {
                return Err(RegistryError::InvalidDelta { code: code.clone() });
            }
            DeltaPolicy::Lenient => {
                warn!(code = %code, "delta deletes a rule missing from the base registry");
            }
        }
    }

    let mut builder = base.to_builder();
    for rule in delta.added_or_modified() {
        builder.upsert(Arc::clone(rule));
    }
    for code in delta.deleted() {
        if delta.upserts(code) {
            continue;
        }
        builder.remove(code);
    }
    let registry = builder.build();
    debug!(
        base = base.len(),
        upserted = delta.upserted_count(),
        deleted = delta.deleted().len(),
        result = registry.len(),
        "composed registry"
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use rulebook_model::RuleDefinition;

    use super::*;
    use crate::discovery::discover;

    fn rule(code: &str, message: &str) -> RuleDefinition {
        RuleDefinition::builder(code, "learners")
            .message(message)
            .field("learner_id")
            .check(|_, _| Ok(()))
            .build()
            .unwrap()
    }

    fn base() -> Registry {
        discover([rule("100", "a"), rule("200", "b"), rule("300", "c")]).unwrap()
    }

    #[test]
    fn empty_delta_is_identity() {
        let base = base();
        assert_eq!(compose(&base, &YearConfig::new()).unwrap(), base);
    }

    #[test]
    fn delta_wins_on_conflict() {
        let base = base();
        let replacement = Arc::new(rule("200", "b2"));
        let delta = YearConfig::new().upsert(Arc::clone(&replacement));
        let composed = compose(&base, &delta).unwrap();
        assert!(Arc::ptr_eq(composed.get("200").unwrap(), &replacement));
        assert_eq!(base.get("200").unwrap().message(), "b");
    }

    #[test]
    fn deleted_codes_are_removed() {
        let composed = compose(&base(), &YearConfig::new().delete("100")).unwrap();
        assert_eq!(composed.codes().collect::<Vec<_>>(), vec!["200", "300"]);
    }

    #[test]
    fn deleted_and_readded_code_keeps_new_definition() {
        let delta = YearConfig::new().delete("300").upsert(rule("300", "c2"));
        let composed = compose(&base(), &delta).unwrap();
        assert_eq!(composed.get("300").unwrap().message(), "c2");
    }

    #[test]
    fn deletion_is_only_skipped_for_the_upserted_code() {
        let delta = YearConfig::new().delete("100").upsert(rule("400", "d"));
        assert!(!delta.upserts("100"));
        let composed = compose(&base(), &delta).unwrap();
        assert_eq!(composed.codes().collect::<Vec<_>>(), vec!["200", "300", "400"]);
    }

    #[test]
    fn strict_policy_rejects_unknown_deletion() {
        let error = compose(&base(), &YearConfig::new().delete("999")).unwrap_err();
        assert_eq!(
            error,
            RegistryError::InvalidDelta {
                code: "999".to_string()
            }
        );
    }

    #[test]
    fn lenient_policy_skips_unknown_deletion() {
        let base = base();
        let delta = YearConfig::new().delete("999").delete("100");
        let composed = compose_with(&base, &delta, DeltaPolicy::Lenient).unwrap();
        assert_eq!(composed.codes().collect::<Vec<_>>(), vec!["200", "300"]);
    }
}

use rulebook_model::{ModelError, Registry, RuleDefinition};
use tracing::debug;

use crate::error::{RegistryError, Result};

/// Build the base registry from a registration table.
///
/// The table is an explicit list of definitions, typically returned by a
/// function in the crate that owns the rules. Fails on the first repeated
/// code.
pub fn discover<I>(definitions: I) -> Result<Registry>
where
    I: IntoIterator<Item = RuleDefinition>,
{
    let mut builder = Registry::builder();
    for definition in definitions {
        builder.try_insert(definition).map_err(|error| match error {
            ModelError::DuplicateRuleCode { code } => RegistryError::DuplicateRuleCode { code },
            other => RegistryError::Model(other),
        })?;
    }
    let registry = builder.build();
    debug!(rules = registry.len(), "discovered rule definitions");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(code: &str) -> RuleDefinition {
        RuleDefinition::builder(code, "learners")
            .field("learner_id")
            .check(|_, _| Ok(()))
            .build()
            .unwrap()
    }

    #[test]
    fn discover_builds_sorted_registry() {
        let registry = discover([rule("2020"), rule("1010"), rule("2010")]).unwrap();
        assert_eq!(
            registry.codes().collect::<Vec<_>>(),
            vec!["1010", "2010", "2020"]
        );
    }

    #[test]
    fn discover_rejects_duplicate_codes() {
        let error = discover([rule("2010"), rule("2020"), rule("2010")]).unwrap_err();
        assert_eq!(
            error,
            RegistryError::DuplicateRuleCode {
                code: "2010".to_string()
            }
        );
    }

    #[test]
    fn discover_accepts_empty_table() {
        assert!(discover(Vec::new()).unwrap().is_empty());
    }
}

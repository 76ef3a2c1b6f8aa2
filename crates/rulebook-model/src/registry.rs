//! Immutable code → definition mapping for one cycle.
//!
//! A [`Registry`] is never edited. New registries are produced through a
//! [`RegistryBuilder`], which starts empty or from a copy of an existing
//! registry. Definitions are shared between registries via `Arc`, so deriving
//! a cycle from its predecessor only clones pointers.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::definition::RuleDefinition;
use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    rules: BTreeMap<String, Arc<RuleDefinition>>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Builder seeded with a copy of this registry's entries.
    pub fn to_builder(&self) -> RegistryBuilder {
        RegistryBuilder {
            rules: self.rules.clone(),
        }
    }

    pub fn get(&self, code: &str) -> Option<&Arc<RuleDefinition>> {
        self.rules.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rules.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Codes in ascending order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Definitions in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RuleDefinition>> {
        self.rules.values()
    }
}

/// Mutable staging area for a new [`Registry`].
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    rules: BTreeMap<String, Arc<RuleDefinition>>,
}

impl RegistryBuilder {
    /// Insert a definition whose code must not already be present.
    pub fn try_insert(&mut self, rule: impl Into<Arc<RuleDefinition>>) -> Result<()> {
        let rule = rule.into();
        if self.rules.contains_key(rule.code()) {
            return Err(ModelError::DuplicateRuleCode {
                code: rule.code().to_string(),
            });
        }
        self.rules.insert(rule.code().to_string(), rule);
        Ok(())
    }

    /// Insert or overwrite a definition, returning the one it replaced.
    pub fn upsert(&mut self, rule: impl Into<Arc<RuleDefinition>>) -> Option<Arc<RuleDefinition>> {
        let rule = rule.into();
        self.rules.insert(rule.code().to_string(), rule)
    }

    pub fn remove(&mut self, code: &str) -> Option<Arc<RuleDefinition>> {
        self.rules.remove(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rules.contains_key(code)
    }

    pub fn build(self) -> Registry {
        Registry { rules: self.rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(code: &str, table: &str) -> RuleDefinition {
        RuleDefinition::builder(code, table)
            .field("id")
            .check(|_, _| Ok(()))
            .build()
            .unwrap()
    }

    #[test]
    fn try_insert_rejects_duplicates() {
        let mut builder = Registry::builder();
        builder.try_insert(rule("100", "t")).unwrap();
        let error = builder.try_insert(rule("100", "u")).unwrap_err();
        assert_eq!(
            error,
            ModelError::DuplicateRuleCode {
                code: "100".to_string()
            }
        );
    }

    #[test]
    fn to_builder_leaves_source_untouched() {
        let mut builder = Registry::builder();
        builder.try_insert(rule("100", "t")).unwrap();
        let base = builder.build();

        let mut derived = base.to_builder();
        derived.remove("100");
        derived.upsert(rule("200", "t"));
        let derived = derived.build();

        assert_eq!(base.codes().collect::<Vec<_>>(), vec!["100"]);
        assert_eq!(derived.codes().collect::<Vec<_>>(), vec!["200"]);
    }

    #[test]
    fn codes_are_sorted() {
        let mut builder = Registry::builder();
        builder.try_insert(rule("300", "schools")).unwrap();
        builder.try_insert(rule("100", "learners")).unwrap();
        builder.try_insert(rule("200", "learners")).unwrap();
        let registry = builder.build();
        assert_eq!(registry.codes().collect::<Vec<_>>(), vec!["100", "200", "300"]);
    }
}

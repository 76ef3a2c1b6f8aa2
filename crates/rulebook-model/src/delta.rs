//! Declarative difference between one cycle's registry and the next.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::definition::RuleDefinition;

/// Codes to remove plus definitions to insert or overwrite.
///
/// A code may be both deleted and upserted; composition keeps the delta's
/// definition in that case. Upserted definitions are always keyed by their
/// own code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearConfig {
    deleted: BTreeSet<String>,
    added_or_modified: BTreeMap<String, Arc<RuleDefinition>>,
}

impl YearConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn delete(mut self, code: impl Into<String>) -> Self {
        self.deleted.insert(code.into().trim().to_string());
        self
    }

    #[must_use]
    pub fn delete_all<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for code in codes {
            self.deleted.insert(code.into().trim().to_string());
        }
        self
    }

    /// Add a new rule or replace the base cycle's rule with the same code.
    #[must_use]
    pub fn upsert(mut self, rule: impl Into<Arc<RuleDefinition>>) -> Self {
        let rule = rule.into();
        self.added_or_modified.insert(rule.code().to_string(), rule);
        self
    }

    pub fn deleted(&self) -> &BTreeSet<String> {
        &self.deleted
    }

    /// Upserted definitions in ascending code order.
    pub fn added_or_modified(&self) -> impl Iterator<Item = &Arc<RuleDefinition>> {
        self.added_or_modified.values()
    }

    pub fn upserted_count(&self) -> usize {
        self.added_or_modified.len()
    }

    /// True when this delta carries a definition for `code`.
    pub fn upserts(&self, code: &str) -> bool {
        self.added_or_modified.contains_key(code)
    }

    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.added_or_modified.is_empty()
    }

    /// Codes that are both deleted and re-added by this delta.
    pub fn replaced(&self) -> impl Iterator<Item = &str> {
        self.deleted
            .iter()
            .filter(|code| self.added_or_modified.contains_key(code.as_str()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_deletes_and_upserts() {
        let rule = RuleDefinition::builder("2060", "learners")
            .field("enrol_status")
            .check(|_, _| Ok(()))
            .build()
            .unwrap();
        let delta = YearConfig::new()
            .delete(" 2040 ")
            .delete_all(["2060"])
            .upsert(rule);
        assert!(!delta.is_empty());
        assert!(delta.deleted().contains("2040"));
        assert!(delta.upserts("2060"));
        assert_eq!(delta.replaced().collect::<Vec<_>>(), vec!["2060"]);
        assert!(YearConfig::new().is_empty());
    }
}

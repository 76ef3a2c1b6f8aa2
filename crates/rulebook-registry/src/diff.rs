use rulebook_model::Registry;
use serde::Serialize;

/// Codes that differ between two registries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Present in both with a different descriptor or predicate.
    pub modified: Vec<String>,
}

impl RegistryDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Compare `older` with `newer`, listing codes in ascending order.
pub fn diff(older: &Registry, newer: &Registry) -> RegistryDiff {
    let mut result = RegistryDiff::default();
    for rule in newer.iter() {
        match older.get(rule.code()) {
            None => result.added.push(rule.code().to_string()),
            Some(previous) if previous != rule => result.modified.push(rule.code().to_string()),
            Some(_) => {}
        }
    }
    for code in older.codes() {
        if !newer.contains(code) {
            result.removed.push(code.to_string());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use rulebook_model::{RuleDefinition, YearConfig};

    use super::*;
    use crate::compose::compose;
    use crate::discovery::discover;

    fn rule(code: &str) -> RuleDefinition {
        RuleDefinition::builder(code, "schools")
            .field("phase")
            .check(|_, _| Ok(()))
            .build()
            .unwrap()
    }

    #[test]
    fn diff_classifies_changes() {
        let base = discover([rule("1010"), rule("1020"), rule("1030")]).unwrap();
        let delta = YearConfig::new()
            .delete("1010")
            .upsert(rule("1020"))
            .upsert(rule("1040"));
        let next = compose(&base, &delta).unwrap();
        let changes = diff(&base, &next);
        assert_eq!(changes.added, vec!["1040"]);
        assert_eq!(changes.removed, vec!["1010"]);
        assert_eq!(changes.modified, vec!["1020"]);
    }

    #[test]
    fn identical_registries_have_empty_diff() {
        let base = discover([rule("1010")]).unwrap();
        assert!(diff(&base, &base.to_builder().build()).is_empty());
    }
}

//! Issues and the per-rule recorder predicates write into.

use std::collections::HashSet;
use std::fmt;

use rulebook_common::normalize_table_id;
use serde::{Deserialize, Serialize};

use crate::definition::RuleDefinition;
use crate::error::{RuleError, RuleResult};

/// Zero-based row position within a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowLocator(pub usize);

impl RowLocator {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for RowLocator {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for RowLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One violation of a rule: the table, the implicated fields and the rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub rule_code: String,
    pub table: String,
    pub fields: Vec<String>,
    /// Ordered set; the first occurrence of a row keeps its position.
    pub rows: Vec<RowLocator>,
}

impl Issue {
    pub fn new<I>(
        rule_code: impl Into<String>,
        table: impl Into<String>,
        fields: Vec<String>,
        rows: I,
    ) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RowLocator>,
    {
        let mut seen = HashSet::new();
        let rows = rows
            .into_iter()
            .map(Into::into)
            .filter(|row| seen.insert(*row))
            .collect();
        Self {
            rule_code: rule_code.into(),
            table: table.into(),
            fields,
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Recorder handed to a predicate for the duration of one rule execution.
///
/// Everything recorded here belongs to the rule the recorder was created for;
/// the engine merges it into the run's context only if the predicate
/// completes.
#[derive(Debug, Clone)]
pub struct Findings {
    rule_code: String,
    table: String,
    affected_fields: Vec<String>,
    issues: Vec<Issue>,
}

impl Findings {
    pub fn for_rule(rule: &RuleDefinition) -> Self {
        Self {
            rule_code: rule.code().to_string(),
            table: rule.table().to_string(),
            affected_fields: rule.affected_fields().to_vec(),
            issues: Vec::new(),
        }
    }

    pub fn rule_code(&self) -> &str {
        &self.rule_code
    }

    /// Table the rule reads.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn affected_fields(&self) -> &[String] {
        &self.affected_fields
    }

    /// Record an issue on the rule's table implicating all affected fields.
    pub fn report_rows<I>(&mut self, rows: I)
    where
        I: IntoIterator,
        I::Item: Into<RowLocator>,
    {
        let fields = self.affected_fields.clone();
        let table = self.table.clone();
        self.push(table, fields, rows);
    }

    /// Record an issue on the rule's table implicating `fields`.
    pub fn report<I>(&mut self, fields: &[&str], rows: I) -> RuleResult
    where
        I: IntoIterator,
        I::Item: Into<RowLocator>,
    {
        let table = self.table.clone();
        self.report_in(&table, fields, rows)
    }

    /// Record an issue on another table, for rules that cross-check tables.
    pub fn report_in<I>(&mut self, table: &str, fields: &[&str], rows: I) -> RuleResult
    where
        I: IntoIterator,
        I::Item: Into<RowLocator>,
    {
        let fields = self.resolve_fields(fields)?;
        self.push(normalize_table_id(table), fields, rows);
        Ok(())
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    fn push<I>(&mut self, table: String, fields: Vec<String>, rows: I)
    where
        I: IntoIterator,
        I::Item: Into<RowLocator>,
    {
        let issue = Issue::new(self.rule_code.clone(), table, fields, rows);
        if issue.rows.is_empty() {
            return;
        }
        self.issues.push(issue);
    }

    /// Map requested names onto affected fields, keeping affected-field order.
    fn resolve_fields(&self, requested: &[&str]) -> RuleResult<Vec<String>> {
        for name in requested {
            let known = self
                .affected_fields
                .iter()
                .any(|field| field.eq_ignore_ascii_case(name.trim()));
            if !known {
                return Err(RuleError::UnknownField {
                    rule: self.rule_code.clone(),
                    field: (*name).to_string(),
                });
            }
        }
        if requested.is_empty() {
            return Ok(self.affected_fields.clone());
        }
        Ok(self
            .affected_fields
            .iter()
            .filter(|field| {
                requested
                    .iter()
                    .any(|name| field.eq_ignore_ascii_case(name.trim()))
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn findings() -> Findings {
        let rule = RuleDefinition::builder("2050", "learners")
            .fields(["date_of_birth", "year_group"])
            .check(|_, _| Ok(()))
            .build()
            .unwrap();
        Findings::for_rule(&rule)
    }

    #[test]
    fn issue_rows_are_an_ordered_set() {
        let issue = Issue::new("1", "t", vec!["f".to_string()], [5usize, 2, 5, 9, 2]);
        assert_eq!(issue.rows, vec![RowLocator(5), RowLocator(2), RowLocator(9)]);
    }

    #[test]
    fn report_rows_uses_every_affected_field() {
        let mut findings = findings();
        findings.report_rows([3usize]);
        let issue = &findings.issues()[0];
        assert_eq!(issue.rule_code, "2050");
        assert_eq!(issue.table, "learners");
        assert_eq!(issue.fields, vec!["date_of_birth", "year_group"]);
    }

    #[test]
    fn report_keeps_affected_field_order() {
        let mut findings = findings();
        findings
            .report(&["YEAR_GROUP", "date_of_birth"], [1usize])
            .unwrap();
        assert_eq!(
            findings.issues()[0].fields,
            vec!["date_of_birth", "year_group"]
        );
    }

    #[test]
    fn report_rejects_unknown_field() {
        let mut findings = findings();
        let error = findings.report(&["gender"], [1usize]).unwrap_err();
        assert!(matches!(error, RuleError::UnknownField { ref field, .. } if field == "gender"));
        assert!(findings.is_empty());
    }

    #[test]
    fn empty_row_sets_are_not_recorded() {
        let mut findings = findings();
        findings.report_rows(Vec::<usize>::new());
        findings.report_in("Schools", &["year_group"], Vec::<usize>::new()).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn report_in_normalizes_table() {
        let mut findings = findings();
        findings.report_in(" Schools ", &[], [0usize]).unwrap();
        assert_eq!(findings.issues()[0].table, "schools");
    }
}

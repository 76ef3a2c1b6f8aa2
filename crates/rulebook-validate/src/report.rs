//! Report compilation.
//!
//! A finished [`ValidationContext`] compiles into two flat, order-preserving
//! views:
//!
//! - the full issue listing, one [`IssueRecord`] per implicated row, grouped by
//!   rule code and kept in the order the predicate reported them
//! - the user summary, one [`SummaryRecord`] per rule that produced issues,
//!   failed to execute or was requested without existing in the registry
//!
//! Rules that completed without issues appear in neither view.

use std::collections::BTreeSet;

use rulebook_model::{RowLocator, Severity};
use serde::{Serialize, Serializer};

use crate::context::{RuleOutcome, ValidationContext};

/// One implicated row of one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRecord {
    pub rule_code: String,
    pub table: String,
    #[serde(serialize_with = "join_fields")]
    pub fields: Vec<String>,
    pub row: RowLocator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    /// Rule ran and found violations.
    Issues,
    /// Rule raised or panicked; no issues were kept.
    ExecutionFailure,
    /// Rule code was requested but is not in the registry.
    UnknownRule,
}

impl SummaryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Issues => "Issues",
            Self::ExecutionFailure => "Execution failure",
            Self::UnknownRule => "Unknown rule",
        }
    }
}

/// One user-facing line per rule needing attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRecord {
    pub rule_code: String,
    pub status: SummaryStatus,
    pub severity: Option<Severity>,
    pub message: String,
    /// Distinct (table, row) pairs implicated by the rule.
    pub affected_rows: usize,
    /// Failure text for execution failures.
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompiledReport {
    pub issues: Vec<IssueRecord>,
    pub summary: Vec<SummaryRecord>,
}

impl CompiledReport {
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub fn failure_count(&self) -> usize {
        self.count_status(SummaryStatus::ExecutionFailure)
    }

    pub fn unknown_count(&self) -> usize {
        self.count_status(SummaryStatus::UnknownRule)
    }

    /// True when an error-severity rule found issues, a rule failed or an
    /// unknown code was requested.
    pub fn has_errors(&self) -> bool {
        self.summary.iter().any(|record| match record.status {
            SummaryStatus::Issues => record.severity == Some(Severity::Error),
            SummaryStatus::ExecutionFailure | SummaryStatus::UnknownRule => true,
        })
    }

    fn count_status(&self, status: SummaryStatus) -> usize {
        self.summary
            .iter()
            .filter(|record| record.status == status)
            .count()
    }
}

/// Compile both report views from a finished run.
pub fn compile(context: &ValidationContext) -> CompiledReport {
    let mut report = CompiledReport::default();
    let mut unknown = context.unknown_codes().iter().peekable();

    for (code, outcome) in context.outcomes() {
        while let Some(missing) = unknown.next_if(|missing| missing.as_str() < code) {
            report.summary.push(unknown_record(missing));
        }
        let rule = context.rule(code);
        let message = rule.map(|rule| rule.message().to_string()).unwrap_or_default();
        let severity = rule.map(|rule| rule.severity());
        match outcome {
            RuleOutcome::Completed(issues) if issues.is_empty() => {}
            RuleOutcome::Completed(issues) => {
                let mut affected = BTreeSet::new();
                for issue in issues {
                    for row in &issue.rows {
                        affected.insert((issue.table.as_str(), *row));
                        report.issues.push(IssueRecord {
                            rule_code: code.to_string(),
                            table: issue.table.clone(),
                            fields: issue.fields.clone(),
                            row: *row,
                        });
                    }
                }
                report.summary.push(SummaryRecord {
                    rule_code: code.to_string(),
                    status: SummaryStatus::Issues,
                    severity,
                    message,
                    affected_rows: affected.len(),
                    detail: None,
                });
            }
            RuleOutcome::Failed(failure) => report.summary.push(SummaryRecord {
                rule_code: code.to_string(),
                status: SummaryStatus::ExecutionFailure,
                severity,
                message,
                affected_rows: 0,
                detail: Some(failure.to_string()),
            }),
        }
    }
    for missing in unknown {
        report.summary.push(unknown_record(missing));
    }
    report
}

fn unknown_record(code: &str) -> SummaryRecord {
    SummaryRecord {
        rule_code: code.to_string(),
        status: SummaryStatus::UnknownRule,
        severity: None,
        message: "Rule code is not defined for this cycle".to_string(),
        affected_rows: 0,
        detail: None,
    }
}

fn join_fields<S: Serializer>(fields: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&fields.join(";"))
}

#[cfg(test)]
mod tests {
    use rulebook_model::Issue;

    use super::*;
    use crate::context::RuleFailure;

    fn issue(code: &str, table: &str, rows: &[usize]) -> Issue {
        Issue::new(code, table, vec!["a".to_string(), "b".to_string()], rows.iter().copied())
    }

    #[test]
    fn listing_keeps_predicate_row_order() {
        let mut context = ValidationContext::new();
        context.record_issue("200", issue("200", "t", &[5, 2])).unwrap();
        context.record_issue("100", issue("100", "t", &[9])).unwrap();
        let report = compile(&context);
        let rows: Vec<_> = report
            .issues
            .iter()
            .map(|record| (record.rule_code.as_str(), record.row.index()))
            .collect();
        assert_eq!(rows, vec![("100", 9), ("200", 5), ("200", 2)]);
    }

    #[test]
    fn affected_rows_counts_distinct_rows() {
        let mut context = ValidationContext::new();
        context.record_issue("200", issue("200", "t", &[1, 2])).unwrap();
        context.record_issue("200", issue("200", "t", &[2, 3])).unwrap();
        context.record_issue("200", issue("200", "u", &[1])).unwrap();
        let report = compile(&context);
        assert_eq!(report.issues.len(), 5);
        assert_eq!(report.summary[0].affected_rows, 4);
    }

    #[test]
    fn unknown_codes_interleave_by_code() {
        let mut context = ValidationContext::new();
        context.record_unknown("150");
        context.record_unknown("999");
        context.record_issue("100", issue("100", "t", &[1])).unwrap();
        context
            .record_failure("200", RuleFailure::error("boom"))
            .unwrap();
        let report = compile(&context);
        let summary: Vec<_> = report
            .summary
            .iter()
            .map(|record| (record.rule_code.as_str(), record.status))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("100", SummaryStatus::Issues),
                ("150", SummaryStatus::UnknownRule),
                ("200", SummaryStatus::ExecutionFailure),
                ("999", SummaryStatus::UnknownRule),
            ]
        );
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.unknown_count(), 2);
        assert!(report.has_errors());
    }

    #[test]
    fn passed_rules_are_omitted() {
        let mut context = ValidationContext::new();
        context.mark_completed("100").unwrap();
        let report = compile(&context);
        assert!(report.issues.is_empty());
        assert!(report.summary.is_empty());
        assert!(!report.has_errors());
    }
}

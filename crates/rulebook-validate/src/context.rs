//! Per-run accumulator of rule outcomes.
//!
//! A context is created by the engine for one run, filled as rules finish and
//! handed to the report compiler. It is never shared between runs.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use rulebook_model::{Issue, RuleDefinition};
use serde::Serialize;

use crate::error::ContextError;

/// Why a rule failed to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Predicate returned an error.
    Error,
    /// Predicate panicked.
    Panic,
}

/// Structured record of a rule that did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl RuleFailure {
    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Error,
            detail: detail.into(),
        }
    }

    pub fn panic(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Panic,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::Error => write!(f, "{}", self.detail),
            FailureKind::Panic => write!(f, "rule panicked: {}", self.detail),
        }
    }
}

/// Result of running one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Predicate returned normally; an empty list means the rule passed.
    Completed(Vec<Issue>),
    Failed(RuleFailure),
}

impl RuleOutcome {
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Completed(issues) => issues,
            Self::Failed(_) => &[],
        }
    }

    pub fn failure(&self) -> Option<&RuleFailure> {
        match self {
            Self::Completed(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    outcomes: BTreeMap<String, RuleOutcome>,
    rules: BTreeMap<String, Arc<RuleDefinition>>,
    unknown: BTreeSet<String>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the definition of a rule taking part in this run.
    pub fn register_rule(&mut self, rule: Arc<RuleDefinition>) {
        self.rules.insert(rule.code().to_string(), rule);
    }

    /// Record a rule that completed; issues may follow via [`record_issue`](Self::record_issue).
    pub fn mark_completed(&mut self, code: &str) -> Result<(), ContextError> {
        match self.outcomes.get(code) {
            Some(RuleOutcome::Failed(_)) => Err(ContextError::AlreadyFailed {
                code: code.to_string(),
            }),
            Some(RuleOutcome::Completed(_)) => Ok(()),
            None => {
                self.outcomes
                    .insert(code.to_string(), RuleOutcome::Completed(Vec::new()));
                Ok(())
            }
        }
    }

    pub fn record_issue(&mut self, code: &str, issue: Issue) -> Result<(), ContextError> {
        let outcome = self
            .outcomes
            .entry(code.to_string())
            .or_insert_with(|| RuleOutcome::Completed(Vec::new()));
        match outcome {
            RuleOutcome::Completed(issues) => {
                issues.push(issue);
                Ok(())
            }
            RuleOutcome::Failed(_) => Err(ContextError::AlreadyFailed {
                code: code.to_string(),
            }),
        }
    }

    pub fn record_failure(&mut self, code: &str, failure: RuleFailure) -> Result<(), ContextError> {
        match self.outcomes.get(code) {
            Some(RuleOutcome::Failed(_)) => Err(ContextError::DuplicateFailure {
                code: code.to_string(),
            }),
            Some(RuleOutcome::Completed(issues)) if !issues.is_empty() => {
                Err(ContextError::IssuesAlreadyRecorded {
                    code: code.to_string(),
                })
            }
            _ => {
                self.outcomes
                    .insert(code.to_string(), RuleOutcome::Failed(failure));
                Ok(())
            }
        }
    }

    /// Record a requested code that the registry does not contain.
    pub fn record_unknown(&mut self, code: &str) {
        self.unknown.insert(code.to_string());
    }

    pub fn outcome(&self, code: &str) -> Option<&RuleOutcome> {
        self.outcomes.get(code)
    }

    /// Outcomes in ascending code order.
    pub fn outcomes(&self) -> impl Iterator<Item = (&str, &RuleOutcome)> {
        self.outcomes
            .iter()
            .map(|(code, outcome)| (code.as_str(), outcome))
    }

    pub fn rule(&self, code: &str) -> Option<&Arc<RuleDefinition>> {
        self.rules.get(code)
    }

    pub fn unknown_codes(&self) -> &BTreeSet<String> {
        &self.unknown
    }

    /// Number of rules with an outcome, passed or failed.
    pub fn executed_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn issue_count(&self) -> usize {
        self.outcomes
            .values()
            .map(|outcome| outcome.issues().len())
            .sum()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes
            .values()
            .filter(|outcome| outcome.is_failed())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(code: &str, rows: &[usize]) -> Issue {
        Issue::new(code, "t", vec!["f".to_string()], rows.iter().copied())
    }

    #[test]
    fn issues_accumulate_per_code() {
        let mut context = ValidationContext::new();
        context.record_issue("200", issue("200", &[2])).unwrap();
        context.record_issue("200", issue("200", &[5])).unwrap();
        assert_eq!(context.outcome("200").unwrap().issues().len(), 2);
        assert_eq!(context.issue_count(), 2);
    }

    #[test]
    fn failure_excludes_later_issues() {
        let mut context = ValidationContext::new();
        context
            .record_failure("300", RuleFailure::error("boom"))
            .unwrap();
        let error = context.record_issue("300", issue("300", &[1])).unwrap_err();
        assert_eq!(
            error,
            ContextError::AlreadyFailed {
                code: "300".to_string()
            }
        );
        assert_eq!(context.failure_count(), 1);
    }

    #[test]
    fn failure_is_recorded_once() {
        let mut context = ValidationContext::new();
        context
            .record_failure("300", RuleFailure::error("boom"))
            .unwrap();
        let error = context
            .record_failure("300", RuleFailure::panic("again"))
            .unwrap_err();
        assert!(matches!(error, ContextError::DuplicateFailure { .. }));
    }

    #[test]
    fn issues_exclude_later_failure() {
        let mut context = ValidationContext::new();
        context.record_issue("200", issue("200", &[2])).unwrap();
        let error = context
            .record_failure("200", RuleFailure::error("late"))
            .unwrap_err();
        assert!(matches!(error, ContextError::IssuesAlreadyRecorded { .. }));
    }

    #[test]
    fn completed_rule_without_issues_counts_as_executed() {
        let mut context = ValidationContext::new();
        context.mark_completed("100").unwrap();
        assert_eq!(context.executed_count(), 1);
        assert_eq!(context.issue_count(), 0);
        assert!(!context.outcome("100").unwrap().is_failed());
    }

    #[test]
    fn failure_display_marks_panics() {
        assert_eq!(RuleFailure::error("bad column").to_string(), "bad column");
        assert_eq!(
            RuleFailure::panic("index out of bounds").to_string(),
            "rule panicked: index out of bounds"
        );
    }
}

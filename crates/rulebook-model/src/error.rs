use rulebook_common::TableError;
use thiserror::Error;

/// Errors raised while constructing definitions and registries.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    #[error("Rule code must not be empty")]
    EmptyRuleCode,

    #[error("Rule {code} must name the table it reads")]
    EmptyTable { code: String },

    #[error("Rule {code} must list at least one affected field")]
    NoAffectedFields { code: String },

    #[error("Rule {code} has no predicate")]
    MissingPredicate { code: String },

    #[error("Rule code '{code}' is defined more than once")]
    DuplicateRuleCode { code: String },
}

/// Result type for model construction.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Error returned by a rule predicate.
///
/// Any variant marks the rule as failed for the current run; the engine
/// records it and moves on to the next rule.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuleError {
    /// Table the rule reads is not in the submission.
    #[error("Table '{table}' is not present in the submission")]
    MissingTable { table: String },

    /// Issue named a field outside the rule's affected fields.
    #[error("Field '{field}' is not an affected field of rule {rule}")]
    UnknownField { rule: String, field: String },

    #[error(transparent)]
    Table(#[from] TableError),

    /// Polars DataFrame operation error.
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("{0}")]
    Message(String),
}

/// Result type returned by predicates.
pub type RuleResult<T = ()> = std::result::Result<T, RuleError>;

impl RuleError {
    pub fn msg(message: impl std::fmt::Display) -> Self {
        Self::Message(message.to_string())
    }
}

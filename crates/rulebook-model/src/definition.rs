//! Self-describing rule definitions.
//!
//! A [`RuleDefinition`] pairs a descriptor (code, table, message, affected
//! fields, severity) with the predicate that inspects a submission. Definitions
//! are built once through [`RuleDefinitionBuilder`] and never edited; a rule is
//! changed by publishing a new definition under the same code in a later
//! cycle's delta.

use std::fmt;
use std::sync::Arc;

use polars::prelude::DataFrame;
use rulebook_common::{TableStore, normalize_table_id};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result, RuleError, RuleResult};
use crate::findings::Findings;

/// Severity attached to a rule's descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Submission must be corrected.
    Error,
    /// Should be reviewed; may be explained away.
    Warning,
    /// Informational only.
    Info,
}

impl Severity {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Info => "Info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Check a rule runs against a submission.
///
/// Predicates read from the store and write only to the [`Findings`] they are
/// handed. Returning an error (or panicking) marks the rule as failed for the
/// run; issues recorded before the failure are discarded.
pub trait Predicate: Send + Sync {
    fn check(&self, data: &dyn TableStore, findings: &mut Findings) -> RuleResult;
}

impl<F> Predicate for F
where
    F: Fn(&dyn TableStore, &mut Findings) -> RuleResult + Send + Sync,
{
    fn check(&self, data: &dyn TableStore, findings: &mut Findings) -> RuleResult {
        self(data, findings)
    }
}

/// Look up the table a predicate needs, failing the rule when it is absent.
pub fn require_table<'a>(
    data: &'a dyn TableStore,
    table: &str,
) -> RuleResult<&'a DataFrame> {
    data.table(table).ok_or_else(|| RuleError::MissingTable {
        table: table.to_string(),
    })
}

/// Immutable rule descriptor plus predicate.
#[derive(Clone)]
pub struct RuleDefinition {
    code: String,
    table: String,
    message: String,
    affected_fields: Vec<String>,
    severity: Severity,
    predicate: Arc<dyn Predicate>,
}

impl RuleDefinition {
    /// Start building a definition for `code` reading `table`.
    pub fn builder(code: impl Into<String>, table: impl Into<String>) -> RuleDefinitionBuilder {
        RuleDefinitionBuilder {
            code: code.into(),
            table: table.into(),
            message: String::new(),
            affected_fields: Vec::new(),
            severity: Severity::Error,
            predicate: None,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn affected_fields(&self) -> &[String] {
        &self.affected_fields
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Run the predicate against `data`, recording into `findings`.
    pub fn check(
        &self,
        data: &dyn TableStore,
        findings: &mut Findings,
    ) -> RuleResult {
        self.predicate.check(data, findings)
    }

    /// True when both definitions carry the same descriptor, ignoring the predicate.
    pub fn same_descriptor(&self, other: &Self) -> bool {
        self.code == other.code
            && self.table == other.table
            && self.message == other.message
            && self.affected_fields == other.affected_fields
            && self.severity == other.severity
    }
}

impl PartialEq for RuleDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.same_descriptor(other) && Arc::ptr_eq(&self.predicate, &other.predicate)
    }
}

impl Eq for RuleDefinition {}

impl fmt::Debug for RuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDefinition")
            .field("code", &self.code)
            .field("table", &self.table)
            .field("message", &self.message)
            .field("affected_fields", &self.affected_fields)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

/// Builder for [`RuleDefinition`].
pub struct RuleDefinitionBuilder {
    code: String,
    table: String,
    message: String,
    affected_fields: Vec<String>,
    severity: Severity,
    predicate: Option<Arc<dyn Predicate>>,
}

impl RuleDefinitionBuilder {
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.affected_fields.push(field.into());
        self
    }

    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.affected_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Use a function or closure as the predicate.
    #[must_use]
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&dyn TableStore, &mut Findings) -> RuleResult + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(check));
        self
    }

    /// Use a shared predicate, e.g. one reused by several rule codes.
    #[must_use]
    pub fn predicate(mut self, predicate: Arc<dyn Predicate>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn build(self) -> Result<RuleDefinition> {
        let code = self.code.trim().to_string();
        if code.is_empty() {
            return Err(ModelError::EmptyRuleCode);
        }
        let table = normalize_table_id(&self.table);
        if table.is_empty() {
            return Err(ModelError::EmptyTable { code });
        }
        let affected_fields: Vec<String> = self
            .affected_fields
            .iter()
            .map(|field| field.trim().to_string())
            .filter(|field| !field.is_empty())
            .collect();
        if affected_fields.is_empty() {
            return Err(ModelError::NoAffectedFields { code });
        }
        let Some(predicate) = self.predicate else {
            return Err(ModelError::MissingPredicate { code });
        };
        Ok(RuleDefinition {
            code,
            table,
            message: self.message,
            affected_fields,
            severity: self.severity,
            predicate,
        })
    }
}

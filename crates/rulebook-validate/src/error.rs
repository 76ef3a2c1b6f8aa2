//! Error types for the validation context and report writers.

use std::path::PathBuf;

use thiserror::Error;

/// Misuse of the per-run context.
///
/// A rule either completes (with zero or more issues) or fails; the context
/// refuses writes that would mix the two.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContextError {
    #[error("Rule {code} already failed; issues cannot be recorded")]
    AlreadyFailed { code: String },

    #[error("Rule {code} is already marked as failed")]
    DuplicateFailure { code: String },

    #[error("Rule {code} already recorded issues; it cannot also fail")]
    IssuesAlreadyRecorded { code: String },
}

/// Errors raised while writing report files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

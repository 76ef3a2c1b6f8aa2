//! Error types for table access.

use thiserror::Error;

/// Errors raised while reading a table through the store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TableError {
    /// Column is not present in the table (case-insensitive lookup).
    #[error("Column '{column}' not found in table '{table}'")]
    MissingColumn { table: String, column: String },

    /// Polars DataFrame operation error.
    #[error("DataFrame error: {0}")]
    Polars(#[from] ::polars::error::PolarsError),
}

/// Result type for table access.
pub type Result<T> = std::result::Result<T, TableError>;

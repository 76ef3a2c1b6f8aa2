//! Shared utilities for rulebook crates.
//!
//! This crate provides the minimal table-store interface the validation core
//! reads submissions through, plus Polars `AnyValue` helpers used by rule
//! predicates.

pub mod error;
pub mod lookup;
pub mod polars;
pub mod store;

pub use error::{Result, TableError};
pub use lookup::CaseInsensitiveSet;
pub use self::polars::{any_to_string, format_numeric, parse_i64, string_column};
pub use store::{DataContainer, TableStore, normalize_table_id};

//! Rule definition model for the rulebook workspace.
//!
//! - [`RuleDefinition`]: immutable descriptor plus predicate
//! - [`Registry`]: immutable code → definition mapping for one cycle
//! - [`YearConfig`]: declarative delta between two cycles
//! - [`Findings`] and [`Issue`]: what a predicate records while it runs

pub mod definition;
pub mod delta;
pub mod error;
pub mod findings;
pub mod registry;

pub use definition::{Predicate, RuleDefinition, RuleDefinitionBuilder, Severity, require_table};
pub use delta::YearConfig;
pub use error::{ModelError, Result, RuleError, RuleResult};
pub use findings::{Findings, Issue, RowLocator};
pub use registry::{Registry, RegistryBuilder};

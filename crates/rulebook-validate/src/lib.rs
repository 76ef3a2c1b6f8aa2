//! Rule execution and reporting.
//!
//! - [`ValidationEngine`]: runs a selection of a registry's rules against a
//!   [`TableStore`], isolating each rule's failure
//! - [`ValidationContext`]: per-run accumulator of issues and failures
//! - [`compile`]: turns a finished context into the full issue listing and the
//!   user-facing summary
//! - [`output`]: CSV and JSON writers for both views
//!
//! # Example
//!
//! ```ignore
//! use rulebook_validate::{ValidationEngine, ValidationRun, compile};
//!
//! let registry = rulesets.resolve("2024")?;
//! let context = ValidationEngine::default().run(&ValidationRun::new(&registry, &data));
//! let report = compile(&context);
//! for row in &report.summary {
//!     println!("{} {:?} {}", row.rule_code, row.status, row.affected_rows);
//! }
//! ```
//!
//! [`TableStore`]: rulebook_common::TableStore

pub mod context;
pub mod engine;
pub mod error;
pub mod output;
pub mod report;

pub use context::{FailureKind, RuleFailure, RuleOutcome, ValidationContext};
pub use engine::{EngineOptions, ValidationEngine, ValidationRun, run};
pub use error::{ContextError, ReportError};
pub use output::{
    REPORT_SCHEMA, REPORT_SCHEMA_VERSION, write_issue_listing, write_issue_listing_csv,
    write_report_json, write_summary, write_summary_csv,
};
pub use report::{CompiledReport, IssueRecord, SummaryRecord, SummaryStatus, compile};

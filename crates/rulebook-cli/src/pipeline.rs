//! The `validate` pipeline: load, resolve, run, compile, write.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use rulebook_registry::Rulesets;
use rulebook_validate::{
    CompiledReport, EngineOptions, ValidationEngine, ValidationRun, compile,
    write_issue_listing_csv, write_report_json, write_summary_csv,
};
use tracing::{info, info_span};

use crate::loader::load_data_dir;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
    #[default]
    Both,
}

impl ReportFormat {
    fn csv(self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }

    fn json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

#[derive(Debug, Clone)]
pub struct ValidationRequest {
    pub data_dir: PathBuf,
    pub cycle: String,
    /// Rule codes to run; empty runs the whole cycle.
    pub rules: Vec<String>,
    pub output_dir: PathBuf,
    pub format: ReportFormat,
    pub jobs: usize,
}

#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub cycle: String,
    /// Loaded tables with their row counts.
    pub tables: Vec<(String, usize)>,
    pub executed: usize,
    pub report: CompiledReport,
    pub written: Vec<PathBuf>,
}

impl ValidationOutcome {
    pub fn has_errors(&self) -> bool {
        self.report.has_errors()
    }
}

pub fn run_validation(rulesets: &Rulesets, request: &ValidationRequest) -> Result<ValidationOutcome> {
    let ruleset = rulesets
        .ruleset(&request.cycle)
        .with_context(|| format!("resolve cycle '{}'", request.cycle))?;
    let cycle = ruleset.cycle.to_string();
    let span = info_span!("validate", cycle = %cycle);
    let _guard = span.enter();
    let started = Instant::now();

    let data = load_data_dir(&request.data_dir)?;
    let tables = data
        .iter()
        .map(|(id, frame)| (id.to_string(), frame.height()))
        .collect();

    let selected = (!request.rules.is_empty()).then_some(request.rules.as_slice());
    let engine = ValidationEngine::new(EngineOptions::default().with_jobs(request.jobs));
    let context =
        engine.run(&ValidationRun::new(&ruleset.registry, &data).with_selection(selected));
    let report = compile(&context);
    let written = write_outputs(&request.output_dir, &cycle, &report, request.format)?;

    info!(
        tables = data.len(),
        rows = data.row_count(),
        issues = report.issue_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "validation complete"
    );
    Ok(ValidationOutcome {
        cycle,
        tables,
        executed: context.executed_count(),
        report,
        written,
    })
}

fn write_outputs(
    output_dir: &Path,
    cycle: &str,
    report: &CompiledReport,
    format: ReportFormat,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if format.csv() {
        written.push(
            write_issue_listing_csv(output_dir, &report.issues).context("write issue listing")?,
        );
        written.push(write_summary_csv(output_dir, &report.summary).context("write summary")?);
    }
    if format.json() {
        written.push(write_report_json(output_dir, cycle, report).context("write json report")?);
    }
    Ok(written)
}

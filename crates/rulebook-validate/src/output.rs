//! CSV and JSON writers for compiled reports.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use crate::error::ReportError;
use crate::report::{CompiledReport, IssueRecord, SummaryRecord};

pub const REPORT_SCHEMA: &str = "rulebook.validation-report";
pub const REPORT_SCHEMA_VERSION: u32 = 1;

const ISSUE_HEADERS: [&str; 4] = ["rule_code", "table", "fields", "row"];
const SUMMARY_HEADERS: [&str; 6] = [
    "rule_code",
    "status",
    "severity",
    "message",
    "affected_rows",
    "detail",
];

pub const ISSUE_LISTING_FILE: &str = "issues.csv";
pub const SUMMARY_FILE: &str = "summary.csv";
pub const REPORT_JSON_FILE: &str = "validation_report.json";

#[derive(Serialize)]
struct ReportPayload<'a> {
    schema: &'static str,
    schema_version: u32,
    generated_at: String,
    cycle: &'a str,
    issue_count: usize,
    failure_count: usize,
    issues: &'a [IssueRecord],
    summary: &'a [SummaryRecord],
}

/// Write the full issue listing as CSV. The header row is always written.
pub fn write_issue_listing<W: Write>(writer: W, records: &[IssueRecord]) -> Result<(), ReportError> {
    write_records(writer, &ISSUE_HEADERS, records)
}

/// Write the user summary as CSV. The header row is always written.
pub fn write_summary<W: Write>(writer: W, records: &[SummaryRecord]) -> Result<(), ReportError> {
    write_records(writer, &SUMMARY_HEADERS, records)
}

pub fn write_issue_listing_csv(
    output_dir: &Path,
    records: &[IssueRecord],
) -> Result<PathBuf, ReportError> {
    let path = create_output(output_dir, ISSUE_LISTING_FILE)?;
    let file = fs::File::create(&path).map_err(|e| ReportError::io(&path, e))?;
    write_issue_listing(file, records)?;
    Ok(path)
}

pub fn write_summary_csv(
    output_dir: &Path,
    records: &[SummaryRecord],
) -> Result<PathBuf, ReportError> {
    let path = create_output(output_dir, SUMMARY_FILE)?;
    let file = fs::File::create(&path).map_err(|e| ReportError::io(&path, e))?;
    write_summary(file, records)?;
    Ok(path)
}

/// Write both views into one JSON document.
pub fn write_report_json(
    output_dir: &Path,
    cycle: &str,
    report: &CompiledReport,
) -> Result<PathBuf, ReportError> {
    let path = create_output(output_dir, REPORT_JSON_FILE)?;
    let payload = ReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        cycle,
        issue_count: report.issue_count(),
        failure_count: report.failure_count(),
        issues: &report.issues,
        summary: &report.summary,
    };
    let json = serde_json::to_string_pretty(&payload)?;
    fs::write(&path, format!("{json}\n")).map_err(|e| ReportError::io(&path, e))?;
    Ok(path)
}

fn write_records<W: Write, T: Serialize>(
    writer: W,
    headers: &[&str],
    records: &[T],
) -> Result<(), ReportError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(headers)?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn create_output(output_dir: &Path, file_name: &str) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(output_dir).map_err(|e| ReportError::io(output_dir, e))?;
    Ok(output_dir.join(file_name))
}

//! Integration tests for CSV loading and the validate pipeline.

use std::fs;
use std::path::Path;

use rulebook_cli::loader::{list_csv_files, load_data_dir, table_id};
use rulebook_cli::pipeline::{ReportFormat, ValidationRequest, run_validation};
use rulebook_common::{TableStore, string_column};
use rulebook_rules::published_rulesets;

const SCHOOLS: &str = "school_id,phase\n007,PRIMARY\n008,NURSERY\n";
const LEARNERS: &str = "\
learner_id,date_of_birth,gender,school_id,enrolment_date,year_group
L1,2012-03-01,M,007,2016-09-01,7
L2,2012-02-30,F,007,2016-09-01,7
,2011-09-15,F,009,2016-09-01,8
";

fn write_dataset(dir: &Path) {
    fs::write(dir.join("Schools.csv"), SCHOOLS).expect("write schools");
    fs::write(dir.join("learners.CSV"), LEARNERS).expect("write learners");
    fs::write(dir.join("notes.txt"), "ignored").expect("write notes");
}

fn request(dir: &Path, cycle: &str, rules: &[&str], format: ReportFormat) -> ValidationRequest {
    ValidationRequest {
        data_dir: dir.to_path_buf(),
        cycle: cycle.to_string(),
        rules: rules.iter().map(ToString::to_string).collect(),
        output_dir: dir.join("output"),
        format,
        jobs: 2,
    }
}

#[test]
fn loader_reads_csv_files_as_string_tables() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_dataset(dir.path());

    let files = list_csv_files(dir.path()).expect("list");
    assert_eq!(files.len(), 2);
    assert_eq!(table_id(&files[0]).as_deref(), Some("schools"));

    let data = load_data_dir(dir.path()).expect("load");
    assert_eq!(data.len(), 2);
    let schools = data.table("SCHOOLS").expect("schools table");
    assert_eq!(
        string_column(schools, "schools", "school_id").expect("column"),
        vec!["007", "008"]
    );
    let learners = data.table("learners").expect("learners table");
    assert_eq!(
        string_column(learners, "learners", "learner_id").expect("column"),
        vec!["L1", "L2", ""]
    );
}

#[test]
fn loader_rejects_clashing_table_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("schools.csv"), SCHOOLS).expect("write");
    fs::write(dir.path().join("SCHOOLS.csv"), SCHOOLS).expect("write");
    let error = load_data_dir(dir.path()).expect_err("clash");
    assert!(error.to_string().contains("table 'schools'"));
}

#[test]
fn loader_requires_existing_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(load_data_dir(&dir.path().join("missing")).is_err());
}

#[test]
fn validate_writes_both_report_views() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_dataset(dir.path());

    let rulesets = published_rulesets().expect("rulesets");
    let outcome = run_validation(&rulesets, &request(dir.path(), "2024", &[], ReportFormat::Both))
        .expect("validate");

    assert_eq!(outcome.cycle, "2024");
    assert_eq!(
        outcome.tables,
        vec![("learners".to_string(), 3), ("schools".to_string(), 2)]
    );
    assert_eq!(outcome.executed, rulesets.resolve("2024").expect("2024").len());
    assert!(outcome.has_errors());
    assert_eq!(outcome.written.len(), 3);
    assert!(outcome.written.iter().all(|path| path.is_file()));

    let codes: Vec<_> = outcome
        .report
        .summary
        .iter()
        .map(|record| (record.rule_code.as_str(), record.affected_rows))
        .collect();
    assert_eq!(
        codes,
        vec![("1020", 1), ("2010", 1), ("2030", 1), ("2050", 1)]
    );

    let listing = fs::read_to_string(dir.path().join("output/issues.csv")).expect("listing");
    assert_eq!(listing.lines().count(), 5);
    assert!(listing.contains("2050,learners,school_id,2"));
}

#[test]
fn selected_and_unknown_codes() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_dataset(dir.path());

    let rulesets = published_rulesets().expect("rulesets");
    let outcome = run_validation(
        &rulesets,
        &request(dir.path(), "2025", &["2070", "2040"], ReportFormat::Json),
    )
    .expect("validate");

    assert_eq!(outcome.executed, 1);
    assert!(outcome.report.issues.is_empty());
    assert_eq!(outcome.written.len(), 1);

    let payload: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(&outcome.written[0]).expect("read json"),
    )
    .expect("parse json");
    insta::assert_json_snapshot!(&payload["summary"], @r#"
    [
      {
        "affected_rows": 0,
        "detail": null,
        "message": "Rule code is not defined for this cycle",
        "rule_code": "2040",
        "severity": null,
        "status": "unknown_rule"
      }
    ]
    "#);
}

#[test]
fn unknown_cycle_stops_before_loading() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rulesets = published_rulesets().expect("rulesets");
    let error = run_validation(&rulesets, &request(dir.path(), "1999", &[], ReportFormat::Csv))
        .expect_err("unknown cycle");
    assert!(format!("{error:#}").contains("1999"));
    assert!(!dir.path().join("output").exists());
}

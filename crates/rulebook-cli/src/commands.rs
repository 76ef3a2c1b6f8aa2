use anyhow::{Context, Result, anyhow};
use comfy_table::{Cell, Table};
use rulebook_registry::{Ruleset, Rulesets, diff};
use rulebook_rules::published_rulesets;

use rulebook_cli::pipeline::{ReportFormat, ValidationOutcome, ValidationRequest, run_validation};

use crate::cli::{DiffArgs, OutputFormatArg, RulesArgs, ValidateArgs};
use crate::summary::{apply_table_style, dim_cell, header_cell, severity_cell};

fn rulesets() -> Result<Rulesets> {
    published_rulesets().context("publish built-in rulesets")
}

pub fn run_validate(args: &ValidateArgs) -> Result<ValidationOutcome> {
    let request = ValidationRequest {
        data_dir: args.data_dir.clone(),
        cycle: args.cycle.clone(),
        rules: args.rules.clone(),
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| args.data_dir.join("output")),
        format: match args.format {
            OutputFormatArg::Csv => ReportFormat::Csv,
            OutputFormatArg::Json => ReportFormat::Json,
            OutputFormatArg::Both => ReportFormat::Both,
        },
        jobs: args.jobs,
    };
    run_validation(&rulesets()?, &request)
}

fn select_ruleset<'a>(rulesets: &'a Rulesets, cycle: Option<&str>) -> Result<&'a Ruleset> {
    match cycle {
        Some(cycle) => rulesets
            .ruleset(cycle)
            .with_context(|| format!("resolve cycle '{cycle}'")),
        None => rulesets
            .latest()
            .ok_or_else(|| anyhow!("no cycles are published")),
    }
}

pub fn run_rules(args: &RulesArgs) -> Result<()> {
    let rulesets = rulesets()?;
    let ruleset = select_ruleset(&rulesets, args.cycle.as_deref())?;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Table"),
        header_cell("Severity"),
        header_cell("Fields"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    for rule in ruleset.registry.iter() {
        table.add_row(vec![
            Cell::new(rule.code()),
            Cell::new(rule.table()),
            severity_cell(Some(rule.severity())),
            Cell::new(rule.affected_fields().join(", ")),
            Cell::new(rule.message()),
        ]);
    }
    println!("Cycle: {} ({} rules)", ruleset.cycle, ruleset.registry.len());
    println!("{table}");
    Ok(())
}

pub fn run_cycles() -> Result<()> {
    let rulesets = rulesets()?;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Cycle"),
        header_cell("Snapshot"),
        header_cell("Derived from"),
        header_cell("Rules"),
    ]);
    apply_table_style(&mut table);
    for ruleset in rulesets.cycles() {
        let parent = match &ruleset.parent {
            Some(parent) => Cell::new(parent),
            None => dim_cell("-"),
        };
        table.add_row(vec![
            Cell::new(&ruleset.cycle),
            Cell::new(ruleset.snapshot_id()),
            parent,
            Cell::new(ruleset.registry.len()),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_diff(args: &DiffArgs) -> Result<()> {
    let rulesets = rulesets()?;
    let older = select_ruleset(&rulesets, Some(&args.from))?;
    let newer = select_ruleset(&rulesets, Some(&args.to))?;
    let changes = diff(&older.registry, &newer.registry);
    if changes.is_empty() {
        println!("No rule changes between {} and {}.", older.cycle, newer.cycle);
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Change"), header_cell("Code"), header_cell("Message")]);
    apply_table_style(&mut table);
    let rows = changes
        .added
        .iter()
        .map(|code| ("added", code, newer))
        .chain(changes.modified.iter().map(|code| ("modified", code, newer)))
        .chain(changes.removed.iter().map(|code| ("removed", code, older)));
    for (change, code, source) in rows {
        let message = source
            .registry
            .get(code)
            .map(|rule| rule.message().to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(change),
            Cell::new(code),
            Cell::new(message),
        ]);
    }
    println!("{} -> {}", older.cycle, newer.cycle);
    println!("{table}");
    Ok(())
}

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use rulebook_cli::pipeline::ValidationOutcome;
use rulebook_model::Severity;
use rulebook_validate::{SummaryRecord, SummaryStatus};

pub fn print_summary(outcome: &ValidationOutcome) {
    println!("Cycle: {}", outcome.cycle);
    let tables: Vec<String> = outcome
        .tables
        .iter()
        .map(|(id, rows)| format!("{id} ({rows} rows)"))
        .collect();
    println!(
        "Tables: {}",
        if tables.is_empty() {
            "none".to_string()
        } else {
            tables.join(", ")
        }
    );
    for path in &outcome.written {
        println!("Wrote: {}", path.display());
    }

    let report = &outcome.report;
    if report.summary.is_empty() {
        println!("{} rules executed, no issues found.", outcome.executed);
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Status"),
        header_cell("Severity"),
        header_cell("Rows"),
        header_cell("Message"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    for record in &report.summary {
        table.add_row(vec![
            Cell::new(&record.rule_code)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            status_cell(record.status),
            severity_cell(record.severity),
            rows_cell(record),
            message_cell(record),
        ]);
    }
    println!("{table}");
    println!(
        "{} rules executed: {} issue rows, {} failures, {} unknown codes",
        outcome.executed,
        report.issue_count(),
        report.failure_count(),
        report.unknown_count()
    );
}

fn status_cell(status: SummaryStatus) -> Cell {
    match status {
        SummaryStatus::Issues => Cell::new(status.label()),
        SummaryStatus::ExecutionFailure => Cell::new(status.label())
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        SummaryStatus::UnknownRule => Cell::new(status.label()).fg(Color::Magenta),
    }
}

pub fn severity_cell(severity: Option<Severity>) -> Cell {
    match severity {
        Some(Severity::Error) => Cell::new("ERROR").fg(Color::Red),
        Some(Severity::Warning) => Cell::new("WARN").fg(Color::Yellow),
        Some(Severity::Info) => Cell::new("INFO").fg(Color::Cyan),
        None => dim_cell("-"),
    }
}

fn rows_cell(record: &SummaryRecord) -> Cell {
    match record.status {
        SummaryStatus::Issues => Cell::new(record.affected_rows).add_attribute(Attribute::Bold),
        SummaryStatus::ExecutionFailure | SummaryStatus::UnknownRule => dim_cell("-"),
    }
}

fn message_cell(record: &SummaryRecord) -> Cell {
    match &record.detail {
        Some(detail) if record.message.is_empty() => Cell::new(detail).fg(Color::Red),
        Some(detail) => Cell::new(format!("{}\n{detail}", record.message)).fg(Color::Red),
        None => Cell::new(&record.message),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 5 {
        table.set_constraints(vec![
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::UpperBoundary(Width::Fixed(20)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::UpperBoundary(Width::Percentage(60)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

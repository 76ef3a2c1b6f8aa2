//! Reusable predicates for the built-in catalog.
//!
//! Each check reads one column of the rule's own table. Values are compared
//! after trimming; blank values are left to [`Required`].

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use rulebook_common::{TableStore, parse_i64, string_column};
use rulebook_model::{Findings, Predicate, RuleResult, require_table};

/// Reads `column` from the rule's table as trimmed strings.
fn column_values(
    data: &dyn TableStore,
    findings: &Findings,
    column: &str,
) -> RuleResult<Vec<String>> {
    let table = findings.table();
    let frame = require_table(data, table)?;
    Ok(string_column(frame, table, column)?)
}

fn rows_where<F>(values: &[String], mut violates: F) -> Vec<usize>
where
    F: FnMut(&str) -> bool,
{
    values
        .iter()
        .enumerate()
        .filter(|(_, value)| violates(value))
        .map(|(idx, _)| idx)
        .collect()
}

/// Flags rows where the column is blank.
#[derive(Debug, Clone)]
pub struct Required {
    pub column: &'static str,
}

impl Predicate for Required {
    fn check(&self, data: &dyn TableStore, findings: &mut Findings) -> RuleResult {
        let values = column_values(data, findings, self.column)?;
        findings.report(&[self.column], rows_where(&values, str::is_empty))
    }
}

/// Flags non-blank values outside a fixed code list.
#[derive(Debug, Clone)]
pub struct AllowedValues {
    pub column: &'static str,
    pub allowed: &'static [&'static str],
}

impl Predicate for AllowedValues {
    fn check(&self, data: &dyn TableStore, findings: &mut Findings) -> RuleResult {
        let values = column_values(data, findings, self.column)?;
        let rows = rows_where(&values, |value| {
            !value.is_empty() && !self.allowed.iter().any(|allowed| *allowed == value)
        });
        findings.report(&[self.column], rows)
    }
}

/// Flags every occurrence of a value after its first.
#[derive(Debug, Clone)]
pub struct Unique {
    pub column: &'static str,
}

impl Predicate for Unique {
    fn check(&self, data: &dyn TableStore, findings: &mut Findings) -> RuleResult {
        let values = column_values(data, findings, self.column)?;
        let mut seen = HashSet::new();
        let rows = rows_where(&values, |value| {
            !value.is_empty() && !seen.insert(value.to_string())
        });
        findings.report(&[self.column], rows)
    }
}

/// Flags values that are not calendar dates in `YYYY-MM-DD` form.
#[derive(Debug, Clone)]
pub struct IsoDate {
    pub column: &'static str,
}

impl Predicate for IsoDate {
    fn check(&self, data: &dyn TableStore, findings: &mut Findings) -> RuleResult {
        let values = column_values(data, findings, self.column)?;
        let rows = rows_where(&values, |value| !value.is_empty() && !is_iso_date(value));
        findings.report(&[self.column], rows)
    }
}

/// `YYYY-MM-DD` with a real calendar day. Shorter forms such as `2024-1-5`
/// are rejected even though chrono would parse them.
pub fn is_iso_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Flags values that are not integers within `min..=max`.
#[derive(Debug, Clone)]
pub struct IntegerRange {
    pub column: &'static str,
    pub min: i64,
    pub max: i64,
}

impl Predicate for IntegerRange {
    fn check(&self, data: &dyn TableStore, findings: &mut Findings) -> RuleResult {
        let values = column_values(data, findings, self.column)?;
        let rows = rows_where(&values, |value| {
            !value.is_empty()
                && !parse_i64(value).is_some_and(|number| (self.min..=self.max).contains(&number))
        });
        findings.report(&[self.column], rows)
    }
}

/// Flags values with no matching key in another table.
#[derive(Debug, Clone)]
pub struct References {
    pub column: &'static str,
    pub target_table: &'static str,
    pub target_column: &'static str,
}

impl Predicate for References {
    fn check(&self, data: &dyn TableStore, findings: &mut Findings) -> RuleResult {
        let values = column_values(data, findings, self.column)?;
        let target = require_table(data, self.target_table)?;
        let keys: BTreeSet<String> = string_column(target, self.target_table, self.target_column)?
            .into_iter()
            .filter(|key| !key.is_empty())
            .collect();
        let rows = rows_where(&values, |value| !value.is_empty() && !keys.contains(value));
        findings.report(&[self.column], rows)
    }
}

/// Flags rows whose `later` date falls before their `earlier` date.
///
/// Rows where either value is blank or not a valid date are skipped.
#[derive(Debug, Clone)]
pub struct DateOrder {
    pub earlier: &'static str,
    pub later: &'static str,
}

impl Predicate for DateOrder {
    fn check(&self, data: &dyn TableStore, findings: &mut Findings) -> RuleResult {
        let earlier = column_values(data, findings, self.earlier)?;
        let later = column_values(data, findings, self.later)?;
        let rows: Vec<usize> = earlier
            .iter()
            .zip(&later)
            .enumerate()
            .filter(|(_, (start, end))| match (parse_date(start), parse_date(end)) {
                (Some(start), Some(end)) => end < start,
                _ => false,
            })
            .map(|(idx, _)| idx)
            .collect();
        findings.report(&[self.earlier, self.later], rows)
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if !is_iso_date(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_dates_require_full_form() {
        assert!(is_iso_date("2024-02-29"));
        assert!(!is_iso_date("2023-02-29"));
        assert!(!is_iso_date("2024-1-05"));
        assert!(!is_iso_date("05/01/2024"));
    }

    #[test]
    fn rows_where_keeps_positions() {
        let values: Vec<String> = ["a", "", "b", ""].iter().map(ToString::to_string).collect();
        assert_eq!(rows_where(&values, str::is_empty), vec![1, 3]);
    }
}

//! Minimal table-store interface over Polars frames.
//!
//! The validation core never sees where tables came from. Callers build a
//! [`DataContainer`] (or implement [`TableStore`] themselves) and hand it to
//! the engine, which only ever reads from it.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;

/// Read-only access to the tables of one submission.
///
/// Implementations must be shareable across worker threads; rules are
/// executed concurrently against the same store.
pub trait TableStore: Send + Sync {
    /// Look up a table by identifier.
    fn table(&self, id: &str) -> Option<&DataFrame>;

    /// Identifiers of every table in the store, in ascending order.
    fn table_ids(&self) -> Vec<String>;
}

/// Table identifier → frame mapping supplied by the caller.
///
/// Identifiers are normalized to lower case, so `Learners` and `learners`
/// name the same table.
#[derive(Debug, Clone, Default)]
pub struct DataContainer {
    tables: BTreeMap<String, DataFrame>,
}

impl DataContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, replacing any previous table with the same identifier.
    #[must_use]
    pub fn with_table(mut self, id: impl AsRef<str>, frame: DataFrame) -> Self {
        self.insert(id, frame);
        self
    }

    /// Add a table, returning the frame it replaced.
    pub fn insert(&mut self, id: impl AsRef<str>, frame: DataFrame) -> Option<DataFrame> {
        self.tables.insert(normalize_table_id(id.as_ref()), frame)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total number of rows across every table.
    pub fn row_count(&self) -> usize {
        self.tables.values().map(DataFrame::height).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataFrame)> {
        self.tables.iter().map(|(id, frame)| (id.as_str(), frame))
    }
}

impl TableStore for DataContainer {
    fn table(&self, id: &str) -> Option<&DataFrame> {
        self.tables.get(&normalize_table_id(id))
    }

    fn table_ids(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}

/// Canonical spelling of a table identifier.
pub fn normalize_table_id(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use polars::prelude::{Column, DataFrame};

    use super::*;

    fn frame(rows: usize) -> DataFrame {
        let values: Vec<i64> = (0..rows as i64).collect();
        DataFrame::new(vec![Column::new("id".into(), values)]).unwrap()
    }

    #[test]
    fn table_lookup_is_case_insensitive() {
        let data = DataContainer::new().with_table("Learners", frame(3));
        assert!(data.table("learners").is_some());
        assert!(data.table(" LEARNERS ").is_some());
        assert!(data.table("schools").is_none());
        assert_eq!(data.table_ids(), vec!["learners".to_string()]);
    }

    #[test]
    fn insert_replaces_and_counts_rows() {
        let mut data = DataContainer::new();
        assert!(data.insert("schools", frame(2)).is_none());
        assert!(data.insert("SCHOOLS", frame(4)).is_some());
        data.insert("learners", frame(5));
        assert_eq!(data.len(), 2);
        assert_eq!(data.row_count(), 9);
    }
}

//! Reads a directory of CSV files into a [`DataContainer`].
//!
//! Every `*.csv` file directly inside the directory becomes one table named
//! by its lower-cased file stem. All columns are read as strings so codes
//! such as `007` keep their leading zeros.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use polars::prelude::{CsvReadOptions, DataFrame, SerReader};
use rulebook_common::{DataContainer, TableStore, normalize_table_id};
use tracing::debug;

/// CSV files directly inside `dir`, sorted by file name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("data directory not found: {}", dir.display());
    }
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("read directory {}", dir.display()))?
            .path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Table id for a CSV path.
pub fn table_id(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(normalize_table_id)
        .filter(|id| !id.is_empty())
}

pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to read CSV: {}", path.display()))
}

/// Load every CSV file in `dir`.
///
/// Fails when two files map to the same table id, e.g. `Schools.csv` and
/// `schools.CSV`.
pub fn load_data_dir(dir: &Path) -> Result<DataContainer> {
    let mut container = DataContainer::new();
    for path in list_csv_files(dir)? {
        let Some(id) = table_id(&path) else {
            continue;
        };
        if container.table(&id).is_some() {
            bail!("more than one file maps to table '{id}' in {}", dir.display());
        }
        let frame = read_csv_table(&path)?;
        debug!(table = %id, rows = frame.height(), columns = frame.width(), "loaded table");
        container.insert(id, frame);
    }
    Ok(container)
}

//! Reading table columns from CSV files.
//!
//! The first record is the header. Empty or whitespace-only cells become
//! missing values; every other cell is kept verbatim.

use std::path::Path;

use anyhow::{Context, Result, bail};
use coltype_model::Column;
use csv::ReaderBuilder;

/// Every column of `path`, in header order.
pub fn read_columns(path: &Path, delimiter: char) -> Result<Vec<Column>> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("delimiter must be a single ASCII character, got {delimiter:?}"))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("read csv: {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("read header: {}", path.display()))?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.with_context(|| format!("read record: {}", path.display()))?;
        for (index, cells) in values.iter_mut().enumerate() {
            cells.push(record.get(index).and_then(cell_value));
        }
    }
    tracing::debug!(
        path = %path.display(),
        columns = headers.len(),
        rows = values.first().map_or(0, Vec::len),
        "csv loaded"
    );
    Ok(headers
        .into_iter()
        .zip(values)
        .map(|(name, cells)| Column::new(name, cells))
        .collect())
}

/// The columns named in `wanted`, in that order; all columns when empty.
pub fn select_columns(columns: Vec<Column>, wanted: &[String]) -> Result<Vec<Column>> {
    if wanted.is_empty() {
        return Ok(columns);
    }
    let mut selected = Vec::with_capacity(wanted.len());
    for name in wanted {
        match columns.iter().find(|column| column.name() == name) {
            Some(column) => selected.push(column.clone()),
            None => bail!(
                "column {name:?} not found (available: {})",
                columns
                    .iter()
                    .map(Column::name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
    Ok(selected)
}

/// The single column `name` of `path`.
pub fn read_column(path: &Path, name: &str, delimiter: char) -> Result<Column> {
    let mut selected = select_columns(read_columns(path, delimiter)?, &[name.to_string()])?;
    selected
        .pop()
        .with_context(|| format!("column {name:?} not found"))
}

fn cell_value(cell: &str) -> Option<String> {
    if cell.trim().is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

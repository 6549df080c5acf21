//! Table loading, typed column access and CSV export using Polars

use std::path::Path;

use polars::prelude::*;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::InsightError;

/// Maximum number of characters shown for a category label on a chart axis
pub const LABEL_MAX_CHARS: usize = 15;

/// Load a CSV file with a header row and check that every referenced column is present
///
/// # Arguments
/// * `path` - Path to the CSV file
/// * `required` - Column names the caller will read from the table
///
/// # Returns
/// * The loaded `DataFrame`, columns and rows in file order
pub fn load_table(path: &Path, required: &[&str]) -> crate::Result<DataFrame> {
    if !path.is_file() {
        return Err(InsightError::data_load(path, "file does not exist"));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| InsightError::data_load(path, e))?;

    require_columns(&df, &table_name(path), required)?;

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded table"
    );
    Ok(df)
}

/// Fail with `ColumnMissing` on the first referenced column absent from `df`
pub fn require_columns(df: &DataFrame, table: &str, required: &[&str]) -> crate::Result<()> {
    for column in required {
        if df.get_column_index(column).is_none() {
            return Err(InsightError::column_missing(table, *column));
        }
    }
    Ok(())
}

/// Read a numeric column of `table` as `f64` values in row order. Integer columns are coerced.
pub fn f64_values(df: &DataFrame, table: &str, name: &str) -> crate::Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| InsightError::column_missing(table, name))?;
    let values = column.cast(&DataType::Float64)?;

    values
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| value.ok_or_else(|| InsightError::invalid_cell(name, row, "numeric")))
        .collect()
}

/// Read a column of `table` as owned strings in row order.
pub fn str_values(df: &DataFrame, table: &str, name: &str) -> crate::Result<Vec<String>> {
    let column = df
        .column(name)
        .map_err(|_| InsightError::column_missing(table, name))?;
    let values = column.cast(&DataType::String)?;

    values
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value
                .map(str::to_string)
                .ok_or_else(|| InsightError::invalid_cell(name, row, "text"))
        })
        .collect()
}

/// Write `df` as CSV with a header row and no index column.
///
/// The file is written to a temporary sibling first and moved over `path`
/// once complete, so the destination is either the old file or the new one.
pub fn export_table(df: &mut DataFrame, path: &Path) -> crate::Result<()> {
    let parent = parent_dir(path);

    let mut temp_file =
        NamedTempFile::new_in(parent).map_err(|e| InsightError::export(path, e))?;

    CsvWriter::new(temp_file.as_file_mut())
        .include_header(true)
        .finish(df)
        .map_err(|e| InsightError::export(path, e))?;

    temp_file
        .persist(path)
        .map_err(|e| InsightError::export(path, e.error))?;

    debug!(path = %path.display(), rows = df.height(), "exported table");
    Ok(())
}

/// Truncate a label to at most `max_chars` characters for chart display.
///
/// Labels that already fit are returned unchanged. When a label is cut,
/// whitespace left dangling at the cut is dropped.
pub fn shorten_label(label: &str, max_chars: usize) -> String {
    match label.char_indices().nth(max_chars) {
        Some((cut, _)) => label[..cut].trim_end().to_string(),
        None => label.to_string(),
    }
}

/// Add `target` holding the shortened form of every label in `source`
pub fn with_short_labels(
    df: &mut DataFrame,
    table: &str,
    source: &str,
    target: &str,
) -> crate::Result<()> {
    let short: Vec<String> = str_values(df, table, source)?
        .iter()
        .map(|label| shorten_label(label, LABEL_MAX_CHARS))
        .collect();

    df.with_column(Series::new(target.into(), short))?;
    Ok(())
}

/// Directory a file lives in, `.` for bare file names
pub(crate) fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn table_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

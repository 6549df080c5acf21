//! Error taxonomy shared by every pipeline stage

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("failed to load table from {path}: {message}")]
    DataLoad { path: PathBuf, message: String },

    #[error("column '{column}' has a missing or non-{expected} value at row {row}")]
    InvalidCell {
        column: String,
        row: usize,
        expected: &'static str,
    },

    #[error("column '{column}' not found in {table}")]
    ColumnMissing { table: String, column: String },

    #[error("failed to render chart to {path}: {message}")]
    Render { path: PathBuf, message: String },

    #[error("failed to export table to {path}: {message}")]
    Export { path: PathBuf, message: String },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InsightError {
    pub fn data_load(path: &Path, message: impl ToString) -> Self {
        Self::DataLoad {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn column_missing(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::ColumnMissing {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn invalid_cell(column: impl Into<String>, row: usize, expected: &'static str) -> Self {
        Self::InvalidCell {
            column: column.into(),
            row,
            expected,
        }
    }

    pub fn render(path: &Path, message: impl ToString) -> Self {
        Self::Render {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn export(path: &Path, message: impl ToString) -> Self {
        Self::Export {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

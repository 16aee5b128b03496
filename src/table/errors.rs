//! # Table Errors
//!
//! Failures talking to the backing sheet store.

use thiserror::Error;

/// Result type for table store operations
pub type TableResult<T> = Result<T, TableError>;

/// Table store errors
#[derive(Debug, Clone, Error)]
pub enum TableError {
    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Malformed workbook {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Cell out of range: row {row}, column {col}")]
    OutOfRange { row: usize, col: usize },

    #[error("Named range not found: {0}")]
    RangeNotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl TableError {
    /// Stable code used in log lines
    pub fn code(&self) -> &'static str {
        match self {
            TableError::Io { .. } => "LATEWATCH_TABLE_IO",
            TableError::Malformed { .. } => "LATEWATCH_TABLE_MALFORMED",
            TableError::SheetNotFound(_) => "LATEWATCH_SHEET_NOT_FOUND",
            TableError::OutOfRange { .. } => "LATEWATCH_CELL_OUT_OF_RANGE",
            TableError::RangeNotFound(_) => "LATEWATCH_RANGE_NOT_FOUND",
            TableError::Unavailable(_) => "LATEWATCH_TABLE_UNAVAILABLE",
        }
    }

    pub(crate) fn io(path: impl Into<String>, err: std::io::Error) -> Self {
        TableError::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

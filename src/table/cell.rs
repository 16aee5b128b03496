//! Typed cell values
//!
//! Grid values arrive loosely typed from the backing store. They are mapped
//! to `CellValue` at the ingestion boundary so that validation and message
//! formatting never deal with raw JSON.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single cell of a sheet.
///
/// Serialized untagged: strings, numbers, booleans and `null` map to `Text`,
/// `Number`, `Bool` and `Empty`. Strings holding an RFC 3339 timestamp become
/// `DateTime`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Timestamp cell
    DateTime(DateTime<Utc>),
    /// Numeric cell
    Number(f64),
    /// Checkbox cell
    Bool(bool),
    /// Free text
    Text(String),
    /// Nothing entered
    #[default]
    Empty,
}

impl CellValue {
    /// Shorthand for a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// True when the cell holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) | CellValue::Bool(_) | CellValue::DateTime(_) => false,
        }
    }

    /// Display text with surrounding whitespace removed.
    pub fn trimmed(&self) -> String {
        self.to_string().trim().to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
            CellValue::DateTime(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M")),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(ts: DateTime<Utc>) -> Self {
        CellValue::DateTime(ts)
    }
}

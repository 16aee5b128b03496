//! Column schema resolution
//!
//! The late log is addressed by logical column keys. Each key has a header
//! label; resolution finds the label in the header row and records its
//! position. Matching is exact: case-sensitive, no trimming.
//!
//! Resolution is all-or-nothing. If any declared label is missing the run
//! must stop before reading a single data row.

mod errors;

pub use errors::{SchemaError, SchemaResult};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::table::CellValue;

/// Stable meaning of a column, independent of its label or position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogicalKey {
    Name,
    Date,
    Violation,
    HowLate,
    Notes,
    EmailSent,
    CoachNotified,
}

impl LogicalKey {
    /// Every declared key, in column-documentation order.
    pub const ALL: [LogicalKey; 7] = [
        LogicalKey::Name,
        LogicalKey::Date,
        LogicalKey::Violation,
        LogicalKey::HowLate,
        LogicalKey::Notes,
        LogicalKey::EmailSent,
        LogicalKey::CoachNotified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalKey::Name => "name",
            LogicalKey::Date => "date",
            LogicalKey::Violation => "violation",
            LogicalKey::HowLate => "howLate",
            LogicalKey::Notes => "notes",
            LogicalKey::EmailSent => "emailSent",
            LogicalKey::CoachNotified => "coachNotified",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header label for every logical key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnSchema {
    pub name: String,
    pub date: String,
    pub violation: String,
    pub how_late: String,
    pub notes: String,
    pub email_sent: String,
    pub coach_notified: String,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            name: "Name".to_string(),
            date: "Date".to_string(),
            violation: "Violation".to_string(),
            how_late: "How Late?".to_string(),
            notes: "Notes".to_string(),
            email_sent: "Email sent".to_string(),
            coach_notified: "Coach notified".to_string(),
        }
    }
}

impl ColumnSchema {
    /// Header label declared for `key`.
    pub fn label(&self, key: LogicalKey) -> &str {
        match key {
            LogicalKey::Name => &self.name,
            LogicalKey::Date => &self.date,
            LogicalKey::Violation => &self.violation,
            LogicalKey::HowLate => &self.how_late,
            LogicalKey::Notes => &self.notes,
            LogicalKey::EmailSent => &self.email_sent,
            LogicalKey::CoachNotified => &self.coach_notified,
        }
    }

    /// Locate every declared label in `header`.
    ///
    /// When a label occurs more than once the leftmost column wins.
    ///
    /// # Errors
    ///
    /// `SchemaError::MissingColumn` for the first key (in `LogicalKey::ALL`
    /// order) whose label is absent.
    pub fn resolve(&self, header: &[CellValue]) -> SchemaResult<ResolvedColumns> {
        let mut indices = [0usize; LogicalKey::ALL.len()];

        for key in LogicalKey::ALL {
            let label = self.label(key);
            let position = header
                .iter()
                .position(|cell| header_text(cell) == label)
                .ok_or_else(|| SchemaError::MissingColumn {
                    key,
                    label: label.to_string(),
                })?;
            indices[key.slot()] = position;
        }

        Ok(ResolvedColumns { indices })
    }
}

fn header_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Column positions for every logical key of a successfully resolved header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    indices: [usize; LogicalKey::ALL.len()],
}

impl ResolvedColumns {
    /// 0-based column index of `key`.
    pub fn index(&self, key: LogicalKey) -> usize {
        self.indices[key.slot()]
    }

    /// `(key, index)` pairs in `LogicalKey::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (LogicalKey, usize)> + '_ {
        LogicalKey::ALL.iter().map(move |k| (*k, self.index(*k)))
    }
}

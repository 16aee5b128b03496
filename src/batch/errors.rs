//! Per-row processing errors
//!
//! A row error never stops the batch. The row keeps its blank mark and is
//! picked up again by the next run.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::notify::NotifyError;
use crate::table::TableError;

/// Where in the row transition a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStage {
    ReadRule,
    Notify,
    WriteMark,
}

impl RowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStage::ReadRule => "read_rule",
            RowStage::Notify => "notify",
            RowStage::WriteMark => "write_mark",
        }
    }
}

impl fmt::Display for RowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure while resolving one row
#[derive(Debug, Clone, Error)]
pub enum RowError {
    #[error("row {row}: reading validation rule failed: {source}")]
    ReadRule {
        row: usize,
        #[source]
        source: TableError,
    },

    #[error("row {row}: sending notification failed: {source}")]
    Notify {
        row: usize,
        #[source]
        source: NotifyError,
    },

    /// `notified` is true when the message already went out.
    #[error("row {row}: writing mark failed: {source}")]
    WriteMark {
        row: usize,
        notified: bool,
        #[source]
        source: TableError,
    },
}

impl RowError {
    pub fn row(&self) -> usize {
        match self {
            RowError::ReadRule { row, .. }
            | RowError::Notify { row, .. }
            | RowError::WriteMark { row, .. } => *row,
        }
    }

    pub fn stage(&self) -> RowStage {
        match self {
            RowError::ReadRule { .. } => RowStage::ReadRule,
            RowError::Notify { .. } => RowStage::Notify,
            RowError::WriteMark { .. } => RowStage::WriteMark,
        }
    }

    /// Stable code of the underlying failure
    pub fn code(&self) -> &'static str {
        match self {
            RowError::ReadRule { source, .. } | RowError::WriteMark { source, .. } => {
                source.code()
            }
            RowError::Notify { source, .. } => source.code(),
        }
    }

    /// True when a notification went out but the row stayed unmarked.
    pub fn mark_lost(&self) -> bool {
        matches!(self, RowError::WriteMark { notified: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_error_accessors() {
        let err = RowError::Notify {
            row: 4,
            source: NotifyError::Send("refused".into()),
        };
        assert_eq!(err.row(), 4);
        assert_eq!(err.stage(), RowStage::Notify);
        assert_eq!(err.code(), "LATEWATCH_NOTIFY_SEND");
        assert!(!err.mark_lost());
        assert_eq!(
            err.to_string(),
            "row 4: sending notification failed: Failed to send: refused"
        );
    }

    #[test]
    fn test_mark_lost() {
        let err = RowError::WriteMark {
            row: 2,
            notified: true,
            source: TableError::Unavailable("down".into()),
        };
        assert!(err.mark_lost());
        assert_eq!(err.stage().as_str(), "write_mark");
    }
}

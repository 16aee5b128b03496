//! Unprocessed-row selection
//!
//! A row is eligible while its "emailSent" cell is blank. Any mark at all,
//! timestamp or sentinel, retires it. This is the only idempotence check.

use std::collections::BTreeMap;

use crate::schema::{LogicalKey, ResolvedColumns};
use crate::table::{CellValue, TableSnapshot};

static EMPTY: CellValue = CellValue::Empty;

/// One data row, keyed by logical column. Lives for a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord {
    row_number: usize,
    values: BTreeMap<LogicalKey, CellValue>,
}

impl RowRecord {
    pub fn new(row_number: usize, values: BTreeMap<LogicalKey, CellValue>) -> Self {
        Self { row_number, values }
    }

    /// 1-based physical row number
    pub fn row_number(&self) -> usize {
        self.row_number
    }

    pub fn get(&self, key: LogicalKey) -> &CellValue {
        self.values.get(&key).unwrap_or(&EMPTY)
    }

    /// Display text of a cell, trimmed.
    pub fn text(&self, key: LogicalKey) -> String {
        self.get(key).trimmed()
    }
}

/// Data rows split by their "emailSent" mark
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Rows to process, top to bottom
    pub unprocessed: Vec<RowRecord>,
    /// Row numbers that already carry a mark
    pub already_marked: Vec<usize>,
}

/// Split every data row of `snapshot` into unprocessed and already marked.
pub fn partition_rows(snapshot: &TableSnapshot, columns: &ResolvedColumns) -> Selection {
    let mark_col = columns.index(LogicalKey::EmailSent);
    let mut selection = Selection::default();

    for (row_number, cells) in snapshot.data_rows() {
        let marked = cells.get(mark_col).map_or(false, |c| !c.is_blank());
        if marked {
            selection.already_marked.push(row_number);
            continue;
        }

        let values = columns
            .iter()
            .map(|(key, col)| (key, cells.get(col).cloned().unwrap_or_default()))
            .collect();
        selection.unprocessed.push(RowRecord::new(row_number, values));
    }

    selection
}

/// Rows lacking a mark, in physical order.
pub fn select_unprocessed(snapshot: &TableSnapshot, columns: &ResolvedColumns) -> Vec<RowRecord> {
    partition_rows(snapshot, columns).unprocessed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnSchema;

    const HEADER: [&str; 7] = [
        "Name",
        "Date",
        "Violation",
        "How Late?",
        "Notes",
        "Email sent",
        "Coach notified",
    ];

    fn snapshot(rows: &[&[&str]]) -> TableSnapshot {
        let mut all: Vec<Vec<CellValue>> = vec![HEADER.iter().map(|h| CellValue::text(*h)).collect()];
        for row in rows {
            all.push(
                row.iter()
                    .map(|s| {
                        if s.is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::text(*s)
                        }
                    })
                    .collect(),
            );
        }
        TableSnapshot::new(all)
    }

    fn columns(snapshot: &TableSnapshot) -> ResolvedColumns {
        ColumnSchema::default().resolve(snapshot.header()).unwrap()
    }

    #[test]
    fn test_selects_blank_marks_in_order() {
        let snap = snapshot(&[
            &["alice", "", "", "", "", "", ""],
            &["bob", "", "", "", "", "2026-10-01 08:00", ""],
            &["carol", "", "", "", "", "   ", ""],
            &["dave", "", "", "", "", "invalid name", ""],
            &["erin"],
        ]);

        let selection = partition_rows(&snap, &columns(&snap));
        let picked: Vec<usize> = selection.unprocessed.iter().map(|r| r.row_number()).collect();

        assert_eq!(picked, vec![2, 4, 6]);
        assert_eq!(selection.already_marked, vec![3, 5]);
    }

    #[test]
    fn test_record_values() {
        let snap = snapshot(&[&["alice", "Mon", "Tardy", "5", " bus ", "", "yes"]]);
        let rows = select_unprocessed(&snap, &columns(&snap));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text(LogicalKey::Name), "alice");
        assert_eq!(rows[0].text(LogicalKey::Notes), "bus");
        assert_eq!(rows[0].get(LogicalKey::CoachNotified), &CellValue::text("yes"));
    }

    #[test]
    fn test_short_row_reads_empty() {
        let snap = snapshot(&[&["alice"]]);
        let rows = select_unprocessed(&snap, &columns(&snap));
        assert_eq!(rows[0].get(LogicalKey::Violation), &CellValue::Empty);
    }

    #[test]
    fn test_header_only() {
        let snap = snapshot(&[]);
        assert!(select_unprocessed(&snap, &columns(&snap)).is_empty());
    }
}

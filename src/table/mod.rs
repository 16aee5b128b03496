//! Sheet store abstraction
//!
//! The batch never talks to a concrete spreadsheet. It sees a `TableStore`
//! (one sheet) obtained from a `Workbook` (a set of named sheets).
//!
//! Coordinates: rows are 1-based physical row numbers, so the header is row
//! 1 and the first data row is row 2. Columns are 0-based indices, as
//! produced by the schema resolver.

mod cell;
mod errors;
mod memory;
mod workbook;

pub use cell::CellValue;
pub use errors::{TableError, TableResult};
pub use memory::{MemoryTable, MemoryWorkbook};
pub use workbook::{FileSheet, WorkbookFile};

use chrono::{DateTime, Utc};

use crate::validation::ValidationRule;

/// Physical row number of the header row.
pub const HEADER_ROW: usize = 1;

/// A full read of one sheet, taken once per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSnapshot {
    rows: Vec<Vec<CellValue>>,
}

impl TableSnapshot {
    /// Build a snapshot from raw rows. Trailing rows that are entirely
    /// blank are dropped, matching a spreadsheet's used data range.
    pub fn new(mut rows: Vec<Vec<CellValue>>) -> Self {
        while rows
            .last()
            .map(|row| row.iter().all(CellValue::is_blank))
            .unwrap_or(false)
        {
            rows.pop();
        }
        Self { rows }
    }

    /// Header row, empty when the sheet has no rows at all.
    pub fn header(&self) -> &[CellValue] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Data rows with their physical row numbers, top to bottom.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[CellValue])> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, row)| (idx + 1, row.as_slice()))
    }

    /// Number of data rows (header excluded).
    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }
}

/// One sheet of the backing store.
pub trait TableStore {
    /// Read every row including the header.
    fn read_grid(&self) -> TableResult<TableSnapshot>;

    /// Read one cell. Cells past the end of a short row read as `Empty`.
    fn read_cell(&self, row: usize, col: usize) -> TableResult<CellValue>;

    /// Overwrite one cell.
    fn write_cell(&mut self, row: usize, col: usize, value: CellValue) -> TableResult<()>;

    /// Data-validation rule attached to a cell, if any.
    fn validation_rule(&self, row: usize, col: usize) -> TableResult<Option<ValidationRule>>;

    /// Flatten a named range into its cell values.
    fn resolve_range(&self, reference: &str) -> TableResult<Vec<CellValue>>;

    /// Last modification time of the backing resource.
    fn last_modified(&self) -> TableResult<DateTime<Utc>>;
}

impl<T: TableStore + ?Sized> TableStore for &mut T {
    fn read_grid(&self) -> TableResult<TableSnapshot> {
        (**self).read_grid()
    }

    fn read_cell(&self, row: usize, col: usize) -> TableResult<CellValue> {
        (**self).read_cell(row, col)
    }

    fn write_cell(&mut self, row: usize, col: usize, value: CellValue) -> TableResult<()> {
        (**self).write_cell(row, col, value)
    }

    fn validation_rule(&self, row: usize, col: usize) -> TableResult<Option<ValidationRule>> {
        (**self).validation_rule(row, col)
    }

    fn resolve_range(&self, reference: &str) -> TableResult<Vec<CellValue>> {
        (**self).resolve_range(reference)
    }

    fn last_modified(&self) -> TableResult<DateTime<Utc>> {
        (**self).last_modified()
    }
}

/// A set of sheets addressed by name.
pub trait Workbook {
    /// Sheet handle type
    type Sheet<'a>: TableStore
    where
        Self: 'a;

    /// Open a sheet by name; `Ok(None)` when no such sheet exists.
    fn sheet(&mut self, name: &str) -> TableResult<Option<Self::Sheet<'_>>>;
}

/// Convert a 1-based physical row number to a vector index.
pub(crate) fn row_index(row: usize, col: usize) -> TableResult<usize> {
    row.checked_sub(1)
        .ok_or(TableError::OutOfRange { row, col })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_drops_trailing_blank_rows() {
        let snapshot = TableSnapshot::new(vec![
            vec![CellValue::text("Name")],
            vec![CellValue::text("alice")],
            vec![CellValue::Empty],
            vec![CellValue::text("  ")],
        ]);

        assert_eq!(snapshot.data_row_count(), 1);
    }

    #[test]
    fn test_snapshot_keeps_interior_blank_rows() {
        let snapshot = TableSnapshot::new(vec![
            vec![CellValue::text("Name")],
            vec![CellValue::Empty],
            vec![CellValue::text("bob")],
        ]);

        let rows: Vec<usize> = snapshot.data_rows().map(|(n, _)| n).collect();
        assert_eq!(rows, vec![2, 3]);
    }

    #[test]
    fn test_empty_snapshot_has_no_header() {
        let snapshot = TableSnapshot::new(Vec::new());
        assert!(snapshot.header().is_empty());
        assert_eq!(snapshot.data_row_count(), 0);
    }

    #[test]
    fn test_row_index_rejects_zero() {
        assert!(row_index(0, 1).is_err());
        assert_eq!(row_index(2, 1).unwrap(), 1);
    }
}

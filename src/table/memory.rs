//! In-memory sheet store
//!
//! Used by tests and by embedders that already hold the grid in memory.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use super::{row_index, CellValue, TableError, TableResult, TableSnapshot, TableStore, Workbook};
use crate::validation::ValidationRule;

/// A single in-memory sheet.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    rows: Vec<Vec<CellValue>>,
    column_rules: BTreeMap<usize, ValidationRule>,
    named_ranges: BTreeMap<String, Vec<CellValue>>,
    last_modified: Option<DateTime<Utc>>,
    failing_rows: BTreeSet<usize>,
    writes: Vec<(usize, usize, CellValue)>,
}

impl MemoryTable {
    /// Create a sheet from header and data rows.
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Create a sheet from string rows; blank strings become `Empty`.
    pub fn from_strings(rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|s| {
                        if s.is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::text(*s)
                        }
                    })
                    .collect()
            })
            .collect();
        Self::new(rows)
    }

    /// Attach a validation rule to every cell of a column.
    pub fn with_column_rule(mut self, col: usize, rule: ValidationRule) -> Self {
        self.column_rules.insert(col, rule);
        self
    }

    /// Define a named range.
    pub fn with_named_range(mut self, name: &str, values: Vec<CellValue>) -> Self {
        self.named_ranges.insert(name.to_string(), values);
        self
    }

    /// Set the modification time reported by `last_modified`.
    /// Without one, `last_modified` fails.
    pub fn with_last_modified(mut self, ts: DateTime<Utc>) -> Self {
        self.last_modified = Some(ts);
        self
    }

    /// Make every write to `row` fail.
    pub fn fail_writes_on(mut self, row: usize) -> Self {
        self.failing_rows.insert(row);
        self
    }

    /// Every successful write, in order.
    pub fn writes(&self) -> &[(usize, usize, CellValue)] {
        &self.writes
    }

    /// Current contents of a cell; `Empty` when out of range.
    pub fn cell(&self, row: usize, col: usize) -> CellValue {
        self.read_cell(row, col).unwrap_or_default()
    }
}

impl TableStore for MemoryTable {
    fn read_grid(&self) -> TableResult<TableSnapshot> {
        Ok(TableSnapshot::new(self.rows.clone()))
    }

    fn read_cell(&self, row: usize, col: usize) -> TableResult<CellValue> {
        let idx = row_index(row, col)?;
        let cells = self.rows.get(idx).ok_or(TableError::OutOfRange { row, col })?;
        Ok(cells.get(col).cloned().unwrap_or_default())
    }

    fn write_cell(&mut self, row: usize, col: usize, value: CellValue) -> TableResult<()> {
        if self.failing_rows.contains(&row) {
            return Err(TableError::Unavailable(format!("write to row {} refused", row)));
        }
        let idx = row_index(row, col)?;
        let cells = self
            .rows
            .get_mut(idx)
            .ok_or(TableError::OutOfRange { row, col })?;
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value.clone();
        self.writes.push((row, col, value));
        Ok(())
    }

    fn validation_rule(&self, _row: usize, col: usize) -> TableResult<Option<ValidationRule>> {
        Ok(self.column_rules.get(&col).cloned())
    }

    fn resolve_range(&self, reference: &str) -> TableResult<Vec<CellValue>> {
        self.named_ranges
            .get(reference)
            .cloned()
            .ok_or_else(|| TableError::RangeNotFound(reference.to_string()))
    }

    fn last_modified(&self) -> TableResult<DateTime<Utc>> {
        self.last_modified
            .ok_or_else(|| TableError::Unavailable("modification time unknown".into()))
    }
}

/// Named in-memory sheets.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: BTreeMap<String, MemoryTable>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a sheet.
    pub fn with_sheet(mut self, name: &str, table: MemoryTable) -> Self {
        self.sheets.insert(name.to_string(), table);
        self
    }

    /// Borrow a sheet for inspection.
    pub fn get(&self, name: &str) -> Option<&MemoryTable> {
        self.sheets.get(name)
    }
}

impl Workbook for MemoryWorkbook {
    type Sheet<'a> = &'a mut MemoryTable;

    fn sheet(&mut self, name: &str) -> TableResult<Option<Self::Sheet<'_>>> {
        Ok(self.sheets.get_mut(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_past_short_row_is_empty() {
        let table = MemoryTable::from_strings(&[&["Name", "Email sent"], &["alice"]]);
        assert_eq!(table.read_cell(2, 1).unwrap(), CellValue::Empty);
    }

    #[test]
    fn test_write_extends_short_row() {
        let mut table = MemoryTable::from_strings(&[&["Name", "Email sent"], &["alice"]]);
        table.write_cell(2, 1, CellValue::text("x")).unwrap();

        assert_eq!(table.cell(2, 1), CellValue::text("x"));
        assert_eq!(table.writes().len(), 1);
    }

    #[test]
    fn test_write_out_of_range() {
        let mut table = MemoryTable::from_strings(&[&["Name"]]);
        assert!(matches!(
            table.write_cell(5, 0, CellValue::Empty),
            Err(TableError::OutOfRange { row: 5, col: 0 })
        ));
    }

    #[test]
    fn test_failing_row() {
        let mut table = MemoryTable::from_strings(&[&["Name"], &["a"]]).fail_writes_on(2);
        assert!(table.write_cell(2, 0, CellValue::Empty).is_err());
        assert!(table.writes().is_empty());
    }

    #[test]
    fn test_missing_range_and_timestamp() {
        let table = MemoryTable::default();
        assert!(matches!(
            table.resolve_range("Roster"),
            Err(TableError::RangeNotFound(_))
        ));
        assert!(table.last_modified().is_err());
    }

    #[test]
    fn test_workbook_lookup() {
        let mut book = MemoryWorkbook::new().with_sheet("October 2026", MemoryTable::default());
        assert!(book.sheet("October 2026").unwrap().is_some());
        assert!(book.sheet("November 2026").unwrap().is_none());
    }
}

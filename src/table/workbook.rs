//! JSON workbook file
//!
//! A workbook is a single JSON document:
//!
//! ```json
//! {
//!   "sheets": {
//!     "October 2026": {
//!       "rows": [["Name", "Date"], ["alice", "2026-10-01T08:10:00Z"]],
//!       "validations": [{ "column": 0, "rule": { "kind": "range", "reference": "Roster" } }]
//!     }
//!   },
//!   "named_ranges": { "Roster": ["alice", "bob"] }
//! }
//! ```
//!
//! Range references that are not named ranges are read as A1 notation
//! against a sheet of the same workbook, e.g. `Staff!A2:A`.
//!
//! Every cell write reloads the file, patches one cell and commits the whole
//! document with write-temp, fsync, rename.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{row_index, CellValue, TableError, TableResult, TableSnapshot, TableStore, Workbook};
use crate::validation::ValidationRule;

/// On-disk workbook document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkbookDoc {
    #[serde(default)]
    pub sheets: BTreeMap<String, SheetDoc>,

    #[serde(default)]
    pub named_ranges: BTreeMap<String, Vec<CellValue>>,
}

/// One sheet inside a workbook document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetDoc {
    #[serde(default)]
    pub rows: Vec<Vec<CellValue>>,

    #[serde(default)]
    pub validations: Vec<ColumnRule>,
}

/// Validation rule applied to every data cell of a column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRule {
    pub column: usize,
    pub rule: ValidationRule,
}

impl WorkbookDoc {
    fn load(path: &Path) -> TableResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| TableError::io(path.display().to_string(), e))?;
        serde_json::from_str(&content).map_err(|e| TableError::Malformed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn save_atomic(&self, path: &Path) -> TableResult<()> {
        let display = path.display().to_string();
        let content = serde_json::to_string_pretty(self).map_err(|e| TableError::Malformed {
            path: display.clone(),
            reason: e.to_string(),
        })?;

        let temp_path = temp_path_for(path);
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| TableError::io(temp_path.display().to_string(), e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| TableError::io(temp_path.display().to_string(), e))?;
        file.sync_all()
            .map_err(|e| TableError::io(temp_path.display().to_string(), e))?;

        fs::rename(&temp_path, path).map_err(|e| TableError::io(display, e))?;

        if let Some(parent) = path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }

    fn sheet(&self, name: &str) -> TableResult<&SheetDoc> {
        self.sheets
            .get(name)
            .ok_or_else(|| TableError::SheetNotFound(name.to_string()))
    }

    fn resolve(&self, reference: &str) -> TableResult<Vec<CellValue>> {
        if let Some(values) = self.named_ranges.get(reference) {
            return Ok(values.clone());
        }

        let area = A1Range::parse(reference)
            .ok_or_else(|| TableError::RangeNotFound(reference.to_string()))?;
        let sheet = self.sheet(&area.sheet)?;

        let last_row = area.end_row.unwrap_or(sheet.rows.len());
        let mut values = Vec::new();
        for row in area.start_row..=last_row {
            let cells = match sheet.rows.get(row - 1) {
                Some(cells) => cells,
                None => break,
            };
            for col in area.start_col..=area.end_col {
                values.push(cells.get(col).cloned().unwrap_or_default());
            }
        }
        Ok(values)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// `Sheet!A2:B10`, `Sheet!A2:A` or `Sheet!C3`
#[derive(Debug, PartialEq)]
struct A1Range {
    sheet: String,
    start_col: usize,
    start_row: usize,
    end_col: usize,
    end_row: Option<usize>,
}

impl A1Range {
    fn parse(reference: &str) -> Option<Self> {
        let (sheet, area) = reference.rsplit_once('!')?;
        let sheet = sheet.trim_matches('\'');
        let (start, end) = match area.split_once(':') {
            Some((start, end)) => (start, Some(end)),
            None => (area, None),
        };

        let (start_col, start_row) = parse_a1_cell(start)?;
        let start_row = start_row?;
        let (end_col, end_row) = match end {
            Some(end) => parse_a1_cell(end)?,
            None => (start_col, Some(start_row)),
        };

        if sheet.is_empty() || end_col < start_col || end_row.map_or(false, |r| r < start_row) {
            return None;
        }

        Some(Self {
            sheet: sheet.to_string(),
            start_col,
            start_row,
            end_col,
            end_row,
        })
    }
}

/// Widest sheet addressable by A1 letters (`ZZZ`).
const MAX_COLUMNS: usize = 18_278;

/// Split `AB12` into (column index, row number). The row is optional.
fn parse_a1_cell(cell: &str) -> Option<(usize, Option<usize>)> {
    let letters: String = cell.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    if letters.is_empty() {
        return None;
    }
    let digits = &cell[letters.len()..];

    let width = letters
        .to_ascii_uppercase()
        .bytes()
        .try_fold(0usize, |acc, b| {
            acc.checked_mul(26)?.checked_add((b - b'A' + 1) as usize)
        })
        .filter(|w| *w <= MAX_COLUMNS)?;
    let col = width - 1;

    let row = if digits.is_empty() {
        None
    } else {
        match digits.parse::<usize>() {
            Ok(0) | Err(_) => return None,
            Ok(n) => Some(n),
        }
    };
    Some((col, row))
}

/// A workbook stored as one JSON file.
#[derive(Debug, Clone)]
pub struct WorkbookFile {
    path: PathBuf,
}

impl WorkbookFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Workbook for WorkbookFile {
    type Sheet<'a> = FileSheet;

    fn sheet(&mut self, name: &str) -> TableResult<Option<FileSheet>> {
        let doc = WorkbookDoc::load(&self.path)?;
        if !doc.sheets.contains_key(name) {
            return Ok(None);
        }
        Ok(Some(FileSheet {
            path: self.path.clone(),
            sheet: name.to_string(),
            doc,
        }))
    }
}

/// One sheet of a `WorkbookFile`, read when opened.
#[derive(Debug, Clone)]
pub struct FileSheet {
    path: PathBuf,
    sheet: String,
    doc: WorkbookDoc,
}

impl FileSheet {
    fn rows(&self) -> TableResult<&Vec<Vec<CellValue>>> {
        Ok(&self.doc.sheet(&self.sheet)?.rows)
    }
}

fn patch_cell(
    doc: &mut WorkbookDoc,
    sheet: &str,
    row: usize,
    col: usize,
    value: CellValue,
) -> TableResult<()> {
    let idx = row_index(row, col)?;
    let sheet = doc
        .sheets
        .get_mut(sheet)
        .ok_or_else(|| TableError::SheetNotFound(sheet.to_string()))?;
    let cells = sheet
        .rows
        .get_mut(idx)
        .ok_or(TableError::OutOfRange { row, col })?;
    if cells.len() <= col {
        cells.resize(col + 1, CellValue::Empty);
    }
    cells[col] = value;
    Ok(())
}

impl TableStore for FileSheet {
    fn read_grid(&self) -> TableResult<TableSnapshot> {
        Ok(TableSnapshot::new(self.rows()?.clone()))
    }

    fn read_cell(&self, row: usize, col: usize) -> TableResult<CellValue> {
        let idx = row_index(row, col)?;
        let cells = self
            .rows()?
            .get(idx)
            .ok_or(TableError::OutOfRange { row, col })?;
        Ok(cells.get(col).cloned().unwrap_or_default())
    }

    fn write_cell(&mut self, row: usize, col: usize, value: CellValue) -> TableResult<()> {
        let mut fresh = WorkbookDoc::load(&self.path)?;
        patch_cell(&mut fresh, &self.sheet, row, col, value.clone())?;
        fresh.save_atomic(&self.path)?;

        patch_cell(&mut self.doc, &self.sheet, row, col, value)
    }

    fn validation_rule(&self, row: usize, col: usize) -> TableResult<Option<ValidationRule>> {
        if row <= super::HEADER_ROW {
            return Ok(None);
        }
        let sheet = self.doc.sheet(&self.sheet)?;
        Ok(sheet
            .validations
            .iter()
            .find(|v| v.column == col)
            .map(|v| v.rule.clone()))
    }

    fn resolve_range(&self, reference: &str) -> TableResult<Vec<CellValue>> {
        self.doc.resolve(reference)
    }

    fn last_modified(&self) -> TableResult<DateTime<Utc>> {
        let display = self.path.display().to_string();
        let modified = fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|e| TableError::io(display, e))?;
        Ok(DateTime::<Utc>::from(modified))
    }
}

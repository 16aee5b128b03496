//! Row state transition
//!
//! `Unprocessed -> Invalid | Notified`. Both targets are terminal. Each row
//! gets at most one notification and at most one cell write per run; the
//! notification is sent before the timestamp is written.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::RowError;
use super::selector::RowRecord;
use super::BatchConfig;
use crate::notify::{Notification, Notifier};
use crate::observability::{Event, RunLog};
use crate::schema::{LogicalKey, ResolvedColumns};
use crate::table::{CellValue, TableStore};
use crate::validation::{check_identity, FAIL_OPEN};

/// How a row was resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProcessingOutcome {
    /// Notification sent, timestamp written
    Notified { at: DateTime<Utc> },
    /// Sentinel written, nothing sent
    MarkedInvalid,
    /// Already carried a mark before the run
    Skipped,
}

/// Applies the transition to the rows of one run.
pub struct RowProcessor<'a, N: Notifier + ?Sized> {
    config: &'a BatchConfig,
    columns: ResolvedColumns,
    notifier: &'a N,
    log: &'a RunLog,
    now: DateTime<Utc>,
}

impl<'a, N: Notifier + ?Sized> RowProcessor<'a, N> {
    pub fn new(
        config: &'a BatchConfig,
        columns: ResolvedColumns,
        notifier: &'a N,
        log: &'a RunLog,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            config,
            columns,
            notifier,
            log,
            now,
        }
    }

    /// Resolve one unprocessed row.
    ///
    /// # Errors
    ///
    /// `RowError` when the rule cannot be read, the notification fails, or
    /// the mark cannot be written. The row then keeps its blank mark.
    pub fn process<S: TableStore + ?Sized>(
        &self,
        store: &mut S,
        record: &RowRecord,
    ) -> Result<ProcessingOutcome, RowError> {
        let row = record.row_number();
        let name_col = self.columns.index(LogicalKey::Name);
        let mark_col = self.columns.index(LogicalKey::EmailSent);

        let rule = store
            .validation_rule(row, name_col)
            .map_err(|source| RowError::ReadRule { row, source })?;

        let identity = record.text(LogicalKey::Name);
        let admitted = check_identity(rule.as_ref(), &identity, &*store).unwrap_or_else(|e| {
            let row_text = row.to_string();
            self.log.emit(
                Event::RangeResolutionFailed,
                &[
                    ("code", e.code()),
                    ("error", e.to_string().as_str()),
                    ("row", row_text.as_str()),
                ],
            );
            FAIL_OPEN
        });

        if !admitted {
            store
                .write_cell(row, mark_col, CellValue::text(&self.config.invalid_sentinel))
                .map_err(|source| RowError::WriteMark {
                    row,
                    notified: false,
                    source,
                })?;
            return Ok(ProcessingOutcome::MarkedInvalid);
        }

        let notification =
            Notification::from_row(record, &self.config.email_domain, &self.config.subject);
        self.notifier
            .send(&notification)
            .map_err(|source| RowError::Notify { row, source })?;

        store
            .write_cell(row, mark_col, CellValue::DateTime(self.now))
            .map_err(|source| RowError::WriteMark {
                row,
                notified: true,
                source,
            })?;

        Ok(ProcessingOutcome::Notified { at: self.now })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MockNotifier;
    use crate::schema::ColumnSchema;
    use crate::table::MemoryTable;
    use crate::validation::ValidationRule;
    use chrono::TimeZone;

    const HEADER: &[&str] = &[
        "Name",
        "Date",
        "Violation",
        "How Late?",
        "Notes",
        "Email sent",
        "Coach notified",
    ];

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn record(table: &MemoryTable, row: usize) -> RowRecord {
        let snapshot = table.read_grid().unwrap();
        let columns = ColumnSchema::default().resolve(snapshot.header()).unwrap();
        crate::batch::select_unprocessed(&snapshot, &columns)
            .into_iter()
            .find(|r| r.row_number() == row)
            .unwrap()
    }

    fn run_one(
        table: &mut MemoryTable,
        notifier: &MockNotifier,
        row: usize,
    ) -> Result<ProcessingOutcome, RowError> {
        let config = BatchConfig::new("school.org");
        let columns = ColumnSchema::default()
            .resolve(table.read_grid().unwrap().header())
            .unwrap();
        let log = RunLog::new("test");
        let rec = record(table, row);
        RowProcessor::new(&config, columns, notifier, &log, now()).process(table, &rec)
    }

    #[test]
    fn test_admitted_row_is_notified_and_stamped() {
        let mut table = MemoryTable::from_strings(&[HEADER, &["jdoe", "Mon", "Tardy"]]);
        let notifier = MockNotifier::new();

        let outcome = run_one(&mut table, &notifier, 2).unwrap();

        assert_eq!(outcome, ProcessingOutcome::Notified { at: now() });
        assert_eq!(notifier.sent_count(), 1);
        assert_eq!(notifier.sent()[0].to, "jdoe@school.org");
        assert_eq!(table.cell(2, 5), CellValue::DateTime(now()));
    }

    #[test]
    fn test_rejected_row_gets_sentinel() {
        let mut table = MemoryTable::from_strings(&[HEADER, &["Carol"]])
            .with_column_rule(0, ValidationRule::list(["Alice", "Bob"]));
        let notifier = MockNotifier::new();

        let outcome = run_one(&mut table, &notifier, 2).unwrap();

        assert_eq!(outcome, ProcessingOutcome::MarkedInvalid);
        assert_eq!(notifier.sent_count(), 0);
        assert_eq!(table.cell(2, 5), CellValue::text("invalid name"));
    }

    #[test]
    fn test_blank_name_gets_sentinel() {
        let mut table = MemoryTable::from_strings(&[HEADER, &["", "Mon"]]);
        let notifier = MockNotifier::new();

        assert_eq!(
            run_one(&mut table, &notifier, 2).unwrap(),
            ProcessingOutcome::MarkedInvalid
        );
        assert_eq!(notifier.sent_count(), 0);
    }

    #[test]
    fn test_unresolvable_range_admits() {
        let mut table = MemoryTable::from_strings(&[HEADER, &["zed"]])
            .with_column_rule(0, ValidationRule::range("Nowhere"));
        let notifier = MockNotifier::new();

        assert!(matches!(
            run_one(&mut table, &notifier, 2).unwrap(),
            ProcessingOutcome::Notified { .. }
        ));
        assert_eq!(notifier.sent_count(), 1);
    }

    #[test]
    fn test_send_failure_leaves_row_blank() {
        let mut table = MemoryTable::from_strings(&[HEADER, &["jdoe"]]);
        let notifier = MockNotifier::new().failing_for("jdoe@school.org");

        let err = run_one(&mut table, &notifier, 2).unwrap_err();

        assert!(matches!(err, RowError::Notify { row: 2, .. }));
        assert!(table.writes().is_empty());
    }

    #[test]
    fn test_write_failure_after_send_is_mark_lost() {
        let mut table = MemoryTable::from_strings(&[HEADER, &["jdoe"]]).fail_writes_on(2);
        let notifier = MockNotifier::new();

        let err = run_one(&mut table, &notifier, 2).unwrap_err();

        assert!(err.mark_lost());
        assert_eq!(notifier.sent_count(), 1);
    }
}

//! The late-log batch
//!
//! One run: recency guard (guarded runs only), snapshot, schema resolution,
//! selection, then the row transition for every unprocessed row.
//!
//! # Guarantees
//!
//! - The sheet is read once; rows are never re-read mid-run.
//! - An unresolved schema or a missing sheet ends the run before any write.
//! - A failing row is logged and left blank; later rows still run.
//! - A second run with no edits in between notifies nobody.

mod errors;
mod processor;
mod recency;
mod selector;

pub use errors::{RowError, RowStage};
pub use processor::{ProcessingOutcome, RowProcessor};
pub use recency::{RecencyGuard, RecencyVerdict};
pub use selector::{partition_rows, select_unprocessed, RowRecord, Selection};

use chrono::{DateTime, Duration, Local, Utc};
use serde::Serialize;

use crate::notify::Notifier;
use crate::observability::{Event, RunLog};
use crate::schema::ColumnSchema;
use crate::table::{TableStore, Workbook};

/// Sentinel written into the mark column of rejected rows.
pub const DEFAULT_INVALID_SENTINEL: &str = "invalid name";

/// Trailing window of the recency guard, in minutes.
pub const DEFAULT_RECENCY_WINDOW_MINUTES: i64 = 10;

/// Default chrono format naming this period's sheet.
pub const DEFAULT_SHEET_NAME_FORMAT: &str = "%B %Y";

/// Default subject line of reminders.
pub const DEFAULT_SUBJECT: &str = "Late arrival recorded";

/// Immutable settings of a batch.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub columns: ColumnSchema,
    pub invalid_sentinel: String,
    pub recency_window: Duration,
    pub sheet_name_format: String,
    pub email_domain: String,
    pub subject: String,
}

impl BatchConfig {
    /// Defaults for everything but the address domain.
    pub fn new(email_domain: impl Into<String>) -> Self {
        Self {
            columns: ColumnSchema::default(),
            invalid_sentinel: DEFAULT_INVALID_SENTINEL.to_string(),
            recency_window: Duration::minutes(DEFAULT_RECENCY_WINDOW_MINUTES),
            sheet_name_format: DEFAULT_SHEET_NAME_FORMAT.to_string(),
            email_domain: email_domain.into(),
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }

    /// Name of the sheet covering `now`, in local time.
    pub fn sheet_name_for(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&Local)
            .format(&self.sheet_name_format)
            .to_string()
    }
}

/// Whether the recency guard is consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Guarded,
    Unconditional,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Guarded => "guarded",
            RunMode::Unconditional => "unconditional",
        }
    }
}

/// Final state of one row in a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowStatus {
    Resolved(ProcessingOutcome),
    Failed { stage: RowStage, error: String },
}

/// One line of a run report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowReport {
    pub row: usize,
    #[serde(flatten)]
    pub status: RowStatus,
}

/// What a completed run did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub sheet: String,
    pub notified: usize,
    pub marked_invalid: usize,
    pub skipped: usize,
    pub failed: usize,
    pub rows: Vec<RowReport>,
}

impl RunReport {
    fn record(&mut self, row: usize, status: RowStatus) {
        match &status {
            RowStatus::Resolved(ProcessingOutcome::Notified { .. }) => self.notified += 1,
            RowStatus::Resolved(ProcessingOutcome::MarkedInvalid) => self.marked_invalid += 1,
            RowStatus::Resolved(ProcessingOutcome::Skipped) => self.skipped += 1,
            RowStatus::Failed { .. } => self.failed += 1,
        }
        self.rows.push(RowReport { row, status });
    }

    /// Status of a given row, if the row was a data row of the run.
    pub fn status_of(&self, row: usize) -> Option<&RowStatus> {
        self.rows.iter().find(|r| r.row == row).map(|r| &r.status)
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Guarded run saw a recent edit and did nothing
    SkippedRecentEdit {
        sheet: String,
        last_modified: DateTime<Utc>,
    },
    /// This period's sheet does not exist
    SheetMissing { sheet: String },
    /// The sheet could not be opened or read
    SheetUnreadable { sheet: String, error: String },
    /// A declared column is missing from the header
    SchemaUnresolved { sheet: String, missing: String },
    /// Rows were processed
    Completed(RunReport),
}

impl RunOutcome {
    /// The report of a completed run
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// Runs the late-log batch against a store with a notifier.
pub struct Batch<N: Notifier> {
    config: BatchConfig,
    notifier: N,
}

impl<N: Notifier> Batch<N> {
    pub fn new(config: BatchConfig, notifier: N) -> Self {
        Self { config, notifier }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Run against this period's sheet unless it was edited recently.
    pub fn run_guarded<W: Workbook>(&self, workbook: &mut W, now: DateTime<Utc>) -> RunOutcome {
        self.run_period(workbook, RunMode::Guarded, now)
    }

    /// Run against this period's sheet, ignoring recent edits.
    pub fn run_unconditional<W: Workbook>(
        &self,
        workbook: &mut W,
        now: DateTime<Utc>,
    ) -> RunOutcome {
        self.run_period(workbook, RunMode::Unconditional, now)
    }

    fn run_period<W: Workbook>(
        &self,
        workbook: &mut W,
        mode: RunMode,
        now: DateTime<Utc>,
    ) -> RunOutcome {
        let sheet_name = self.config.sheet_name_for(now);

        match workbook.sheet(&sheet_name) {
            Ok(Some(mut sheet)) => self.run_sheet(&sheet_name, &mut sheet, mode, now),
            Ok(None) => {
                RunLog::new(sheet_name.as_str()).emit(Event::SheetMissing, &[]);
                RunOutcome::SheetMissing { sheet: sheet_name }
            }
            Err(e) => {
                RunLog::new(sheet_name.as_str()).emit(
                    Event::SheetUnreadable,
                    &[("code", e.code()), ("error", e.to_string().as_str())],
                );
                RunOutcome::SheetUnreadable {
                    sheet: sheet_name,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Run against one already-selected sheet.
    pub fn run_sheet<S: TableStore + ?Sized>(
        &self,
        sheet_name: &str,
        store: &mut S,
        mode: RunMode,
        now: DateTime<Utc>,
    ) -> RunOutcome {
        let log = RunLog::new(sheet_name);
        log.emit(Event::RunStart, &[("mode", mode.as_str())]);

        if mode == RunMode::Guarded {
            let guard = RecencyGuard::new(self.config.recency_window);
            match guard.check(&*store, now) {
                Ok(RecencyVerdict::RecentEdit(last_modified)) => {
                    log.emit(
                        Event::RunSkippedRecentEdit,
                        &[("last_modified", last_modified.to_rfc3339().as_str())],
                    );
                    return RunOutcome::SkippedRecentEdit {
                        sheet: sheet_name.to_string(),
                        last_modified,
                    };
                }
                Ok(RecencyVerdict::Clear) => {}
                Err(e) => log.emit(
                    Event::RecencyCheckFailed,
                    &[("code", e.code()), ("error", e.to_string().as_str())],
                ),
            }
        }

        let snapshot = match store.read_grid() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log.emit(
                    Event::SheetUnreadable,
                    &[("code", e.code()), ("error", e.to_string().as_str())],
                );
                return RunOutcome::SheetUnreadable {
                    sheet: sheet_name.to_string(),
                    error: e.to_string(),
                };
            }
        };

        let columns = match self.config.columns.resolve(snapshot.header()) {
            Ok(columns) => columns,
            Err(e) => {
                log.emit(
                    Event::SchemaUnresolved,
                    &[("code", e.code()), ("missing", e.label())],
                );
                return RunOutcome::SchemaUnresolved {
                    sheet: sheet_name.to_string(),
                    missing: e.label().to_string(),
                };
            }
        };

        let selection = partition_rows(&snapshot, &columns);
        log.emit(
            Event::RowsSelected,
            &[
                ("unprocessed", selection.unprocessed.len().to_string().as_str()),
                ("already_marked", selection.already_marked.len().to_string().as_str()),
            ],
        );

        let mut report = RunReport {
            run_id: log.run_id().to_string(),
            sheet: sheet_name.to_string(),
            ..RunReport::default()
        };
        for row in &selection.already_marked {
            report.record(*row, RowStatus::Resolved(ProcessingOutcome::Skipped));
        }

        let processor = RowProcessor::new(&self.config, columns, &self.notifier, &log, now);
        for record in &selection.unprocessed {
            let row_text = record.row_number().to_string();
            match processor.process(&mut *store, record) {
                Ok(outcome) => {
                    let event = match outcome {
                        ProcessingOutcome::MarkedInvalid => Event::RowMarkedInvalid,
                        _ => Event::RowNotified,
                    };
                    log.emit(event, &[("row", row_text.as_str())]);
                    report.record(record.row_number(), RowStatus::Resolved(outcome));
                }
                Err(e) => {
                    let event = if e.mark_lost() {
                        Event::RowMarkLost
                    } else {
                        Event::RowFailed
                    };
                    log.emit(
                        event,
                        &[
                            ("code", e.code()),
                            ("error", e.to_string().as_str()),
                            ("row", row_text.as_str()),
                            ("stage", e.stage().as_str()),
                        ],
                    );
                    report.record(
                        record.row_number(),
                        RowStatus::Failed {
                            stage: e.stage(),
                            error: e.to_string(),
                        },
                    );
                }
            }
        }

        report.rows.sort_by_key(|r| r.row);
        log.emit(
            Event::RunComplete,
            &[
                ("failed", report.failed.to_string().as_str()),
                ("marked_invalid", report.marked_invalid.to_string().as_str()),
                ("notified", report.notified.to_string().as_str()),
                ("skipped", report.skipped.to_string().as_str()),
            ],
        );
        RunOutcome::Completed(report)
    }
}

//! Observable events of a latewatch run
//!
//! Events are explicit and typed; every log line names exactly one.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded and validated
    ConfigLoaded,

    // Run lifecycle
    /// A run begins
    RunStart,
    /// Guarded run skipped because the sheet was edited recently
    RunSkippedRecentEdit,
    /// Modification time unavailable, run proceeds
    RecencyCheckFailed,
    /// This period's sheet does not exist
    SheetMissing,
    /// Sheet could not be read
    SheetUnreadable,
    /// Header row lacks a declared column
    SchemaUnresolved,
    /// Unprocessed rows selected
    RowsSelected,
    /// A run finished
    RunComplete,

    // Rows
    /// Notification sent and timestamp written
    RowNotified,
    /// Sentinel written, nothing sent
    RowMarkedInvalid,
    /// Row left unprocessed after an error
    RowFailed,
    /// Notification sent but the mark could not be written
    RowMarkLost,
    /// Range rule could not be resolved, name admitted
    RangeResolutionFailed,

    // Transport
    /// Dry-run transport swallowed a message
    NotificationDryRun,

    // Scheduling
    /// Watch loop started
    ScheduleStart,
    /// Scheduled tick fired
    ScheduleTick,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::RunStart => "RUN_START",
            Event::RunSkippedRecentEdit => "RUN_SKIPPED_RECENT_EDIT",
            Event::RecencyCheckFailed => "RECENCY_CHECK_FAILED",
            Event::SheetMissing => "SHEET_MISSING",
            Event::SheetUnreadable => "SHEET_UNREADABLE",
            Event::SchemaUnresolved => "SCHEMA_UNRESOLVED",
            Event::RowsSelected => "ROWS_SELECTED",
            Event::RunComplete => "RUN_COMPLETE",

            Event::RowNotified => "ROW_NOTIFIED",
            Event::RowMarkedInvalid => "ROW_MARKED_INVALID",
            Event::RowFailed => "ROW_FAILED",
            Event::RowMarkLost => "ROW_MARK_LOST",
            Event::RangeResolutionFailed => "RANGE_RESOLUTION_FAILED",

            Event::NotificationDryRun => "NOTIFICATION_DRY_RUN",

            Event::ScheduleStart => "SCHEDULE_START",
            Event::ScheduleTick => "SCHEDULE_TICK",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::RowFailed | Event::RowMarkLost | Event::SheetUnreadable => Severity::Error,
            Event::SchemaUnresolved
            | Event::SheetMissing
            | Event::RecencyCheckFailed
            | Event::RangeResolutionFailed => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

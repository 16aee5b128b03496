//! Observability for latewatch
//!
//! Structured JSON logging with typed events. Everything a run does is
//! logged with its `run_id`, so the lines of overlapping invocations can be
//! told apart.
//!
//! # Usage
//!
//! ```ignore
//! use latewatch::observability::{Event, Logger, RunLog};
//!
//! Logger::emit(Event::ConfigLoaded, &[("path", "latewatch.json")]);
//!
//! let log = RunLog::new("October 2026");
//! log.emit(Event::RowNotified, &[("row", "4")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

use uuid::Uuid;

/// Log context carried through one run.
#[derive(Debug, Clone)]
pub struct RunLog {
    run_id: String,
    sheet: String,
}

impl RunLog {
    /// Start a run context with a fresh run id.
    pub fn new(sheet: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            sheet: sheet.into(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// Log an event with `run_id` and `sheet` attached.
    pub fn emit(&self, event: Event, fields: &[(&str, &str)]) {
        Logger::emit(event, &self.with_context(fields));
    }

    fn with_context<'a>(&'a self, fields: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        let mut all = Vec::with_capacity(fields.len() + 2);
        all.push(("run_id", self.run_id.as_str()));
        all.push(("sheet", self.sheet.as_str()));
        all.extend_from_slice(fields);
        all
    }
}

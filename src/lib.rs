//! latewatch - one reminder per new row of the late-arrival log
//!
//! Each run opens this period's sheet, resolves the columns by header
//! label, and for every row without a mark either sends a notification
//! and stamps the send time, or writes the invalid-name sentinel.

pub mod batch;
pub mod cli;
pub mod config;
pub mod notify;
pub mod observability;
pub mod schema;
pub mod table;
pub mod validation;

pub use batch::{Batch, BatchConfig, RunMode, RunOutcome, RunReport};
pub use config::Config;
pub use notify::{Notification, Notifier};
pub use table::{CellValue, TableStore, Workbook, WorkbookFile};

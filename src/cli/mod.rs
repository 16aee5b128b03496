//! CLI module for latewatch
//!
//! The trigger surface around the batch:
//! - check: guarded run, skipped after a recent edit
//! - run: unconditional run
//! - watch: guarded runs on a cron schedule

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, run, run_command, run_now, watch};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_summary;

//! CLI command implementations
//!
//! Each command loads the configuration, wires the workbook file and the
//! transport into a `Batch`, and prints the run summary.

use std::path::Path;

use chrono::{Local, Utc};
use croner::Cron;

use crate::batch::{Batch, RunMode, RunOutcome};
use crate::config::Config;
use crate::notify::{create_notifier, Notifier};
use crate::observability::{Event, Logger};
use crate::table::WorkbookFile;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_summary;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Check { config } => check(&config),
        Command::Run { config } => run_now(&config),
        Command::Watch { config } => watch(&config),
    }
}

/// Guarded run against this period's sheet
pub fn check(config_path: &Path) -> CliResult<()> {
    run_once(config_path, RunMode::Guarded)
}

/// Unconditional run against this period's sheet
pub fn run_now(config_path: &Path) -> CliResult<()> {
    run_once(config_path, RunMode::Unconditional)
}

/// Guarded runs on the configured cron schedule. Only returns on error.
pub fn watch(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let cron = Cron::new(&config.schedule)
        .parse()
        .map_err(|e| CliError::schedule_error(e.to_string()))?;

    let (batch, mut workbook) = wire(&config);
    Logger::emit(Event::ScheduleStart, &[("schedule", config.schedule.as_str())]);

    loop {
        let now = Local::now();
        let next = cron
            .find_next_occurrence(&now, false)
            .map_err(|e| CliError::schedule_error(e.to_string()))?;
        let wait = next
            .signed_duration_since(now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO);
        std::thread::sleep(wait);

        Logger::emit(Event::ScheduleTick, &[("at", next.to_rfc3339().as_str())]);
        let outcome = batch.run_guarded(&mut workbook, Utc::now());
        write_summary(&outcome)?;
    }
}

fn run_once(config_path: &Path, mode: RunMode) -> CliResult<()> {
    let config = load_config(config_path)?;
    let (batch, mut workbook) = wire(&config);

    let now = Utc::now();
    let outcome: RunOutcome = match mode {
        RunMode::Guarded => batch.run_guarded(&mut workbook, now),
        RunMode::Unconditional => batch.run_unconditional(&mut workbook, now),
    };
    write_summary(&outcome)
}

fn load_config(path: &Path) -> CliResult<Config> {
    let config = Config::load(path)?;
    let transport = if config.smtp.is_some() { "smtp" } else { "dry_run" };
    Logger::emit(
        Event::ConfigLoaded,
        &[
            ("path", path.display().to_string().as_str()),
            ("transport", transport),
        ],
    );
    Ok(config)
}

fn wire(config: &Config) -> (Batch<Box<dyn Notifier>>, WorkbookFile) {
    let batch = Batch::new(config.batch_config(), create_notifier(config.smtp.clone()));
    let workbook = WorkbookFile::new(&config.workbook_path);
    (batch, workbook)
}

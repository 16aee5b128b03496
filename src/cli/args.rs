//! CLI argument definitions using clap
//!
//! Commands:
//! - latewatch check --config <path>
//! - latewatch run --config <path>
//! - latewatch watch --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// latewatch - one reminder per new row of the late log
#[derive(Parser, Debug)]
#[command(name = "latewatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Process this period's sheet unless it was edited recently
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./latewatch.json")]
        config: PathBuf,
    },

    /// Process this period's sheet even if it was edited recently
    Run {
        /// Path to configuration file
        #[arg(long, default_value = "./latewatch.json")]
        config: PathBuf,
    },

    /// Run `check` on the configured cron schedule until interrupted
    Watch {
        /// Path to configuration file
        #[arg(long, default_value = "./latewatch.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_default_config() {
        let cli = Cli::try_parse_from(["latewatch", "check"]).unwrap();
        match cli.command {
            Command::Check { config } => assert_eq!(config, PathBuf::from("./latewatch.json")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_run_with_config() {
        let cli = Cli::try_parse_from(["latewatch", "run", "--config", "/etc/lw.json"]).unwrap();
        assert!(matches!(cli.command, Command::Run { .. }));
    }

    #[test]
    fn test_unknown_command() {
        assert!(Cli::try_parse_from(["latewatch", "serve"]).is_err());
    }
}

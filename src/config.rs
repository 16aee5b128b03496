//! Configuration file
//!
//! A single JSON object. Only `workbook_path` and `email_domain` are
//! required; everything else has a default.
//!
//! ```json
//! {
//!   "workbook_path": "/srv/attendance/late.json",
//!   "email_domain": "school.org",
//!   "smtp": { "host": "smtp.school.org", "user": "bot", "password": "...", "from_email": "attendance@school.org" }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::batch::{
    BatchConfig, DEFAULT_INVALID_SENTINEL, DEFAULT_RECENCY_WINDOW_MINUTES,
    DEFAULT_SHEET_NAME_FORMAT, DEFAULT_SUBJECT,
};
use crate::notify::SmtpConfig;
use crate::schema::{ColumnSchema, LogicalKey};

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workbook file holding the monthly sheets (required)
    pub workbook_path: PathBuf,

    /// Domain of notification addresses (required)
    pub email_domain: String,

    /// chrono format naming this period's sheet
    #[serde(default = "default_sheet_name_format")]
    pub sheet_name_format: String,

    /// Guarded runs skip sheets edited within this many minutes
    #[serde(default = "default_recency_window_minutes")]
    pub recency_window_minutes: i64,

    /// Written into the mark column of rejected rows
    #[serde(default = "default_invalid_sentinel")]
    pub invalid_sentinel: String,

    /// Header label per logical column
    #[serde(default)]
    pub columns: ColumnSchema,

    /// Subject line of reminders
    #[serde(default = "default_subject")]
    pub subject: String,

    /// SMTP settings; absent means dry run
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,

    /// Cron expression for `watch`
    #[serde(default = "default_schedule")]
    pub schedule: String,
}

fn default_sheet_name_format() -> String {
    DEFAULT_SHEET_NAME_FORMAT.to_string()
}
fn default_recency_window_minutes() -> i64 {
    DEFAULT_RECENCY_WINDOW_MINUTES
}
fn default_invalid_sentinel() -> String {
    DEFAULT_INVALID_SENTINEL.to_string()
}
fn default_subject() -> String {
    DEFAULT_SUBJECT.to_string()
}
fn default_schedule() -> String {
    "*/15 * * * *".to_string()
}

impl Config {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.workbook_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("workbook_path must not be empty".into()));
        }

        let domain = self.email_domain.trim();
        if domain.is_empty() || domain.contains(char::is_whitespace) || domain.contains('@') {
            return Err(ConfigError::Invalid(format!(
                "Invalid email_domain: '{}'",
                self.email_domain
            )));
        }

        if self.recency_window_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "recency_window_minutes must be > 0".into(),
            ));
        }

        if self.invalid_sentinel.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "invalid_sentinel must not be blank".into(),
            ));
        }

        if self.sheet_name_format.is_empty()
            || StrftimeItems::new(&self.sheet_name_format).any(|item| matches!(item, Item::Error))
        {
            return Err(ConfigError::Invalid(format!(
                "Invalid sheet_name_format: '{}'",
                self.sheet_name_format
            )));
        }

        for key in LogicalKey::ALL {
            if self.columns.label(key).is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Column label for {} must not be empty",
                    key
                )));
            }
        }

        croner::Cron::new(&self.schedule)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("Invalid schedule '{}': {}", self.schedule, e)))?;

        Ok(())
    }

    /// Settings of the batch core
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            columns: self.columns.clone(),
            invalid_sentinel: self.invalid_sentinel.clone(),
            recency_window: Duration::minutes(self.recency_window_minutes),
            sheet_name_format: self.sheet_name_format.clone(),
            email_domain: self.email_domain.trim().to_string(),
            subject: self.subject.clone(),
        }
    }
}

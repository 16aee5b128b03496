//! Schema resolution errors
//!
//! An unresolved schema aborts the whole run before any row is touched.

use thiserror::Error;

use super::LogicalKey;

/// Result type for schema resolution
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Header row does not match the declared columns
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Missing column '{label}' for {key}")]
    MissingColumn { key: LogicalKey, label: String },
}

impl SchemaError {
    /// Stable code used in log lines
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::MissingColumn { .. } => "LATEWATCH_SCHEMA_UNRESOLVED",
        }
    }

    /// The label that could not be found
    pub fn label(&self) -> &str {
        match self {
            SchemaError::MissingColumn { label, .. } => label,
        }
    }
}

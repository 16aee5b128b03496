//! # Validation Errors

use thiserror::Error;

use crate::table::TableError;

/// Result type for identity validation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// The validator could not reach a decision.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Range rule has no reference")]
    MissingReference,

    #[error("Could not resolve range {reference}: {source}")]
    RangeResolution {
        reference: String,
        #[source]
        source: TableError,
    },
}

impl ValidationError {
    /// Stable code used in log lines
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingReference => "LATEWATCH_RANGE_REFERENCE_MISSING",
            ValidationError::RangeResolution { .. } => "LATEWATCH_RANGE_RESOLUTION_FAILED",
        }
    }
}

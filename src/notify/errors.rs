//! # Notification Errors

use thiserror::Error;

/// Result type for notification transport
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Notification transport errors
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP relay error: {0}")]
    Relay(String),

    #[error("Failed to send: {0}")]
    Send(String),
}

impl NotifyError {
    /// Stable code used in log lines
    pub fn code(&self) -> &'static str {
        match self {
            NotifyError::InvalidAddress(_) => "LATEWATCH_NOTIFY_ADDRESS",
            NotifyError::Build(_) => "LATEWATCH_NOTIFY_BUILD",
            NotifyError::Relay(_) => "LATEWATCH_NOTIFY_RELAY",
            NotifyError::Send(_) => "LATEWATCH_NOTIFY_SEND",
        }
    }
}

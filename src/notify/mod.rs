//! Notification transport
//!
//! One reminder per admitted row, addressed to `{identity}@{domain}`.

mod email;
mod errors;
mod message;

pub use email::{LogNotifier, MockNotifier, SmtpConfig, SmtpNotifier};
pub use errors::{NotifyError, NotifyResult};
pub use message::{address_for, Notification};

/// Sends a notification. Implementations are synchronous and fail fast.
pub trait Notifier {
    fn send(&self, notification: &Notification) -> NotifyResult<()>;
}

impl<T: Notifier + ?Sized> Notifier for Box<T> {
    fn send(&self, notification: &Notification) -> NotifyResult<()> {
        (**self).send(notification)
    }
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn send(&self, notification: &Notification) -> NotifyResult<()> {
        (**self).send(notification)
    }
}

/// Pick the transport for a configuration: SMTP when configured,
/// otherwise the dry-run logger.
pub fn create_notifier(smtp: Option<SmtpConfig>) -> Box<dyn Notifier> {
    match smtp {
        Some(config) => Box::new(SmtpNotifier::new(config)),
        None => Box::new(LogNotifier),
    }
}

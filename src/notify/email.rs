//! Email transports
//!
//! `SmtpNotifier` sends through an SMTP relay. `LogNotifier` is the dry-run
//! transport used when no SMTP settings are configured. `MockNotifier`
//! records messages for tests.

use std::collections::HashSet;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::errors::{NotifyError, NotifyResult};
use super::message::Notification;
use super::Notifier;
use crate::observability::{Event, Logger};

/// SMTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server host
    pub host: String,

    /// SMTP server port
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// SMTP username; empty means no authentication
    #[serde(default)]
    pub user: String,

    /// SMTP password (should come from secrets)
    #[serde(default)]
    pub password: String,

    /// From email address
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "Attendance Office".to_string()
}

/// SMTP email sender
pub struct SmtpNotifier {
    config: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, notification: &Notification) -> NotifyResult<lettre::Message> {
        use lettre::message::header::ContentType;

        lettre::Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_email)
                    .parse()
                    .map_err(|e| NotifyError::InvalidAddress(format!("from: {}", e)))?,
            )
            .to(notification
                .to
                .parse()
                .map_err(|e| NotifyError::InvalidAddress(format!("{}: {}", notification.to, e)))?)
            .subject(notification.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(|e| NotifyError::Build(e.to_string()))
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, notification: &Notification) -> NotifyResult<()> {
        use lettre::{transport::smtp::authentication::Credentials, SmtpTransport, Transport};

        let email = self.build_message(notification)?;

        let mailer = if self.config.user.is_empty() {
            // No authentication (local relays)
            SmtpTransport::builder_dangerous(&self.config.host)
                .port(self.config.port)
                .build()
        } else {
            let creds = Credentials::new(self.config.user.clone(), self.config.password.clone());

            SmtpTransport::starttls_relay(&self.config.host)
                .map_err(|e| NotifyError::Relay(e.to_string()))?
                .credentials(creds)
                .port(self.config.port)
                .build()
        };

        mailer
            .send(&email)
            .map_err(|e| NotifyError::Send(e.to_string()))?;

        Ok(())
    }
}

/// Dry-run transport: logs the message instead of sending it.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, notification: &Notification) -> NotifyResult<()> {
        Logger::emit(
            Event::NotificationDryRun,
            &[
                ("to", notification.to.as_str()),
                ("subject", notification.subject.as_str()),
            ],
        );
        Ok(())
    }
}

/// Recording transport for tests
#[derive(Debug, Default)]
pub struct MockNotifier {
    sent: RwLock<Vec<Notification>>,
    failing: HashSet<String>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every send to `address`.
    pub fn failing_for(mut self, address: &str) -> Self {
        self.failing.insert(address.to_string());
        self
    }

    /// Messages sent so far
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.read().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of messages sent so far
    pub fn sent_count(&self) -> usize {
        self.sent.read().map(|s| s.len()).unwrap_or(0)
    }
}

impl Notifier for MockNotifier {
    fn send(&self, notification: &Notification) -> NotifyResult<()> {
        if self.failing.contains(&notification.to) {
            return Err(NotifyError::Send(format!(
                "mock transport refused {}",
                notification.to
            )));
        }
        self.sent
            .write()
            .map_err(|_| NotifyError::Send("lock poisoned".into()))?
            .push(notification.clone());
        Ok(())
    }
}

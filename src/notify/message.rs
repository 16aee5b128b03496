//! Reminder message built from one late-log row

use serde::Serialize;

use crate::batch::RowRecord;
use crate::schema::LogicalKey;

/// A message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Body lines, in order. A line is left out when its cell is blank.
const BODY_FIELDS: [(LogicalKey, &str); 5] = [
    (LogicalKey::Name, "Name"),
    (LogicalKey::Date, "Date"),
    (LogicalKey::Violation, "Violation"),
    (LogicalKey::HowLate, "How late"),
    (LogicalKey::Notes, "Notes"),
];

impl Notification {
    /// Build the reminder for `row`, addressed to `{identity}@{domain}`.
    pub fn from_row(row: &RowRecord, domain: &str, subject: &str) -> Self {
        let identity = row.text(LogicalKey::Name);

        let mut body = String::from("A late arrival was recorded for you.\n\n");
        for (key, caption) in BODY_FIELDS {
            let value = row.text(key);
            if !value.is_empty() {
                body.push_str(caption);
                body.push_str(": ");
                body.push_str(&value);
                body.push('\n');
            }
        }

        Self {
            to: address_for(&identity, domain),
            subject: subject.to_string(),
            body,
        }
    }
}

/// `{identity}@{domain}`, both sides trimmed.
pub fn address_for(identity: &str, domain: &str) -> String {
    format!(
        "{}@{}",
        identity.trim(),
        domain.trim().trim_start_matches('@')
    )
}

//! Recency guard
//!
//! A guarded run stays away from a sheet that was edited within the trailing
//! window, so it does not race someone still typing. This is not a lock:
//! overlapping batch invocations are still possible.

use chrono::{DateTime, Duration, Utc};

use crate::table::{TableResult, TableStore};

/// Result of a recency check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyVerdict {
    /// No edit inside the window
    Clear,
    /// Edited at the given time, inside the window
    RecentEdit(DateTime<Utc>),
}

/// Gate on the sheet's last modification time.
#[derive(Debug, Clone, Copy)]
pub struct RecencyGuard {
    window: Duration,
}

impl RecencyGuard {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// True iff `last_modified` lies less than one window before `now`.
    /// Timestamps ahead of `now` count as recent.
    pub fn is_recent(&self, last_modified: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(last_modified) < self.window
    }

    /// Read the modification time and judge it.
    ///
    /// # Errors
    ///
    /// Propagates the store error when the time cannot be read. Callers
    /// treat that as `Clear`.
    pub fn check<S: TableStore + ?Sized>(
        &self,
        store: &S,
        now: DateTime<Utc>,
    ) -> TableResult<RecencyVerdict> {
        let last_modified = store.last_modified()?;
        if self.is_recent(last_modified, now) {
            Ok(RecencyVerdict::RecentEdit(last_modified))
        } else {
            Ok(RecencyVerdict::Clear)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::MemoryTable;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn guard() -> RecencyGuard {
        RecencyGuard::new(Duration::minutes(10))
    }

    #[test]
    fn test_three_minutes_ago_is_recent() {
        let table = MemoryTable::default().with_last_modified(now() - Duration::minutes(3));
        assert_eq!(
            guard().check(&table, now()).unwrap(),
            RecencyVerdict::RecentEdit(now() - Duration::minutes(3))
        );
    }

    #[test]
    fn test_fifteen_minutes_ago_is_clear() {
        let table = MemoryTable::default().with_last_modified(now() - Duration::minutes(15));
        assert_eq!(guard().check(&table, now()).unwrap(), RecencyVerdict::Clear);
    }

    #[test]
    fn test_window_boundary() {
        assert!(!guard().is_recent(now() - Duration::minutes(10), now()));
        assert!(guard().is_recent(now() - Duration::seconds(599), now()));
    }

    #[test]
    fn test_future_timestamp_is_recent() {
        assert!(guard().is_recent(now() + Duration::minutes(1), now()));
    }

    #[test]
    fn test_unreadable_timestamp_does_not_skip() {
        let table = MemoryTable::default();
        assert!(guard().check(&table, now()).is_err());
    }
}

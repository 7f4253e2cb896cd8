//! Clock abstraction.
//!
//! Match and chat timestamps are taken from an injected clock so tests can pin
//! them.

use chrono::{DateTime, Utc};

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns `now()`, but never earlier than `previous`.
    ///
    /// Used for per-document timestamps that must not go backwards when
    /// clients with skewed clocks write the same document.
    fn now_not_before(&self, previous: DateTime<Utc>) -> DateTime<Utc> {
        self.now().max(previous)
    }
}

/// Production clock backed by the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

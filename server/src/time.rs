//! Time source abstraction.
//!
//! Token expiry and note timestamps read the clock through [`TimeSource`] so
//! that tests can move time forward without sleeping.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

/// Abstraction over the wall clock.
pub trait TimeSource: Send + Sync {
    /// Get the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;

    /// Current time in whole seconds since Unix epoch.
    fn now_secs(&self) -> u64 {
        self.now_ms() / 1000
    }

    /// Current time as a UTC timestamp.
    fn now_utc(&self) -> DateTime<Utc> {
        i64::try_from(self.now_ms())
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_default()
    }
}

/// Real time source using the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    // Milliseconds won't overflow u64 for billions of years.
    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> u64 {
        // A clock set before 1970 reads as the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_millis() as u64)
    }
}

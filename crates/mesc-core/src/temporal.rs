//! # Temporal Types
//!
//! Defines [`Timestamp`], a UTC timestamp truncated to seconds, and the
//! [`Clock`] capability through which the engine reads the current time.
//!
//! ## Invariant
//!
//! The timeout rule compares `now` against `created_at + hours × 3600`.
//! Both sides are whole seconds, so the comparison is exact: a release
//! evaluated at the deadline second is already past it.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Seconds in one timeout hour.
pub const SECONDS_PER_HOUR: i64 = 3600;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Create a timestamp from a Unix epoch timestamp (seconds).
    pub fn from_epoch_secs(secs: i64) -> Result<Self, ValidationError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidTimestamp(format!("epoch seconds {secs}")))
    }

    /// Parse an RFC 3339 string with a `Z` suffix.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if !s.ends_with('Z') {
            return Err(ValidationError::InvalidTimestamp(format!(
                "{s:?} must use Z suffix"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| ValidationError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// This instant plus whole hours. `None` if the result is unrepresentable.
    pub fn plus_hours(&self, hours: u32) -> Option<Self> {
        let secs = i64::from(hours).checked_mul(SECONDS_PER_HOUR)?;
        let target = self.epoch_secs().checked_add(secs)?;
        DateTime::from_timestamp(target, 0).map(Self)
    }

    /// This instant plus whole hours, clamped to the latest representable
    /// instant. A clamped deadline is never reached in practice.
    pub fn saturating_plus_hours(&self, hours: u32) -> Self {
        self.plus_hours(hours)
            .unwrap_or_else(|| Self(truncate_to_seconds(DateTime::<Utc>::MAX_UTC)))
    }

    /// Render as ISO 8601 with Z suffix (e.g. `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// Source of the current time.
///
/// Read at the moment of each operation; implementations must not cache.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A manually advanced clock.
///
/// Clones share the same underlying instant, so a test can keep a handle
/// and advance time after handing a clone to the engine.
#[derive(Debug, Clone)]
pub struct ManualClock {
    epoch_secs: Arc<AtomicI64>,
}

impl ManualClock {
    /// Start the clock at the given instant.
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            epoch_secs: Arc::new(AtomicI64::new(start.epoch_secs())),
        }
    }

    /// Move the clock forward by `secs` seconds.
    pub fn advance_secs(&self, secs: i64) {
        self.epoch_secs.fetch_add(secs, Ordering::SeqCst);
    }

    /// Move the clock forward by whole hours.
    pub fn advance_hours(&self, hours: u32) {
        self.advance_secs(i64::from(hours) * SECONDS_PER_HOUR);
    }

    /// Jump to an absolute instant.
    pub fn set(&self, to: Timestamp) {
        self.epoch_secs.store(to.epoch_secs(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let secs = self.epoch_secs.load(Ordering::SeqCst);
        // Only reachable with an out-of-range advance; pin to the epoch.
        DateTime::from_timestamp(secs, 0)
            .map(Timestamp)
            .unwrap_or_else(|| Timestamp(DateTime::<Utc>::UNIX_EPOCH))
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn from_utc_truncates() {
        let dt = Utc
            .with_ymd_and_hms(2026, 1, 15, 12, 30, 45)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        assert_eq!(Timestamp::from_utc(dt).to_iso8601(), "2026-01-15T12:30:45Z");
    }

    #[test]
    fn parse_rejects_offsets() {
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15T12:00:00Z").is_ok());
    }

    #[test]
    fn plus_hours_adds_whole_hours() {
        let start = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let later = start.plus_hours(6).unwrap();
        assert_eq!(later.to_iso8601(), "2026-01-15T18:00:00Z");
        assert_eq!(later.epoch_secs() - start.epoch_secs(), 6 * 3600);
    }

    #[test]
    fn plus_hours_zero_is_identity() {
        let start = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        assert_eq!(start.plus_hours(0), Some(start));
    }

    #[test]
    fn plus_hours_beyond_calendar_range_is_none() {
        // u32::MAX hours is ~490,000 years, past chrono's maximum date.
        let start = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        assert!(start.plus_hours(u32::MAX).is_none());
        assert!(start.plus_hours(24 * 365 * 1000).is_some());
        let clamped = start.saturating_plus_hours(u32::MAX);
        assert!(clamped > start.plus_hours(24 * 365 * 1000).unwrap());
        assert_eq!(clamped.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let start = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let clock = ManualClock::starting_at(start);
        let handle = clock.clone();
        handle.advance_hours(2);
        assert_eq!(clock.now(), start.plus_hours(2).unwrap());
        handle.advance_secs(-1);
        assert_eq!(clock.now().epoch_secs(), start.epoch_secs() + 7199);
    }

    #[test]
    fn epoch_roundtrip() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        assert_eq!(Timestamp::from_epoch_secs(ts.epoch_secs()).unwrap(), ts);
    }

    #[test]
    fn serde_roundtrip() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }
}

//! # Temporal Types: Filing Instants and Incident Dates
//!
//! Two distinct notions of time flow through the engine and must not be
//! confused:
//!
//! - [`Timestamp`]: a UTC instant, truncated to seconds. Filing times,
//!   transfer deadlines, and audit entries use it. The transfer deadline is
//!   an hour-exact boundary, so it needs an instant, not a date.
//!
//! - [`IncidentDate`]: a calendar date with no time component. The regime
//!   decision depends on the day an offence occurred and nothing else.
//!
//! ## Parsing Policy
//!
//! Filing timestamps arrive from a browser-side collaborator that does not
//! always attach an offset. [`Timestamp::parse_lenient()`] accepts RFC 3339
//! with any offset (converted to UTC) and also a naive
//! `YYYY-MM-DDTHH:MM:SS`, which is read as UTC. [`Timestamp::parse()`] is
//! the strict form and accepts only the `Z` suffix.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::NyayaError;

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

    /// Parse a timestamp from an RFC 3339 string with the `Z` suffix.
    ///
    /// # Errors
    ///
    /// Returns [`NyayaError::Validation`] if the string is not RFC 3339 or
    /// uses any offset other than `Z`.
    pub fn parse(s: &str) -> Result<Self, NyayaError> {
        if !s.ends_with('Z') {
            return Err(NyayaError::Validation(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            NyayaError::Validation(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Parse a timestamp, accepting any RFC 3339 offset or a naive
    /// datetime (read as UTC). The result is always UTC, seconds precision.
    pub fn parse_lenient(s: &str) -> Result<Self, NyayaError> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|naive| Self(truncate_to_seconds(naive.and_utc())))
            .ok_or_else(|| NyayaError::Validation(format!("invalid filing timestamp {s:?}")))
    }

    /// Create a timestamp from a Unix epoch timestamp (seconds).
    pub fn from_epoch_secs(secs: i64) -> Result<Self, NyayaError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| NyayaError::Validation(format!("invalid Unix timestamp: {secs}")))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Add a duration, returning `None` on overflow.
    pub fn checked_add(&self, offset: Duration) -> Option<Self> {
        self.0.checked_add_signed(offset).map(Self::from_utc)
    }

    /// Signed distance from `earlier` to `self`.
    pub fn since(&self, earlier: &Timestamp) -> Duration {
        self.0.signed_duration_since(earlier.0)
    }

    /// Render as ISO8601 with Z suffix (e.g., `2024-12-13T10:30:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// The calendar date on which an offence occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncidentDate(NaiveDate);

impl IncidentDate {
    /// Wrap a calendar date.
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build from year/month/day, `None` if the date does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse `YYYY-MM-DD`, or an RFC 3339 datetime whose calendar date (in
    /// its own offset) is taken.
    pub fn parse(s: &str) -> Result<Self, NyayaError> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self(date));
        }
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.date_naive()))
            .map_err(|_| NyayaError::Validation(format!("invalid incident date {s:?}")))
    }

    /// Parse an optional raw field. Absent, blank, or unparseable input
    /// yields `None`; the caller decides the policy for that case.
    pub fn parse_opt(raw: Option<&str>) -> Option<Self> {
        raw.filter(|s| !s.trim().is_empty())
            .and_then(|s| Self::parse(s).ok())
    }

    /// Access the inner calendar date.
    pub fn as_date(&self) -> NaiveDate {
        self.0
    }
}

impl std::fmt::Display for IncidentDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

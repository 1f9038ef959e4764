//! # Temporal Types — UTC-Only Timestamps
//!
//! `Timestamp` is a UTC timestamp truncated to seconds precision. Due
//! dates, Lightning invoice expiries, and receipt mint times all live in
//! this one domain, so "has this passed?" is a plain ordering comparison
//! with no timezone ambiguity.
//!
//! Inputs with explicit offsets are accepted and converted to UTC; output
//! is always ISO8601 with the `Z` suffix (`YYYY-MM-DDTHH:MM:SSZ`).

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SnetError;

/// A UTC timestamp with seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 timestamp, converting any offset to UTC.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the string is not valid RFC 3339.
    pub fn parse(s: &str) -> Result<Self, SnetError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            SnetError::Validation(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// From a Unix epoch timestamp in seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, SnetError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| SnetError::Validation(format!("invalid Unix timestamp: {secs}")))
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Whether this instant is strictly before `now`.
    ///
    /// This is the due-date / expiry check: an invoice is overdue and a
    /// Lightning channel is expired once the relevant timestamp
    /// `has_passed(Timestamp::now())`.
    pub fn has_passed(&self, now: Timestamp) -> bool {
        *self < now
    }

    /// This timestamp shifted forward by `secs` seconds (saturating on
    /// overflow at the chrono range limits).
    pub fn plus_secs(&self, secs: i64) -> Self {
        match self.0.checked_add_signed(chrono::Duration::seconds(secs)) {
            Some(dt) => Self(dt),
            None => *self,
        }
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO8601 with Z suffix (e.g. `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision.
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

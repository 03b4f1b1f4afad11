//! Server-assigned timestamps.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors that can occur when parsing a [`Timestamp`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// The input is not an RFC 3339 date-time.
    #[error("invalid RFC 3339 timestamp: {0}")]
    InvalidFormat(String),
    /// The nanosecond component is out of range.
    #[error("nanoseconds out of range: {0}")]
    NanosOutOfRange(i64),
}

/// A point in time with nanosecond precision.
///
/// Serializes the way the document store's SDK renders timestamps in JSON,
/// `{"_seconds": 1700000000, "_nanoseconds": 0}`, so clients see the same
/// shape regardless of which adapter produced the document.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    #[serde(rename = "_seconds")]
    seconds: i64,
    #[serde(rename = "_nanoseconds")]
    nanos: u32,
}

impl Timestamp {
    /// Build a timestamp from seconds and nanoseconds since the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns `TimestampError::NanosOutOfRange` if `nanos` is not below one
    /// second.
    pub fn new(seconds: i64, nanos: i64) -> Result<Self, TimestampError> {
        let nanos = u32::try_from(nanos)
            .ok()
            .filter(|n| *n < 1_000_000_000)
            .ok_or(TimestampError::NanosOutOfRange(nanos))?;
        Ok(Self { seconds, nanos })
    }

    /// The current time.
    #[must_use]
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// Parse an RFC 3339 date-time such as `2024-05-01T12:00:00.123456Z`.
    ///
    /// # Errors
    ///
    /// Returns `TimestampError::InvalidFormat` if the input cannot be parsed.
    pub fn parse_rfc3339(s: &str) -> Result<Self, TimestampError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self::from(dt.with_timezone(&Utc)))
            .map_err(|_| TimestampError::InvalidFormat(s.to_owned()))
    }

    /// Format as RFC 3339 in UTC with a `Z` suffix.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        DateTime::<Utc>::from_timestamp(self.seconds, self.nanos)
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    /// Whole seconds since the Unix epoch.
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Sub-second nanoseconds.
    #[must_use]
    pub const fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Render as the JSON object clients receive.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "_seconds": self.seconds,
            "_nanoseconds": self.nanos,
        })
    }

    /// Recognize a JSON value previously produced by [`Timestamp::to_json`].
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.len() != 2 {
            return None;
        }
        let seconds = object.get("_seconds")?.as_i64()?;
        let nanos = object.get("_nanoseconds")?.as_i64()?;
        Self::new(seconds, nanos).ok()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos(),
        }
    }
}

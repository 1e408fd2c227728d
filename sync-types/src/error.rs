//! Error types for monthsync.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while encoding, decoding or validating a package.
#[derive(Debug, Error)]
pub enum SyncError {
    /// JSON serialization failed
    #[error("encoding failed: {0}")]
    Encoding(#[source] serde_json::Error),

    /// JSON deserialization failed (malformed bytes or missing fields)
    #[error("decoding failed: {0}")]
    Decoding(#[source] serde_json::Error),

    /// Protocol version is unparseable or has an unknown major component
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(String),

    /// Package is well-formed but fails semantic checks
    #[error("package rejected: {0}")]
    Validation(#[from] ValidationError),
}

/// Reasons a decoded package is rejected wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Package claims to have been created after `now`.
    #[error("package timestamp {created_at} is in the future (now {now})")]
    FutureTimestamp {
        /// Creation timestamp from the package.
        created_at: DateTime<Utc>,
        /// Evaluation time.
        now: DateTime<Utc>,
    },

    /// Package is older than the freshness window.
    #[error("package is stale: created {created_at}, older than {max_age_secs}s")]
    Stale {
        /// Creation timestamp from the package.
        created_at: DateTime<Utc>,
        /// The window that was exceeded, in seconds.
        max_age_secs: i64,
    },

    /// One of the carried events is invalid.
    #[error("event #{index} is invalid: {reason}")]
    InvalidEvent {
        /// Position of the event in the package.
        index: usize,
        /// What is wrong with it.
        reason: EventInvalid,
    },
}

/// Why a single event record fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EventInvalid {
    /// Month outside 1..=12.
    #[error("month {0} is out of range")]
    MonthOutOfRange(i32),

    /// Day not valid for the month in the evaluating year.
    #[error("day {day} is not valid for month {month} in {year}")]
    DayOutOfRange {
        /// The month being checked.
        month: i32,
        /// The offending day.
        day: i32,
        /// Year used for the leap-year rule.
        year: i32,
    },

    /// A transmitted event must carry a title.
    #[error("title is empty")]
    EmptyTitle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SyncError::UnsupportedVersion("2.0".into());
        assert_eq!(err.to_string(), "unsupported protocol version: 2.0");
    }

    #[test]
    fn event_invalid_display() {
        let err = EventInvalid::DayOutOfRange {
            month: 4,
            day: 31,
            year: 2026,
        };
        assert_eq!(err.to_string(), "day 31 is not valid for month 4 in 2026");
    }

    #[test]
    fn validation_converts_into_sync_error() {
        let err: SyncError = ValidationError::InvalidEvent {
            index: 2,
            reason: EventInvalid::EmptyTitle,
        }
        .into();
        assert!(matches!(err, SyncError::Validation(_)));
        assert_eq!(err.to_string(), "package rejected: event #2 is invalid: title is empty");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncError>();
        assert_send_sync::<ValidationError>();
    }
}

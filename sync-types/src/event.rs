//! The event record - one calendar slot on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{days_in_month, month_name};
use crate::EventInvalid;

/// One month's event.
///
/// `month` and `day` are kept as plain integers so that out-of-range values
/// survive decoding and are reported by validation instead of parsing.
/// An empty `title` means the month is unscheduled, whatever the other
/// fields hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Month number, 1..=12. Unique key within a calendar.
    pub month: i32,
    /// Display name of the month. Informational only.
    pub month_name: String,
    /// Event title; empty means "no event".
    pub title: String,
    /// Event location, may be empty.
    pub location: String,
    /// Day of month.
    pub day: i32,
    /// When the record's content last changed.
    pub last_modified: DateTime<Utc>,
}

impl EventRecord {
    /// Create a record, filling in the month name.
    pub fn new(
        month: i32,
        day: i32,
        title: impl Into<String>,
        location: impl Into<String>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            month,
            month_name: month_name(month).unwrap_or_default().to_string(),
            title: title.into(),
            location: location.into(),
            day,
            last_modified,
        }
    }

    /// An empty slot for `month`.
    pub fn unscheduled(month: i32, last_modified: DateTime<Utc>) -> Self {
        Self::new(month, 1, "", "", last_modified)
    }

    /// A month is scheduled iff its title is non-empty.
    pub fn is_scheduled(&self) -> bool {
        !self.title.is_empty()
    }

    /// Check month range, day-for-month range in `year`, and non-empty title.
    pub fn validate(&self, year: i32) -> Result<(), EventInvalid> {
        let max_day =
            days_in_month(self.month, year).ok_or(EventInvalid::MonthOutOfRange(self.month))?;
        if self.day < 1 || self.day > max_day {
            return Err(EventInvalid::DayOutOfRange {
                month: self.month,
                day: self.day,
                year,
            });
        }
        if self.title.is_empty() {
            return Err(EventInvalid::EmptyTitle);
        }
        Ok(())
    }

    /// Convenience wrapper around [`EventRecord::validate`].
    pub fn is_valid(&self, year: i32) -> bool {
        self.validate(year).is_ok()
    }
}

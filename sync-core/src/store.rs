//! Local calendar storage.
//!
//! [`CalendarStore`] is the seam to whatever persists the twelve month
//! slots on a device. [`MemoryCalendar`] is an in-memory implementation
//! used by tests and as a working copy by front-ends that persist elsewhere.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use monthsync_types::{month_name, EventRecord, MONTHS};
use thiserror::Error;

use crate::clock::{Clock, SystemClock};

/// Storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Month outside 1..=12.
    #[error("no calendar slot for month {0}")]
    UnknownMonth(i32),

    /// Durable flush failed.
    #[error("failed to persist calendar: {0}")]
    Persist(String),
}

/// Local calendar storage, one event slot per month.
///
/// Callers serialize access: reads during diffing and writes during apply
/// must not interleave (see `SharedCalendar` in sync-client).
pub trait CalendarStore {
    /// The record for `month`. Unscheduled months have an empty title.
    fn get_event(&self, month: i32) -> Result<EventRecord, StoreError>;

    /// Overwrite the content of `month`.
    fn update_event(
        &mut self,
        month: i32,
        title: &str,
        location: &str,
        day: i32,
    ) -> Result<(), StoreError>;

    /// Put back a record previously read with `get_event`.
    ///
    /// Used to roll back a write whose flush failed. Stores that can hold
    /// the record verbatim should, so `last_modified` is restored too.
    fn restore_event(&mut self, record: EventRecord) -> Result<(), StoreError> {
        self.update_event(record.month, &record.title, &record.location, record.day)
    }

    /// Durably flush the whole calendar.
    fn save_all(&mut self) -> Result<(), StoreError>;

    /// All twelve slots in month order.
    fn all_events(&self) -> Vec<EventRecord>;
}

/// Twelve month slots held in memory.
///
/// `last_modified` only moves when a slot's content actually changes, so a
/// repeated identical write leaves the slot untouched.
pub struct MemoryCalendar {
    slots: Vec<EventRecord>,
    clock: Arc<dyn Clock>,
    saves: usize,
}

impl MemoryCalendar {
    /// Create an empty calendar using wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty calendar stamping modifications from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        let slots = (1..=MONTHS)
            .map(|month| EventRecord::unscheduled(month, now))
            .collect();
        Self {
            slots,
            clock,
            saves: 0,
        }
    }

    /// Load slots from previously persisted records.
    ///
    /// Records for unknown months are skipped; later duplicates win.
    pub fn from_events(
        events: impl IntoIterator<Item = EventRecord>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut calendar = Self::with_clock(clock);
        for event in events {
            if let Some(slot) = calendar.slot_index(event.month) {
                let mut event = event;
                event.month_name = month_name(event.month).unwrap_or_default().to_string();
                calendar.slots[slot] = event;
            }
        }
        calendar
    }

    /// Reset `month` to unscheduled.
    pub fn clear_event(&mut self, month: i32) -> Result<(), StoreError> {
        let slot = self.slot_index(month).ok_or(StoreError::UnknownMonth(month))?;
        if self.slots[slot].is_scheduled() {
            self.slots[slot] = EventRecord::unscheduled(month, self.clock.now());
        }
        Ok(())
    }

    /// Number of times `save_all` has been called.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Timestamp used for the next modification.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn slot_index(&self, month: i32) -> Option<usize> {
        (1..=MONTHS)
            .contains(&month)
            .then(|| (month - 1) as usize)
    }
}

impl Default for MemoryCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryCalendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCalendar")
            .field("slots", &self.slots)
            .field("saves", &self.saves)
            .finish()
    }
}

impl CalendarStore for MemoryCalendar {
    fn get_event(&self, month: i32) -> Result<EventRecord, StoreError> {
        let slot = self.slot_index(month).ok_or(StoreError::UnknownMonth(month))?;
        Ok(self.slots[slot].clone())
    }

    fn update_event(
        &mut self,
        month: i32,
        title: &str,
        location: &str,
        day: i32,
    ) -> Result<(), StoreError> {
        let slot = self.slot_index(month).ok_or(StoreError::UnknownMonth(month))?;
        let now = self.clock.now();
        let record = &mut self.slots[slot];

        if record.title != title || record.location != location || record.day != day {
            record.title = title.to_string();
            record.location = location.to_string();
            record.day = day;
            record.last_modified = now;
        }
        Ok(())
    }

    fn restore_event(&mut self, record: EventRecord) -> Result<(), StoreError> {
        let slot = self
            .slot_index(record.month)
            .ok_or(StoreError::UnknownMonth(record.month))?;
        self.slots[slot] = record;
        Ok(())
    }

    fn save_all(&mut self) -> Result<(), StoreError> {
        self.saves += 1;
        Ok(())
    }

    fn all_events(&self) -> Vec<EventRecord> {
        self.slots.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeZone;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 5, 5, 5, 5, 5).unwrap(),
        ))
    }

    #[test]
    fn starts_with_twelve_unscheduled_months() {
        let calendar = MemoryCalendar::with_clock(clock());
        let events = calendar.all_events();
        assert_eq!(events.len(), 12);
        assert!(events.iter().all(|e| !e.is_scheduled()));
        assert_eq!(events[0].month, 1);
        assert_eq!(events[11].month_name, "December");
    }

    #[test]
    fn update_and_get() {
        let mut calendar = MemoryCalendar::with_clock(clock());
        calendar.update_event(4, "Earth Day", "Park", 22).unwrap();

        let event = calendar.get_event(4).unwrap();
        assert_eq!(event.title, "Earth Day");
        assert_eq!(event.location, "Park");
        assert_eq!(event.day, 22);
    }

    #[test]
    fn unknown_month_rejected() {
        let mut calendar = MemoryCalendar::with_clock(clock());
        assert_eq!(calendar.get_event(0), Err(StoreError::UnknownMonth(0)));
        assert_eq!(
            calendar.update_event(13, "x", "", 1),
            Err(StoreError::UnknownMonth(13))
        );
    }

    #[test]
    fn identical_update_keeps_timestamp() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut calendar = MemoryCalendar::with_clock(Arc::new(FixedClock::new(start)));
        calendar.update_event(6, "Picnic", "Lake", 14).unwrap();
        let before = calendar.get_event(6).unwrap();

        calendar.clock = Arc::new(FixedClock::new(start + chrono::Duration::days(1)));
        calendar.update_event(6, "Picnic", "Lake", 14).unwrap();

        assert_eq!(calendar.get_event(6).unwrap(), before);
    }

    #[test]
    fn clear_event_unschedules() {
        let mut calendar = MemoryCalendar::with_clock(clock());
        calendar.update_event(9, "Fair", "Grounds", 9).unwrap();
        calendar.clear_event(9).unwrap();
        assert!(!calendar.get_event(9).unwrap().is_scheduled());
    }

    #[test]
    fn save_all_is_counted() {
        let mut calendar = MemoryCalendar::with_clock(clock());
        calendar.save_all().unwrap();
        calendar.save_all().unwrap();
        assert_eq!(calendar.save_count(), 2);
    }

    #[test]
    fn from_events_skips_unknown_months() {
        let at = clock().now();
        let calendar = MemoryCalendar::from_events(
            vec![
                EventRecord::new(3, 17, "Parade", "Main St", at),
                EventRecord::new(15, 1, "Nope", "", at),
            ],
            clock(),
        );
        assert_eq!(calendar.get_event(3).unwrap().title, "Parade");
        assert_eq!(calendar.all_events().len(), 12);
    }
}

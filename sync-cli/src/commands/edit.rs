//! Local edits: set or clear one month.

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use monthsync_core::CalendarStore;
use monthsync_types::EventRecord;
use std::path::Path;

use super::show::format_event;
use crate::store::FileCalendar;

/// Schedule an event in `month`, replacing whatever was there.
pub async fn set(data_dir: &Path, month: i32, day: i32, title: &str, location: &str) -> Result<()> {
    let now = Utc::now();
    EventRecord::new(month, day, title, location, now)
        .validate(now.year())
        .context("Invalid event")?;

    let mut calendar = FileCalendar::open(data_dir)?;
    calendar.update_event(month, title, location, day)?;
    calendar.save_all()?;

    println!("{}", format_event(&calendar.get_event(month)?));
    Ok(())
}

/// Remove the event in `month`.
pub async fn clear(data_dir: &Path, month: i32) -> Result<()> {
    let mut calendar = FileCalendar::open(data_dir)?;
    calendar.clear_event(month)?;
    calendar.save_all()?;

    println!("{}", format_event(&calendar.get_event(month)?));
    Ok(())
}

//! Print the local calendar.

use anyhow::Result;
use monthsync_core::CalendarStore;
use monthsync_types::EventRecord;
use std::path::Path;

use crate::store::FileCalendar;

/// Run the show command.
pub async fn run(data_dir: &Path) -> Result<()> {
    let calendar = FileCalendar::open(data_dir)?;
    for event in calendar.all_events() {
        println!("{}", format_event(&event));
    }
    Ok(())
}

/// One line per month, e.g. `April      22  Earth Day @ Park`.
pub fn format_event(event: &EventRecord) -> String {
    if !event.is_scheduled() {
        return format!("{:<10}  --  (no event)", event.month_name);
    }
    let mut line = format!("{:<10}  {:>2}  {}", event.month_name, event.day, event.title);
    if !event.location.is_empty() {
        line.push_str(" @ ");
        line.push_str(&event.location);
    }
    line
}

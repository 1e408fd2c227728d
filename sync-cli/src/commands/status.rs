//! Show device and calendar status.

use anyhow::Result;
use chrono::{DateTime, Utc};
use monthsync_core::CalendarStore;
use std::path::Path;

use crate::config::{DeviceConfig, Settings};
use crate::store::FileCalendar;

/// Run the status command.
pub async fn run(data_dir: &Path, settings: &Settings) -> Result<()> {
    println!("=== monthsync status ===");
    println!();

    match DeviceConfig::load(data_dir).await {
        Ok(device) => {
            println!("Device:");
            println!("  ID:   {}", device.short_id());
            println!("  Name: {}", device.device_name);
            println!("  Init: {}", format_timestamp(device.created_at, Utc::now()));
        }
        Err(_) => {
            println!("Device: NOT INITIALIZED");
            println!();
            println!("Run 'monthsync init --name <name>' to initialize.");
            return Ok(());
        }
    }

    println!();

    let calendar = FileCalendar::open(data_dir)?;
    let events = calendar.all_events();
    let scheduled: Vec<_> = events.iter().filter(|e| e.is_scheduled()).collect();
    println!("Calendar:");
    println!("  File:      {}", calendar.path().display());
    println!("  Scheduled: {} of {} months", scheduled.len(), events.len());
    if let Some(latest) = scheduled.iter().map(|e| e.last_modified).max() {
        println!("  Changed:   {}", format_timestamp(latest, Utc::now()));
    }

    println!();
    println!("Settings:");
    println!("  Package max age: {} days", settings.max_package_age_days);
    println!("  Log level:       {}", settings.log_level);

    Ok(())
}

/// Format a timestamp relative to `now`.
fn format_timestamp(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - at).num_seconds().max(0);

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        format!("{} minutes ago", diff / 60)
    } else if diff < 86400 {
        format!("{} hours ago", diff / 3600)
    } else {
        format!("{} days ago", diff / 86400)
    }
}

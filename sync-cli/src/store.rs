//! JSON file-backed calendar (`calendar.json`).

use anyhow::{Context, Result};
use monthsync_core::{CalendarStore, MemoryCalendar, StoreError, SystemClock};
use monthsync_types::EventRecord;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const CALENDAR_FILE: &str = "calendar.json";

/// Twelve month slots persisted as a JSON array.
///
/// Edits happen on an in-memory copy; `save_all` rewrites the whole file
/// via a temporary file and rename, so a crash leaves either the old or
/// the new calendar on disk.
#[derive(Debug)]
pub struct FileCalendar {
    path: PathBuf,
    calendar: MemoryCalendar,
}

impl FileCalendar {
    /// Open the calendar in `data_dir`, or start an empty one.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CALENDAR_FILE);
        let calendar = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let events: Vec<EventRecord> = serde_json::from_str(&contents)
                .with_context(|| format!("Invalid calendar file {}", path.display()))?;
            MemoryCalendar::from_events(events, Arc::new(SystemClock))
        } else {
            MemoryCalendar::new()
        };
        Ok(Self { path, calendar })
    }

    /// Reset `month` to unscheduled.
    pub fn clear_event(&mut self, month: i32) -> Result<(), StoreError> {
        self.calendar.clear_event(month)
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> std::io::Result<()> {
        let contents = serde_json::to_vec_pretty(&self.calendar.all_events())?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))?;
        }
        std::fs::rename(&tmp, &self.path)
    }
}

impl CalendarStore for FileCalendar {
    fn get_event(&self, month: i32) -> Result<EventRecord, StoreError> {
        self.calendar.get_event(month)
    }

    fn update_event(
        &mut self,
        month: i32,
        title: &str,
        location: &str,
        day: i32,
    ) -> Result<(), StoreError> {
        self.calendar.update_event(month, title, location, day)
    }

    fn restore_event(&mut self, record: EventRecord) -> Result<(), StoreError> {
        self.calendar.restore_event(record)
    }

    fn save_all(&mut self) -> Result<(), StoreError> {
        self.write()
            .map_err(|e| StoreError::Persist(format!("{}: {}", self.path.display(), e)))?;
        tracing::debug!("Saved calendar to {}", self.path.display());
        Ok(())
    }

    fn all_events(&self) -> Vec<EventRecord> {
        self.calendar.all_events()
    }
}

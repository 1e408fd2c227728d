//! CLI command implementations.

pub mod accept;
pub mod edit;
pub mod export;
pub mod import;
pub mod init;
pub mod show;
pub mod status;

use anyhow::{Context, Result};
use monthsync_client::{SharedCalendar, SyncConfig, SyncSession};
use monthsync_types::{month_name, MONTHS};
use std::path::Path;

use crate::config::{DeviceConfig, Settings};
use crate::store::FileCalendar;
use crate::transport::FileTransport;

/// A session over a file-drop transport and the on-disk calendar.
pub type FileSession = SyncSession<FileTransport, FileCalendar>;

/// Open the local calendar and wrap it in a session over `transport`.
///
/// `peer` names the file on the other end, for logs.
pub async fn open_session(
    data_dir: &Path,
    settings: &Settings,
    transport: FileTransport,
    peer: &Path,
) -> Result<FileSession> {
    let device = DeviceConfig::load(data_dir).await?;
    let calendar = SharedCalendar::new(FileCalendar::open(data_dir)?);
    let config = SyncConfig::new(device.identity(), &peer.display().to_string())
        .with_max_package_age(settings.max_package_age());

    let session = SyncSession::new(config, transport, calendar);
    session
        .connect()
        .await
        .with_context(|| format!("Cannot open {}", peer.display()))?;
    Ok(session)
}

/// Parse a month given as a number (`4`) or an English name (`april`, `Apr`).
pub fn parse_month(value: &str) -> Result<i32, String> {
    let value = value.trim();
    if let Ok(month) = value.parse::<i32>() {
        return if (1..=MONTHS).contains(&month) {
            Ok(month)
        } else {
            Err(format!("month must be 1-12, got {month}"))
        };
    }

    let wanted = value.to_lowercase();
    (1..=MONTHS)
        .find(|&m| {
            month_name(m).is_some_and(|name| {
                let name = name.to_lowercase();
                wanted.len() >= 3 && name.starts_with(&wanted)
            })
        })
        .ok_or_else(|| format!("unknown month '{value}'"))
}

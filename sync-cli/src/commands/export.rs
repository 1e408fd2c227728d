//! Write the local calendar as a package file.

use anyhow::Result;
use std::path::Path;

use super::open_session;
use crate::config::Settings;
use crate::transport::FileTransport;

/// Run the export command.
pub async fn run(data_dir: &Path, settings: &Settings, file: &Path) -> Result<()> {
    let session = open_session(data_dir, settings, FileTransport::outbox(file), file).await?;
    let package = session.send_calendar().await?;
    session.close().await?;

    println!(
        "Exported {} event(s) from {} to {}",
        package.events.len(),
        package.source_device.name,
        file.display()
    );
    Ok(())
}

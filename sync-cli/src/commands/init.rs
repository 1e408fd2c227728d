//! Initialize device identity.

use anyhow::Result;
use std::path::Path;

use crate::config::DeviceConfig;

/// Run the init command.
pub async fn run(data_dir: &Path, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("Device name must not be empty");
    }

    // Check if already initialized
    if DeviceConfig::exists(data_dir).await {
        anyhow::bail!(
            "Device already initialized. Delete {} to reinitialize.",
            data_dir.join("device.json").display()
        );
    }

    let config = DeviceConfig::new(name.trim());
    config.save(data_dir).await?;
    tracing::info!("Initialized device {}", config.device_id);

    println!("Device initialized successfully!");
    println!();
    println!("  Device ID: {}", config.short_id());
    println!("  Name:      {}", config.device_name);
    println!("  Data dir:  {}", data_dir.display());
    println!();
    println!("Next steps:");
    println!("  1. Add events: monthsync set april --day 22 --title \"Earth Day\"");
    println!("  2. Share them: monthsync export calendar.json");

    Ok(())
}

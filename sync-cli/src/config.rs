//! Configuration management for monthsync.
//!
//! - `device.json`: identity stamped into exported packages (created by `init`)
//! - `settings.toml`: optional tuning, every key has a default

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use monthsync_types::DeviceIdentity;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEVICE_FILE: &str = "device.json";
const SETTINGS_FILE: &str = "settings.toml";

/// Widest freshness window `settings.toml` may ask for (ten years).
pub const MAX_PACKAGE_AGE_DAYS: i64 = 3650;

/// Device configuration stored locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Stable identifier for this installation.
    pub device_id: String,
    /// Human-readable device name.
    pub device_name: String,
    /// Platform the device was initialized on.
    pub platform: String,
    /// When the device was initialized.
    pub created_at: DateTime<Utc>,
}

impl DeviceConfig {
    /// Create a new device configuration.
    pub fn new(name: &str) -> Self {
        Self {
            device_id: uuid::Uuid::new_v4().to_string(),
            device_name: name.to_string(),
            platform: std::env::consts::OS.to_string(),
            created_at: Utc::now(),
        }
    }

    /// First eight characters of the id, for display.
    pub fn short_id(&self) -> &str {
        self.device_id.get(..8).unwrap_or(&self.device_id)
    }

    /// Identity carried in outgoing packages.
    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity::new(
            &self.device_name,
            &self.device_id,
            &self.platform,
            env!("CARGO_PKG_VERSION"),
        )
    }

    /// Load device configuration from a directory.
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(DEVICE_FILE);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .context("Device not initialized. Run 'monthsync init' first.")?;
        serde_json::from_str(&contents).context("Invalid device configuration")
    }

    /// Save device configuration to a directory.
    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join(DEVICE_FILE);
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents)
            .await
            .context("Failed to save device configuration")?;
        set_file_permissions_0600(&path).await?;
        Ok(())
    }

    /// Check if device is initialized.
    pub async fn exists(data_dir: &Path) -> bool {
        data_dir.join(DEVICE_FILE).exists()
    }
}

/// Optional user settings (`settings.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Packages older than this many days are rejected (default: 7).
    #[serde(default = "default_max_package_age_days")]
    pub max_package_age_days: i64,
    /// Log filter used when `RUST_LOG` is unset (default: "warn").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Settings {
    /// Load settings, falling back to defaults when the file is absent.
    ///
    /// Runs before logging is initialized, so it uses blocking I/O.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid {}", path.display()))
    }

    /// Parse settings from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: Self = toml::from_str(contents)?;
        if !(1..=MAX_PACKAGE_AGE_DAYS).contains(&settings.max_package_age_days) {
            anyhow::bail!(
                "max_package_age_days must be between 1 and {}, got {}",
                MAX_PACKAGE_AGE_DAYS,
                settings.max_package_age_days
            );
        }
        Ok(settings)
    }

    /// Freshness window for imported packages.
    ///
    /// Clamped to `1..=MAX_PACKAGE_AGE_DAYS` days.
    pub fn max_package_age(&self) -> Duration {
        Duration::days(self.max_package_age_days.clamp(1, MAX_PACKAGE_AGE_DAYS))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_package_age_days: default_max_package_age_days(),
            log_level: default_log_level(),
        }
    }
}

fn default_max_package_age_days() -> i64 {
    7
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Set file permissions to 0600 (owner read/write only) on Unix.
/// No-op on non-Unix platforms.
pub async fn set_file_permissions_0600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .context("Failed to set file permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

/// Set directory permissions to 0700 (owner only) on Unix.
/// No-op on non-Unix platforms.
pub async fn set_dir_permissions_0700(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
            .await
            .context("Failed to set directory permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

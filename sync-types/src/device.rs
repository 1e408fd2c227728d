//! Device identity carried in every package.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Describes the device that produced a package.
///
/// Provenance only: nothing in monthsync makes trust decisions from it.
/// `identifier` is vendor-scoped and may change across reinstalls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceIdentity {
    /// Human-readable device name.
    pub name: String,
    /// Stable, vendor-scoped identifier.
    pub identifier: String,
    /// Platform string, e.g. "linux" or "iOS 17.2".
    #[serde(rename = "system")]
    pub platform: String,
    /// Version of the producing application.
    pub app_version: String,
}

impl DeviceIdentity {
    /// Create a new identity.
    pub fn new(
        name: impl Into<String>,
        identifier: impl Into<String>,
        platform: impl Into<String>,
        app_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
            platform: platform.into(),
            app_version: app_version.into(),
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, v{})", self.name, self.platform, self.app_version)
    }
}

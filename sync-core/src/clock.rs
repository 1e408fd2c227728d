//! Clock and device-identity providers.
//!
//! Both are injected so that package construction and validation can be
//! pinned to a known instant in tests.

use chrono::{DateTime, Utc};
use monthsync_types::DeviceIdentity;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current timestamp.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Create a clock that always reports `at`.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Move the clock to a new instant.
    pub fn set(&mut self, at: DateTime<Utc>) {
        self.0 = at;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Source of the local device identity stamped into outgoing packages.
pub trait IdentityProvider: Send + Sync {
    /// The local device's identity.
    fn identity(&self) -> DeviceIdentity;
}

/// A captured identity is its own provider.
impl IdentityProvider for DeviceIdentity {
    fn identity(&self) -> DeviceIdentity {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn fixed_clock_is_frozen() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut clock = FixedClock::new(at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), at);

        clock.set(at + Duration::hours(1));
        assert_eq!(clock.now(), at + Duration::hours(1));
    }

    #[test]
    fn system_clock_moves_forward() {
        let first = SystemClock.now();
        let second = SystemClock.now();
        assert!(second >= first);
    }

    #[test]
    fn identity_provides_itself() {
        let device = DeviceIdentity::new("A", "id-a", "linux", "0.1.0");
        assert_eq!(device.identity(), device);
    }
}

//! SyncPackage - the envelope exchanged between peers.
//!
//! A package is built fresh from local storage for every sync attempt,
//! serialized to JSON, carried as one opaque buffer by the transport, then
//! decoded and validated on the receiving side. It is never mutated after
//! construction.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{DeviceIdentity, EventRecord, SyncError, ValidationError};

/// Protocol version emitted by this implementation.
pub const PROTOCOL_VERSION: &str = "1.0";

/// The only major protocol version understood.
pub const PROTOCOL_MAJOR: u32 = 1;

/// Default freshness window for received packages (7 days).
pub const DEFAULT_MAX_PACKAGE_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// A versioned, self-describing snapshot of one device's scheduled months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPackage {
    /// Protocol version string ("major.minor").
    #[serde(rename = "syncVersion")]
    pub protocol_version: String,
    /// The producing device.
    pub source_device: DeviceIdentity,
    /// Construction time.
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Carried events. Duplicates by month are passed through untouched.
    pub events: Vec<EventRecord>,
    /// Opaque signature, not used for trust.
    #[serde(default)]
    pub signature: Option<String>,
}

impl SyncPackage {
    /// Create a package at the current protocol version.
    pub fn new(
        source_device: DeviceIdentity,
        created_at: DateTime<Utc>,
        events: Vec<EventRecord>,
        signature: Option<String>,
    ) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            source_device,
            created_at,
            events,
            signature,
        }
    }

    /// Serialize to UTF-8 JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SyncError> {
        serde_json::to_vec(self).map_err(SyncError::Encoding)
    }

    /// Deserialize from UTF-8 JSON bytes.
    ///
    /// Fails on malformed JSON, missing required fields, or an unknown major
    /// version. Field values are not range-checked here; see
    /// [`SyncPackage::validate`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SyncError> {
        let package: Self = serde_json::from_slice(bytes).map_err(SyncError::Decoding)?;
        check_version(&package.protocol_version)?;
        Ok(package)
    }

    /// Decode and validate in one step against the default freshness window.
    pub fn decode_validated(bytes: &[u8], now: DateTime<Utc>) -> Result<Self, SyncError> {
        let package = Self::from_bytes(bytes)?;
        package.validate(now)?;
        Ok(package)
    }

    /// Validate against the default 7-day freshness window.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), ValidationError> {
        self.validate_with_max_age(now, Duration::seconds(DEFAULT_MAX_PACKAGE_AGE_SECS))
    }

    /// Validate the package as a whole.
    ///
    /// Rejects future-dated packages, packages older than `max_age`, and any
    /// package containing even one invalid event. Day ranges use the year of
    /// `now`.
    pub fn validate_with_max_age(
        &self,
        now: DateTime<Utc>,
        max_age: Duration,
    ) -> Result<(), ValidationError> {
        if self.created_at > now {
            return Err(ValidationError::FutureTimestamp {
                created_at: self.created_at,
                now,
            });
        }
        if now - self.created_at > max_age {
            return Err(ValidationError::Stale {
                created_at: self.created_at,
                max_age_secs: max_age.num_seconds(),
            });
        }

        let year = now.year();
        for (index, event) in self.events.iter().enumerate() {
            event
                .validate(year)
                .map_err(|reason| ValidationError::InvalidEvent { index, reason })?;
        }
        Ok(())
    }

    /// Boolean form of [`SyncPackage::validate`].
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.validate(now).is_ok()
    }
}

/// Accept any minor version of the known major.
fn check_version(version: &str) -> Result<(), SyncError> {
    let mut parts = version.splitn(2, '.');
    let major = parts.next().and_then(|m| m.parse::<u32>().ok());
    let minor_ok = parts.next().map_or(true, |m| m.parse::<u32>().is_ok());

    match major {
        Some(PROTOCOL_MAJOR) if minor_ok => Ok(()),
        _ => Err(SyncError::UnsupportedVersion(version.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventInvalid;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap()
    }

    fn device() -> DeviceIdentity {
        DeviceIdentity::new("Test Device", "device-1", "linux", "0.1.0")
    }

    fn package_at(created_at: DateTime<Utc>, events: Vec<EventRecord>) -> SyncPackage {
        SyncPackage::new(device(), created_at, events, None)
    }

    #[test]
    fn package_serialize_roundtrip() {
        let created = now() - Duration::milliseconds(1_234);
        let package = SyncPackage::new(
            device(),
            created,
            vec![
                EventRecord::new(4, 22, "Earth Day", "Park", created),
                EventRecord::new(12, 20, "Holiday Party", "Community Center", created),
            ],
            Some("sig".into()),
        );

        let bytes = package.to_bytes().unwrap();
        let restored = SyncPackage::from_bytes(&bytes).unwrap();

        assert_eq!(package, restored);
        assert_eq!(restored.created_at.timestamp_subsec_millis(), 766);
        assert_eq!(restored.signature.as_deref(), Some("sig"));
    }

    #[test]
    fn wire_shape_matches_protocol() {
        let package = package_at(now(), vec![]);
        let json: serde_json::Value = serde_json::from_slice(&package.to_bytes().unwrap()).unwrap();

        assert_eq!(json["syncVersion"], "1.0");
        assert_eq!(json["timestamp"], "2026-10-17T09:30:00Z");
        assert_eq!(json["sourceDevice"]["system"], "linux");
        assert!(json["signature"].is_null());
        assert!(json["events"].as_array().unwrap().is_empty());
    }

    #[test]
    fn decodes_hand_written_json() {
        let json = br#"{
            "syncVersion": "1.0",
            "sourceDevice": {"name": "Phone", "identifier": "X", "system": "iOS", "appVersion": "1.0"},
            "timestamp": "2026-10-16T08:00:00Z",
            "events": [
                {"month": 4, "monthName": "April", "title": "Earth Day", "location": "Park",
                 "day": 22, "lastModified": "2026-10-16T08:00:00Z"}
            ],
            "signature": null
        }"#;

        let package = SyncPackage::from_bytes(json).unwrap();
        assert_eq!(package.source_device.platform, "iOS");
        assert_eq!(package.events[0].title, "Earth Day");
        assert!(package.validate(now()).is_ok());
    }

    #[test]
    fn missing_required_field_fails() {
        let json = br#"{"syncVersion": "1.0", "timestamp": "2026-10-16T08:00:00Z", "events": []}"#;
        assert!(matches!(
            SyncPackage::from_bytes(json),
            Err(SyncError::Decoding(_))
        ));
    }

    #[test]
    fn malformed_bytes_fail() {
        assert!(matches!(
            SyncPackage::from_bytes(b"{not json"),
            Err(SyncError::Decoding(_))
        ));
        assert!(matches!(
            SyncPackage::from_bytes(&[0xff, 0xfe, 0x00]),
            Err(SyncError::Decoding(_))
        ));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut json: serde_json::Value =
            serde_json::from_slice(&package_at(now(), vec![]).to_bytes().unwrap()).unwrap();
        json["futureField"] = serde_json::json!({"nested": true});
        let bytes = serde_json::to_vec(&json).unwrap();

        assert!(SyncPackage::from_bytes(&bytes).is_ok());
    }

    #[test]
    fn missing_signature_decodes_as_none() {
        let mut json: serde_json::Value =
            serde_json::from_slice(&package_at(now(), vec![]).to_bytes().unwrap()).unwrap();
        json.as_object_mut().unwrap().remove("signature");
        let package = SyncPackage::from_bytes(&serde_json::to_vec(&json).unwrap()).unwrap();
        assert!(package.signature.is_none());
    }

    #[test]
    fn unknown_major_version_rejected() {
        let mut package = package_at(now(), vec![]);
        package.protocol_version = "2.0".into();
        let bytes = package.to_bytes().unwrap();

        assert!(matches!(
            SyncPackage::from_bytes(&bytes),
            Err(SyncError::UnsupportedVersion(v)) if v == "2.0"
        ));
    }

    #[test]
    fn minor_versions_tolerated() {
        assert!(check_version("1.0").is_ok());
        assert!(check_version("1.7").is_ok());
        assert!(check_version("1").is_ok());
        assert!(check_version("1.x").is_err());
        assert!(check_version("").is_err());
        assert!(check_version("banana").is_err());
    }

    #[test]
    fn out_of_range_month_still_decodes() {
        let package = package_at(now(), vec![EventRecord::new(14, 1, "Bogus", "", now())]);
        let restored = SyncPackage::from_bytes(&package.to_bytes().unwrap()).unwrap();

        assert_eq!(restored.events[0].month, 14);
        assert_eq!(
            restored.validate(now()),
            Err(ValidationError::InvalidEvent {
                index: 0,
                reason: EventInvalid::MonthOutOfRange(14)
            })
        );
    }

    #[test]
    fn rejects_future_packages() {
        let package = package_at(now() + Duration::seconds(1), vec![]);
        assert!(matches!(
            package.validate(now()),
            Err(ValidationError::FutureTimestamp { .. })
        ));
    }

    #[test]
    fn rejects_stale_packages() {
        let package = package_at(now() - Duration::days(8), vec![]);
        assert!(matches!(
            package.validate(now()),
            Err(ValidationError::Stale { .. })
        ));
    }

    #[test]
    fn six_days_old_is_fresh() {
        assert!(package_at(now() - Duration::days(6), vec![]).is_valid(now()));
    }

    #[test]
    fn seven_day_boundary_is_inclusive() {
        assert!(package_at(now() - Duration::days(7), vec![]).is_valid(now()));
        assert!(!package_at(now() - Duration::days(7) - Duration::seconds(1), vec![]).is_valid(now()));
    }

    #[test]
    fn custom_max_age() {
        let package = package_at(now() - Duration::days(2), vec![]);
        assert!(package
            .validate_with_max_age(now(), Duration::days(1))
            .is_err());
        assert!(package
            .validate_with_max_age(now(), Duration::days(3))
            .is_ok());
    }

    #[test]
    fn empty_package_is_valid() {
        assert!(package_at(now(), vec![]).is_valid(now()));
    }

    #[test]
    fn one_bad_event_rejects_whole_package() {
        let package = package_at(
            now(),
            vec![
                EventRecord::new(4, 22, "Earth Day", "Park", now()),
                EventRecord::new(4, 31, "Too Late", "", now()),
                EventRecord::new(12, 20, "Party", "", now()),
            ],
        );
        assert_eq!(
            package.validate(now()),
            Err(ValidationError::InvalidEvent {
                index: 1,
                reason: EventInvalid::DayOutOfRange {
                    month: 4,
                    day: 31,
                    year: 2026
                }
            })
        );
    }

    #[test]
    fn empty_title_on_wire_fails() {
        let package = package_at(now(), vec![EventRecord::unscheduled(3, now())]);
        assert!(!package.is_valid(now()));
    }

    #[test]
    fn leap_day_uses_evaluating_year() {
        let event = EventRecord::new(2, 29, "Leap Day", "", now());
        let leap_now = Utc.with_ymd_and_hms(2028, 3, 1, 0, 0, 0).unwrap();

        assert!(package_at(leap_now, vec![event.clone()]).is_valid(leap_now));
        assert!(!package_at(now(), vec![event]).is_valid(now()));
    }

    #[test]
    fn duplicate_months_pass_through() {
        let package = package_at(
            now(),
            vec![
                EventRecord::new(5, 1, "First", "", now()),
                EventRecord::new(5, 2, "Second", "", now()),
            ],
        );
        let restored = SyncPackage::decode_validated(&package.to_bytes().unwrap(), now()).unwrap();
        assert_eq!(restored.events.len(), 2);
    }

    #[test]
    fn decode_validated_reports_validation_errors() {
        let package = package_at(now() - Duration::days(30), vec![]);
        let result = SyncPackage::decode_validated(&package.to_bytes().unwrap(), now());
        assert!(matches!(
            result,
            Err(SyncError::Validation(ValidationError::Stale { .. }))
        ));
    }
}

//! # sync-types
//!
//! Wire format types for monthsync peer-to-peer calendar sync.
//!
//! This crate provides the foundational types used across all monthsync crates:
//! - [`EventRecord`] - One month's event slot
//! - [`DeviceIdentity`] - Provenance of a package
//! - [`SyncPackage`] - The versioned JSON envelope, with codec and validator
//! - [`ProposalId`] - Identity for pending update proposals
//! - [`SyncError`], [`ValidationError`], [`EventInvalid`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod calendar;
mod device;
mod error;
mod event;
mod ids;
mod package;

pub use calendar::{days_in_month, is_leap_year, month_name, MONTHS};
pub use device::DeviceIdentity;
pub use error::{EventInvalid, SyncError, ValidationError};
pub use event::EventRecord;
pub use ids::ProposalId;
pub use package::{
    SyncPackage, DEFAULT_MAX_PACKAGE_AGE_SECS, PROTOCOL_MAJOR, PROTOCOL_VERSION,
};

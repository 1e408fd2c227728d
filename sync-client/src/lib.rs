//! # sync-client
//!
//! Session driver for monthsync peer-to-peer calendar sync.
//!
//! This is the library applications use to exchange calendars with peers.
//!
//! ## Features
//!
//! - **Transport Abstraction**: Pluggable transport layer (Bluetooth, mock)
//! - **Single Writer**: [`SharedCalendar`] serializes diffing and applying
//!   across concurrent peer sessions
//! - **Pure Core**: Uses sync-core for side-effect-free reconciliation
//!
//! ## Example
//!
//! ```ignore
//! use monthsync_client::{MockTransport, SharedCalendar, SyncConfig, SyncSession};
//!
//! let session = SyncSession::new(config, MockTransport::new(), calendar.clone());
//! session.connect().await?;
//!
//! let proposals = session.exchange().await?;
//! let report = session.accept_all(&proposals).await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod session;
pub mod shared;
pub mod transport;

pub use session::{ApplyReport, SessionError, SyncConfig, SyncSession};
pub use shared::SharedCalendar;
pub use transport::{MockTransport, Transport, TransportError, MAX_PACKAGE_SIZE};

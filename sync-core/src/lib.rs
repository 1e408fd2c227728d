//! # sync-core
//!
//! Pure reconciliation logic for monthsync (no I/O, instant tests).
//!
//! This crate turns local calendar state into outgoing packages, diffs
//! received packages into pending update proposals, and commits accepted
//! proposals back to storage, all without any network I/O.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects beyond the [`CalendarStore`] they are handed. This
//! enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior via an injectable [`Clock`]
//! - Easy reasoning about session state transitions
//!
//! The actual I/O (transport, serialized storage access) is performed by
//! `sync-client`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod proposal;
pub mod reconcile;
pub mod session;
pub mod store;

pub use clock::{Clock, FixedClock, IdentityProvider, SystemClock};
pub use proposal::{
    sort_for_display, Field, PendingUpdate, ProposalKind, ProposedChange, NO_EVENT,
};
pub use reconcile::{apply, construct, diff, generate, ApplyError};
pub use session::{SessionAction, SessionEvent, SessionState};
pub use store::{CalendarStore, MemoryCalendar, StoreError};

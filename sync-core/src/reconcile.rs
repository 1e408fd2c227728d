//! Reconciliation: package generation, diffing and applying proposals.
//!
//! ```text
//! local store --generate--> SyncPackage --(transport)--> peer
//! peer package --diff(local store)--> [PendingUpdate] --apply--> local store
//! ```
//!
//! `diff` assumes the package has already passed
//! [`SyncPackage::validate`]; it does not re-validate.

use monthsync_types::{EventInvalid, EventRecord, SyncPackage};
use thiserror::Error;

use crate::clock::{Clock, IdentityProvider};
use crate::proposal::{PendingUpdate, ProposedChange};
use crate::store::{CalendarStore, StoreError};

/// Failure to commit one accepted proposal.
///
/// Scoped to that proposal; storage is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// A day value is not an integer.
    #[error("invalid day value: {0:?}")]
    InvalidDay(String),

    /// An edited value would make the event invalid.
    #[error("edited value rejected: {0}")]
    InvalidEvent(#[from] EventInvalid),

    /// A field name that proposals cannot touch.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Storage rejected the write or the flush.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Build a package from the given events, stamped with the local identity
/// and the current time. No constraints are placed on `events`.
pub fn construct(
    events: Vec<EventRecord>,
    signature: Option<String>,
    identity: &(impl IdentityProvider + ?Sized),
    clock: &(impl Clock + ?Sized),
) -> SyncPackage {
    SyncPackage::new(identity.identity(), clock.now(), events, signature)
}

/// Build an outgoing package from local storage.
///
/// Only scheduled months are transmitted. Each record gets
/// `last_modified` set to the conversion time.
pub fn generate(
    local_events: impl IntoIterator<Item = EventRecord>,
    identity: &(impl IdentityProvider + ?Sized),
    clock: &(impl Clock + ?Sized),
) -> SyncPackage {
    let now = clock.now();
    let events = local_events
        .into_iter()
        .filter(EventRecord::is_scheduled)
        .map(|event| EventRecord::new(event.month, event.day, event.title, event.location, now))
        .collect();
    construct(events, None, identity, clock)
}

/// Compare a validated remote package against local storage.
///
/// For each remote event, in package order: an unscheduled local month
/// yields one `NewEvent`; a scheduled one yields one `FieldChange` per
/// differing field (title, location, day), evaluated independently.
pub fn diff<S>(
    remote: &SyncPackage,
    local: &S,
    detected_at: chrono::DateTime<chrono::Utc>,
) -> Result<Vec<PendingUpdate>, StoreError>
where
    S: CalendarStore + ?Sized,
{
    let source = remote.source_device.name.as_str();
    let mut proposals = Vec::new();

    for remote_event in &remote.events {
        let local_event = local.get_event(remote_event.month)?;

        if !local_event.is_scheduled() {
            proposals.push(PendingUpdate::new(
                source,
                ProposedChange::NewEvent,
                remote_event.clone(),
                detected_at,
            ));
            continue;
        }

        let mut changes = Vec::with_capacity(3);
        if local_event.title != remote_event.title {
            changes.push(ProposedChange::Title {
                old: local_event.title.clone(),
                new: remote_event.title.clone(),
            });
        }
        if local_event.location != remote_event.location {
            changes.push(ProposedChange::Location {
                old: local_event.location.clone(),
                new: remote_event.location.clone(),
            });
        }
        if local_event.day != remote_event.day {
            changes.push(ProposedChange::Day {
                old: local_event.day,
                new: remote_event.day,
            });
        }

        proposals.extend(changes.into_iter().map(|change| {
            PendingUpdate::new(source, change, remote_event.clone(), detected_at)
        }));
    }

    Ok(proposals)
}

/// Commit one accepted proposal and durably save the calendar.
///
/// A new event overwrites the month unconditionally. A field change
/// rewrites only its field on the current local record. Applying the same
/// field change twice leaves storage as after the first time.
///
/// If the save fails the month is put back as it was, so a later
/// successful save cannot persist a proposal reported as failed.
pub fn apply<S>(proposal: &PendingUpdate, store: &mut S) -> Result<(), ApplyError>
where
    S: CalendarStore + ?Sized,
{
    let month = proposal.month;
    let before = store.get_event(month)?;

    match &proposal.change {
        ProposedChange::NewEvent => {
            let remote = &proposal.remote_event;
            store.update_event(month, &remote.title, &remote.location, remote.day)?;
        }
        ProposedChange::Title { new, .. } => {
            store.update_event(month, new, &before.location, before.day)?;
        }
        ProposedChange::Location { new, .. } => {
            store.update_event(month, &before.title, new, before.day)?;
        }
        ProposedChange::Day { new, .. } => {
            store.update_event(month, &before.title, &before.location, *new)?;
        }
    }

    if let Err(e) = store.save_all() {
        store.restore_event(before)?;
        return Err(e.into());
    }
    Ok(())
}

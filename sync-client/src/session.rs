//! SyncSession - one calendar exchange with one peer.
//!
//! SyncSession uses the pure reconciliation logic and session state machine
//! from sync-core, and performs the actual I/O via the Transport trait.
//!
//! ```text
//! SharedCalendar --generate--> SyncPackage --encode--> Transport --> peer
//! peer --> Transport --decode/validate--> diff(SharedCalendar) --> [PendingUpdate]
//! user accepts --> apply + save_all (under the SharedCalendar lock)
//! ```
//!
//! # Example
//!
//! ```ignore
//! let calendar = SharedCalendar::new(MemoryCalendar::new());
//! let session = SyncSession::new(SyncConfig::new(identity, "peer"), transport, calendar);
//!
//! session.connect().await?;
//! session.send_calendar().await?;
//! let proposals = session.receive_proposals().await?;
//! let report = session.accept_all(&proposals).await;
//! ```

use std::sync::Arc;

use chrono::Duration;
use monthsync_core::{
    apply, diff, generate, ApplyError, CalendarStore, Clock, PendingUpdate, SessionAction,
    SessionEvent, SessionState, StoreError, SystemClock,
};
use monthsync_types::{
    DeviceIdentity, ProposalId, SyncError, SyncPackage, DEFAULT_MAX_PACKAGE_AGE_SECS,
};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::shared::SharedCalendar;
use crate::transport::{Transport, TransportError, MAX_PACKAGE_SIZE};

/// Session errors.
///
/// All are scoped to one sync attempt or one proposal; none leave local
/// storage partially written.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Transport error (includes the peer disconnecting mid-transfer).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Package could not be encoded, decoded or validated.
    #[error(transparent)]
    Package(#[from] SyncError),

    /// Received buffer exceeds [`MAX_PACKAGE_SIZE`].
    #[error("package too large: {size} bytes (max {max})")]
    TooLarge {
        /// Received size.
        size: usize,
        /// Limit.
        max: usize,
    },

    /// Local storage failed while diffing.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// An accepted proposal could not be committed.
    #[error("apply failed: {0}")]
    Apply(#[from] ApplyError),
}

/// Configuration for SyncSession.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Identity stamped into outgoing packages.
    pub identity: DeviceIdentity,
    /// Address of the peer to connect to.
    pub peer_address: String,
    /// Freshness window for received packages.
    pub max_package_age: Duration,
}

impl SyncConfig {
    /// Create a configuration with the default 7-day freshness window.
    pub fn new(identity: DeviceIdentity, peer_address: &str) -> Self {
        Self {
            identity,
            peer_address: peer_address.to_string(),
            max_package_age: Duration::seconds(DEFAULT_MAX_PACKAGE_AGE_SECS),
        }
    }

    /// Set the freshness window.
    pub fn with_max_package_age(mut self, max_age: Duration) -> Self {
        self.max_package_age = max_age;
        self
    }
}

/// Outcome of accepting a batch of proposals.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Proposals committed to storage.
    pub applied: Vec<ProposalId>,
    /// Proposals that failed, with the reason. Others were unaffected.
    pub failed: Vec<(ProposalId, SessionError)>,
}

impl ApplyReport {
    /// True when every proposal was committed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One sync session with one peer.
pub struct SyncSession<T: Transport, S: CalendarStore + Send> {
    config: SyncConfig,
    transport: T,
    calendar: SharedCalendar<S>,
    clock: Arc<dyn Clock>,
    state: Mutex<SessionState>,
}

impl<T: Transport, S: CalendarStore + Send> SyncSession<T, S> {
    /// Create a new session using wall-clock time.
    pub fn new(config: SyncConfig, transport: T, calendar: SharedCalendar<S>) -> Self {
        Self {
            config,
            transport,
            calendar,
            clock: Arc::new(SystemClock),
            state: Mutex::new(SessionState::new()),
        }
    }

    /// Replace the clock (for tests).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Connect to the configured peer.
    pub async fn connect(&self) -> Result<(), SessionError> {
        self.transport.connect(&self.config.peer_address).await?;
        tracing::info!("Connected to peer {}", self.config.peer_address);
        Ok(())
    }

    /// Build a package from the local calendar and send it.
    ///
    /// Returns the package that was sent.
    pub async fn send_calendar(&self) -> Result<SyncPackage, SessionError> {
        let events = self.calendar.snapshot().await;
        let package = generate(events, &self.config.identity, &*self.clock);
        let bytes = package.to_bytes()?;

        self.transport.send(&bytes).await?;
        tracing::info!(
            "Sent {} event(s) to {} ({} bytes)",
            package.events.len(),
            self.config.peer_address,
            bytes.len()
        );
        Ok(package)
    }

    /// Receive one package and turn it into proposals.
    ///
    /// Only a fully received, decoded and validated package is diffed.
    /// Any failure yields zero proposals, leaves storage untouched, and is
    /// returned to the caller as a session failure.
    pub async fn receive_proposals(&self) -> Result<Vec<PendingUpdate>, SessionError> {
        self.transition(SessionEvent::TransferStarted).await;

        let bytes = match self.transport.recv().await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.transition(SessionEvent::PeerDisconnected {
                    reason: e.to_string(),
                })
                .await;
                return Err(e.into());
            }
        };

        let proposals = match self.reconcile(&bytes).await {
            Ok(proposals) => proposals,
            Err(e) => {
                self.transition(SessionEvent::PackageRejected {
                    reason: e.to_string(),
                })
                .await;
                return Err(e);
            }
        };

        self.transition(SessionEvent::PackageAccepted {
            proposals: proposals.len(),
        })
        .await;
        Ok(proposals)
    }

    /// Send our calendar, then receive and diff the peer's.
    pub async fn exchange(&self) -> Result<Vec<PendingUpdate>, SessionError> {
        self.send_calendar().await?;
        self.receive_proposals().await
    }

    /// Commit one accepted proposal and durably save.
    ///
    /// Allowed in any state: only validated packages produce proposals, and
    /// re-applying one is harmless. The state only counts it as resolved.
    pub async fn accept(&self, proposal: &PendingUpdate) -> Result<(), SessionError> {
        let result = {
            let mut store = self.calendar.lock().await;
            apply(proposal, &mut *store)
        };
        self.transition(SessionEvent::ProposalResolved).await;

        match result {
            Ok(()) => {
                tracing::debug!("Applied {} ({})", proposal.id, proposal.summary());
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Could not apply {}: {}", proposal.id, e);
                Err(e.into())
            }
        }
    }

    /// Drop a proposal without applying it.
    pub async fn discard(&self, proposal: &PendingUpdate) {
        tracing::debug!("Discarded {}", proposal.id);
        self.transition(SessionEvent::ProposalResolved).await;
    }

    /// Accept every proposal in order; a failure affects only its own
    /// proposal.
    pub async fn accept_all(&self, proposals: &[PendingUpdate]) -> ApplyReport {
        let mut report = ApplyReport::default();
        for proposal in proposals {
            match self.accept(proposal).await {
                Ok(()) => report.applied.push(proposal.id),
                Err(e) => report.failed.push((proposal.id, e)),
            }
        }
        report
    }

    /// Current session state.
    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// End the session and close the transport.
    pub async fn close(&self) -> Result<(), SessionError> {
        self.transition(SessionEvent::CloseRequested).await;
        self.transport.close().await?;
        Ok(())
    }

    /// Get a reference to the underlying transport (for testing).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Decode, validate and diff under the calendar lock.
    async fn reconcile(&self, bytes: &[u8]) -> Result<Vec<PendingUpdate>, SessionError> {
        if bytes.len() > MAX_PACKAGE_SIZE {
            return Err(SessionError::TooLarge {
                size: bytes.len(),
                max: MAX_PACKAGE_SIZE,
            });
        }

        let package = SyncPackage::from_bytes(bytes)?;
        let now = self.clock.now();
        package
            .validate_with_max_age(now, self.config.max_package_age)
            .map_err(SyncError::from)?;

        tracing::info!(
            "Received {} event(s) from {}",
            package.events.len(),
            package.source_device
        );

        let store = self.calendar.lock().await;
        Ok(diff(&package, &*store, now)?)
    }

    async fn transition(&self, event: SessionEvent) {
        let actions = {
            let mut state = self.state.lock().await;
            let (new_state, actions) = state.clone().on_event(event);
            *state = new_state;
            actions
        };

        for action in actions {
            match action {
                SessionAction::EmitProposals { count } => {
                    tracing::info!("{} proposal(s) ready for review", count);
                }
                SessionAction::ReportFailure { reason } => {
                    tracing::warn!("Sync with {} failed: {}", self.config.peer_address, reason);
                }
                SessionAction::DiscardPartial => {
                    tracing::debug!("Discarding partial transfer");
                }
            }
        }
    }
}

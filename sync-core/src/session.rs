//! Sync session state machine.
//!
//! Tracks one exchange with one peer: waiting for a package, reviewing the
//! proposals it produced, or failed. Pure: it takes events and returns the
//! new state plus actions; sync-client performs the I/O.
//!
//! A transfer that ends in a disconnect or a rejected package never reaches
//! `Reviewing` and yields no proposals. `Reviewing` counts the proposals the
//! user has not resolved yet; it does not gate applying them, since a
//! proposal carries everything needed to apply it.

/// Session state - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing in flight.
    Idle,
    /// A package transfer from the peer is in progress.
    Receiving,
    /// A validated package produced proposals the user has not resolved.
    Reviewing {
        /// Proposals not yet accepted or discarded.
        pending: usize,
    },
    /// The last transfer was rejected or cut off.
    Failed {
        /// Why the session failed.
        reason: String,
    },
    /// Session finished; no further transfers.
    Closed,
}

impl SessionState {
    /// Create a new state machine in the Idle state.
    pub fn new() -> Self {
        Self::Idle
    }

    /// Process an event and return the new state plus actions to execute.
    pub fn on_event(self, event: SessionEvent) -> (Self, Vec<SessionAction>) {
        match (self, event) {
            // Starting a transfer (also retries after a failure)
            (Self::Idle | Self::Failed { .. }, SessionEvent::TransferStarted) => {
                (Self::Receiving, vec![])
            }

            // From Receiving
            (Self::Receiving, SessionEvent::PackageAccepted { proposals: 0 }) => {
                (Self::Idle, vec![SessionAction::EmitProposals { count: 0 }])
            }
            (Self::Receiving, SessionEvent::PackageAccepted { proposals }) => (
                Self::Reviewing { pending: proposals },
                vec![SessionAction::EmitProposals { count: proposals }],
            ),
            (Self::Receiving, SessionEvent::PackageRejected { reason }) => (
                Self::Failed {
                    reason: reason.clone(),
                },
                vec![SessionAction::ReportFailure { reason }],
            ),
            (Self::Receiving, SessionEvent::PeerDisconnected { reason }) => (
                Self::Failed {
                    reason: reason.clone(),
                },
                vec![
                    SessionAction::DiscardPartial,
                    SessionAction::ReportFailure { reason },
                ],
            ),
            (Self::Receiving, SessionEvent::CloseRequested) => {
                (Self::Closed, vec![SessionAction::DiscardPartial])
            }

            // From Reviewing: proposals stay actionable after a disconnect
            (Self::Reviewing { pending }, SessionEvent::ProposalResolved) => {
                let remaining = pending.saturating_sub(1);
                if remaining == 0 {
                    (Self::Idle, vec![])
                } else {
                    (Self::Reviewing { pending: remaining }, vec![])
                }
            }

            (Self::Closed, _) => (Self::Closed, vec![]),
            (_, SessionEvent::CloseRequested) => (Self::Closed, vec![]),

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// Whether emitted proposals are still awaiting a decision.
    pub fn is_reviewing(&self) -> bool {
        matches!(self, Self::Reviewing { .. })
    }

    /// Whether a transfer is in flight.
    pub fn is_receiving(&self) -> bool {
        matches!(self, Self::Receiving)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Events that can occur during a sync session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The peer began sending a package.
    TransferStarted,
    /// A complete package decoded, validated and was diffed.
    PackageAccepted {
        /// Number of proposals produced.
        proposals: usize,
    },
    /// A complete package failed decoding or validation.
    PackageRejected {
        /// Why it was rejected.
        reason: String,
    },
    /// The peer went away.
    PeerDisconnected {
        /// Reason reported by the transport.
        reason: String,
    },
    /// The user accepted or discarded one proposal.
    ProposalResolved,
    /// The application is ending the session.
    CloseRequested,
}

/// Actions to be executed by sync-client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Hand the proposals to the user.
    EmitProposals {
        /// How many there are.
        count: usize,
    },
    /// Surface a session failure to the user.
    ReportFailure {
        /// What went wrong.
        reason: String,
    },
    /// Drop any partially received bytes.
    DiscardPartial,
}

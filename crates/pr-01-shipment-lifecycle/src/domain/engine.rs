//! # Status Transition Engine
//!
//! The authoritative state machine for one shipment.
//!
//! ```text
//! Idle ─(PickedUp)→ AwaitingMediaGate ─→ Committed(PickedUp) | RolledBack
//! Committed(PickedUp) ─(InTransit)→ AwaitingConfirmGate ─→ Committed(InTransit) | RolledBack
//! Committed(InTransit) ─(Delivered)→ AwaitingCodeGate ─→ Terminal(Delivered) | RolledBack
//! ```
//!
//! ## Guards (`request`), evaluated in order
//!
//! | # | Condition | Result |
//! |---|-----------|--------|
//! | 1 | `delivered` | `Ok(Ignored)` |
//! | 2 | a transition is pending | `ConflictingTransition` |
//! | 3 | predecessor not reached | `PrerequisiteNotMet` |
//! | 4 | target already reached | `AlreadyCompleted` |

use shared_types::entities::{Milestone, ShipmentStatus, Timestamp};
use tracing::debug;
use uuid::Uuid;

use super::entities::{
    CommittedTransition, LifecycleConfig, PendingTransition, RollbackReason,
    RolledBackTransition, TransitionOutcome, TransitionRecord,
};
use super::errors::TransitionError;
use super::rollback::RollbackCoordinator;
use super::store::SnapshotStore;

/// Result of a request that passed or skipped the guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestDecision {
    /// The shipment is terminal; nothing happened.
    Ignored,
    /// A gate must now be opened for this transition.
    Opened(PendingTransition),
}

/// Where the engine is in the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// No gate open. Carries the furthest milestone reached.
    Idle(Option<Milestone>),
    /// A gate is open for this milestone.
    Awaiting(Milestone),
    /// Delivered. No further transitions.
    Terminal,
}

#[derive(Debug)]
pub struct TransitionEngine {
    config: LifecycleConfig,
    store: SnapshotStore,
    pending: Option<PendingTransition>,
    history: Vec<TransitionRecord>,
    rollback: RollbackCoordinator,
}

impl TransitionEngine {
    /// Start a shipment with no milestone reached.
    pub fn new(config: LifecycleConfig) -> Self {
        Self::resume(config, ShipmentStatus::initial())
    }

    /// Start from a prior status, e.g. an order that was already picked up.
    pub fn resume(config: LifecycleConfig, status: ShipmentStatus) -> Self {
        Self {
            config,
            store: SnapshotStore::new(status),
            pending: None,
            history: Vec::new(),
            rollback: RollbackCoordinator,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn status(&self) -> ShipmentStatus {
        self.store.status()
    }

    pub fn pending(&self) -> Option<&PendingTransition> {
        self.pending.as_ref()
    }

    pub fn history(&self) -> &[TransitionRecord] {
        &self.history
    }

    pub fn is_terminal(&self) -> bool {
        self.store.status().delivered()
    }

    pub fn phase(&self) -> EnginePhase {
        if self.is_terminal() {
            EnginePhase::Terminal
        } else if let Some(pending) = &self.pending {
            EnginePhase::Awaiting(pending.target)
        } else {
            EnginePhase::Idle(self.store.status().latest())
        }
    }

    /// Validate a transition request and, if it passes, snapshot the
    /// status and create the pending transition.
    ///
    /// # Errors
    /// - `ConflictingTransition` if a gate is already open
    /// - `PrerequisiteNotMet` if the predecessor is not reached
    /// - `AlreadyCompleted` if the target is already reached
    pub fn request(
        &mut self,
        milestone: Milestone,
        now: Timestamp,
    ) -> Result<RequestDecision, TransitionError> {
        let status = self.store.status();

        if status.delivered() {
            debug!(milestone = %milestone, "Request ignored: shipment is terminal");
            return Ok(RequestDecision::Ignored);
        }

        if let Some(pending) = &self.pending {
            return Err(TransitionError::ConflictingTransition {
                requested: milestone,
                pending: pending.target,
            });
        }

        if let Some(required) = milestone.predecessor() {
            if !status.is_reached(required) {
                return Err(TransitionError::PrerequisiteNotMet {
                    requested: milestone,
                    required,
                });
            }
        }

        if status.is_reached(milestone) {
            return Err(TransitionError::AlreadyCompleted(milestone));
        }

        let snapshot = self.store.take_snapshot(now);
        let pending = PendingTransition::new(milestone, snapshot, now);
        self.pending = Some(pending.clone());

        Ok(RequestDecision::Opened(pending))
    }

    /// Commit the pending transition `id` after its gate passed.
    pub fn commit(
        &mut self,
        id: Uuid,
        now: Timestamp,
    ) -> Result<CommittedTransition, TransitionError> {
        let pending = self
            .pending
            .as_ref()
            .ok_or(TransitionError::NoPendingTransition)?;
        if pending.id != id {
            return Err(TransitionError::StaleTransition(id));
        }
        let milestone = pending.target;

        let status = self.store.raise(milestone);
        self.pending = None;
        self.history.push(TransitionRecord {
            transition_id: id,
            milestone,
            outcome: TransitionOutcome::Committed,
            status,
            at: now,
        });

        Ok(CommittedTransition {
            transition_id: id,
            milestone,
            status,
            terminal: milestone.is_terminal(),
        })
    }

    /// Roll back the pending transition `id`. A no-op returning `None` if
    /// it was already committed or rolled back.
    pub fn abort(
        &mut self,
        id: Uuid,
        reason: RollbackReason,
        now: Timestamp,
    ) -> Option<RolledBackTransition> {
        let rolled = self
            .rollback
            .rollback(&mut self.store, &mut self.pending, id, reason)?;
        self.history.push(TransitionRecord {
            transition_id: rolled.transition_id,
            milestone: rolled.milestone,
            outcome: TransitionOutcome::RolledBack(rolled.reason.clone()),
            status: rolled.restored,
            at: now,
        });
        Some(rolled)
    }

    /// Roll back the pending transition if its gate has been open longer
    /// than the configured timeout.
    pub fn cleanup_timeouts(&mut self, now: Timestamp) -> Option<RolledBackTransition> {
        let timeout = self.config.pending_timeout_ms?;
        let pending = self.pending.as_ref()?;
        if !pending.is_timed_out(now, timeout) {
            return None;
        }
        let id = pending.id;
        self.abort(id, RollbackReason::TimedOut, now)
    }
}

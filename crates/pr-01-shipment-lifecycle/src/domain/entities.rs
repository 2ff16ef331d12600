//! Core domain entities for the Shipment Lifecycle subsystem.

use serde::{Deserialize, Serialize};
use shared_types::entities::{GateKind, MediaKind, Milestone, ShipmentStatus, Timestamp};
use std::fmt;
use uuid::Uuid;

use super::errors::LifecycleError;

/// Number of digits in a verification code.
pub const CODE_LENGTH: usize = 4;

/// The status as it was before a transition attempt began.
///
/// Owned by the pending transition so a rollback never depends on any
/// state outside of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub status: ShipmentStatus,
    pub taken_at: Timestamp,
}

/// A transition waiting on its gate.
///
/// At most one exists at a time. Created on request, destroyed on commit
/// or rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransition {
    /// Unique per attempt, so a late result can't resolve a newer attempt.
    pub id: Uuid,
    pub target: Milestone,
    pub gate: GateKind,
    pub snapshot: Snapshot,
    pub opened_at: Timestamp,
}

impl PendingTransition {
    pub fn new(target: Milestone, snapshot: Snapshot, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            target,
            gate: target.gate_kind(),
            snapshot,
            opened_at: now,
        }
    }

    /// Whether the gate has been open longer than `timeout_ms`.
    pub fn is_timed_out(&self, now: Timestamp, timeout_ms: u64) -> bool {
        now.saturating_sub(self.opened_at) >= timeout_ms
    }
}

/// Why a pending transition was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollbackReason {
    /// The transporter explicitly cancelled the gate.
    Cancelled,
    /// The prompt or picker was dismissed without an answer.
    Dismissed,
    /// The transporter navigated away while the gate was open.
    NavigatedAway,
    /// The gate failed (device or file error).
    GateFailed(String),
    /// Too many wrong codes.
    AttemptsExhausted,
    /// The gate stayed open past the configured timeout.
    TimedOut,
}

impl fmt::Display for RollbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("cancelled"),
            Self::Dismissed => f.write_str("dismissed"),
            Self::NavigatedAway => f.write_str("left the shipment screen"),
            Self::GateFailed(reason) => write!(f, "failed: {reason}"),
            Self::AttemptsExhausted => f.write_str("too many incorrect codes"),
            Self::TimedOut => f.write_str("timed out"),
        }
    }
}

/// How a transition attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionOutcome {
    Committed,
    RolledBack(RollbackReason),
}

/// One entry of the transition history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub transition_id: Uuid,
    pub milestone: Milestone,
    pub outcome: TransitionOutcome,
    /// Status right after the outcome was applied.
    pub status: ShipmentStatus,
    pub at: Timestamp,
}

/// A transition that was just committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedTransition {
    pub transition_id: Uuid,
    pub milestone: Milestone,
    pub status: ShipmentStatus,
    /// The shipment has reached its last milestone.
    pub terminal: bool,
}

/// A transition that was just rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolledBackTransition {
    pub transition_id: Uuid,
    pub milestone: Milestone,
    pub restored: ShipmentStatus,
    pub reason: RollbackReason,
}

/// Lifecycle configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Wrong codes allowed before the code gate closes. `None` = unlimited.
    pub max_code_attempts: Option<u32>,
    /// Gate open time after which `cleanup_timeouts` rolls back. `None` = never.
    pub pending_timeout_ms: Option<u64>,
    /// What the pickup gate asks the media picker for.
    pub pickup_media_kind: MediaKind,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_code_attempts: Some(5),
            pending_timeout_ms: None,
            pickup_media_kind: MediaKind::Photo,
        }
    }
}

impl LifecycleConfig {
    /// Creates a minimal config for testing.
    pub fn for_testing() -> Self {
        Self {
            max_code_attempts: Some(3),
            pending_timeout_ms: Some(1000), // 1 second
            ..Default::default()
        }
    }

    /// Reject settings that would make a gate impossible to pass.
    pub fn validate(&self) -> Result<(), LifecycleError> {
        if self.max_code_attempts == Some(0) {
            return Err(LifecycleError::InvalidConfig(
                "max_code_attempts must be at least 1".to_string(),
            ));
        }
        if self.pending_timeout_ms == Some(0) {
            return Err(LifecycleError::InvalidConfig(
                "pending_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

//! Lifecycle error types.
//!
//! Every rejection is returned as a value. Nothing here is fatal: a rejected
//! request leaves the status exactly as it was.

use shared_types::entities::{GateKind, Milestone};
use shared_types::errors::StatusError;
use thiserror::Error;
use uuid::Uuid;

/// Rejections raised by the transition engine's guards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Another transition is waiting on its gate.
    #[error("cannot start {requested}: {pending} is still awaiting confirmation")]
    ConflictingTransition {
        requested: Milestone,
        pending: Milestone,
    },

    /// The immediate predecessor has not been reached.
    #[error("cannot start {requested}: {required} must be completed first")]
    PrerequisiteNotMet {
        requested: Milestone,
        required: Milestone,
    },

    /// The milestone was already reached.
    #[error("{0} is already completed")]
    AlreadyCompleted(Milestone),

    /// Commit or rollback was asked for while nothing is pending.
    #[error("no transition is pending")]
    NoPendingTransition,

    /// The id does not belong to the pending transition.
    #[error("transition {0} is not the pending transition")]
    StaleTransition(Uuid),
}

/// Invalid input into the four-slot code entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeEntryError {
    #[error("slot {slot} is out of range (0..{len})")]
    SlotOutOfRange { slot: usize, len: usize },

    #[error("'{0}' is not a digit")]
    NotADigit(char),

    #[error("a code must be exactly {expected} digits, got {actual:?}")]
    MalformedCode { expected: usize, actual: String },
}

/// Failure reported by the media picker.
///
/// `Cancelled` and `NoSelection` end the gate as a cancellation; the other
/// variants end it as a failure. Both roll back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickerError {
    #[error("capture was cancelled")]
    Cancelled,

    #[error("no asset was selected")]
    NoSelection,

    #[error("capture device error: {0}")]
    Device(String),

    #[error("could not read asset: {0}")]
    File(String),
}

impl PickerError {
    /// Whether this error is the user backing out rather than a fault.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::NoSelection)
    }
}

/// Failure reaching the code verifier. Never counted as an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifierError {
    #[error("no reference code for {0}")]
    NoReferenceCode(Milestone),

    #[error("verifier unavailable: {0}")]
    Unavailable(String),
}

/// Failure crediting a committed milestone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EarningsPortError {
    #[error("earnings ledger rejected the award: {0}")]
    Rejected(String),

    #[error("earnings ledger unavailable: {0}")]
    Unavailable(String),
}

/// Service-level error for the lifecycle API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    CodeEntry(#[from] CodeEntryError),

    #[error(transparent)]
    InvalidStatus(#[from] StatusError),

    /// The call needs a gate but none is open.
    #[error("no gate is open")]
    NoOpenGate,

    /// The call targets a different gate than the one open.
    #[error("expected a {expected} gate but {open} is open")]
    WrongGate { expected: GateKind, open: GateKind },

    #[error("invalid lifecycle configuration: {0}")]
    InvalidConfig(String),
}

//! # Inbound Port - ShipmentLifecycleApi
//!
//! Primary driving port used by the transporter's shipment screen.
//!
//! | Method | Gate | Effect |
//! |--------|------|--------|
//! | `request_transition` | any | guards, snapshot, open gate |
//! | `capture_media` | MediaCapture | await picker, commit or roll back |
//! | `respond` | Confirmation | commit on Confirm, roll back otherwise |
//! | `enter_code_digit` / `erase_code_digit` / `enter_code` | CodeVerification | edit slots, auto-submit |
//! | `verify_code` | CodeVerification | explicit Verify trigger |
//! | `cancel_pending` | any | roll back (idempotent) |
//! | `cleanup_timeouts` | any | roll back a gate open too long |

use async_trait::async_trait;
use shared_types::confirmation::{ConfirmationAction, ConfirmationRequest};
use shared_types::entities::{
    AssetUri, Credits, MediaKind, MediaSource, Milestone, ShipmentId, ShipmentStatus,
};
use uuid::Uuid;

use crate::domain::{LifecycleError, PendingTransition, RollbackReason, TransitionRecord};

/// What the screen must show after a successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatePrompt {
    /// Offer camera and library.
    Media { transition_id: Uuid, kind: MediaKind },
    /// Ask the confirmation question.
    Confirm {
        transition_id: Uuid,
        request: ConfirmationRequest,
    },
    /// Show the four code slots.
    Code { transition_id: Uuid, slots: usize },
}

impl GatePrompt {
    pub fn transition_id(&self) -> Uuid {
        match self {
            Self::Media { transition_id, .. }
            | Self::Confirm { transition_id, .. }
            | Self::Code { transition_id, .. } => *transition_id,
        }
    }
}

/// Result of `request_transition`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The shipment is terminal. Nothing happened.
    Ignored,
    Opened(GatePrompt),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub transition_id: Uuid,
    pub milestone: Milestone,
    pub status: ShipmentStatus,
    /// Credit added by this commit. `None` if nothing new was credited.
    pub credit: Option<Credits>,
    /// Delivered: hand over to the completed view.
    pub terminal: bool,
    /// The asset that passed the media gate.
    pub evidence: Option<AssetUri>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackReport {
    pub transition_id: Uuid,
    pub milestone: Milestone,
    pub restored: ShipmentStatus,
    pub reason: RollbackReason,
}

/// How a gate interaction ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionReport {
    Committed(CommitReport),
    RolledBack(RollbackReport),
}

/// Result of a code entry or verification trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Not all slots are filled yet.
    Incomplete { focus: usize },
    /// Another trigger is already verifying this code.
    InProgress,
    /// Wrong code. The gate stays open.
    Mismatch { remaining: Option<u32> },
    /// The verifier could not answer. The gate stays open.
    Unavailable { reason: String },
    /// The delivery was already committed by an earlier trigger.
    AlreadyCommitted,
    /// The gate closed.
    Resolved(TransitionReport),
}

/// Who abandoned the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelCause {
    /// The Cancel action.
    Explicit,
    /// Back-navigation while the gate was open.
    NavigatedAway,
}

impl From<CancelCause> for RollbackReason {
    fn from(cause: CancelCause) -> Self {
        match cause {
            CancelCause::Explicit => RollbackReason::Cancelled,
            CancelCause::NavigatedAway => RollbackReason::NavigatedAway,
        }
    }
}

/// Primary API for the Shipment Lifecycle subsystem.
///
/// # Example
///
/// ```rust,ignore
/// use pr_01_shipment_lifecycle::ports::*;
///
/// async fn pickup(api: &impl ShipmentLifecycleApi) -> Result<(), LifecycleError> {
///     api.request_transition(Milestone::PickedUp).await?;
///     match api.capture_media(MediaSource::Camera).await? {
///         TransitionReport::Committed(report) => println!("+{:?}", report.credit),
///         TransitionReport::RolledBack(report) => println!("{}", report.reason),
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ShipmentLifecycleApi: Send + Sync {
    fn shipment(&self) -> &ShipmentId;

    /// Validates the request and opens the milestone's gate.
    ///
    /// # Errors
    /// - `ConflictingTransition`: a gate is already open
    /// - `PrerequisiteNotMet`: the previous milestone is not reached
    /// - `AlreadyCompleted`: the milestone is already reached
    async fn request_transition(
        &self,
        milestone: Milestone,
    ) -> Result<RequestOutcome, LifecycleError>;

    /// Runs the media picker for the open pickup gate.
    async fn capture_media(&self, source: MediaSource)
        -> Result<TransitionReport, LifecycleError>;

    /// Answers the open confirmation gate.
    async fn respond(&self, action: ConfirmationAction)
        -> Result<TransitionReport, LifecycleError>;

    /// Types one digit. Verifies automatically once all slots are filled.
    async fn enter_code_digit(
        &self,
        slot: usize,
        digit: char,
    ) -> Result<VerifyOutcome, LifecycleError>;

    /// Backspace on a slot. Returns the new focus.
    fn erase_code_digit(&self, slot: usize) -> Result<usize, LifecycleError>;

    /// Fills every slot at once and verifies.
    async fn enter_code(&self, code: &str) -> Result<VerifyOutcome, LifecycleError>;

    /// The explicit Verify trigger.
    async fn verify_code(&self) -> Result<VerifyOutcome, LifecycleError>;

    /// Abandons the open gate. `Ok(None)` if nothing was pending.
    async fn cancel_pending(
        &self,
        cause: CancelCause,
    ) -> Result<Option<RollbackReport>, LifecycleError>;

    /// Rolls back a gate that stayed open past the configured timeout.
    async fn cleanup_timeouts(&self) -> Option<RollbackReport>;

    fn status(&self) -> ShipmentStatus;

    fn pending(&self) -> Option<PendingTransition>;

    fn is_terminal(&self) -> bool;

    fn history(&self) -> Vec<TransitionRecord>;
}

//! # Gates
//!
//! The confirmation step that must pass before a milestone is committed.
//!
//! | Gate | Milestone | Passes when |
//! |------|-----------|-------------|
//! | `MediaCaptureGate` | PickedUp | the picker returns a non-empty URI |
//! | `ConfirmationGate` | InTransit | the transporter answers `Confirm` |
//! | `CodeVerificationGate` | Delivered | the entered code matches the reference |
//!
//! Gates decide outcomes only. Waiting on the picker or verifier and the
//! commit/rollback that follows belong to the service.

use shared_types::confirmation::{ConfirmationAction, ConfirmationRequest};
use shared_types::entities::{AssetUri, GateKind, MediaKind, Milestone};

use super::code_entry::CodeEntry;
use super::errors::PickerError;

/// How a gate resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome<T> {
    /// The gate passed with its evidence.
    Passed(T),
    /// The transporter backed out.
    Cancelled,
    /// The gate could not complete.
    Failed(String),
}

/// Pickup gate: one resolved photo or video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaCaptureGate {
    pub kind: MediaKind,
}

impl MediaCaptureGate {
    pub fn new(kind: MediaKind) -> Self {
        Self { kind }
    }

    /// Interpret a picker result. Only the URI's existence matters.
    pub fn resolve(&self, result: Result<AssetUri, PickerError>) -> GateOutcome<AssetUri> {
        match result {
            Ok(uri) if uri.is_empty() => GateOutcome::Cancelled,
            Ok(uri) => GateOutcome::Passed(uri),
            Err(e) if e.is_cancellation() => GateOutcome::Cancelled,
            Err(e) => GateOutcome::Failed(e.to_string()),
        }
    }
}

/// Transit gate: a plain yes/no.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationGate {
    pub request: ConfirmationRequest,
}

impl ConfirmationGate {
    pub fn new(milestone: Milestone) -> Self {
        Self {
            request: ConfirmationRequest::for_milestone(milestone),
        }
    }

    pub fn resolve(&self, action: ConfirmationAction) -> GateOutcome<()> {
        match action {
            ConfirmationAction::Confirm => GateOutcome::Passed(()),
            ConfirmationAction::Cancel | ConfirmationAction::Dismiss => GateOutcome::Cancelled,
        }
    }
}

/// Result of checking one code against the gate's attempt budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    Accepted,
    /// Wrong code; `remaining` is `None` when attempts are unlimited.
    Mismatch { remaining: Option<u32> },
    /// Wrong code and no attempts left.
    Exhausted,
}

/// Delivery gate: four digits compared against the reference code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeVerificationGate {
    pub entry: CodeEntry,
    attempts: u32,
    max_attempts: Option<u32>,
    last_rejected: Option<String>,
    in_flight: bool,
}

impl CodeVerificationGate {
    pub fn new(max_attempts: Option<u32>) -> Self {
        Self {
            entry: CodeEntry::new(),
            attempts: 0,
            max_attempts,
            last_rejected: None,
            in_flight: false,
        }
    }

    /// Wrong codes counted so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn remaining(&self) -> Option<u32> {
        self.max_attempts
            .map(|max| max.saturating_sub(self.attempts))
    }

    /// Whether `code` is the one most recently rejected.
    ///
    /// Re-submitting it is answered from here without a second
    /// verification round-trip or another counted attempt.
    pub fn already_rejected(&self, code: &str) -> bool {
        self.last_rejected.as_deref() == Some(code)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Mark a verification round-trip as started. Returns `false` if one
    /// is already running.
    pub fn begin_verify(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn end_verify(&mut self) {
        self.in_flight = false;
    }

    /// Record the verifier's answer for `code`.
    pub fn record(&mut self, code: &str, matched: bool) -> CodeCheck {
        if matched {
            return CodeCheck::Accepted;
        }
        self.attempts = self.attempts.saturating_add(1);
        self.last_rejected = Some(code.to_string());
        match self.remaining() {
            Some(0) => CodeCheck::Exhausted,
            remaining => CodeCheck::Mismatch { remaining },
        }
    }
}

/// The gate currently open, one per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenGate {
    MediaCapture(MediaCaptureGate),
    Confirmation(ConfirmationGate),
    CodeVerification(CodeVerificationGate),
}

impl OpenGate {
    /// Build the gate a milestone requires.
    pub fn for_milestone(
        milestone: Milestone,
        media_kind: MediaKind,
        max_code_attempts: Option<u32>,
    ) -> Self {
        match milestone.gate_kind() {
            GateKind::MediaCapture => Self::MediaCapture(MediaCaptureGate::new(media_kind)),
            GateKind::Confirmation => Self::Confirmation(ConfirmationGate::new(milestone)),
            GateKind::CodeVerification => {
                Self::CodeVerification(CodeVerificationGate::new(max_code_attempts))
            }
        }
    }

    pub fn kind(&self) -> GateKind {
        match self {
            Self::MediaCapture(_) => GateKind::MediaCapture,
            Self::Confirmation(_) => GateKind::Confirmation,
            Self::CodeVerification(_) => GateKind::CodeVerification,
        }
    }
}

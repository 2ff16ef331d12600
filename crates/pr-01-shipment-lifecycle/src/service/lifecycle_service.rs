//! Shipment Lifecycle Service
//!
//! Orchestrates the transition engine, the open gate and the outbound
//! ports.
//!
//! ## Locking
//!
//! State sits behind a synchronous mutex that is never held across an
//! `.await`. Waiting on the picker or verifier happens with the lock
//! released, and every result is re-checked against the transition id
//! before it is applied.
//!
//! ## Cancellation
//!
//! Each gate subscribes to a shared cancel epoch when it opens. Bumping the
//! epoch (through a [`GateCanceller`] or any rollback) wakes an in-flight
//! picker or verifier wait, which then resolves as cancelled.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::confirmation::ConfirmationAction;
use shared_types::entities::{
    AssetUri, GateKind, MediaSource, Milestone, ShipmentId, ShipmentStatus,
};
use shared_types::time::TimeSource;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::{
    CodeCheck, CodeEntry, GateOutcome, LifecycleConfig, LifecycleError, OpenGate,
    PendingTransition, RequestDecision, RollbackReason, RolledBackTransition, TransitionEngine,
    TransitionError, TransitionOutcome, TransitionRecord, CODE_LENGTH,
};
use crate::ports::{
    CancelCause, CodeVerifier, CommitReport, EarningsPort, GatePrompt, LifecycleNotifier,
    MediaPicker, RequestOutcome, RollbackReport, ShipmentLifecycleApi, TransitionReport,
    VerifyOutcome,
};

/// Outbound dependencies of the service.
#[derive(Clone)]
pub struct LifecyclePorts {
    pub picker: Arc<dyn MediaPicker>,
    pub verifier: Arc<dyn CodeVerifier>,
    pub earnings: Arc<dyn EarningsPort>,
    pub notifier: Arc<dyn LifecycleNotifier>,
    pub time: Arc<dyn TimeSource>,
}

/// Cloneable handle that cancels whatever gate is open.
///
/// Usable from another task while a gate call is awaiting its collaborator.
#[derive(Clone, Debug)]
pub struct GateCanceller {
    epoch: Arc<watch::Sender<u64>>,
}

impl GateCanceller {
    pub fn cancel(&self) {
        bump(&self.epoch);
    }
}

fn bump(epoch: &watch::Sender<u64>) {
    epoch.send_modify(|e| *e = e.wrapping_add(1));
}

struct GateSlot {
    transition_id: Uuid,
    milestone: Milestone,
    gate: OpenGate,
    cancel_rx: watch::Receiver<u64>,
}

impl GateSlot {
    fn cancel_requested(&self) -> bool {
        self.cancel_rx.has_changed().unwrap_or(false)
    }
}

struct LifecycleState {
    engine: TransitionEngine,
    gate: Option<GateSlot>,
}

impl LifecycleState {
    fn close_gate(&mut self, id: Uuid) {
        if self.gate.as_ref().is_some_and(|slot| slot.transition_id == id) {
            self.gate = None;
        }
    }

    /// The report for a transition that an earlier call already settled.
    fn settled_report(&self, id: Uuid) -> Result<TransitionReport, LifecycleError> {
        let record = self
            .engine
            .history()
            .iter()
            .rev()
            .find(|r| r.transition_id == id)
            .ok_or(TransitionError::StaleTransition(id))?;

        Ok(match &record.outcome {
            TransitionOutcome::Committed => TransitionReport::Committed(CommitReport {
                transition_id: id,
                milestone: record.milestone,
                status: record.status,
                credit: None,
                terminal: record.milestone.is_terminal(),
                evidence: None,
            }),
            TransitionOutcome::RolledBack(reason) => TransitionReport::RolledBack(RollbackReport {
                transition_id: id,
                milestone: record.milestone,
                restored: record.status,
                reason: reason.clone(),
            }),
        })
    }
}

impl From<RolledBackTransition> for RollbackReport {
    fn from(rolled: RolledBackTransition) -> Self {
        Self {
            transition_id: rolled.transition_id,
            milestone: rolled.milestone,
            restored: rolled.restored,
            reason: rolled.reason,
        }
    }
}

/// Shipment Lifecycle Service
///
/// Implements the `ShipmentLifecycleApi` port for one shipment.
pub struct ShipmentLifecycleService {
    shipment: ShipmentId,
    config: LifecycleConfig,
    state: Mutex<LifecycleState>,
    ports: LifecyclePorts,
    cancel_epoch: Arc<watch::Sender<u64>>,
}

impl ShipmentLifecycleService {
    /// Start a shipment with no milestone reached.
    pub fn new(
        shipment: ShipmentId,
        config: LifecycleConfig,
        ports: LifecyclePorts,
    ) -> Result<Self, LifecycleError> {
        Self::resume(shipment, config, ports, ShipmentStatus::initial())
    }

    /// Start from the order's prior status.
    pub fn resume(
        shipment: ShipmentId,
        config: LifecycleConfig,
        ports: LifecyclePorts,
        status: ShipmentStatus,
    ) -> Result<Self, LifecycleError> {
        config.validate()?;
        let (cancel_epoch, _) = watch::channel(0u64);
        info!(shipment = %shipment, status = %status, "Shipment lifecycle started");
        Ok(Self {
            shipment,
            config: config.clone(),
            state: Mutex::new(LifecycleState {
                engine: TransitionEngine::resume(config, status),
                gate: None,
            }),
            ports,
            cancel_epoch: Arc::new(cancel_epoch),
        })
    }

    /// Start from raw backend flags, rejecting an out-of-order combination.
    pub fn resume_from_flags(
        shipment: ShipmentId,
        config: LifecycleConfig,
        ports: LifecyclePorts,
        picked_up: bool,
        in_transit: bool,
        delivered: bool,
    ) -> Result<Self, LifecycleError> {
        let status = ShipmentStatus::from_flags(picked_up, in_transit, delivered)?;
        Self::resume(shipment, config, ports, status)
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn canceller(&self) -> GateCanceller {
        GateCanceller {
            epoch: self.cancel_epoch.clone(),
        }
    }

    /// The code slots of the open delivery gate.
    pub fn code_entry(&self) -> Option<CodeEntry> {
        let state = self.state.lock();
        match state.gate.as_ref().map(|slot| &slot.gate) {
            Some(OpenGate::CodeVerification(gate)) => Some(gate.entry.clone()),
            _ => None,
        }
    }

    /// Roll back an open gate whose cancel handle fired while no
    /// collaborator call was in flight.
    async fn settle_cancellation(&self) -> Option<TransitionReport> {
        let id = {
            let state = self.state.lock();
            let slot = state.gate.as_ref()?;
            if !slot.cancel_requested() {
                return None;
            }
            slot.transition_id
        };
        self.roll_back(id, RollbackReason::Cancelled).await.ok()
    }

    async fn commit(
        &self,
        id: Uuid,
        evidence: Option<AssetUri>,
    ) -> Result<TransitionReport, LifecycleError> {
        let committed = {
            let mut state = self.state.lock();
            let now = self.ports.time.now();
            match state.engine.commit(id, now) {
                Ok(committed) => {
                    state.close_gate(id);
                    committed
                }
                Err(_) => return state.settled_report(id),
            }
        };

        info!(
            shipment = %self.shipment,
            milestone = %committed.milestone,
            transition_id = %id,
            status = %committed.status,
            "Transition committed"
        );

        let credit = match self
            .ports
            .earnings
            .award(&self.shipment, committed.milestone.into())
            .await
        {
            Ok(credit) => credit,
            Err(e) => {
                error!(
                    shipment = %self.shipment,
                    milestone = %committed.milestone,
                    error = %e,
                    "Award failed after commit"
                );
                None
            }
        };

        self.ports
            .notifier
            .transition_committed(&self.shipment, id, committed.milestone, committed.status)
            .await;

        if committed.terminal {
            info!(shipment = %self.shipment, "Shipment delivered");
            self.ports.notifier.shipment_terminal(&self.shipment).await;
        }

        Ok(TransitionReport::Committed(CommitReport {
            transition_id: id,
            milestone: committed.milestone,
            status: committed.status,
            credit,
            terminal: committed.terminal,
            evidence,
        }))
    }

    async fn roll_back(
        &self,
        id: Uuid,
        reason: RollbackReason,
    ) -> Result<TransitionReport, LifecycleError> {
        let rolled = {
            let mut state = self.state.lock();
            let now = self.ports.time.now();
            match state.engine.abort(id, reason, now) {
                Some(rolled) => {
                    state.close_gate(id);
                    bump(&self.cancel_epoch);
                    rolled
                }
                None => return state.settled_report(id),
            }
        };

        self.announce_rollback(&rolled).await;
        Ok(TransitionReport::RolledBack(rolled.into()))
    }

    async fn announce_rollback(&self, rolled: &RolledBackTransition) {
        warn!(
            shipment = %self.shipment,
            milestone = %rolled.milestone,
            transition_id = %rolled.transition_id,
            reason = %rolled.reason,
            "Transition rolled back"
        );
        self.ports
            .notifier
            .transition_rolled_back(
                &self.shipment,
                rolled.transition_id,
                rolled.milestone,
                rolled.restored,
                &rolled.reason,
            )
            .await;
    }

    /// Run one verification round-trip for the entered code.
    ///
    /// Both the auto-submit and the Verify button land here. A code that
    /// was just rejected is answered without asking the verifier again, and
    /// a second trigger while a round-trip is running is told so.
    async fn attempt_verify(&self) -> Result<VerifyOutcome, LifecycleError> {
        if let Some(report) = self.settle_cancellation().await {
            return Ok(VerifyOutcome::Resolved(report));
        }

        let (id, milestone, code, mut cancel_rx) = {
            let mut state = self.state.lock();
            let terminal = state.engine.is_terminal();
            let Some(slot) = state.gate.as_mut() else {
                if terminal {
                    return Ok(VerifyOutcome::AlreadyCommitted);
                }
                return Err(LifecycleError::NoOpenGate);
            };
            let open = slot.gate.kind();
            let OpenGate::CodeVerification(gate) = &mut slot.gate else {
                return Err(LifecycleError::WrongGate {
                    expected: GateKind::CodeVerification,
                    open,
                });
            };
            let Some(code) = gate.entry.code() else {
                return Ok(VerifyOutcome::Incomplete {
                    focus: gate.entry.focus(),
                });
            };
            if gate.already_rejected(&code) {
                return Ok(VerifyOutcome::Mismatch {
                    remaining: gate.remaining(),
                });
            }
            if !gate.begin_verify() {
                return Ok(VerifyOutcome::InProgress);
            }
            (slot.transition_id, slot.milestone, code, slot.cancel_rx.clone())
        };

        let answer = tokio::select! {
            biased;
            _ = cancel_rx.changed() => None,
            answer = self.ports.verifier.verify(&self.shipment, milestone, &code) => Some(answer),
        };
        let Some(answer) = answer else {
            return Ok(VerifyOutcome::Resolved(
                self.roll_back(id, RollbackReason::Cancelled).await?,
            ));
        };

        let check = {
            let mut state = self.state.lock();
            let current = state.gate.as_mut().and_then(|slot| match &mut slot.gate {
                OpenGate::CodeVerification(gate) if slot.transition_id == id => Some(gate),
                _ => None,
            });
            match current {
                Some(gate) => {
                    gate.end_verify();
                    answer.map(|matched| gate.record(&code, matched))
                }
                // Settled by a cancel or timeout while the verifier was busy
                None => return state.settled_report(id).map(VerifyOutcome::Resolved),
            }
        };

        match check {
            Ok(CodeCheck::Accepted) => Ok(VerifyOutcome::Resolved(self.commit(id, None).await?)),
            Ok(CodeCheck::Mismatch { remaining }) => {
                debug!(shipment = %self.shipment, remaining = ?remaining, "Code mismatch");
                Ok(VerifyOutcome::Mismatch { remaining })
            }
            Ok(CodeCheck::Exhausted) => Ok(VerifyOutcome::Resolved(
                self.roll_back(id, RollbackReason::AttemptsExhausted).await?,
            )),
            Err(e) => {
                warn!(shipment = %self.shipment, error = %e, "Code verifier unavailable");
                Ok(VerifyOutcome::Unavailable {
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl ShipmentLifecycleApi for ShipmentLifecycleService {
    fn shipment(&self) -> &ShipmentId {
        &self.shipment
    }

    async fn request_transition(
        &self,
        milestone: Milestone,
    ) -> Result<RequestOutcome, LifecycleError> {
        self.settle_cancellation().await;

        let (prompt, gate_kind) = {
            let mut state = self.state.lock();
            let now = self.ports.time.now();
            let pending = match state.engine.request(milestone, now) {
                Ok(RequestDecision::Ignored) => return Ok(RequestOutcome::Ignored),
                Ok(RequestDecision::Opened(pending)) => pending,
                Err(e) => {
                    debug!(shipment = %self.shipment, milestone = %milestone, reason = %e, "Transition rejected");
                    return Err(e.into());
                }
            };

            let gate = OpenGate::for_milestone(
                milestone,
                self.config.pickup_media_kind,
                self.config.max_code_attempts,
            );
            let prompt = match &gate {
                OpenGate::MediaCapture(g) => GatePrompt::Media {
                    transition_id: pending.id,
                    kind: g.kind,
                },
                OpenGate::Confirmation(g) => GatePrompt::Confirm {
                    transition_id: pending.id,
                    request: g.request.clone(),
                },
                OpenGate::CodeVerification(_) => GatePrompt::Code {
                    transition_id: pending.id,
                    slots: CODE_LENGTH,
                },
            };
            let kind = gate.kind();
            state.gate = Some(GateSlot {
                transition_id: pending.id,
                milestone,
                gate,
                cancel_rx: self.cancel_epoch.subscribe(),
            });
            (prompt, kind)
        };

        info!(
            shipment = %self.shipment,
            milestone = %milestone,
            transition_id = %prompt.transition_id(),
            gate = %gate_kind,
            "Gate opened"
        );
        self.ports
            .notifier
            .gate_opened(&self.shipment, prompt.transition_id(), milestone, gate_kind)
            .await;

        Ok(RequestOutcome::Opened(prompt))
    }

    async fn capture_media(
        &self,
        source: MediaSource,
    ) -> Result<TransitionReport, LifecycleError> {
        if let Some(report) = self.settle_cancellation().await {
            return Ok(report);
        }

        let (id, gate, mut cancel_rx) = {
            let state = self.state.lock();
            let slot = state.gate.as_ref().ok_or(LifecycleError::NoOpenGate)?;
            let OpenGate::MediaCapture(gate) = &slot.gate else {
                return Err(LifecycleError::WrongGate {
                    expected: GateKind::MediaCapture,
                    open: slot.gate.kind(),
                });
            };
            (slot.transition_id, *gate, slot.cancel_rx.clone())
        };

        let result = tokio::select! {
            biased;
            _ = cancel_rx.changed() => None,
            result = self.ports.picker.capture(gate.kind, source) => Some(result),
        };
        let Some(result) = result else {
            return self.roll_back(id, RollbackReason::Cancelled).await;
        };

        match gate.resolve(result) {
            GateOutcome::Passed(uri) => {
                debug!(shipment = %self.shipment, uri = %uri, "Media resolved");
                self.commit(id, Some(uri)).await
            }
            GateOutcome::Cancelled => self.roll_back(id, RollbackReason::Cancelled).await,
            GateOutcome::Failed(reason) => {
                self.roll_back(id, RollbackReason::GateFailed(reason)).await
            }
        }
    }

    async fn respond(
        &self,
        action: ConfirmationAction,
    ) -> Result<TransitionReport, LifecycleError> {
        if let Some(report) = self.settle_cancellation().await {
            return Ok(report);
        }

        let (id, outcome) = {
            let state = self.state.lock();
            let slot = state.gate.as_ref().ok_or(LifecycleError::NoOpenGate)?;
            let OpenGate::Confirmation(gate) = &slot.gate else {
                return Err(LifecycleError::WrongGate {
                    expected: GateKind::Confirmation,
                    open: slot.gate.kind(),
                });
            };
            (slot.transition_id, gate.resolve(action))
        };

        match outcome {
            GateOutcome::Passed(()) => self.commit(id, None).await,
            GateOutcome::Cancelled if action == ConfirmationAction::Dismiss => {
                self.roll_back(id, RollbackReason::Dismissed).await
            }
            GateOutcome::Cancelled => self.roll_back(id, RollbackReason::Cancelled).await,
            GateOutcome::Failed(reason) => {
                self.roll_back(id, RollbackReason::GateFailed(reason)).await
            }
        }
    }

    async fn enter_code_digit(
        &self,
        slot: usize,
        digit: char,
    ) -> Result<VerifyOutcome, LifecycleError> {
        if let Some(report) = self.settle_cancellation().await {
            return Ok(VerifyOutcome::Resolved(report));
        }

        {
            let mut state = self.state.lock();
            let open = state.gate.as_mut().ok_or(LifecycleError::NoOpenGate)?;
            let kind = open.gate.kind();
            let OpenGate::CodeVerification(gate) = &mut open.gate else {
                return Err(LifecycleError::WrongGate {
                    expected: GateKind::CodeVerification,
                    open: kind,
                });
            };
            if !gate.entry.enter(slot, digit)? {
                return Ok(VerifyOutcome::Incomplete {
                    focus: gate.entry.focus(),
                });
            }
        }

        // All four slots filled: auto-submit.
        self.attempt_verify().await
    }

    fn erase_code_digit(&self, slot: usize) -> Result<usize, LifecycleError> {
        let mut state = self.state.lock();
        // A cancelled gate is settled by the next async call; until then it
        // takes no more input.
        let open = state
            .gate
            .as_mut()
            .filter(|open| !open.cancel_requested())
            .ok_or(LifecycleError::NoOpenGate)?;
        let kind = open.gate.kind();
        let OpenGate::CodeVerification(gate) = &mut open.gate else {
            return Err(LifecycleError::WrongGate {
                expected: GateKind::CodeVerification,
                open: kind,
            });
        };
        gate.entry.erase(slot)?;
        Ok(gate.entry.focus())
    }

    async fn enter_code(&self, code: &str) -> Result<VerifyOutcome, LifecycleError> {
        if let Some(report) = self.settle_cancellation().await {
            return Ok(VerifyOutcome::Resolved(report));
        }

        {
            let mut state = self.state.lock();
            let open = state.gate.as_mut().ok_or(LifecycleError::NoOpenGate)?;
            let kind = open.gate.kind();
            let OpenGate::CodeVerification(gate) = &mut open.gate else {
                return Err(LifecycleError::WrongGate {
                    expected: GateKind::CodeVerification,
                    open: kind,
                });
            };
            gate.entry.fill(code)?;
        }
        self.attempt_verify().await
    }

    async fn verify_code(&self) -> Result<VerifyOutcome, LifecycleError> {
        self.attempt_verify().await
    }

    async fn cancel_pending(
        &self,
        cause: CancelCause,
    ) -> Result<Option<RollbackReport>, LifecycleError> {
        let id = {
            let state = self.state.lock();
            match state.gate.as_ref() {
                Some(slot) => slot.transition_id,
                None => {
                    debug!(shipment = %self.shipment, "Cancel ignored: no gate open");
                    return Ok(None);
                }
            }
        };

        match self.roll_back(id, cause.into()).await? {
            TransitionReport::RolledBack(report) => Ok(Some(report)),
            // Committed between the lookup and the rollback
            TransitionReport::Committed(_) => Ok(None),
        }
    }

    async fn cleanup_timeouts(&self) -> Option<RollbackReport> {
        let rolled = {
            let mut state = self.state.lock();
            let now = self.ports.time.now();
            let rolled = state.engine.cleanup_timeouts(now)?;
            state.close_gate(rolled.transition_id);
            bump(&self.cancel_epoch);
            rolled
        };
        self.announce_rollback(&rolled).await;
        Some(rolled.into())
    }

    fn status(&self) -> ShipmentStatus {
        self.state.lock().engine.status()
    }

    fn pending(&self) -> Option<PendingTransition> {
        self.state.lock().engine.pending().cloned()
    }

    fn is_terminal(&self) -> bool {
        self.state.lock().engine.is_terminal()
    }

    fn history(&self) -> Vec<TransitionRecord> {
        self.state.lock().engine.history().to_vec()
    }
}

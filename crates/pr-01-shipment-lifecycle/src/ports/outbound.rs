//! Outbound (Driven) ports for the Shipment Lifecycle subsystem.
//!
//! These traits define the collaborators the lifecycle needs: a media
//! picker, a code verifier, the earnings ledger and whatever renders the
//! results (credit display, navigation).

use async_trait::async_trait;
use shared_types::entities::{
    AssetUri, CreditMilestone, Credits, GateKind, MediaKind, MediaSource, Milestone, ShipmentId,
    ShipmentStatus,
};
use uuid::Uuid;

use crate::domain::{EarningsPortError, PickerError, RollbackReason, VerifierError};

/// Captures a photo or video for the pickup gate.
#[async_trait]
pub trait MediaPicker: Send + Sync {
    /// Capture or choose one asset.
    ///
    /// # Returns
    /// - `Ok(uri)`: an asset was resolved (an empty URI counts as no selection)
    /// - `Err(Cancelled | NoSelection)`: the transporter backed out
    /// - `Err(Device | File)`: the capture failed
    async fn capture(&self, kind: MediaKind, source: MediaSource)
        -> Result<AssetUri, PickerError>;
}

/// Checks a delivery code against the milestone's reference code.
#[async_trait]
pub trait CodeVerifier: Send + Sync {
    /// # Returns
    /// - `Ok(true)`: the code matches
    /// - `Ok(false)`: the code does not match
    /// - `Err`: the verifier could not answer (not counted as an attempt)
    async fn verify(
        &self,
        shipment: &ShipmentId,
        milestone: Milestone,
        code: &str,
    ) -> Result<bool, VerifierError>;
}

/// Credits a committed milestone.
#[async_trait]
pub trait EarningsPort: Send + Sync {
    /// # Returns
    /// - `Ok(Some(amount))`: newly credited
    /// - `Ok(None)`: already credited before, nothing changed
    async fn award(
        &self,
        shipment: &ShipmentId,
        milestone: CreditMilestone,
    ) -> Result<Option<Credits>, EarningsPortError>;
}

/// Receives lifecycle facts for display and navigation.
#[async_trait]
pub trait LifecycleNotifier: Send + Sync {
    async fn gate_opened(
        &self,
        shipment: &ShipmentId,
        transition_id: Uuid,
        milestone: Milestone,
        gate: GateKind,
    );

    async fn transition_committed(
        &self,
        shipment: &ShipmentId,
        transition_id: Uuid,
        milestone: Milestone,
        status: ShipmentStatus,
    );

    async fn transition_rolled_back(
        &self,
        shipment: &ShipmentId,
        transition_id: Uuid,
        milestone: Milestone,
        restored: ShipmentStatus,
        reason: &RollbackReason,
    );

    /// The shipment is delivered; show the completed view.
    async fn shipment_terminal(&self, shipment: &ShipmentId);
}

/// Notifier that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl LifecycleNotifier for NoOpNotifier {
    async fn gate_opened(&self, _: &ShipmentId, _: Uuid, _: Milestone, _: GateKind) {}

    async fn transition_committed(&self, _: &ShipmentId, _: Uuid, _: Milestone, _: ShipmentStatus) {}

    async fn transition_rolled_back(
        &self,
        _: &ShipmentId,
        _: Uuid,
        _: Milestone,
        _: ShipmentStatus,
        _: &RollbackReason,
    ) {
    }

    async fn shipment_terminal(&self, _: &ShipmentId) {}
}

// =============================================================================
// TEST DOUBLES
// =============================================================================

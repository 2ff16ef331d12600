//! Event bus adapter for the Shipment Lifecycle subsystem.
//!
//! Turns lifecycle notifications into `ShipmentEvent`s on the shared bus so
//! the screen, the earnings view and navigation can follow along.

use async_trait::async_trait;
use shared_bus::{EventPublisher, InMemoryEventBus, ShipmentEvent};
use shared_types::entities::{GateKind, Milestone, ShipmentId, ShipmentStatus};
use std::sync::Arc;
use tracing::trace;
use uuid::Uuid;

use crate::domain::RollbackReason;
use crate::ports::LifecycleNotifier;

/// Publishes lifecycle events to the in-memory bus.
pub struct BusLifecycleNotifier {
    bus: Arc<InMemoryEventBus>,
}

impl BusLifecycleNotifier {
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        Self { bus }
    }

    async fn publish(&self, event: ShipmentEvent) {
        let receivers = self.bus.publish(event).await;
        trace!(receivers, "Lifecycle event published");
    }
}

#[async_trait]
impl LifecycleNotifier for BusLifecycleNotifier {
    async fn gate_opened(
        &self,
        shipment: &ShipmentId,
        transition_id: Uuid,
        milestone: Milestone,
        gate: GateKind,
    ) {
        self.publish(ShipmentEvent::TransitionRequested {
            shipment: shipment.clone(),
            transition_id,
            milestone,
            gate,
        })
        .await;
    }

    async fn transition_committed(
        &self,
        shipment: &ShipmentId,
        transition_id: Uuid,
        milestone: Milestone,
        status: ShipmentStatus,
    ) {
        self.publish(ShipmentEvent::TransitionCommitted {
            shipment: shipment.clone(),
            transition_id,
            milestone,
            status,
        })
        .await;
    }

    async fn transition_rolled_back(
        &self,
        shipment: &ShipmentId,
        transition_id: Uuid,
        milestone: Milestone,
        restored: ShipmentStatus,
        reason: &RollbackReason,
    ) {
        self.publish(ShipmentEvent::TransitionRolledBack {
            shipment: shipment.clone(),
            transition_id,
            milestone,
            restored,
            reason: reason.to_string(),
        })
        .await;
    }

    async fn shipment_terminal(&self, shipment: &ShipmentId) {
        self.publish(ShipmentEvent::ShipmentTerminal {
            shipment: shipment.clone(),
        })
        .await;
    }
}

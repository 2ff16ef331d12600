//! Publishes credit awards to the shared bus for the credit display.

use async_trait::async_trait;
use shared_bus::{EventPublisher, InMemoryEventBus, ShipmentEvent};
use shared_types::entities::{CreditMilestone, Credits, ShipmentId};
use std::sync::Arc;
use tracing::trace;

use crate::ports::CreditNotifier;

pub struct BusCreditNotifier {
    bus: Arc<InMemoryEventBus>,
}

impl BusCreditNotifier {
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl CreditNotifier for BusCreditNotifier {
    async fn credit_awarded(
        &self,
        shipment: &ShipmentId,
        milestone: CreditMilestone,
        amount: Credits,
        total: Credits,
    ) {
        let receivers = self
            .bus
            .publish(ShipmentEvent::CreditAwarded {
                shipment: shipment.clone(),
                milestone,
                amount,
                total,
            })
            .await;
        trace!(receivers, "Credit event published");
    }
}

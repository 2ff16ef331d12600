//! Outbound (Driven) ports for the Earnings subsystem.

use async_trait::async_trait;
use shared_types::entities::{CreditMilestone, Credits, ShipmentId};

/// Receives the transient `(amount, total)` notification after an award.
#[async_trait]
pub trait CreditNotifier: Send + Sync {
    async fn credit_awarded(
        &self,
        shipment: &ShipmentId,
        milestone: CreditMilestone,
        amount: Credits,
        total: Credits,
    );
}

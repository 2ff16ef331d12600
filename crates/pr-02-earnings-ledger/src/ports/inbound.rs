//! # Inbound Port - EarningsApi

use async_trait::async_trait;
use shared_types::entities::{CreditMilestone, Credits, ShipmentId};

use crate::domain::{AwardResult, EarningEvent, LedgerError};

/// Primary API for the Earnings subsystem.
#[async_trait]
pub trait EarningsApi: Send + Sync {
    /// Credit a milestone for a shipment. Idempotent per milestone.
    ///
    /// # Errors
    /// - `Overflow`: the total would overflow; nothing is recorded
    async fn award(
        &self,
        shipment: &ShipmentId,
        milestone: CreditMilestone,
    ) -> Result<AwardResult, LedgerError>;

    /// Running total for a shipment. Zero if nothing was credited.
    fn total(&self, shipment: &ShipmentId) -> Credits;

    fn events(&self, shipment: &ShipmentId) -> Vec<EarningEvent>;

    fn has_awarded(&self, shipment: &ShipmentId, milestone: CreditMilestone) -> bool;
}

//! # Earnings Adapter
//!
//! Implements the lifecycle's `EarningsPort` on top of the earnings
//! subsystem (pr-02).

use std::sync::Arc;

use async_trait::async_trait;
use pr_01_shipment_lifecycle::{EarningsPort, EarningsPortError};
use pr_02_earnings_ledger::{EarningsApi, LedgerError};
use shared_types::entities::{CreditMilestone, Credits, ShipmentId};

pub struct LedgerEarningsAdapter {
    ledger: Arc<dyn EarningsApi>,
}

impl LedgerEarningsAdapter {
    pub fn new(ledger: Arc<dyn EarningsApi>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl EarningsPort for LedgerEarningsAdapter {
    async fn award(
        &self,
        shipment: &ShipmentId,
        milestone: CreditMilestone,
    ) -> Result<Option<Credits>, EarningsPortError> {
        match self.ledger.award(shipment, milestone).await {
            Ok(result) => Ok(result.credited()),
            Err(e @ LedgerError::Overflow { .. }) => Err(EarningsPortError::Rejected(e.to_string())),
            Err(e @ LedgerError::InvalidTable(_)) => {
                Err(EarningsPortError::Unavailable(e.to_string()))
            }
        }
    }
}

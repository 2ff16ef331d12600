//! Earnings Service
//!
//! Keeps one ledger per shipment and tells the credit display about every
//! new award.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::entities::{CreditMilestone, Credits, ShipmentId};
use shared_types::time::TimeSource;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::domain::{AwardResult, CreditTable, EarningEvent, EarningsLedger, LedgerError};
use crate::ports::{CreditNotifier, EarningsApi};

/// Earnings Service implementation
///
/// Implements the `EarningsApi` port using injected dependencies.
pub struct EarningsService {
    table: CreditTable,
    ledgers: Mutex<HashMap<ShipmentId, EarningsLedger>>,
    notifier: Arc<dyn CreditNotifier>,
    time: Arc<dyn TimeSource>,
}

impl EarningsService {
    pub fn new(
        table: CreditTable,
        notifier: Arc<dyn CreditNotifier>,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, LedgerError> {
        table.validate()?;
        Ok(Self {
            table,
            ledgers: Mutex::new(HashMap::new()),
            notifier,
            time,
        })
    }

    pub fn table(&self) -> &CreditTable {
        &self.table
    }
}

#[async_trait]
impl EarningsApi for EarningsService {
    async fn award(
        &self,
        shipment: &ShipmentId,
        milestone: CreditMilestone,
    ) -> Result<AwardResult, LedgerError> {
        let result = {
            let mut ledgers = self.ledgers.lock();
            let now = self.time.now();
            ledgers
                .entry(shipment.clone())
                .or_default()
                .award(&self.table, milestone, now)
        };

        match &result {
            Ok(AwardResult::Awarded { event, total }) => {
                info!(
                    shipment = %shipment,
                    milestone = %milestone,
                    amount = %event.amount,
                    total = %total,
                    "Credit awarded"
                );
                self.notifier
                    .credit_awarded(shipment, milestone, event.amount, *total)
                    .await;
            }
            Ok(AwardResult::AlreadyAwarded) => {
                debug!(shipment = %shipment, milestone = %milestone, "Award skipped: already credited");
            }
            Err(e) => {
                error!(shipment = %shipment, milestone = %milestone, error = %e, "Award failed");
            }
        }

        result
    }

    fn total(&self, shipment: &ShipmentId) -> Credits {
        self.ledgers
            .lock()
            .get(shipment)
            .map(EarningsLedger::total)
            .unwrap_or(Credits::ZERO)
    }

    fn events(&self, shipment: &ShipmentId) -> Vec<EarningEvent> {
        self.ledgers
            .lock()
            .get(shipment)
            .map(EarningsLedger::events)
            .unwrap_or_default()
    }

    fn has_awarded(&self, shipment: &ShipmentId, milestone: CreditMilestone) -> bool {
        self.ledgers
            .lock()
            .get(shipment)
            .is_some_and(|ledger| ledger.has_awarded(milestone))
    }
}

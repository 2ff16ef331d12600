//! # Earnings Ledger
//!
//! Per-shipment record of credited milestones. Each milestone is credited at
//! most once; the total is always the sum of the recorded events.

use shared_types::entities::{CreditMilestone, Credits, Timestamp};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::entities::{AwardResult, CreditTable, EarningEvent};
use super::errors::LedgerError;

#[derive(Debug, Clone, Default)]
pub struct EarningsLedger {
    events: BTreeMap<CreditMilestone, EarningEvent>,
    total: Credits,
}

impl EarningsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `milestone` from `table`. A repeat award is a no-op.
    pub fn award(
        &mut self,
        table: &CreditTable,
        milestone: CreditMilestone,
        now: Timestamp,
    ) -> Result<AwardResult, LedgerError> {
        if self.events.contains_key(&milestone) {
            return Ok(AwardResult::AlreadyAwarded);
        }

        let amount = table.amount_for(milestone);
        let total = self
            .total
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { milestone })?;

        let event = EarningEvent {
            id: Uuid::new_v4(),
            milestone,
            amount,
            awarded_at: now,
        };
        self.events.insert(milestone, event.clone());
        self.total = total;

        Ok(AwardResult::Awarded { event, total })
    }

    pub fn total(&self) -> Credits {
        self.total
    }

    pub fn has_awarded(&self, milestone: CreditMilestone) -> bool {
        self.events.contains_key(&milestone)
    }

    /// Awarded events in milestone order.
    pub fn events(&self) -> Vec<EarningEvent> {
        self.events.values().cloned().collect()
    }
}

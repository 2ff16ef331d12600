//! Core domain entities for the Earnings subsystem.

use serde::{Deserialize, Serialize};
use shared_types::entities::{CreditMilestone, Credits, Timestamp};
use uuid::Uuid;

use super::errors::LedgerError;

/// Fixed credit per milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTable {
    pub access_unlock: Credits,
    pub picked_up: Credits,
    pub in_transit: Credits,
    pub delivered: Credits,
}

impl Default for CreditTable {
    fn default() -> Self {
        Self {
            access_unlock: Credits(5),
            picked_up: Credits(10),
            in_transit: Credits(15),
            delivered: Credits(25),
        }
    }
}

impl CreditTable {
    pub fn amount_for(&self, milestone: CreditMilestone) -> Credits {
        match milestone {
            CreditMilestone::AccessUnlock => self.access_unlock,
            CreditMilestone::PickedUp => self.picked_up,
            CreditMilestone::InTransit => self.in_transit,
            CreditMilestone::Delivered => self.delivered,
        }
    }

    /// Every milestone must be worth something.
    pub fn validate(&self) -> Result<(), LedgerError> {
        for milestone in [
            CreditMilestone::AccessUnlock,
            CreditMilestone::PickedUp,
            CreditMilestone::InTransit,
            CreditMilestone::Delivered,
        ] {
            if self.amount_for(milestone) == Credits::ZERO {
                return Err(LedgerError::InvalidTable(format!(
                    "{milestone} is worth zero credits"
                )));
            }
        }
        Ok(())
    }
}

/// One credited milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningEvent {
    pub id: Uuid,
    pub milestone: CreditMilestone,
    pub amount: Credits,
    pub awarded_at: Timestamp,
}

/// Result of an award.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AwardResult {
    /// Newly credited. Carries the ledger total after the award.
    Awarded { event: EarningEvent, total: Credits },
    /// Credited before. The ledger is unchanged.
    AlreadyAwarded,
}

impl AwardResult {
    /// The credit this award added, if any.
    pub fn credited(&self) -> Option<Credits> {
        match self {
            Self::Awarded { event, .. } => Some(event.amount),
            Self::AlreadyAwarded => None,
        }
    }
}

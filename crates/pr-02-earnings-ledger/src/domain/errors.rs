//! Error types for the Earnings subsystem.

use shared_types::entities::CreditMilestone;
use thiserror::Error;

/// Errors raised by the earnings ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The running total would no longer fit.
    #[error("credit total overflow while awarding {milestone}")]
    Overflow { milestone: CreditMilestone },

    /// The credit table is unusable.
    #[error("invalid credit table: {0}")]
    InvalidTable(String),
}

//! # Earnings Ledger Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Credits the transporter a fixed amount per milestone, at most once per
//! milestone and shipment, and reports `(amount, total)` to the credit
//! display.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | One award per milestone | `domain/ledger.rs` - `award()` keyed by milestone |
//! | Total = sum of events | `domain/ledger.rs` - checked add, all-or-nothing |
//!
//! ## Credit Table
//!
//! | Milestone | Default credit |
//! |-----------|----------------|
//! | AccessUnlock | 5 |
//! | PickedUp | 10 |
//! | InTransit | 15 |
//! | Delivered | 25 |
//!
//! ## Module Structure
//!
//! ```text
//! adapters/  - BusCreditNotifier
//! service/   - EarningsService (ledger per shipment)
//! ports/     - EarningsApi (inbound), CreditNotifier (outbound)
//! domain/    - CreditTable, EarningsLedger, LedgerError
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
pub use service::*;

//! Ports layer for the Earnings subsystem.
//!
//! - Inbound (Driving): `EarningsApi`, called by the lifecycle on commit
//! - Outbound (Driven): `CreditNotifier`, the credit display

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;

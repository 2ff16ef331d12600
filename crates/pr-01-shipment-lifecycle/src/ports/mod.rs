//! Ports layer for the Shipment Lifecycle subsystem.
//!
//! Defines the hexagonal architecture port traits:
//! - Inbound (Driving) ports: API exposed to the shipment screen
//! - Outbound (Driven) ports: media picker, code verifier, earnings, notifier

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;

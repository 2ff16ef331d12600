//! # Shared Types Crate
//!
//! This crate contains the shipment entities exchanged between the
//! lifecycle subsystem (pr-01), the earnings subsystem (pr-02) and the
//! event bus.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Invariants in Types**: `ShipmentStatus` cannot be built with an
//!   out-of-order flag combination, not even through deserialization.
//! - **Fixed Action Sets**: Confirmations carry a closed set of named
//!   actions instead of ad-hoc button lists.

pub mod confirmation;
pub mod entities;
pub mod errors;
pub mod time;

pub use confirmation::*;
pub use entities::*;
pub use errors::*;
pub use time::*;

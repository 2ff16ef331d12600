//! Service layer for the Shipment Lifecycle subsystem.

mod lifecycle_service;

pub use lifecycle_service::{GateCanceller, LifecyclePorts, ShipmentLifecycleService};

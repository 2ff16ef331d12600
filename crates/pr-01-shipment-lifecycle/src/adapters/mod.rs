//! Adapters layer for the Shipment Lifecycle subsystem.
//!
//! - `BusLifecycleNotifier` - publishes lifecycle events to the shared bus
//! - `StaticCodeVerifier` - reference-table code verifier

pub mod bus_notifier;
pub mod static_verifier;

pub use bus_notifier::BusLifecycleNotifier;
pub use static_verifier::StaticCodeVerifier;

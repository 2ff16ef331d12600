//! Adapters layer for the Earnings subsystem.

pub mod bus_notifier;

pub use bus_notifier::BusCreditNotifier;

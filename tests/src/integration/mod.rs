//! # Cross-Subsystem Integration
//!
//! Lifecycle (1) and Earnings (2) driven together over the shared bus.

pub mod fixtures;

pub mod delivery;
pub mod rollback;
pub mod session;

//! Service layer for the Earnings subsystem.

mod earnings_service;

pub use earnings_service::EarningsService;

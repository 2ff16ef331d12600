//! # Subsystem Container
//!
//! Central container holding the session's subsystem instances with their
//! adapters injected.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, LoggingConfig, RuntimeConfig};
pub use subsystems::CourierContainer;

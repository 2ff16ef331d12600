//! # Courier Runtime Library
//!
//! This library exposes the internal modules of the courier runtime for
//! testing. The main entry point is the `main.rs` binary.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and subsystem wiring
//! - `adapters/` - Port implementations bridging subsystems and the console
//! - `handlers/` - Bus subscribers for the credit display and navigation
//! - `session` - Console command parsing and execution

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod session;

pub use container::{ConfigError, CourierContainer, RuntimeConfig};
pub use session::{Command, Flow, Session, SessionError};

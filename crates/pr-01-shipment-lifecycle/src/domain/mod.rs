//! # Domain Layer - Shipment Lifecycle Subsystem
//!
//! Pure state-machine logic. No I/O and no async.
//!
//! ## Components
//!
//! - `entities`: Snapshot, PendingTransition, TransitionRecord, LifecycleConfig
//! - `store`: SnapshotStore (status triple plus one saved snapshot)
//! - `engine`: TransitionEngine (guards, commit, abort, timeouts)
//! - `rollback`: RollbackCoordinator and the pure `restore`
//! - `gates`: media capture, confirmation and code verification gates
//! - `code_entry`: the four-slot code input
//! - `errors`: TransitionError, CodeEntryError, port errors, LifecycleError

pub mod code_entry;
pub mod engine;
pub mod entities;
pub mod errors;
pub mod gates;
pub mod rollback;
pub mod store;

pub use code_entry::*;
pub use engine::*;
pub use entities::*;
pub use errors::*;
pub use gates::*;
pub use rollback::*;
pub use store::*;

//! # Shipment Lifecycle Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Moves a shipment through PickedUp → InTransit → Delivered. Each step is
//! guarded by a gate (photo, confirmation, delivery code) and is either
//! committed whole or rolled back to the status it started from.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Milestones only move forward | `domain/engine.rs` - `request()` guards |
//! | At most one pending transition | `domain/engine.rs` - `ConflictingTransition` |
//! | Rollback restores the snapshot exactly | `domain/rollback.rs` - `restore()` |
//! | Delivered is terminal | `domain/engine.rs` - `RequestDecision::Ignored` |
//! | Late gate results can't touch a newer attempt | `service/` - transition id checks |
//!
//! ## Transition Protocol
//!
//! ```text
//! [IDLE] ──request──→ [AWAITING GATE] ──pass──→ [COMMITTED]
//!                           │
//!                           └── cancel/dismiss/fail/timeout ──→ [IDLE] (snapshot restored)
//! ```
//!
//! | Stage | Method | Effect |
//! |-------|--------|--------|
//! | Request | `request_transition()` | Guards, snapshot, open gate |
//! | Commit | gate passes | Raise milestone, award credit |
//! | Rollback | `cancel_pending()` / gate failure | Restore snapshot |
//! | Timeout | `cleanup_timeouts()` | Roll back a stale gate |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `MediaPicker` | Pickup photo or video |
//! | `CodeVerifier` | Delivery code check |
//! | `EarningsPort` | Credit the committed milestone (subsystem 2) |
//! | `LifecycleNotifier` | Events for the screen and navigation |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - Bus notifier, static code verifier                 │
//! │  service/  - ShipmentLifecycleService (async gate orchestration)│
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - ShipmentLifecycleApi trait                 │
//! │  ports/outbound.rs - MediaPicker, CodeVerifier, EarningsPort    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/engine.rs     - TransitionEngine (guards, commit, abort)│
//! │  domain/store.rs      - SnapshotStore                           │
//! │  domain/rollback.rs   - RollbackCoordinator                     │
//! │  domain/gates.rs      - Media, confirmation and code gates      │
//! │  domain/code_entry.rs - Four-slot code entry                    │
//! │  domain/errors.rs     - TransitionError, LifecycleError         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
pub use service::*;

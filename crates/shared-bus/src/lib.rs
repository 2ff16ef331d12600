//! # Shared Bus - Event Bus for Shipment Events
//!
//! Carries the choreography between the lifecycle subsystem, the earnings
//! subsystem and the external collaborators that render their results.
//!
//! ## Rules
//!
//! - Subsystems publish facts (a transition committed, a credit was awarded);
//!   they never call the credit display or navigation layers directly.
//! - Collaborators subscribe with an `EventFilter` and react on their own
//!   schedule. A publish with no subscribers is dropped, not an error.
//!
//! ```text
//! ┌──────────────────┐                     ┌────────────────────┐
//! │ pr-01 Lifecycle  │── publish() ──┐     │ Credit display     │
//! └──────────────────┘               ▼     │ (CreditAwarded)    │
//!                             ┌──────────────┐        ↑
//! ┌──────────────────┐        │  Event Bus   │────────┤ subscribe()
//! │ pr-02 Earnings   │──────▶ │              │        ↓
//! └──────────────────┘        └──────────────┘ ┌────────────────────┐
//!                                              │ Navigation         │
//!                                              │ (ShipmentTerminal) │
//!                                              └────────────────────┘
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, ShipmentEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Subsystem id of the shipment lifecycle (pr-01).
pub const LIFECYCLE_SUBSYSTEM: u8 = 1;

/// Subsystem id of the earnings ledger (pr-02).
pub const EARNINGS_SUBSYSTEM: u8 = 2;

//! # Shipment Events
//!
//! Defines all event types that flow through the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::entities::{
    CreditMilestone, Credits, GateKind, Milestone, ShipmentId, ShipmentStatus,
};
use uuid::Uuid;

use crate::{EARNINGS_SUBSYSTEM, LIFECYCLE_SUBSYSTEM};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipmentEvent {
    // =========================================================================
    // SUBSYSTEM 1: SHIPMENT LIFECYCLE
    // =========================================================================
    /// A gate was opened for a milestone.
    TransitionRequested {
        shipment: ShipmentId,
        transition_id: Uuid,
        milestone: Milestone,
        gate: GateKind,
    },

    /// A milestone was committed.
    TransitionCommitted {
        shipment: ShipmentId,
        transition_id: Uuid,
        milestone: Milestone,
        status: ShipmentStatus,
    },

    /// A pending transition was abandoned and the snapshot restored.
    TransitionRolledBack {
        shipment: ShipmentId,
        transition_id: Uuid,
        milestone: Milestone,
        restored: ShipmentStatus,
        /// Human-readable rollback reason.
        reason: String,
    },

    /// The shipment reached its terminal milestone.
    /// Source: Subsystem 1 | Target: navigation (completed view)
    ShipmentTerminal { shipment: ShipmentId },

    // =========================================================================
    // SUBSYSTEM 2: EARNINGS LEDGER
    // =========================================================================
    /// A credit was awarded.
    /// Source: Subsystem 2 | Target: credit display ("+amount" toast)
    CreditAwarded {
        shipment: ShipmentId,
        milestone: CreditMilestone,
        amount: Credits,
        /// Ledger total after this award.
        total: Credits,
    },
}

impl ShipmentEvent {
    /// Get the topic for this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::TransitionRequested { .. }
            | Self::TransitionCommitted { .. }
            | Self::TransitionRolledBack { .. } => EventTopic::Lifecycle,
            Self::ShipmentTerminal { .. } => EventTopic::Navigation,
            Self::CreditAwarded { .. } => EventTopic::Earnings,
        }
    }

    /// Get the subsystem that publishes this event.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::CreditAwarded { .. } => EARNINGS_SUBSYSTEM,
            _ => LIFECYCLE_SUBSYSTEM,
        }
    }

    /// The shipment this event concerns.
    #[must_use]
    pub fn shipment(&self) -> &ShipmentId {
        match self {
            Self::TransitionRequested { shipment, .. }
            | Self::TransitionCommitted { shipment, .. }
            | Self::TransitionRolledBack { shipment, .. }
            | Self::ShipmentTerminal { shipment }
            | Self::CreditAwarded { shipment, .. } => shipment,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Gate opened, committed and rolled back transitions.
    Lifecycle,
    /// Credit awards.
    Earnings,
    /// Signals for the surrounding screen (terminal shipment).
    Navigation,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
    /// Restrict to one shipment. `None` means every shipment.
    pub shipment: Option<ShipmentId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            ..Self::default()
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            source_subsystems: subsystems,
            ..Self::default()
        }
    }

    /// Narrow this filter to a single shipment.
    #[must_use]
    pub fn for_shipment(mut self, shipment: ShipmentId) -> Self {
        self.shipment = Some(shipment);
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &ShipmentEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        let shipment_match = self
            .shipment
            .as_ref()
            .map_or(true, |id| id == event.shipment());

        topic_match && source_match && shipment_match
    }
}

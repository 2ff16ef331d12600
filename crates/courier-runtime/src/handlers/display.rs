//! # Display Handler
//!
//! Bus subscriber standing in for the credit display and navigation: shows
//! `+amount (total)` after each award and hands over to the completed view
//! once the shipment is delivered.

use std::sync::Arc;

use shared_bus::{EventFilter, EventStream, EventTopic, InMemoryEventBus, ShipmentEvent};
use shared_types::entities::ShipmentId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

/// Render the user-facing line for an event, if it has one.
pub fn render_event(event: &ShipmentEvent) -> Option<String> {
    match event {
        ShipmentEvent::CreditAwarded {
            milestone,
            amount,
            total,
            ..
        } => Some(format!("+{amount} credits for {milestone} (total {total})")),
        ShipmentEvent::ShipmentTerminal { shipment } => {
            Some(format!("Shipment {shipment} delivered. Opening completed shipments."))
        }
        _ => None,
    }
}

pub struct DisplayHandler {
    bus: Arc<InMemoryEventBus>,
    shipment: ShipmentId,
    output: mpsc::UnboundedSender<String>,
}

impl DisplayHandler {
    pub fn new(
        bus: Arc<InMemoryEventBus>,
        shipment: ShipmentId,
        output: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            bus,
            shipment,
            output,
        }
    }

    fn subscribe(&self) -> EventStream {
        let filter = EventFilter::topics(vec![EventTopic::Earnings, EventTopic::Navigation])
            .for_shipment(self.shipment.clone());
        self.bus.event_stream(filter)
    }

    /// Subscribe now and forward events on a background task.
    ///
    /// Anything published after this returns reaches the output, so the
    /// caller may award credits right away.
    pub fn spawn(self) -> JoinHandle<()> {
        let stream = self.subscribe();
        tokio::spawn(self.forward(stream))
    }

    /// Runs until the bus or the output closes.
    async fn forward(self, mut stream: EventStream) {
        info!(shipment = %self.shipment, "Display handler started");

        while let Some(event) = stream.next().await {
            debug!(
                event = %serde_json::to_string(&event).unwrap_or_default(),
                "Display event"
            );
            let Some(line) = render_event(&event) else {
                continue;
            };
            if self.output.send(line).is_err() {
                warn!("Display output closed, stopping handler");
                return;
            }
        }
        warn!("Event stream ended, display handler stopping");
    }
}

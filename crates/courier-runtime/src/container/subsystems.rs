//! # Subsystem Container
//!
//! Holds the subsystem instances for one transporter session and wires
//! them together.
//!
//! ## Initialization Order
//!
//! ```text
//! Phase 1: Event bus, time source
//! Phase 2: Earnings (pr-02), publishing credits to the bus
//! Phase 3: Lifecycle (pr-01), awarding through the earnings adapter
//! ```

use std::sync::Arc;

use pr_01_shipment_lifecycle::{
    BusLifecycleNotifier, LifecyclePorts, MediaPicker, ShipmentLifecycleService,
    StaticCodeVerifier,
};
use pr_02_earnings_ledger::{
    AwardResult, BusCreditNotifier, EarningsApi, EarningsService, LedgerError,
};
use shared_bus::InMemoryEventBus;
use shared_types::entities::CreditMilestone;
use shared_types::time::{SystemTimeSource, TimeSource};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::adapters::{LedgerEarningsAdapter, LocalFileMediaPicker};
use crate::container::config::{ConfigError, RuntimeConfig};
use crate::handlers::DisplayHandler;

/// Central container holding the session's subsystems.
pub struct CourierContainer {
    /// Lifecycle (Subsystem 1) for the configured shipment.
    pub lifecycle: Arc<ShipmentLifecycleService>,
    /// Earnings (Subsystem 2), one ledger per shipment.
    pub earnings: Arc<EarningsService>,
    /// Local files standing in for camera and library.
    pub picker: Arc<LocalFileMediaPicker>,
    /// All lifecycle and credit events flow through this bus.
    pub event_bus: Arc<InMemoryEventBus>,
    /// Configuration (immutable after initialization).
    pub config: RuntimeConfig,
}

impl CourierContainer {
    /// Validate `config` and build every subsystem.
    pub fn new(config: RuntimeConfig) -> Result<Self, ConfigError> {
        Self::with_time(config, Arc::new(SystemTimeSource))
    }

    #[instrument(name = "subsystem_init", skip_all, fields(shipment = %config.shipment))]
    pub fn with_time(
        config: RuntimeConfig,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        info!("Phase 1: Creating shared infrastructure");
        let event_bus = Arc::new(InMemoryEventBus::new());

        info!("Phase 2: Initializing earnings");
        let earnings = Arc::new(EarningsService::new(
            config.credits,
            Arc::new(BusCreditNotifier::new(event_bus.clone())),
            time.clone(),
        )?);

        info!("Phase 3: Initializing shipment lifecycle");
        let picker = Arc::new(LocalFileMediaPicker::new(config.media_root.clone()));
        let ports = LifecyclePorts {
            picker: picker.clone() as Arc<dyn MediaPicker>,
            verifier: Arc::new(StaticCodeVerifier::with_delivery_code(
                config.delivery_code.clone(),
            )),
            earnings: Arc::new(LedgerEarningsAdapter::new(
                earnings.clone() as Arc<dyn EarningsApi>
            )),
            notifier: Arc::new(BusLifecycleNotifier::new(event_bus.clone())),
            time,
        };
        let lifecycle = Arc::new(ShipmentLifecycleService::resume(
            config.shipment.clone(),
            config.lifecycle.clone(),
            ports,
            config.prior_status(),
        )?);

        info!("All subsystems initialized");
        Ok(Self {
            lifecycle,
            earnings,
            picker,
            event_bus,
            config,
        })
    }

    /// Credit the one-time access unlock for this shipment.
    pub async fn unlock_access(&self) -> Result<AwardResult, LedgerError> {
        self.earnings
            .award(&self.config.shipment, CreditMilestone::AccessUnlock)
            .await
    }

    /// Forward this shipment's earnings and navigation events to `output`.
    ///
    /// The display is subscribed when this returns, so call it before
    /// `unlock_access` or the first credit is missed.
    pub fn spawn_display(&self, output: mpsc::UnboundedSender<String>) -> JoinHandle<()> {
        DisplayHandler::new(
            Arc::clone(&self.event_bus),
            self.config.shipment.clone(),
            output,
        )
        .spawn()
    }
}

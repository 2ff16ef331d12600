//! # Integration Fixtures
//!
//! Wires the lifecycle and earnings subsystems the same way the courier
//! container does, but with ports the test controls: a manual clock, a
//! picker that blocks until released, and a verifier that can go offline.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use pr_01_shipment_lifecycle::{
    BusLifecycleNotifier, CodeVerifier, LifecycleConfig, LifecyclePorts, MediaPicker,
    PickerError, ShipmentLifecycleService, StaticCodeVerifier, VerifierError,
};
use pr_02_earnings_ledger::{BusCreditNotifier, CreditTable, EarningsApi, EarningsService};
use shared_bus::{EventFilter, InMemoryEventBus, ShipmentEvent, Subscription};
use shared_types::entities::{AssetUri, MediaKind, MediaSource, Milestone, ShipmentId, ShipmentStatus};
use shared_types::time::ManualTimeSource;
use tokio::sync::{oneshot, Notify};

use courier_runtime::adapters::LedgerEarningsAdapter;

/// Delivery code used by every harness.
pub const DELIVERY_CODE: &str = "4821";

/// A media picker whose capture waits until the test releases it.
///
/// Dropping the release sender without sending ends the capture as
/// `PickerError::Cancelled`.
pub struct HeldPicker {
    started: Notify,
    pending: Mutex<Option<oneshot::Receiver<Result<AssetUri, PickerError>>>>,
}

impl HeldPicker {
    pub fn new() -> (Arc<Self>, oneshot::Sender<Result<AssetUri, PickerError>>) {
        let (tx, rx) = oneshot::channel();
        let picker = Arc::new(Self {
            started: Notify::new(),
            pending: Mutex::new(Some(rx)),
        });
        (picker, tx)
    }

    /// Resolves once a capture is in flight.
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }
}

#[async_trait]
impl MediaPicker for HeldPicker {
    async fn capture(&self, _: MediaKind, _: MediaSource) -> Result<AssetUri, PickerError> {
        let rx = self.pending.lock().take();
        self.started.notify_one();
        match rx {
            Some(rx) => rx.await.unwrap_or(Err(PickerError::Cancelled)),
            None => Err(PickerError::NoSelection),
        }
    }
}

/// A picker that always returns the same asset.
pub struct FixedPicker(pub Result<AssetUri, PickerError>);

#[async_trait]
impl MediaPicker for FixedPicker {
    async fn capture(&self, _: MediaKind, _: MediaSource) -> Result<AssetUri, PickerError> {
        self.0.clone()
    }
}

/// Wraps the static verifier with an outage switch.
pub struct SwitchableVerifier {
    inner: StaticCodeVerifier,
    offline: Mutex<bool>,
}

impl SwitchableVerifier {
    pub fn new(code: &str) -> Self {
        Self {
            inner: StaticCodeVerifier::with_delivery_code(code),
            offline: Mutex::new(false),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock() = offline;
    }
}

#[async_trait]
impl CodeVerifier for SwitchableVerifier {
    async fn verify(
        &self,
        shipment: &ShipmentId,
        milestone: Milestone,
        code: &str,
    ) -> Result<bool, VerifierError> {
        if *self.offline.lock() {
            return Err(VerifierError::Unavailable("connection refused".to_string()));
        }
        self.inner.verify(shipment, milestone, code).await
    }
}

/// Both subsystems wired over one bus.
pub struct Harness {
    pub shipment: ShipmentId,
    pub lifecycle: Arc<ShipmentLifecycleService>,
    pub earnings: Arc<EarningsService>,
    pub verifier: Arc<SwitchableVerifier>,
    pub bus: Arc<InMemoryEventBus>,
    pub time: Arc<ManualTimeSource>,
}

impl Harness {
    /// Builder with a fixed picker that always succeeds.
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            picker: Arc::new(FixedPicker(Ok(AssetUri::new("file:///media/parcel.jpg")))),
            config: LifecycleConfig::default(),
            status: ShipmentStatus::initial(),
        }
    }

    /// Subscribe before driving the flow to see every event.
    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe(EventFilter::all().for_shipment(self.shipment.clone()))
    }
}

pub struct HarnessBuilder {
    picker: Arc<dyn MediaPicker>,
    config: LifecycleConfig,
    status: ShipmentStatus,
}

impl HarnessBuilder {
    pub fn picker(mut self, picker: Arc<dyn MediaPicker>) -> Self {
        self.picker = picker;
        self
    }

    pub fn config(mut self, config: LifecycleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn status(mut self, status: ShipmentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> Harness {
        let shipment = ShipmentId::new("SHP-IT-001");
        let bus = Arc::new(InMemoryEventBus::new());
        let time = Arc::new(ManualTimeSource::new(1_000));
        let earnings = Arc::new(
            EarningsService::new(
                CreditTable::default(),
                Arc::new(BusCreditNotifier::new(bus.clone())),
                time.clone(),
            )
            .expect("default credit table is valid"),
        );
        let verifier = Arc::new(SwitchableVerifier::new(DELIVERY_CODE));
        let ports = LifecyclePorts {
            picker: self.picker,
            verifier: verifier.clone(),
            earnings: Arc::new(LedgerEarningsAdapter::new(
                earnings.clone() as Arc<dyn EarningsApi>
            )),
            notifier: Arc::new(BusLifecycleNotifier::new(bus.clone())),
            time: time.clone(),
        };
        let lifecycle = Arc::new(
            ShipmentLifecycleService::resume(shipment.clone(), self.config, ports, self.status)
                .expect("harness config is valid"),
        );

        Harness {
            shipment,
            lifecycle,
            earnings,
            verifier,
            bus,
            time,
        }
    }
}

/// Everything already published to `sub`.
pub fn drain(sub: &mut Subscription) -> Vec<ShipmentEvent> {
    let mut events = Vec::new();
    while let Ok(Some(event)) = sub.try_recv() {
        events.push(event);
    }
    events
}

/// Short labels for asserting event order.
pub fn labels(events: &[ShipmentEvent]) -> Vec<String> {
    events
        .iter()
        .map(|event| match event {
            ShipmentEvent::TransitionRequested { milestone, .. } => format!("requested:{milestone}"),
            ShipmentEvent::TransitionCommitted { milestone, .. } => format!("committed:{milestone}"),
            ShipmentEvent::TransitionRolledBack { milestone, .. } => {
                format!("rolled_back:{milestone}")
            }
            ShipmentEvent::ShipmentTerminal { .. } => "terminal".to_string(),
            ShipmentEvent::CreditAwarded { milestone, amount, .. } => {
                format!("credit:{milestone}:{}", amount.0)
            }
        })
        .collect()
}

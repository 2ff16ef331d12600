//! # Rollback Coordinator
//!
//! Every gate-exit path that does not commit ends here: cancel, error,
//! explicit Cancel, back-navigation, attempt exhaustion and timeout.
//!
//! ```text
//! [AwaitingGate] ──cancel/error──→ restore(snapshot) ──→ [Idle]
//!       │
//!       └── second rollback for the same id ──→ no-op
//! ```

use shared_types::entities::ShipmentStatus;
use tracing::debug;
use uuid::Uuid;

use super::entities::{PendingTransition, RollbackReason, RolledBackTransition, Snapshot};
use super::store::SnapshotStore;

/// The status a snapshot describes.
pub fn restore(snapshot: &Snapshot) -> ShipmentStatus {
    snapshot.status
}

/// Restores the store and discards the pending transition.
#[derive(Debug, Default, Clone, Copy)]
pub struct RollbackCoordinator;

impl RollbackCoordinator {
    /// Roll back the pending transition `id`.
    ///
    /// Returns `None` without touching anything if `id` is not the pending
    /// transition, which makes a repeated call for the same id a no-op.
    pub fn rollback(
        &self,
        store: &mut SnapshotStore,
        pending: &mut Option<PendingTransition>,
        id: Uuid,
        reason: RollbackReason,
    ) -> Option<RolledBackTransition> {
        let Some(current) = pending.as_ref() else {
            debug!(transition_id = %id, "Rollback ignored: nothing pending");
            return None;
        };
        if current.id != id {
            debug!(transition_id = %id, pending = %current.id, "Rollback ignored: stale id");
            return None;
        }

        let transition = pending.take()?;
        let restored = store.restore(&transition.snapshot);

        Some(RolledBackTransition {
            transition_id: transition.id,
            milestone: transition.target,
            restored,
            reason,
        })
    }
}

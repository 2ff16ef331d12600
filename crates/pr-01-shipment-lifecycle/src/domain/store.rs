//! # Snapshot Store
//!
//! Holds the current status triple and the one snapshot taken before the
//! transition in progress.
//!
//! ## Invariants
//!
//! - Between `take_snapshot` and `restore`, flags only move forward.
//! - `raise` never clears a flag.
//! - There is never more than one saved snapshot.

use shared_types::entities::{Milestone, ShipmentStatus, Timestamp};

use super::entities::Snapshot;
use super::rollback::restore;

/// Current status plus the single saved snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    status: ShipmentStatus,
    saved: Option<Snapshot>,
}

impl SnapshotStore {
    /// Start from a known status.
    pub fn new(status: ShipmentStatus) -> Self {
        Self {
            status,
            saved: None,
        }
    }

    pub fn status(&self) -> ShipmentStatus {
        self.status
    }

    pub fn saved(&self) -> Option<&Snapshot> {
        self.saved.as_ref()
    }

    /// Save the current status, replacing any older snapshot.
    pub fn take_snapshot(&mut self, now: Timestamp) -> Snapshot {
        let snapshot = Snapshot {
            status: self.status,
            taken_at: now,
        };
        self.saved = Some(snapshot);
        snapshot
    }

    /// Reach `milestone` and drop the saved snapshot.
    pub fn raise(&mut self, milestone: Milestone) -> ShipmentStatus {
        self.status = self.status.with(milestone);
        self.saved = None;
        self.status
    }

    /// Put the status back field-for-field and drop the saved snapshot.
    pub fn restore(&mut self, snapshot: &Snapshot) -> ShipmentStatus {
        self.status = restore(snapshot);
        self.saved = None;
        self.status
    }
}

//! # Core Domain Entities
//!
//! Defines the shipment entities shared by the lifecycle and earnings
//! subsystems.
//!
//! ## Clusters
//!
//! - **Progress**: `Milestone`, `ShipmentStatus`, `GateKind`
//! - **Media**: `MediaKind`, `MediaSource`, `AssetUri`
//! - **Earnings**: `Credits`, `CreditMilestone`
//! - **Identity**: `ShipmentId`

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::StatusError;

/// Timestamp in milliseconds since UNIX epoch.
pub type Timestamp = u64;

// =============================================================================
// CLUSTER A: PROGRESS
// =============================================================================

/// Identifier of a shipment as issued by the marketplace backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipmentId(pub String);

impl ShipmentId {
    /// Create a shipment id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the three ordered shipment-progress states.
///
/// The derived ordering matches the delivery order:
/// `PickedUp < InTransit < Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Milestone {
    /// The transporter has collected the parcel from the sender.
    PickedUp,
    /// The parcel is on its way.
    InTransit,
    /// The parcel has been handed to the recipient.
    Delivered,
}

impl Milestone {
    /// All milestones in delivery order.
    pub const ALL: [Milestone; 3] = [Self::PickedUp, Self::InTransit, Self::Delivered];

    /// The milestone that must be reached before this one.
    pub fn predecessor(&self) -> Option<Milestone> {
        match self {
            Self::PickedUp => None,
            Self::InTransit => Some(Self::PickedUp),
            Self::Delivered => Some(Self::InTransit),
        }
    }

    /// The milestone that follows this one.
    pub fn successor(&self) -> Option<Milestone> {
        match self {
            Self::PickedUp => Some(Self::InTransit),
            Self::InTransit => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    /// The confirmation step that gates this milestone.
    pub fn gate_kind(&self) -> GateKind {
        match self {
            Self::PickedUp => GateKind::MediaCapture,
            Self::InTransit => GateKind::Confirmation,
            Self::Delivered => GateKind::CodeVerification,
        }
    }

    /// Whether reaching this milestone ends the lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PickedUp => "PICKED_UP",
            Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED",
        };
        f.write_str(s)
    }
}

/// Progress flags of a shipment.
///
/// INVARIANT: `in_transit ⇒ picked_up` and `delivered ⇒ in_transit`.
/// Fields are private so the invariant can only be broken through
/// [`ShipmentStatus::from_flags`], which rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "StatusFlags")]
pub struct ShipmentStatus {
    picked_up: bool,
    in_transit: bool,
    delivered: bool,
}

/// Wire form of [`ShipmentStatus`], validated on deserialization.
#[derive(Deserialize)]
struct StatusFlags {
    picked_up: bool,
    in_transit: bool,
    delivered: bool,
}

impl TryFrom<StatusFlags> for ShipmentStatus {
    type Error = StatusError;

    fn try_from(flags: StatusFlags) -> Result<Self, Self::Error> {
        Self::from_flags(flags.picked_up, flags.in_transit, flags.delivered)
    }
}

impl ShipmentStatus {
    /// A fresh shipment with no milestone reached.
    pub const fn initial() -> Self {
        Self {
            picked_up: false,
            in_transit: false,
            delivered: false,
        }
    }

    /// Build a status from raw flags, enforcing the ordering invariant.
    pub fn from_flags(picked_up: bool, in_transit: bool, delivered: bool) -> Result<Self, StatusError> {
        let status = Self {
            picked_up,
            in_transit,
            delivered,
        };
        if !status.is_consistent() {
            return Err(StatusError::Inconsistent {
                picked_up,
                in_transit,
                delivered,
            });
        }
        Ok(status)
    }

    /// The status implied by an order whose prior progress is `reached`.
    ///
    /// Every milestone up to and including `reached` is set.
    pub fn reached(reached: Option<Milestone>) -> Self {
        let mut status = Self::initial();
        if let Some(last) = reached {
            for milestone in Milestone::ALL.iter().filter(|m| **m <= last) {
                status.set(*milestone);
            }
        }
        status
    }

    /// Whether the parcel has been picked up.
    pub fn picked_up(&self) -> bool {
        self.picked_up
    }

    /// Whether the parcel is in transit.
    pub fn in_transit(&self) -> bool {
        self.in_transit
    }

    /// Whether the parcel has been delivered.
    pub fn delivered(&self) -> bool {
        self.delivered
    }

    /// Whether the given milestone has been reached.
    pub fn is_reached(&self, milestone: Milestone) -> bool {
        match milestone {
            Milestone::PickedUp => self.picked_up,
            Milestone::InTransit => self.in_transit,
            Milestone::Delivered => self.delivered,
        }
    }

    /// The furthest milestone reached so far.
    pub fn latest(&self) -> Option<Milestone> {
        Milestone::ALL
            .iter()
            .rev()
            .copied()
            .find(|m| self.is_reached(*m))
    }

    /// The next milestone to be reached, or `None` once delivered.
    pub fn next(&self) -> Option<Milestone> {
        match self.latest() {
            None => Some(Milestone::PickedUp),
            Some(m) => m.successor(),
        }
    }

    /// Return a copy with `milestone` reached.
    ///
    /// Flags are only ever raised; this never clears a flag.
    #[must_use]
    pub fn with(mut self, milestone: Milestone) -> Self {
        self.set(milestone);
        self
    }

    /// Check the ordering invariant.
    pub fn is_consistent(&self) -> bool {
        (!self.in_transit || self.picked_up) && (!self.delivered || self.in_transit)
    }

    /// Whether every flag raised in `earlier` is still raised here.
    pub fn dominates(&self, earlier: &ShipmentStatus) -> bool {
        Milestone::ALL
            .iter()
            .all(|m| !earlier.is_reached(*m) || self.is_reached(*m))
    }

    fn set(&mut self, milestone: Milestone) {
        match milestone {
            Milestone::PickedUp => self.picked_up = true,
            Milestone::InTransit => self.in_transit = true,
            Milestone::Delivered => self.delivered = true,
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{picked_up: {}, in_transit: {}, delivered: {}}}",
            self.picked_up, self.in_transit, self.delivered
        )
    }
}

/// The kind of confirmation step that gates a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateKind {
    /// A photo or video must be captured.
    MediaCapture,
    /// The transporter confirms without providing an asset.
    Confirmation,
    /// A 4-digit code must be verified.
    CodeVerification,
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MediaCapture => "MEDIA_CAPTURE",
            Self::Confirmation => "CONFIRMATION",
            Self::CodeVerification => "CODE_VERIFICATION",
        };
        f.write_str(s)
    }
}

// =============================================================================
// CLUSTER B: MEDIA
// =============================================================================

/// What the media picker should capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MediaKind {
    /// A still photo.
    #[default]
    Photo,
    /// A video clip.
    Video,
}

/// Where the media picker takes the asset from.
///
/// Both sources are equivalent entry points into the same gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaSource {
    /// The device camera.
    Camera,
    /// The device photo library.
    Library,
}

/// URI of a resolved media asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetUri(pub String);

impl AssetUri {
    /// Create an asset URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Whether the URI carries no usable reference.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Borrow the raw URI.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// CLUSTER C: EARNINGS
// =============================================================================

/// An amount of transporter credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Credits(pub u64);

impl Credits {
    /// No credit.
    pub const ZERO: Credits = Credits(0);

    /// Add two amounts, returning `None` on overflow.
    pub fn checked_add(self, other: Credits) -> Option<Credits> {
        self.0.checked_add(other.0).map(Credits)
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A milestone that earns credit.
///
/// Besides the three shipment milestones, the transporter is credited once
/// when access to the shipment is unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CreditMilestone {
    /// The transporter unlocked access to the shipment.
    AccessUnlock,
    /// See [`Milestone::PickedUp`].
    PickedUp,
    /// See [`Milestone::InTransit`].
    InTransit,
    /// See [`Milestone::Delivered`].
    Delivered,
}

impl From<Milestone> for CreditMilestone {
    fn from(milestone: Milestone) -> Self {
        match milestone {
            Milestone::PickedUp => Self::PickedUp,
            Milestone::InTransit => Self::InTransit,
            Milestone::Delivered => Self::Delivered,
        }
    }
}

impl fmt::Display for CreditMilestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessUnlock => f.write_str("ACCESS_UNLOCK"),
            Self::PickedUp => Milestone::PickedUp.fmt(f),
            Self::InTransit => Milestone::InTransit.fmt(f),
            Self::Delivered => Milestone::Delivered.fmt(f),
        }
    }
}

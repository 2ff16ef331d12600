//! # Error Types
//!
//! Defines error types shared across subsystems.

use thiserror::Error;

/// Errors raised when building a `ShipmentStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    /// A later milestone is set while an earlier one is not.
    #[error(
        "Inconsistent status: picked_up={picked_up}, in_transit={in_transit}, delivered={delivered}"
    )]
    Inconsistent {
        picked_up: bool,
        in_transit: bool,
        delivered: bool,
    },
}

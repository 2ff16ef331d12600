//! # Adapter Implementations
//!
//! Concrete implementations of the lifecycle's outbound ports that are
//! specific to the console runtime.
//!
//! - `LedgerEarningsAdapter` - `EarningsPort` backed by the earnings subsystem
//! - `LocalFileMediaPicker` - `MediaPicker` that resolves staged local files

pub mod earnings;
pub mod media;

pub use earnings::LedgerEarningsAdapter;
pub use media::LocalFileMediaPicker;

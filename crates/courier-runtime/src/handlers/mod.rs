//! # Event Handlers
//!
//! Bus subscribers that render events for the transporter.

pub mod display;

pub use display::{render_event, DisplayHandler};

//! Directional pumps moving bytes between the pseudo-terminal and the device.

pub mod pump;

pub use pump::{incoming_pump, outgoing_pump, PumpContext, PumpReport, DEFAULT_MAX_CHUNK};

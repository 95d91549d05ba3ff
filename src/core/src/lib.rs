//! Transparent tap on a serial line.
//!
//! A pseudo-terminal stands in for the real device; everything a client
//! writes to it is relayed to the serial port and everything the port sends
//! back is relayed to the client. Both directions are copied, according to
//! the capture mode, into a queue that the log sink renders as hex/ASCII
//! dumps.

pub mod configuration;
pub mod controller;
pub mod data_capture;
pub mod endpoint;
pub mod error_handling;
pub mod log_sink;
pub mod relay;
pub mod session_management;

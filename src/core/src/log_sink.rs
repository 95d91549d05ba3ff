//! Human-readable rendering of the capture stream.

pub mod formatter;
pub mod log_writer;

pub use formatter::{render_record, DEFAULT_COLUMNS};
pub use log_writer::LogSink;

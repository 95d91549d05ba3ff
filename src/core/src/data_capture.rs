pub mod types;
pub mod capture_filter;
pub mod capture_queue;

pub use types::{CaptureMode, CaptureRecord, Direction};
pub use capture_filter::should_capture;
pub use capture_queue::{capture_queue, CaptureReceiver, CaptureSender};

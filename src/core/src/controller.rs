pub mod controller_handler;

pub use controller_handler::{relay_until, Controller};

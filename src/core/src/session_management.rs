//! Session lifecycle for one sniffing run.

/// Submodule for the session and its running relay.
pub mod session;

pub use session::{RelayHandle, Session, SessionSummary};

/// Represents the current status of a session.
///
/// Variants:
/// - `Pending`: endpoints are open, pumps not yet started.
/// - `Active`: both pumps have been spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Pending,
    Active,
}

//! Common data types used across the data_capture subsystem.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Direction of serial flow for captured bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Bytes flowing from the client (through the pseudo-terminal) to the device.
    Incoming,
    /// Bytes flowing from the device back to the client.
    Outgoing,
}

impl Direction {
    /// Tag used in rendered capture headers.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Incoming => "INCOMING",
            Direction::Outgoing => "OUTGOING",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which direction(s) produce capture records for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    IncomingOnly,
    OutgoingOnly,
    Bidirectional,
}

impl CaptureMode {
    /// Resolves the mode from the `--incoming`/`--outgoing` switches.
    ///
    /// Both switches select `Bidirectional`, `--incoming` alone selects
    /// `IncomingOnly`, anything else falls back to `OutgoingOnly`.
    pub fn from_flags(incoming: bool, outgoing: bool) -> Self {
        match (incoming, outgoing) {
            (true, true) => CaptureMode::Bidirectional,
            (true, false) => CaptureMode::IncomingOnly,
            (false, _) => CaptureMode::OutgoingOnly,
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::IncomingOnly => f.write_str("incoming only"),
            CaptureMode::OutgoingOnly => f.write_str("outgoing only"),
            CaptureMode::Bidirectional => f.write_str("bidirectional"),
        }
    }
}

/// One relayed chunk as seen by the observation channel.
///
/// Records are created by a pump at read time and never mutated afterwards;
/// the payload is owned so the pump's buffer can be reused immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRecord {
    payload: Vec<u8>,
    captured_at: DateTime<Local>,
    direction: Direction,
}

impl CaptureRecord {
    pub fn new(payload: &[u8], captured_at: DateTime<Local>, direction: Direction) -> Self {
        Self {
            payload: payload.to_vec(),
            captured_at,
            direction,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_from_flags() {
        assert_eq!(CaptureMode::from_flags(true, true), CaptureMode::Bidirectional);
        assert_eq!(CaptureMode::from_flags(true, false), CaptureMode::IncomingOnly);
        assert_eq!(CaptureMode::from_flags(false, true), CaptureMode::OutgoingOnly);
        assert_eq!(CaptureMode::from_flags(false, false), CaptureMode::OutgoingOnly);
    }

    #[test]
    fn record_copies_payload() {
        let mut buf = *b"abc";
        let record = CaptureRecord::new(&buf, Local::now(), Direction::Incoming);
        buf[0] = b'z';
        assert_eq!(record.payload(), b"abc");
        assert_eq!(record.len(), 3);
        assert_eq!(record.direction(), Direction::Incoming);
    }

    #[test]
    fn direction_labels() {
        assert_eq!(Direction::Incoming.to_string(), "INCOMING");
        assert_eq!(Direction::Outgoing.label(), "OUTGOING");
    }
}

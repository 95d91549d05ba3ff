use super::types::{CaptureMode, Direction};

/// Decides whether bytes moving in `direction` reach the observation channel.
///
/// Forwarding never depends on this; it only gates capture.
pub fn should_capture(mode: CaptureMode, direction: Direction) -> bool {
    match mode {
        CaptureMode::Bidirectional => true,
        CaptureMode::IncomingOnly => direction == Direction::Incoming,
        CaptureMode::OutgoingOnly => direction == Direction::Outgoing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bidirectional_accepts_both() {
        assert!(should_capture(CaptureMode::Bidirectional, Direction::Incoming));
        assert!(should_capture(CaptureMode::Bidirectional, Direction::Outgoing));
    }

    #[test]
    fn single_direction_modes() {
        assert!(should_capture(CaptureMode::IncomingOnly, Direction::Incoming));
        assert!(!should_capture(CaptureMode::IncomingOnly, Direction::Outgoing));
        assert!(should_capture(CaptureMode::OutgoingOnly, Direction::Outgoing));
        assert!(!should_capture(CaptureMode::OutgoingOnly, Direction::Incoming));
    }
}

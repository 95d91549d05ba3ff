//! Unbounded FIFO between the relay pumps and the capture consumer.
//!
//! Both pumps hold a [`CaptureSender`]; exactly one [`CaptureReceiver`] drains
//! the queue. Records from one sender come out in the order they were sent.
//! Once every sender is dropped and the queue is empty, the receiver reports
//! the end of the stream.

use log::trace;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::types::CaptureRecord;

/// Creates a connected sender/receiver pair.
pub fn capture_queue() -> (CaptureSender, CaptureReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CaptureSender { tx }, CaptureReceiver { rx })
}

#[derive(Debug, Clone)]
pub struct CaptureSender {
    tx: UnboundedSender<CaptureRecord>,
}

impl CaptureSender {
    /// Enqueues a record. Returns `false` if the consumer is gone, in which
    /// case the record is dropped.
    pub fn send(&self, record: CaptureRecord) -> bool {
        match self.tx.send(record) {
            Ok(()) => true,
            Err(_) => {
                trace!("capture consumer closed; record dropped");
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[derive(Debug)]
pub struct CaptureReceiver {
    rx: UnboundedReceiver<CaptureRecord>,
}

impl CaptureReceiver {
    /// Blocks the current thread until a record is available.
    ///
    /// Must not be called from inside an async context; the log sink runs it
    /// on a blocking thread.
    pub fn recv_blocking(&mut self) -> Option<CaptureRecord> {
        self.rx.blocking_recv()
    }

    pub async fn recv(&mut self) -> Option<CaptureRecord> {
        self.rx.recv().await
    }

    /// Returns the next record if one is already queued.
    pub fn try_recv(&mut self) -> Option<CaptureRecord> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_capture::types::Direction;
    use chrono::Local;

    fn record(payload: &[u8], direction: Direction) -> CaptureRecord {
        CaptureRecord::new(payload, Local::now(), direction)
    }

    #[test]
    fn preserves_order_per_sender() {
        let (tx, mut rx) = capture_queue();
        for chunk in [b"A", b"B", b"C"] {
            assert!(tx.send(record(chunk, Direction::Incoming)));
        }
        drop(tx);

        let got: Vec<Vec<u8>> = std::iter::from_fn(|| rx.recv_blocking())
            .map(|r| r.payload().to_vec())
            .collect();
        assert_eq!(got, vec![b"A".to_vec(), b"B".to_vec(), b"C".to_vec()]);
    }

    #[test]
    fn two_producers_keep_their_own_order() {
        let (tx, mut rx) = capture_queue();
        let tx2 = tx.clone();

        let a = std::thread::spawn(move || {
            for i in 0u8..50 {
                tx.send(record(&[i], Direction::Incoming));
            }
        });
        let b = std::thread::spawn(move || {
            for i in 0u8..50 {
                tx2.send(record(&[i], Direction::Outgoing));
            }
        });
        a.join().unwrap();
        b.join().unwrap();

        let mut incoming = Vec::new();
        let mut outgoing = Vec::new();
        while let Some(r) = rx.recv_blocking() {
            match r.direction() {
                Direction::Incoming => incoming.push(r.payload()[0]),
                Direction::Outgoing => outgoing.push(r.payload()[0]),
            }
        }
        let expected: Vec<u8> = (0u8..50).collect();
        assert_eq!(incoming, expected);
        assert_eq!(outgoing, expected);
    }

    #[test]
    fn send_after_receiver_dropped() {
        let (tx, rx) = capture_queue();
        drop(rx);
        assert!(tx.is_closed());
        assert!(!tx.send(record(b"x", Direction::Outgoing)));
    }

    #[tokio::test]
    async fn async_receive() {
        let (tx, mut rx) = capture_queue();
        tx.send(record(b"hi", Direction::Outgoing));
        let r = rx.recv().await.expect("record");
        assert_eq!(r.payload(), b"hi");
        assert!(rx.try_recv().is_none());
    }
}

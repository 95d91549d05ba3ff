//! In-memory device link for exercising the relay without hardware.
//!
//! The [`MockDevice`] side is handed to the session as its device; the
//! [`MockDeviceHandle`] side plays the hardware: it injects bytes the device
//! "sends" and collects what the relay wrote to it. Dropping the handle makes
//! every further device read or write fail with `BrokenPipe`, which is how
//! tests simulate an unplugged cable.

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use super::device_link::{DeviceHalves, DeviceReader, DeviceWriter};

pub struct MockDevice;

impl MockDevice {
    /// Builds a mock whose reads time out after `timeout`.
    pub fn pair(name: &str, timeout: Duration) -> (DeviceHalves, MockDeviceHandle) {
        let (inject_tx, inject_rx) = mpsc::channel();
        let (written_tx, written_rx) = mpsc::channel();
        let halves = DeviceHalves {
            name: name.to_string(),
            reader: Box::new(MockReader {
                rx: inject_rx,
                pending: Vec::new(),
                timeout,
            }),
            writer: Box::new(MockWriter { tx: written_tx }),
        };
        let handle = MockDeviceHandle {
            inject_tx,
            written_rx,
        };
        (halves, handle)
    }
}

pub struct MockDeviceHandle {
    inject_tx: Sender<Vec<u8>>,
    written_rx: Receiver<Vec<u8>>,
}

impl MockDeviceHandle {
    /// Queues bytes as if the device had put them on the wire.
    pub fn inject(&self, data: &[u8]) {
        let _ = self.inject_tx.send(data.to_vec());
    }

    /// Next chunk written by the relay, if one arrives within `timeout`.
    pub fn recv_written(&self, timeout: Duration) -> Option<Vec<u8>> {
        self.written_rx.recv_timeout(timeout).ok()
    }

    /// Collects written bytes until `len` have arrived or `timeout` elapses.
    pub fn collect_written(&self, len: usize, timeout: Duration) -> Vec<u8> {
        let deadline = Instant::now() + timeout;
        let mut out = Vec::new();
        while out.len() < len {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.written_rx.recv_timeout(remaining) {
                Ok(chunk) => out.extend_from_slice(&chunk),
                Err(_) => break,
            }
        }
        out
    }
}

struct MockReader {
    rx: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    timeout: Duration,
}

impl DeviceReader for MockReader {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.rx.recv_timeout(self.timeout) {
                Ok(chunk) => self.pending = chunk,
                Err(RecvTimeoutError::Timeout) => return Ok(0),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock device unplugged"))
                }
            }
        }
        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

struct MockWriter {
    tx: Sender<Vec<u8>>,
}

impl DeviceWriter for MockWriter {
    fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.tx
            .send(data.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "mock device unplugged"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_split_large_injections() {
        let (mut halves, handle) = MockDevice::pair("mock", Duration::from_millis(20));
        handle.inject(b"abcdef");
        let mut buf = [0u8; 4];
        assert_eq!(halves.reader.read_chunk(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(halves.reader.read_chunk(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(halves.reader.read_chunk(&mut buf).unwrap(), 0);
    }

    #[test]
    fn unplugged_device_errors() {
        let (mut halves, handle) = MockDevice::pair("mock", Duration::from_millis(20));
        drop(handle);
        let mut buf = [0u8; 4];
        let err = halves.reader.read_chunk(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(halves.writer.write_chunk(b"x").is_err());
    }
}

use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::AsFd;

use chrono::{DateTime, Local};
use log::{debug, trace};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::data_capture::{should_capture, CaptureMode, CaptureRecord, CaptureSender, Direction};
use crate::endpoint::{wait_readable, wait_writable, DeviceReader, DeviceWriter};
use crate::error_handling::types::CaptureError;

pub const DEFAULT_MAX_CHUNK: usize = 1024;

/// Upper bound on one readiness wait, so cancellation is noticed promptly.
const READY_SLICE_MS: u16 = 50;

const PREVIEW_LEN: usize = 64;

/// Everything a pump shares with its sibling and the session.
#[derive(Debug, Clone)]
pub struct PumpContext {
    pub session_id: Uuid,
    pub mode: CaptureMode,
    pub max_chunk: usize,
    pub captures: CaptureSender,
    pub cancel: CancellationToken,
}

impl PumpContext {
    fn offer(&self, direction: Direction, chunk: &[u8], captured_at: DateTime<Local>, report: &mut PumpReport) {
        report.chunks += 1;
        report.bytes += chunk.len() as u64;

        if should_capture(self.mode, direction) {
            if self.captures.send(CaptureRecord::new(chunk, captured_at, direction)) {
                report.captured += 1;
            }
        }

        let preview = &chunk[..chunk.len().min(PREVIEW_LEN)];
        trace!(
            "[{}] relayed {} {} bytes: {}{}",
            self.session_id,
            direction,
            chunk.len(),
            String::from_utf8_lossy(preview),
            if chunk.len() > PREVIEW_LEN { " ..." } else { "" }
        );
    }
}

/// Totals for one pump over its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpReport {
    pub direction: Direction,
    pub chunks: u64,
    pub bytes: u64,
    pub captured: u64,
}

impl PumpReport {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            chunks: 0,
            bytes: 0,
            captured: 0,
        }
    }
}

/// Client -> device. Waits for the pseudo-terminal master to become readable,
/// forwards each chunk to the device and offers it for capture.
///
/// Returns when `ctx.cancel` fires; any I/O failure ends the pump with an error.
pub fn incoming_pump(
    mut master: File,
    mut device: Box<dyn DeviceWriter>,
    ctx: PumpContext,
) -> Result<PumpReport, CaptureError> {
    debug!("[{}] incoming pump started", ctx.session_id);
    let mut report = PumpReport::new(Direction::Incoming);
    let mut buf = vec![0u8; ctx.max_chunk.max(1)];

    while !ctx.cancel.is_cancelled() {
        if !wait_readable(master.as_fd(), READY_SLICE_MS).map_err(CaptureError::PollFailed)? {
            continue;
        }
        let n = match master.read(&mut buf) {
            Ok(0) => {
                return Err(CaptureError::EndpointIo(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "pseudo-terminal closed",
                )))
            }
            Ok(n) => n,
            Err(e) if retryable(&e) => continue,
            Err(e) => return Err(CaptureError::EndpointIo(e)),
        };
        let captured_at = Local::now();

        ctx.offer(Direction::Incoming, &buf[..n], captured_at, &mut report);
        device.write_chunk(&buf[..n]).map_err(CaptureError::DeviceIo)?;
    }

    debug!("[{}] incoming pump cancelled", ctx.session_id);
    Ok(report)
}

/// Device -> client. Polls the device with its own read timeout and writes
/// every non-empty chunk back into the pseudo-terminal master.
///
/// A client that stops reading stalls the pump on the master write, but
/// cancellation still ends it; the unwritten rest of the chunk is dropped.
pub fn outgoing_pump(
    mut device: Box<dyn DeviceReader>,
    mut master: File,
    ctx: PumpContext,
) -> Result<PumpReport, CaptureError> {
    debug!("[{}] outgoing pump started", ctx.session_id);
    let mut report = PumpReport::new(Direction::Outgoing);
    let mut buf = vec![0u8; ctx.max_chunk.max(1)];

    while !ctx.cancel.is_cancelled() {
        let n = device.read_chunk(&mut buf).map_err(CaptureError::DeviceIo)?;
        if n == 0 {
            continue;
        }
        let captured_at = Local::now();

        ctx.offer(Direction::Outgoing, &buf[..n], captured_at, &mut report);
        if !write_until_cancelled(&mut master, &buf[..n], &ctx.cancel)? {
            debug!("[{}] outgoing write abandoned on cancel", ctx.session_id);
            break;
        }
    }

    debug!("[{}] outgoing pump cancelled", ctx.session_id);
    Ok(report)
}

fn retryable(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock)
}

/// Writes all of `chunk` to the non-blocking master, waiting for room in
/// `READY_SLICE_MS` slices. Returns `false` if `cancel` fired first.
fn write_until_cancelled(
    master: &mut File,
    mut chunk: &[u8],
    cancel: &CancellationToken,
) -> Result<bool, CaptureError> {
    while !chunk.is_empty() {
        if cancel.is_cancelled() {
            return Ok(false);
        }
        if !wait_writable(master.as_fd(), READY_SLICE_MS).map_err(CaptureError::PollFailed)? {
            continue;
        }
        match master.write(chunk) {
            Ok(0) => {
                return Err(CaptureError::EndpointIo(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "pseudo-terminal accepted no bytes",
                )))
            }
            Ok(n) => chunk = &chunk[n..],
            Err(e) if retryable(&e) => continue,
            Err(e) => return Err(CaptureError::EndpointIo(e)),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_capture::capture_queue;
    use crate::endpoint::{MockDevice, VirtualEndpoint};
    use std::thread;
    use std::time::Duration;

    fn context(mode: CaptureMode, captures: CaptureSender) -> PumpContext {
        PumpContext {
            session_id: Uuid::new_v4(),
            mode,
            max_chunk: DEFAULT_MAX_CHUNK,
            captures,
            cancel: CancellationToken::new(),
        }
    }

    #[test]
    fn incoming_forwards_and_captures() {
        let endpoint = VirtualEndpoint::open().unwrap();
        let mut client = endpoint.connect_client().unwrap();
        let (master, _) = endpoint.master_handles().unwrap();
        let (halves, device) = MockDevice::pair("mock", Duration::from_millis(10));
        let (tx, mut rx) = capture_queue();
        let ctx = context(CaptureMode::IncomingOnly, tx);
        let cancel = ctx.cancel.clone();

        let pump = thread::spawn(move || incoming_pump(master, halves.writer, ctx));

        client.write_all(b"hello").unwrap();
        let written = device.collect_written(5, Duration::from_secs(2));
        assert_eq!(written, b"hello");

        cancel.cancel();
        let report = pump.join().unwrap().expect("clean cancel");
        assert_eq!(report.bytes, 5);
        assert_eq!(report.captured, report.chunks);

        let mut captured = Vec::new();
        while let Some(r) = rx.try_recv() {
            assert_eq!(r.direction(), Direction::Incoming);
            captured.extend_from_slice(r.payload());
        }
        assert_eq!(captured, b"hello");
    }

    #[test]
    fn outgoing_forwards_without_capture_in_incoming_mode() {
        let endpoint = VirtualEndpoint::open().unwrap();
        let mut client = endpoint.connect_client().unwrap();
        let (_, master) = endpoint.master_handles().unwrap();
        let (halves, device) = MockDevice::pair("mock", Duration::from_millis(10));
        let (tx, mut rx) = capture_queue();
        let ctx = context(CaptureMode::IncomingOnly, tx);
        let cancel = ctx.cancel.clone();

        let pump = thread::spawn(move || outgoing_pump(halves.reader, master, ctx));

        device.inject(b"\x02reply\x03");
        let mut got = Vec::new();
        let mut buf = [0u8; 32];
        while got.len() < 7 {
            assert!(wait_readable(client.as_fd(), 2000).unwrap(), "client saw nothing");
            let n = client.read(&mut buf).unwrap();
            got.extend_from_slice(&buf[..n]);
        }
        assert_eq!(got, b"\x02reply\x03");

        cancel.cancel();
        let report = pump.join().unwrap().expect("clean cancel");
        assert_eq!(report.bytes, 7);
        assert_eq!(report.captured, 0);
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn device_failure_ends_outgoing_pump() {
        let endpoint = VirtualEndpoint::open().unwrap();
        let (_, master) = endpoint.master_handles().unwrap();
        let (halves, device) = MockDevice::pair("mock", Duration::from_millis(10));
        let (tx, _rx) = capture_queue();
        let ctx = context(CaptureMode::Bidirectional, tx);

        drop(device);
        match outgoing_pump(halves.reader, master, ctx) {
            Err(CaptureError::DeviceIo(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected device error, got {:?}", other),
        }
    }

    #[test]
    fn cancel_ends_outgoing_pump_with_unread_client() {
        let endpoint = VirtualEndpoint::open().unwrap();
        let (_, master) = endpoint.master_handles().unwrap();
        let (halves, device) = MockDevice::pair("mock", Duration::from_millis(10));
        let (tx, _rx) = capture_queue();
        let ctx = context(CaptureMode::OutgoingOnly, tx);
        let cancel = ctx.cancel.clone();

        let pump = thread::spawn(move || outgoing_pump(halves.reader, master, ctx));
        let block = [0x41u8; 1024];
        for _ in 0..2048 {
            device.inject(&block);
        }
        thread::sleep(Duration::from_millis(300));
        cancel.cancel();

        let started = std::time::Instant::now();
        while !pump.is_finished() {
            assert!(started.elapsed() < Duration::from_secs(3), "pump ignored cancel");
            thread::sleep(Duration::from_millis(10));
        }
        let report = pump.join().unwrap().expect("clean cancel");
        assert!(report.bytes > 0);
        assert!(report.bytes < 2048 * 1024);
    }

    #[test]
    fn chunks_respect_max_chunk() {
        let endpoint = VirtualEndpoint::open().unwrap();
        let (_, master) = endpoint.master_handles().unwrap();
        let (halves, device) = MockDevice::pair("mock", Duration::from_millis(10));
        let (tx, mut rx) = capture_queue();
        let mut ctx = context(CaptureMode::OutgoingOnly, tx);
        ctx.max_chunk = 4;
        let cancel = ctx.cancel.clone();

        let pump = thread::spawn(move || outgoing_pump(halves.reader, master, ctx));
        device.inject(b"0123456789");
        thread::sleep(Duration::from_millis(200));
        cancel.cancel();
        pump.join().unwrap().unwrap();

        let sizes: Vec<usize> = std::iter::from_fn(|| rx.try_recv()).map(|r| r.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }
}

//! One sniffing session: a pseudo-terminal, a device link, and the two pumps
//! that relay between them.
//!
//! ```no_run
//! use serialsniff::configuration::SessionSettings;
//! use serialsniff::data_capture::{capture_queue, CaptureMode};
//! use serialsniff::session_management::session::Session;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = SessionSettings {
//!     port: "/dev/ttyUSB0".to_string(),
//!     baud_rate: 115_200,
//!     mode: CaptureMode::Bidirectional,
//!     timeout_units: 1000,
//!     max_chunk: 1024,
//! };
//! let (tx, mut rx) = capture_queue();
//! let mut session = Session::open(settings, tx)?;
//! println!("connect to {}", session.proxy_path().display());
//!
//! let relay = session.start()?;
//! while let Some(record) = rx.recv().await {
//!     println!("{} {} bytes", record.direction(), record.len());
//! }
//! relay.join().await?;
//! session.cleanup();
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::SessionStatus;
use crate::configuration::SessionSettings;
use crate::data_capture::{CaptureSender, Direction};
use crate::endpoint::{DeviceHalves, PhysicalDevice, VirtualEndpoint};
use crate::error_handling::types::{CaptureError, SessionError};
use crate::relay::{incoming_pump, outgoing_pump, PumpContext, PumpReport};

pub struct Session {
    id: Uuid,
    settings: SessionSettings,
    endpoint: VirtualEndpoint,
    device: Option<DeviceHalves>,
    captures: Option<CaptureSender>,
    cancel: CancellationToken,
    status: SessionStatus,
}

impl Session {
    /// Allocates the pseudo-terminal and opens the serial device named in
    /// `settings`. Either failure aborts construction.
    pub fn open(settings: SessionSettings, captures: CaptureSender) -> Result<Self, SessionError> {
        let endpoint = VirtualEndpoint::open()?;
        let device = PhysicalDevice::open(&settings.port, settings.baud_rate, settings.timeout_units)?;
        let device = device.split()?;
        Ok(Self::assemble(settings, endpoint, device, captures))
    }

    /// Like [`Session::open`] but relays to an already connected device link.
    pub fn with_device(
        settings: SessionSettings,
        device: DeviceHalves,
        captures: CaptureSender,
    ) -> Result<Self, SessionError> {
        let endpoint = VirtualEndpoint::open()?;
        Ok(Self::assemble(settings, endpoint, device, captures))
    }

    fn assemble(
        settings: SessionSettings,
        endpoint: VirtualEndpoint,
        device: DeviceHalves,
        captures: CaptureSender,
    ) -> Self {
        let id = Uuid::new_v4();
        debug!(
            "[{}] session created: {} <-> {} ({})",
            id,
            endpoint.path().display(),
            device.name,
            settings.mode
        );
        Self {
            id,
            settings,
            endpoint,
            device: Some(device),
            captures: Some(captures),
            cancel: CancellationToken::new(),
            status: SessionStatus::Pending,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Path of the pseudo-terminal clients should open instead of the device.
    pub fn proxy_path(&self) -> &Path {
        self.endpoint.path()
    }

    pub fn endpoint(&self) -> &VirtualEndpoint {
        &self.endpoint
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Token that stops both pumps when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Spawns the incoming and outgoing pumps on blocking threads.
    ///
    /// The session's capture sender moves into the pumps, so the capture
    /// stream closes once both pumps have returned. A pump that fails cancels
    /// the session, which stops its sibling as well.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<RelayHandle, SessionError> {
        let (device, captures) = match (self.device.take(), self.captures.take()) {
            (Some(d), Some(c)) => (d, c),
            _ => return Err(SessionError::AlreadyStarted),
        };
        let (master_in, master_out) = self.endpoint.master_handles()?;

        let context = PumpContext {
            session_id: self.id,
            mode: self.settings.mode,
            max_chunk: self.settings.max_chunk,
            captures,
            cancel: self.cancel.clone(),
        };

        let mut set = JoinSet::new();
        let DeviceHalves { reader, writer, .. } = device;

        {
            let ctx = context.clone();
            set.spawn_blocking(move || {
                let id = ctx.session_id;
                let cancel = ctx.cancel.clone();
                let res = incoming_pump(master_in, writer, ctx);
                if let Err(e) = &res {
                    error!("[{}] incoming pump failed: {}", id, e);
                    cancel.cancel();
                }
                res
            });
        }

        {
            let ctx = context;
            set.spawn_blocking(move || {
                let id = ctx.session_id;
                let cancel = ctx.cancel.clone();
                let res = outgoing_pump(reader, master_out, ctx);
                if let Err(e) = &res {
                    error!("[{}] outgoing pump failed: {}", id, e);
                    cancel.cancel();
                }
                res
            });
        }

        self.status = SessionStatus::Active;
        info!("[{}] relaying {} <-> {}", self.id, self.endpoint.path().display(), self.settings.port);

        Ok(RelayHandle {
            session_id: self.id,
            set,
            cancel: self.cancel.clone(),
            started_at: Utc::now(),
        })
    }

    /// Stops the pumps (if still running) and closes both pseudo-terminal
    /// descriptors and any device link that was never started.
    pub fn cleanup(mut self) {
        self.cancel.cancel();
        self.device.take();
        self.captures.take();
        info!("[{}] session closed", self.id);
    }
}

/// Running pumps of a started session.
pub struct RelayHandle {
    session_id: Uuid,
    set: JoinSet<Result<PumpReport, CaptureError>>,
    cancel: CancellationToken,
    started_at: DateTime<Utc>,
}

impl RelayHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for both pumps. Returns the first pump error, if any, after the
    /// other pump has stopped too.
    pub async fn join(mut self) -> Result<SessionSummary, CaptureError> {
        let mut incoming = PumpReport::new(Direction::Incoming);
        let mut outgoing = PumpReport::new(Direction::Outgoing);
        let mut failure = None;

        while let Some(res) = self.set.join_next().await {
            match res {
                Ok(Ok(report)) => match report.direction {
                    Direction::Incoming => incoming = report,
                    Direction::Outgoing => outgoing = report,
                },
                Ok(Err(e)) => {
                    self.cancel.cancel();
                    failure.get_or_insert(e);
                }
                Err(e) => {
                    self.cancel.cancel();
                    failure.get_or_insert(CaptureError::TaskFailed(e.to_string()));
                }
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }

        let summary = SessionSummary {
            session_id: self.session_id,
            incoming,
            outgoing,
            duration: Utc::now() - self.started_at,
        };
        info!(
            "[{}] relay finished: incoming={} bytes/{} chunks ({} captured), outgoing={} bytes/{} chunks ({} captured), duration={}",
            summary.session_id,
            incoming.bytes,
            incoming.chunks,
            incoming.captured,
            outgoing.bytes,
            outgoing.chunks,
            outgoing.captured,
            summary.duration
        );
        Ok(summary)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub incoming: PumpReport,
    pub outgoing: PumpReport,
    pub duration: Duration,
}

use std::future::Future;

use log::{error, info};

use crate::configuration::{Config, Settings};
use crate::data_capture::{capture_queue, CaptureReceiver};
use crate::error_handling::types::*;
use crate::log_sink::LogSink;
use crate::session_management::{Session, SessionSummary};

/// Wires configuration, session and log sink together for one run of the
/// sniffer.
pub struct Controller {
    pub settings: Settings,
}

impl Controller {
    pub fn new(config: Config) -> Result<Self, ControllerError> {
        // Reported once, by the caller.
        let settings = config.resolve()?;
        Ok(Self { settings })
    }

    pub fn from_settings(settings: Settings) -> Self {
        Self { settings }
    }

    /// Opens the device and pseudo-terminal, then relays until Ctrl-C or a
    /// relay failure.
    pub async fn run(self) -> Result<SessionSummary, ControllerError> {
        let (tx, rx) = capture_queue();
        let session = Session::open(self.settings.session.clone(), tx)?;
        let sink = LogSink::to_stdout(self.settings.columns, self.settings.output_file.as_deref())?;
        relay_until(session, rx, sink, interrupted()).await
    }
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("unable to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Prints the banner, starts the relay and the log sink, and runs until
/// `shutdown` resolves or a pump fails.
///
/// On shutdown the pumps are cancelled and joined before the session is
/// cleaned up; the log sink then drains whatever is still queued.
pub async fn relay_until<F>(
    mut session: Session,
    captures: CaptureReceiver,
    mut sink: LogSink,
    shutdown: F,
) -> Result<SessionSummary, ControllerError>
where
    F: Future<Output = ()>,
{
    let settings = session.settings().clone();
    let proxy = session.proxy_path().display().to_string();
    sink.write_banner(&settings.port, settings.baud_rate, &proxy)?;
    info!(
        "sniffing {} at {} baud ({}), clients connect to {}",
        settings.port, settings.baud_rate, settings.mode, proxy
    );

    let sink_task = tokio::task::spawn_blocking(move || sink.run(captures));
    let token = session.cancellation_token();
    let relay = session.start()?;

    let joined = relay.join();
    tokio::pin!(joined);
    let outcome = tokio::select! {
        res = &mut joined => res,
        _ = shutdown => {
            info!("interrupt received, stopping relay");
            token.cancel();
            joined.await
        }
    };

    session.cleanup();
    let sink_result = sink_task.await;

    let summary = outcome.map_err(SessionError::from)?;
    let rendered = sink_result.map_err(|e| ControllerError::TaskFailed(e.to_string()))??;
    info!("{} capture records rendered", rendered);
    Ok(summary)
}

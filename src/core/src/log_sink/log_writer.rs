use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::{debug, info};

use super::formatter::{render_banner, render_record};
use crate::data_capture::{CaptureReceiver, CaptureRecord};
use crate::error_handling::types::LogError;

/// Single consumer of the capture queue.
///
/// Every rendered block goes to the console and, when configured, to a file.
/// Both destinations are flushed after each record so a crash loses at most
/// the record being written.
pub struct LogSink {
    columns: usize,
    console: Box<dyn Write + Send>,
    file: Option<Box<dyn Write + Send>>,
    rendered: u64,
}

impl LogSink {
    pub fn new(
        columns: usize,
        console: Box<dyn Write + Send>,
        file: Option<Box<dyn Write + Send>>,
    ) -> Self {
        Self {
            columns,
            console,
            file,
            rendered: 0,
        }
    }

    /// Console on stdout, plus `path` (created or truncated) if given.
    pub fn to_stdout(columns: usize, path: Option<&Path>) -> Result<Self, LogError> {
        let file: Option<Box<dyn Write + Send>> = match path {
            Some(p) => {
                let f = File::create(p).map_err(LogError::FileOpen)?;
                debug!("writing capture log to {}", p.display());
                Some(Box::new(BufWriter::new(f)))
            }
            None => None,
        };
        Ok(Self::new(columns, Box::new(io::stdout()), file))
    }

    pub fn write_banner(&mut self, port: &str, baud_rate: u32, proxy: &str) -> Result<(), LogError> {
        self.emit(&render_banner(port, baud_rate, proxy))
    }

    pub fn write_record(&mut self, record: &CaptureRecord) -> Result<(), LogError> {
        let text = render_record(record, self.columns);
        self.emit(&text)?;
        self.rendered += 1;
        Ok(())
    }

    pub fn rendered(&self) -> u64 {
        self.rendered
    }

    /// Drains `captures` until every producer is gone. Blocks the calling
    /// thread; returns how many records were rendered.
    pub fn run(mut self, mut captures: CaptureReceiver) -> Result<u64, LogError> {
        debug!("log sink started");
        while let Some(record) = captures.recv_blocking() {
            self.write_record(&record)?;
        }
        info!("capture stream closed after {} records", self.rendered);
        Ok(self.rendered)
    }

    fn emit(&mut self, text: &str) -> Result<(), LogError> {
        self.console
            .write_all(text.as_bytes())
            .and_then(|_| self.console.flush())
            .map_err(LogError::ConsoleWrite)?;
        if let Some(file) = self.file.as_mut() {
            file.write_all(text.as_bytes())
                .and_then(|_| file.flush())
                .map_err(LogError::FileWrite)?;
        }
        Ok(())
    }
}

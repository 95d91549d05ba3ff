use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::debug;

use super::types::{FileConfig, SessionSettings, Settings};
use crate::data_capture::CaptureMode;
use crate::endpoint::DEFAULT_TIMEOUT_UNITS;
use crate::error_handling::types::ConfigError;
use crate::log_sink::DEFAULT_COLUMNS;
use crate::relay::DEFAULT_MAX_CHUNK;

/// Command-line configuration.
///
/// Positional `port` and `baudrate` may be omitted when a configuration file
/// supplies them. Values given on the command line always win over the file.
///
/// # Fields Overview
///
/// - `port`, `baudrate`: the serial device to tap and its speed
/// - `incoming`, `outgoing`: which direction(s) to capture; both means
///   bidirectional, none means outgoing only
/// - `file`: optional capture log file, truncated on start
/// - `columns`: payload bytes per rendered line
/// - `timeout`: device read timeout in bit periods
/// - `max_chunk`: largest chunk one pump moves at a time
/// - `config`: TOML file with defaults for all of the above
#[derive(Parser, Debug, Clone)]
#[command(name = "serialsniff")]
#[command(version)]
#[command(about = "Transparent serial port sniffer")]
pub struct Config {
    /// Serial port to sniff
    pub port: Option<String>,

    /// Baudrate of the serial port to sniff
    pub baudrate: Option<u32>,

    /// Sniff incoming (from host to serial device) transfers
    #[arg(long, short = 'i', action = ArgAction::SetTrue)]
    pub incoming: bool,

    /// Sniff outgoing (from serial device to host) transfers
    #[arg(long, short = 'o', action = ArgAction::SetTrue)]
    pub outgoing: bool,

    /// File to write the sniffed transfers to
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// How many columns of characters to display per line [default: 8]
    #[arg(long)]
    pub columns: Option<usize>,

    /// Device read timeout, in bit periods of the baudrate [default: 1000]
    #[arg(long)]
    pub timeout: Option<u32>,

    /// Maximum bytes relayed per chunk [default: 1024]
    #[arg(long)]
    pub max_chunk: Option<usize>,

    /// TOML configuration file
    #[arg(long, short = 'c', env = "SERIALSNIFF_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Parses the process arguments, exiting with a usage message on error.
    pub fn from_args() -> Self {
        Config::parse()
    }

    /// Loads the configuration file, if any, and merges it under the
    /// command-line values.
    pub fn resolve(self) -> Result<Settings, ConfigError> {
        let file = match &self.config {
            Some(path) => {
                debug!("loading configuration file {}", path.display());
                FileConfig::from_file(path)?
            }
            None => FileConfig::default(),
        };
        self.merge(file)
    }

    fn merge(self, file: FileConfig) -> Result<Settings, ConfigError> {
        let port = self.port.or(file.port).ok_or(ConfigError::MissingPort)?;
        let baud_rate = self.baudrate.or(file.baudrate).ok_or(ConfigError::MissingBaudRate)?;
        if baud_rate == 0 {
            return Err(ConfigError::InvalidBaudRate(baud_rate));
        }

        let mode = if self.incoming || self.outgoing {
            CaptureMode::from_flags(self.incoming, self.outgoing)
        } else {
            file.mode.unwrap_or(CaptureMode::OutgoingOnly)
        };

        let columns = self.columns.or(file.columns).unwrap_or(DEFAULT_COLUMNS);
        if columns == 0 {
            return Err(ConfigError::NotInRange("columns must be at least 1".to_string()));
        }
        let timeout_units = self.timeout.or(file.timeout).unwrap_or(DEFAULT_TIMEOUT_UNITS);
        if timeout_units == 0 {
            return Err(ConfigError::NotInRange("timeout must be at least 1".to_string()));
        }
        let max_chunk = self.max_chunk.or(file.max_chunk).unwrap_or(DEFAULT_MAX_CHUNK);
        if max_chunk == 0 {
            return Err(ConfigError::NotInRange("max chunk must be at least 1".to_string()));
        }

        Ok(Settings {
            session: SessionSettings {
                port,
                baud_rate,
                mode,
                timeout_units,
                max_chunk,
            },
            columns,
            output_file: self.file.or(file.file),
        })
    }
}

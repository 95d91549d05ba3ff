use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::data_capture::CaptureMode;
use crate::error_handling::types::ConfigError;

/// Optional on-disk configuration. Every key may be overridden from the
/// command line.
///
/// ```toml
/// port = "/dev/ttyUSB0"
/// baudrate = 115200
/// mode = "bidirectional"
/// file = "capture.log"
/// columns = 16
/// timeout = 1000
/// max_chunk = 1024
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub port: Option<String>,
    pub baudrate: Option<u32>,
    pub mode: Option<CaptureMode>,
    pub file: Option<PathBuf>,
    pub columns: Option<usize>,
    pub timeout: Option<u32>,
    pub max_chunk: Option<usize>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))
    }
}

/// Construction inputs for one sniffing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub port: String,
    pub baud_rate: u32,
    pub mode: CaptureMode,
    /// Device read timeout in bit periods of `baud_rate`.
    pub timeout_units: u32,
    pub max_chunk: usize,
}

/// Fully resolved and validated runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub session: SessionSettings,
    pub columns: usize,
    pub output_file: Option<PathBuf>,
}

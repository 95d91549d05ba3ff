use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    MissingPort,
    MissingBaudRate,
    InvalidBaudRate(u32),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::MissingPort => write!(f, "No serial port given"),
            ConfigError::MissingBaudRate => write!(f, "No baudrate given"),
            ConfigError::InvalidBaudRate(b) => write!(f, "Invalid baudrate: {}", b),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

#[derive(Debug)]
pub enum EndpointError {
    AllocationFailed(nix::Error),
    PathUnavailable(nix::Error),
    TermiosError(nix::Error),
    IoError(std::io::Error),
}

impl fmt::Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointError::AllocationFailed(e) => write!(f, "Pseudo-terminal allocation failed: {}", e),
            EndpointError::PathUnavailable(e) => write!(f, "Pseudo-terminal path unavailable: {}", e),
            EndpointError::TermiosError(e) => write!(f, "Pseudo-terminal mode setup failed: {}", e),
            EndpointError::IoError(e) => write!(f, "Pseudo-terminal IO error: {}", e),
        }
    }
}

impl std::error::Error for EndpointError {}

impl From<std::io::Error> for EndpointError {
    fn from(err: std::io::Error) -> Self {
        EndpointError::IoError(err)
    }
}

#[derive(Debug)]
pub enum DeviceError {
    InvalidSpeed(u32),
    OpenFailed(String, serialport::Error),
    CloneFailed(serialport::Error),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::InvalidSpeed(b) => write!(f, "Invalid device speed: {}", b),
            DeviceError::OpenFailed(port, e) => write!(f, "Unable to open {}: {}", port, e),
            DeviceError::CloneFailed(e) => write!(f, "Unable to split device handle: {}", e),
        }
    }
}

impl std::error::Error for DeviceError {}

#[derive(Debug)]
pub enum CaptureError {
    EndpointIo(std::io::Error),
    DeviceIo(std::io::Error),
    PollFailed(nix::Error),
    TaskFailed(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::EndpointIo(e) => write!(f, "Virtual endpoint relay error: {}", e),
            CaptureError::DeviceIo(e) => write!(f, "Physical device relay error: {}", e),
            CaptureError::PollFailed(e) => write!(f, "Readiness wait failed: {}", e),
            CaptureError::TaskFailed(e) => write!(f, "Relay task failed: {}", e),
        }
    }
}

impl std::error::Error for CaptureError {}

#[derive(Debug)]
pub enum LogError {
    ConsoleWrite(std::io::Error),
    FileWrite(std::io::Error),
    FileOpen(std::io::Error),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::ConsoleWrite(e) => write!(f, "Console write failed: {}", e),
            LogError::FileWrite(e) => write!(f, "Capture file write failed: {}", e),
            LogError::FileOpen(e) => write!(f, "Unable to open capture file: {}", e),
        }
    }
}

impl std::error::Error for LogError {}

#[derive(Debug)]
pub enum SessionError {
    EndpointError(EndpointError),
    DeviceError(DeviceError),
    CaptureError(CaptureError),
    AlreadyStarted,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EndpointError(e) => write!(f, "Endpoint error: {}", e),
            SessionError::DeviceError(e) => write!(f, "Device error: {}", e),
            SessionError::CaptureError(e) => write!(f, "Capture error: {}", e),
            SessionError::AlreadyStarted => write!(f, "Session already started"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<EndpointError> for SessionError {
    fn from(err: EndpointError) -> Self {
        SessionError::EndpointError(err)
    }
}

impl From<DeviceError> for SessionError {
    fn from(err: DeviceError) -> Self {
        SessionError::DeviceError(err)
    }
}

impl From<CaptureError> for SessionError {
    fn from(err: CaptureError) -> Self {
        SessionError::CaptureError(err)
    }
}

#[derive(Debug)]
pub enum ControllerError {
    ConfigurationError(ConfigError),
    SessionError(SessionError),
    LogError(LogError),
    TaskFailed(String),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            ControllerError::SessionError(e) => write!(f, "Session error: {}", e),
            ControllerError::LogError(e) => write!(f, "Log error: {}", e),
            ControllerError::TaskFailed(e) => write!(f, "Background task failed: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<ConfigError> for ControllerError {
    fn from(err: ConfigError) -> Self {
        ControllerError::ConfigurationError(err)
    }
}

impl From<SessionError> for ControllerError {
    fn from(err: SessionError) -> Self {
        ControllerError::SessionError(err)
    }
}

impl From<LogError> for ControllerError {
    fn from(err: LogError) -> Self {
        ControllerError::LogError(err)
    }
}

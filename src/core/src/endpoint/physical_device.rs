//! Connector for the real serial line.
//!
//! The port is opened 8N1 with RTS/CTS flow control and DTR asserted. The
//! read timeout is expressed in bit periods of the configured speed, so the
//! same `timeout_units` waits for a comparable amount of line activity at any
//! baudrate: 1000 units at 9600 baud is roughly 104 ms.

use std::io::{self, Read, Write};
use std::time::Duration;

use log::{debug, warn};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use super::device_link::{DeviceHalves, DeviceReader, DeviceWriter};
use crate::error_handling::types::DeviceError;

pub const DEFAULT_TIMEOUT_UNITS: u32 = 1000;

/// `timeout_units / baud_rate` seconds.
pub fn read_timeout(baud_rate: u32, timeout_units: u32) -> Duration {
    Duration::from_secs_f64(f64::from(timeout_units) / f64::from(baud_rate.max(1)))
}

pub struct PhysicalDevice {
    name: String,
    baud_rate: u32,
    timeout: Duration,
    port: Box<dyn SerialPort>,
}

impl PhysicalDevice {
    pub fn open(name: &str, baud_rate: u32, timeout_units: u32) -> Result<Self, DeviceError> {
        if baud_rate == 0 {
            return Err(DeviceError::InvalidSpeed(baud_rate));
        }
        let timeout = read_timeout(baud_rate, timeout_units);

        let mut port = serialport::new(name, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::Hardware)
            .timeout(timeout)
            .open()
            .map_err(|e| DeviceError::OpenFailed(name.to_string(), e))?;

        // DSR/DTR handshake: assert DTR for the lifetime of the connection.
        // Some drivers (and pseudo-terminals) reject the modem-control ioctl.
        if let Err(e) = port.write_data_terminal_ready(true) {
            warn!("unable to assert DTR on {}: {}", name, e);
        }

        debug!(
            "opened {} at {} baud, read timeout {:?}",
            name, baud_rate, timeout
        );

        Ok(Self {
            name: name.to_string(),
            baud_rate,
            timeout,
            port,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Splits the connection into a reader for the outgoing pump and a writer
    /// for the incoming pump.
    pub fn split(self) -> Result<DeviceHalves, DeviceError> {
        let writer = self.port.try_clone().map_err(DeviceError::CloneFailed)?;
        Ok(DeviceHalves {
            name: self.name,
            reader: Box::new(SerialReader { port: self.port }),
            writer: Box::new(SerialWriter { port: writer }),
        })
    }
}

struct SerialReader {
    port: Box<dyn SerialPort>,
}

impl DeviceReader for SerialReader {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::Interrupted) => {
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }
}

struct SerialWriter {
    port: Box<dyn SerialPort>,
}

impl DeviceWriter for SerialWriter {
    fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)?;
        self.port.flush()
    }
}

//! Seams between the relay pumps and whatever sits on the device side.
//!
//! The outgoing pump owns a [`DeviceReader`], the incoming pump owns a
//! [`DeviceWriter`]. Real hardware goes through
//! [`PhysicalDevice`](super::physical_device::PhysicalDevice); tests use
//! [`MockDevice`](super::mock_device::MockDevice).

use std::io;

/// Timeout-bounded source of device bytes.
pub trait DeviceReader: Send {
    /// Reads whatever the device produced within its timeout window.
    ///
    /// `Ok(0)` means the window elapsed with no data and is not an error.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Sink for bytes headed to the device.
pub trait DeviceWriter: Send {
    /// Writes the whole chunk, in order.
    fn write_chunk(&mut self, data: &[u8]) -> io::Result<()>;
}

/// The two independently owned halves of one device connection.
pub struct DeviceHalves {
    pub name: String,
    pub reader: Box<dyn DeviceReader>,
    pub writer: Box<dyn DeviceWriter>,
}

impl std::fmt::Debug for DeviceHalves {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceHalves").field("name", &self.name).finish_non_exhaustive()
    }
}

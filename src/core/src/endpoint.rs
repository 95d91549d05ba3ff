//! Both ends of the tap: the pseudo-terminal clients talk to and the serial
//! device it relays to.

pub mod device_link;
pub mod mock_device;
pub mod physical_device;
pub mod virtual_endpoint;

pub use device_link::{DeviceHalves, DeviceReader, DeviceWriter};
pub use mock_device::{MockDevice, MockDeviceHandle};
pub use physical_device::{read_timeout, PhysicalDevice, DEFAULT_TIMEOUT_UNITS};
pub use virtual_endpoint::{wait_readable, wait_writable, VirtualEndpoint};

//! Memory resources attached to the [`Bus`](crate::bus::Bus): main RAM and the host-communication
//! device.

pub mod host;
pub mod ram;

pub use host::HostDevice;
pub use ram::Ram;

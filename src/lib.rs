//! USB Topology Reader
//!
//! A library and CLI tool for navigating the Linux sysfs USB device tree:
//! buses, nested ports, interfaces, attributes and serial devices.

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod sysfs;
pub mod usbids;

pub use config::Config;
pub use error::TopologyError;
pub use model::{DeviceAddress, InterfaceAddress, UsbSpeed};
pub use sysfs::{Bus, Container, Device, Interface, Port, TopologyNode, UsbRoot};
pub use usbids::{UsbIds, VendorProductResolver};

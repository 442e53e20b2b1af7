//! Live sysfs views of the USB topology.

pub mod aggregate;
pub mod attr;
pub mod classify;
pub mod node;
pub mod snapshot;
pub mod tty;

pub use aggregate::{aggregate_interfaces, devices};
pub use attr::{DeviceAttr, InterfaceAttr, read_attr};
pub use classify::{EntryKind, classify};
pub use node::{Bus, Container, Device, Interface, Port, TopologyNode, UsbRoot};
pub use snapshot::{DeviceSnapshot, InterfaceSnapshot, TopologySnapshot};
pub use tty::resolve_tty;

/// Default location of the flat USB device listing.
pub const SYSFS_USB_DEVICES: &str = "/sys/bus/usb/devices";

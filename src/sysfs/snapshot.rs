//! One-shot materialization of the live tree.
//!
//! The live views never cache; a snapshot is the explicit opt-in for callers
//! that need a stable copy (reports, diffs, serialization).

use super::attr::{DeviceAttr, InterfaceAttr};
use super::node::{Bus, Device, Interface, Port, UsbRoot};
use serde::Serialize;
use std::collections::BTreeMap;

/// Interface values captured at snapshot time.
#[derive(Debug, Clone, Serialize)]
pub struct InterfaceSnapshot {
    /// Sysfs name (`1-1:1.0`).
    pub name: String,
    pub config: u32,
    pub number: u32,
    /// Serial device, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tty: Option<String>,
    /// Bound driver, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    /// Readable attributes by file name.
    pub attributes: BTreeMap<String, String>,
}

/// Device values captured at snapshot time, with nested children.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSnapshot {
    /// Sysfs name (`usb1`, `1-1.2`).
    pub name: String,
    /// Coordinates from the bus down (`[1, 1, 2]`).
    pub path: Vec<u32>,
    /// Readable attributes by file name.
    pub attributes: BTreeMap<String, String>,
    pub interfaces: Vec<InterfaceSnapshot>,
    pub children: Vec<DeviceSnapshot>,
}

/// Complete USB topology at one instant, sorted by sysfs name.
#[derive(Debug, Clone, Serialize)]
pub struct TopologySnapshot {
    /// Location the snapshot was taken from.
    pub root: String,
    pub buses: Vec<DeviceSnapshot>,
}

impl TopologySnapshot {
    /// Walk the whole live tree once and copy every value.
    pub fn capture(root: &UsbRoot) -> Self {
        let mut buses: Vec<Bus> = root.buses();
        buses.sort_by_key(|bus| bus.number());

        Self {
            root: root.fs_path().display().to_string(),
            buses: buses.iter().map(capture_bus).collect(),
        }
    }

    /// Number of devices including root hubs.
    pub fn device_count(&self) -> usize {
        fn count(device: &DeviceSnapshot) -> usize {
            1 + device.children.iter().map(count).sum::<usize>()
        }
        self.buses.iter().map(count).sum()
    }

    /// Serialize as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn capture_bus(bus: &Bus) -> DeviceSnapshot {
    capture_device(bus, bus.ports())
}

fn capture_port(port: &Port) -> DeviceSnapshot {
    capture_device(port, port.ports())
}

fn capture_device(device: &dyn Device, mut ports: Vec<Port>) -> DeviceSnapshot {
    ports.sort_by_key(|port| port.name());

    let mut interfaces = device.interfaces();
    interfaces.sort_by_key(|iface| iface.name());

    DeviceSnapshot {
        name: device.name(),
        path: device.address().path(),
        attributes: DeviceAttr::ALL
            .iter()
            .filter_map(|attr| Some((attr.to_string(), device.attr(*attr)?)))
            .collect(),
        interfaces: interfaces.iter().map(capture_interface).collect(),
        children: ports.iter().map(capture_port).collect(),
    }
}

fn capture_interface(iface: &Interface) -> InterfaceSnapshot {
    InterfaceSnapshot {
        name: iface.name(),
        config: iface.config(),
        number: iface.number(),
        tty: iface.tty(),
        driver: iface.driver(),
        attributes: InterfaceAttr::ALL
            .iter()
            .filter_map(|attr| Some((attr.to_string(), iface.attr(*attr)?)))
            .collect(),
    }
}

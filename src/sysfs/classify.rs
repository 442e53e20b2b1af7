//! Classification of sysfs directory entry names.
//!
//! `/sys/bus/usb/devices` and every device directory below it mix device and
//! interface entries with unrelated siblings (`power`, `driver`, `ep_00`, ...).
//! Names are matched against the full anchored pattern, so `1-1` never matches
//! as a prefix of `1-10`.

use crate::model::{DeviceAddress, InterfaceAddress};

/// What a directory entry name denotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Host controller root hub: `usb<N>`.
    Controller(u32),
    /// Device attached directly to a root hub port: `<bus>-<port>`.
    RootPort(DeviceAddress),
    /// Device behind one or more hubs: `<bus>-<port>(.<port>)+`.
    NestedPort(DeviceAddress),
    /// Interface of a device: `<device>:<config>.<interface>`.
    Interface(InterfaceAddress),
}

impl EntryKind {
    /// Device address for port entries.
    pub fn device(&self) -> Option<&DeviceAddress> {
        match self {
            Self::RootPort(addr) | Self::NestedPort(addr) => Some(addr),
            _ => None,
        }
    }
}

/// Classify an entry name on its own. Returns `None` for unrelated entries.
pub fn classify(name: &str) -> Option<EntryKind> {
    if name.contains(':') {
        return InterfaceAddress::parse_name(name).map(EntryKind::Interface);
    }
    let addr = DeviceAddress::parse_name(name)?;
    Some(match addr.depth() {
        0 => EntryKind::Controller(addr.bus()),
        1 => EntryKind::RootPort(addr),
        _ => EntryKind::NestedPort(addr),
    })
}

/// If `name` is a device directly below `parent`, return its own port number.
pub fn child_port(parent: &DeviceAddress, name: &str) -> Option<u32> {
    let addr = classify(name)?.device()?.clone();
    if addr.parent().as_ref() == Some(parent) {
        addr.port()
    } else {
        None
    }
}

/// If `name` is an interface of `device`, return its address.
pub fn child_interface(device: &DeviceAddress, name: &str) -> Option<InterfaceAddress> {
    match classify(name)? {
        EntryKind::Interface(iface) if iface.device() == device => Some(iface),
        _ => None,
    }
}

/// If `name` is a controller root hub, return its bus number.
pub fn controller_bus(name: &str) -> Option<u32> {
    match classify(name)? {
        EntryKind::Controller(bus) => Some(bus),
        _ => None,
    }
}

//! Live views over the sysfs USB tree.
//!
//! Nodes hold only their directory and their coordinate. Children, interfaces
//! and attribute values are recomputed from the filesystem on every call, so a
//! node always reflects the current plug state and simply turns empty once its
//! directory disappears.

use super::attr::{self, DeviceAttr, InterfaceAttr};
use super::classify;
use crate::error::TopologyError;
use crate::model::address::parse_number;
use crate::model::{DeviceAddress, InterfaceAddress, UsbSpeed};
use std::path::{Path, PathBuf};

/// USB class code for hubs.
const HUB_CLASS: u8 = 0x09;

/// List entry names of `dir`. An unreadable or vanished directory is empty.
pub(crate) fn list_entry_names(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "cannot list directory");
            return Vec::new();
        }
    };

    entries
        .flatten()
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect()
}

/// Parse a textual child key. Negative, signed or non-numeric keys are invalid.
fn parse_key(key: &str) -> Result<u32, TopologyError> {
    parse_number(key).ok_or_else(|| TopologyError::InvalidAddress(key.to_string()))
}

/// Resolve `name` below `dir`, requiring a directory.
fn existing_dir(dir: &Path, name: &str) -> Result<PathBuf, TopologyError> {
    let path = dir.join(name);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(TopologyError::not_found(name))
    }
}

/// Container semantics shared by the root, buses and ports.
///
/// `child` never depends on a previous `child_keys` call; each access checks the
/// filesystem on its own.
pub trait Container {
    /// Node type of the children.
    type Child;

    /// Coordinates of the current children, in directory enumeration order.
    fn child_keys(&self) -> Vec<u32>;

    /// Look up a child by coordinate.
    fn child(&self, key: u32) -> Result<Self::Child, TopologyError>;

    /// Look up a child by textual coordinate, e.g. from user input.
    fn child_by_name(&self, key: &str) -> Result<Self::Child, TopologyError> {
        self.child(parse_key(key)?)
    }

    /// Resolve every current child. Children that vanish between the listing
    /// and the lookup are skipped.
    fn children(&self) -> Vec<Self::Child> {
        self.child_keys()
            .into_iter()
            .filter_map(|key| match self.child(key) {
                Ok(child) => Some(child),
                Err(e) => {
                    tracing::debug!(key, error = %e, "child vanished during traversal");
                    None
                }
            })
            .collect()
    }
}

/// Root of the USB device tree (`/sys/bus/usb/devices`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbRoot {
    fs_path: PathBuf,
}

impl Default for UsbRoot {
    fn default() -> Self {
        Self::new()
    }
}

impl UsbRoot {
    /// Root at the default sysfs location.
    pub fn new() -> Self {
        Self::with_base_path(super::SYSFS_USB_DEVICES)
    }

    /// Root at a custom location (for testing or alternate mounts).
    pub fn with_base_path(base_path: impl AsRef<Path>) -> Self {
        Self {
            fs_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Filesystem location.
    pub fn fs_path(&self) -> &Path {
        &self.fs_path
    }

    /// Bus numbers currently present.
    pub fn bus_numbers(&self) -> Vec<u32> {
        self.child_keys()
    }

    /// Buses currently present.
    pub fn buses(&self) -> Vec<Bus> {
        self.children()
    }

    /// Walk from the root to the device at `address`, one lookup per coordinate.
    pub fn device(&self, address: &DeviceAddress) -> Result<TopologyNode, TopologyError> {
        let bus = self.child(address.bus())?;
        let Some((first, rest)) = address.ports().split_first() else {
            return Ok(TopologyNode::Bus(bus));
        };
        let mut port = bus.child(*first)?;
        for &key in rest {
            port = port.child(key)?;
        }
        Ok(TopologyNode::Port(port))
    }

    /// Resolve the interface at `address`.
    pub fn interface(&self, address: &InterfaceAddress) -> Result<Interface, TopologyError> {
        match self.device(address.device())? {
            TopologyNode::Bus(bus) => bus.interface(address.config(), address.number()),
            TopologyNode::Port(port) => port.interface(address.config(), address.number()),
            _ => Err(TopologyError::not_found(address.sysfs_name())),
        }
    }
}

impl Container for UsbRoot {
    type Child = Bus;

    fn child_keys(&self) -> Vec<u32> {
        list_entry_names(&self.fs_path)
            .iter()
            .filter_map(|name| classify::controller_bus(name))
            .collect()
    }

    fn child(&self, key: u32) -> Result<Bus, TopologyError> {
        let address = DeviceAddress::root_hub(key);
        let fs_path = existing_dir(&self.fs_path, &address.sysfs_name())?;
        Ok(Bus { address, fs_path })
    }
}

/// Attribute and interface access common to root hubs and ports.
pub trait Device {
    /// Device coordinate.
    fn address(&self) -> &DeviceAddress;

    /// Filesystem location.
    fn fs_path(&self) -> &Path;

    /// Sysfs directory name (`usb1`, `1-1.2`).
    fn name(&self) -> String {
        self.address().sysfs_name()
    }

    /// Is the device directory still present?
    fn exists(&self) -> bool {
        self.fs_path().is_dir()
    }

    /// Read an attribute; `None` when missing or unreadable.
    fn attr(&self, attr: DeviceAttr) -> Option<String> {
        attr::read_attr(self.fs_path(), attr.file_name())
    }

    /// Read an attribute by file name, rejecting undeclared names.
    fn attr_by_name(&self, name: &str) -> Result<Option<String>, TopologyError> {
        let attr: DeviceAttr = name.parse()?;
        Ok(self.attr(attr))
    }

    /// Interfaces of the current configuration, in directory enumeration order.
    fn interfaces(&self) -> Vec<Interface> {
        let address = self.address();
        list_entry_names(self.fs_path())
            .iter()
            .filter_map(|name| {
                let iface = classify::child_interface(address, name)?;
                let fs_path = self.fs_path().join(name);
                fs_path.is_dir().then_some(Interface {
                    address: iface,
                    fs_path,
                })
            })
            .collect()
    }

    /// Look up one interface by `(config, number)`.
    fn interface(&self, config: u32, number: u32) -> Result<Interface, TopologyError> {
        let address = self.address().interface(config, number);
        let fs_path = existing_dir(self.fs_path(), &address.sysfs_name())?;
        Ok(Interface { address, fs_path })
    }

    /// Vendor ID.
    fn vendor_id(&self) -> Option<u16> {
        attr::parse_hex_u16(&self.attr(DeviceAttr::VendorId)?)
    }

    /// Product ID.
    fn product_id(&self) -> Option<u16> {
        attr::parse_hex_u16(&self.attr(DeviceAttr::ProductId)?)
    }

    /// Format VID:PID as string.
    fn vid_pid(&self) -> Option<String> {
        Some(format!(
            "{:04x}:{:04x}",
            self.vendor_id()?,
            self.product_id()?
        ))
    }

    /// Manufacturer string.
    fn manufacturer(&self) -> Option<String> {
        self.attr(DeviceAttr::Manufacturer)
    }

    /// Product string.
    fn product(&self) -> Option<String> {
        self.attr(DeviceAttr::Product)
    }

    /// Serial number.
    fn serial(&self) -> Option<String> {
        self.attr(DeviceAttr::Serial)
    }

    /// Device class.
    fn device_class(&self) -> Option<u8> {
        attr::parse_hex_u8(&self.attr(DeviceAttr::DeviceClass)?)
    }

    /// Is this a hub? (bDeviceClass == 0x09).
    fn is_hub(&self) -> bool {
        self.device_class() == Some(HUB_CLASS)
    }

    /// Number of downstream ports (`maxchild`), hubs only.
    fn num_ports(&self) -> Option<u8> {
        self.attr(DeviceAttr::MaxChild)?.parse().ok()
    }

    /// Negotiated speed.
    fn speed(&self) -> Option<UsbSpeed> {
        UsbSpeed::from_sysfs(&self.attr(DeviceAttr::Speed)?)
    }

    /// Maximum power consumption in milliamps (from bMaxPower).
    fn max_power_ma(&self) -> Option<u16> {
        attr::parse_max_power(&self.attr(DeviceAttr::MaxPower)?)
    }

    /// Empty or 0 bConfigurationValue means the device failed to configure.
    fn is_configured(&self) -> bool {
        self.attr(DeviceAttr::ConfigurationValue)
            .and_then(|v| v.parse::<u8>().ok())
            .is_some_and(|v| v > 0)
    }

    /// Get display name (product > manufacturer > VID:PID > sysfs name).
    fn display_name(&self) -> String {
        self.product()
            .or_else(|| self.manufacturer())
            .or_else(|| self.vid_pid())
            .unwrap_or_else(|| self.name())
    }
}

/// A host controller root hub (`usbN`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bus {
    address: DeviceAddress,
    fs_path: PathBuf,
}

impl Bus {
    /// Bus number.
    pub fn number(&self) -> u32 {
        self.address.bus()
    }

    /// Root port numbers with a device attached.
    pub fn port_numbers(&self) -> Vec<u32> {
        self.child_keys()
    }

    /// Devices attached to root ports.
    pub fn ports(&self) -> Vec<Port> {
        self.children()
    }

    /// Root containing this bus, re-derived from the directory layout.
    pub fn parent(&self) -> Option<UsbRoot> {
        self.fs_path.parent().map(UsbRoot::with_base_path)
    }
}

impl Device for Bus {
    fn address(&self) -> &DeviceAddress {
        &self.address
    }

    fn fs_path(&self) -> &Path {
        &self.fs_path
    }
}

impl Container for Bus {
    type Child = Port;

    fn child_keys(&self) -> Vec<u32> {
        port_keys(&self.address, &self.fs_path)
    }

    fn child(&self, key: u32) -> Result<Port, TopologyError> {
        port_child(&self.address, &self.fs_path, key)
    }
}

/// A device attached to a port, addressed by its port path under the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    address: DeviceAddress,
    fs_path: PathBuf,
}

impl Port {
    /// Own port number on the upstream hub.
    pub fn number(&self) -> u32 {
        // Ports are only constructed from non-empty port paths.
        self.address.port().unwrap_or_default()
    }

    /// Bus number.
    pub fn bus_number(&self) -> u32 {
        self.address.bus()
    }

    /// Downstream port numbers with a device attached.
    pub fn port_numbers(&self) -> Vec<u32> {
        self.child_keys()
    }

    /// Devices attached to downstream ports.
    pub fn ports(&self) -> Vec<Port> {
        self.children()
    }

    /// Upstream hub (a bus for first-level ports), re-derived from the
    /// directory layout.
    pub fn parent(&self) -> Option<TopologyNode> {
        let fs_path = self.fs_path.parent()?.to_path_buf();
        let address = self.address.parent()?;
        Some(if address.is_root_hub() {
            TopologyNode::Bus(Bus { address, fs_path })
        } else {
            TopologyNode::Port(Port { address, fs_path })
        })
    }
}

impl Device for Port {
    fn address(&self) -> &DeviceAddress {
        &self.address
    }

    fn fs_path(&self) -> &Path {
        &self.fs_path
    }
}

impl Container for Port {
    type Child = Port;

    fn child_keys(&self) -> Vec<u32> {
        port_keys(&self.address, &self.fs_path)
    }

    fn child(&self, key: u32) -> Result<Port, TopologyError> {
        port_child(&self.address, &self.fs_path, key)
    }
}

fn port_keys(parent: &DeviceAddress, dir: &Path) -> Vec<u32> {
    list_entry_names(dir)
        .iter()
        .filter_map(|name| classify::child_port(parent, name))
        .collect()
}

fn port_child(parent: &DeviceAddress, dir: &Path, key: u32) -> Result<Port, TopologyError> {
    let address = parent.child(key)?;
    let fs_path = existing_dir(dir, &address.sysfs_name())?;
    Ok(Port { address, fs_path })
}

/// A device interface (`<device>:<config>.<interface>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    address: InterfaceAddress,
    fs_path: PathBuf,
}

impl Interface {
    /// Interface coordinate.
    pub fn address(&self) -> &InterfaceAddress {
        &self.address
    }

    /// Filesystem location.
    pub fn fs_path(&self) -> &Path {
        &self.fs_path
    }

    /// Sysfs directory name (`1-1.2:1.0`).
    pub fn name(&self) -> String {
        self.address.sysfs_name()
    }

    /// Configuration value.
    pub fn config(&self) -> u32 {
        self.address.config()
    }

    /// Interface number.
    pub fn number(&self) -> u32 {
        self.address.number()
    }

    /// Is the interface directory still present?
    pub fn exists(&self) -> bool {
        self.fs_path.is_dir()
    }

    /// Read an attribute; `None` when missing or unreadable.
    pub fn attr(&self, attr: InterfaceAttr) -> Option<String> {
        attr::read_attr(&self.fs_path, attr.file_name())
    }

    /// Read an attribute by file name, rejecting undeclared names.
    pub fn attr_by_name(&self, name: &str) -> Result<Option<String>, TopologyError> {
        let attr: InterfaceAttr = name.parse()?;
        Ok(self.attr(attr))
    }

    /// Interface class code.
    pub fn class(&self) -> Option<u8> {
        attr::parse_hex_u8(&self.attr(InterfaceAttr::InterfaceClass)?)
    }

    /// Number of endpoints besides ep0.
    pub fn num_endpoints(&self) -> Option<u8> {
        attr::parse_hex_u8(&self.attr(InterfaceAttr::NumEndpoints)?)
    }

    /// Interface description string.
    pub fn description(&self) -> Option<String> {
        self.attr(InterfaceAttr::Interface)
    }

    /// Name of the bound kernel driver, from the `driver` symlink.
    pub fn driver(&self) -> Option<String> {
        let target = std::fs::read_link(self.fs_path.join("driver")).ok()?;
        target
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
    }

    /// Serial device name (e.g. `ttyUSB0`), if this interface provides one.
    pub fn tty(&self) -> Option<String> {
        super::tty::resolve_tty(self)
    }

    /// Owning device, re-derived from the directory layout.
    pub fn device(&self) -> Option<TopologyNode> {
        let fs_path = self.fs_path.parent()?.to_path_buf();
        let address = self.address.device().clone();
        Some(if address.is_root_hub() {
            TopologyNode::Bus(Bus { address, fs_path })
        } else {
            TopologyNode::Port(Port { address, fs_path })
        })
    }
}

/// Any node of the topology tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyNode {
    Root(UsbRoot),
    Bus(Bus),
    Port(Port),
    Interface(Interface),
}

impl TopologyNode {
    /// Filesystem location.
    pub fn fs_path(&self) -> &Path {
        match self {
            Self::Root(root) => root.fs_path(),
            Self::Bus(bus) => bus.fs_path(),
            Self::Port(port) => port.fs_path(),
            Self::Interface(iface) => iface.fs_path(),
        }
    }

    /// Sysfs directory name; the root uses its full path.
    pub fn name(&self) -> String {
        match self {
            Self::Root(root) => root.fs_path().display().to_string(),
            Self::Bus(bus) => bus.name(),
            Self::Port(port) => port.name(),
            Self::Interface(iface) => iface.name(),
        }
    }

    /// Device view of buses and ports.
    pub fn as_device(&self) -> Option<&dyn Device> {
        match self {
            Self::Bus(bus) => Some(bus),
            Self::Port(port) => Some(port),
            _ => None,
        }
    }

    /// Container children: buses of the root, ports of buses and ports.
    pub fn children(&self) -> Vec<TopologyNode> {
        match self {
            Self::Root(root) => root.buses().into_iter().map(Self::Bus).collect(),
            Self::Bus(bus) => bus.ports().into_iter().map(Self::Port).collect(),
            Self::Port(port) => port.ports().into_iter().map(Self::Port).collect(),
            Self::Interface(_) => Vec::new(),
        }
    }

    /// Interfaces directly owned by this node.
    pub fn interfaces(&self) -> Vec<Interface> {
        self.as_device()
            .map(|device| device.interfaces())
            .unwrap_or_default()
    }
}

impl From<UsbRoot> for TopologyNode {
    fn from(root: UsbRoot) -> Self {
        Self::Root(root)
    }
}

impl From<Bus> for TopologyNode {
    fn from(bus: Bus) -> Self {
        Self::Bus(bus)
    }
}

impl From<Port> for TopologyNode {
    fn from(port: Port) -> Self {
        Self::Port(port)
    }
}

impl From<Interface> for TopologyNode {
    fn from(iface: Interface) -> Self {
        Self::Interface(iface)
    }
}

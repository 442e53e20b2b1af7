//! Positional USB addresses: bus, port path and interface coordinates.

use crate::error::TopologyError;
use std::fmt;
use std::str::FromStr;

/// Parse a digit run without sign or leading zeros.
///
/// Rejecting leading zeros keeps name generation an exact inverse of parsing.
pub(crate) fn parse_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

/// Address of a device node: bus number plus the port path from the root hub.
///
/// An empty port path denotes the root hub itself (`usbN`).
/// Examples:
/// - `usb3` -> bus 3, ports []
/// - `3-1` -> bus 3, ports [1]
/// - `3-1.2.4` -> bus 3, ports [1, 2, 4]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceAddress {
    bus: u32,
    ports: Vec<u32>,
}

impl DeviceAddress {
    /// Address of the root hub of `bus`.
    pub fn root_hub(bus: u32) -> Self {
        Self {
            bus,
            ports: Vec::new(),
        }
    }

    /// Create an address from a bus number and port path. Port numbers are 1-based.
    pub fn new(bus: u32, ports: Vec<u32>) -> Result<Self, TopologyError> {
        if let Some(pos) = ports.iter().position(|&p| p == 0) {
            return Err(TopologyError::InvalidAddress(format!(
                "port number at depth {} must be positive",
                pos
            )));
        }
        Ok(Self { bus, ports })
    }

    /// Bus number.
    pub fn bus(&self) -> u32 {
        self.bus
    }

    /// Port path below the root hub.
    pub fn ports(&self) -> &[u32] {
        &self.ports
    }

    /// Own coordinate: the last port number, `None` for a root hub.
    pub fn port(&self) -> Option<u32> {
        self.ports.last().copied()
    }

    /// Is this the root hub of its bus?
    pub fn is_root_hub(&self) -> bool {
        self.ports.is_empty()
    }

    /// Hub depth (0 = root hub, 1 = plugged directly into the root hub).
    pub fn depth(&self) -> usize {
        self.ports.len()
    }

    /// Coordinates from the bus down to this node, e.g. `[1, 1, 3, 1]` for `1-1.3.1`.
    pub fn path(&self) -> Vec<u32> {
        let mut path = Vec::with_capacity(self.ports.len() + 1);
        path.push(self.bus);
        path.extend_from_slice(&self.ports);
        path
    }

    /// Address of the upstream hub. `None` for a root hub.
    pub fn parent(&self) -> Option<DeviceAddress> {
        let (_, prefix) = self.ports.split_last()?;
        Some(Self {
            bus: self.bus,
            ports: prefix.to_vec(),
        })
    }

    /// Address of the device attached to `port` of this hub.
    pub fn child(&self, port: u32) -> Result<DeviceAddress, TopologyError> {
        if port == 0 {
            return Err(TopologyError::InvalidAddress(format!(
                "port 0 below {}",
                self
            )));
        }
        let mut ports = self.ports.clone();
        ports.push(port);
        Ok(Self {
            bus: self.bus,
            ports,
        })
    }

    /// Address of interface `number` in configuration `config` of this device.
    pub fn interface(&self, config: u32, number: u32) -> InterfaceAddress {
        InterfaceAddress {
            device: self.clone(),
            config,
            number,
        }
    }

    /// Directory name in sysfs (`usb3`, `3-1.2`).
    pub fn sysfs_name(&self) -> String {
        if self.ports.is_empty() {
            return format!("usb{}", self.bus);
        }
        let ports: Vec<String> = self.ports.iter().map(|p| p.to_string()).collect();
        format!("{}-{}", self.bus, ports.join("."))
    }

    /// Device part of interface names. Root hub interfaces use port 0 (`3-0:1.0`).
    pub fn interface_prefix(&self) -> String {
        if self.ports.is_empty() {
            format!("{}-0", self.bus)
        } else {
            self.sysfs_name()
        }
    }

    /// Parse `usbN` or `B-P(.P)*`.
    pub(crate) fn parse_name(name: &str) -> Option<Self> {
        if let Some(bus) = name.strip_prefix("usb") {
            return parse_number(bus).map(Self::root_hub);
        }
        Self::parse_port_name(name)
    }

    /// Parse `B-P(.P)*` only.
    pub(crate) fn parse_port_name(name: &str) -> Option<Self> {
        let (bus, ports) = name.split_once('-')?;
        let bus = parse_number(bus)?;
        let ports = ports
            .split('.')
            .map(|p| parse_number(p).filter(|&p| p > 0))
            .collect::<Option<Vec<u32>>>()?;
        Some(Self { bus, ports })
    }

    /// Parse the device part of an interface name, accepting `B-0` for root hubs.
    fn parse_interface_prefix(prefix: &str) -> Option<Self> {
        if let Some(bus) = prefix.strip_suffix("-0") {
            return parse_number(bus).map(Self::root_hub);
        }
        Self::parse_port_name(prefix)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sysfs_name())
    }
}

impl FromStr for DeviceAddress {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_name(s).ok_or_else(|| TopologyError::InvalidAddress(s.to_string()))
    }
}

/// Address of an interface: the owning device plus `(config, interface)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceAddress {
    device: DeviceAddress,
    config: u32,
    number: u32,
}

impl InterfaceAddress {
    /// Owning device.
    pub fn device(&self) -> &DeviceAddress {
        &self.device
    }

    /// Configuration value.
    pub fn config(&self) -> u32 {
        self.config
    }

    /// Interface number within the configuration.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Directory name in sysfs (`3-1.2:1.0`).
    pub fn sysfs_name(&self) -> String {
        format!(
            "{}:{}.{}",
            self.device.interface_prefix(),
            self.config,
            self.number
        )
    }

    pub(crate) fn parse_name(name: &str) -> Option<Self> {
        let (prefix, suffix) = name.split_once(':')?;
        let (config, number) = suffix.split_once('.')?;
        Some(Self {
            device: DeviceAddress::parse_interface_prefix(prefix)?,
            config: parse_number(config)?,
            number: parse_number(number)?,
        })
    }
}

impl fmt::Display for InterfaceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sysfs_name())
    }
}

impl FromStr for InterfaceAddress {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_name(s).ok_or_else(|| TopologyError::InvalidAddress(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("0"), Some(0));
        assert_eq!(parse_number("12"), Some(12));
        assert_eq!(parse_number("01"), None);
        assert_eq!(parse_number("-1"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("99999999999"), None);
    }

    #[test]
    fn test_device_address_parent() {
        let addr: DeviceAddress = "3-1.2.3".parse().unwrap();
        assert_eq!(addr.parent(), Some("3-1.2".parse().unwrap()));

        let addr2: DeviceAddress = "3-1".parse().unwrap();
        assert_eq!(addr2.parent(), Some(DeviceAddress::root_hub(3)));
        assert_eq!(DeviceAddress::root_hub(3).parent(), None);
    }

    #[test]
    fn test_device_address_path() {
        let addr: DeviceAddress = "1-1.3.1".parse().unwrap();
        assert_eq!(addr.path(), vec![1, 1, 3, 1]);
        assert_eq!(addr.depth(), 3);
        assert_eq!(addr.port(), Some(1));
        assert_eq!(DeviceAddress::root_hub(1).path(), vec![1]);
    }

    #[test]
    fn test_nested_names_round_trip() {
        for name in ["1-1", "1-10", "2-1.3.1", "10-4.4.4.4.2", "usb7"] {
            let addr: DeviceAddress = name.parse().unwrap();
            assert_eq!(addr.sysfs_name(), name);
        }
        let addr: DeviceAddress = "2-1.3.12".parse().unwrap();
        assert_eq!(addr.ports(), &[1, 3, 12]);
    }

    #[test]
    fn test_rejects_malformed_device_names() {
        for name in ["1-", "-1", "1-0", "1-1.", "1-1..2", "1-1-2", "usb", "usb-1", "1-01", "power"] {
            assert!(name.parse::<DeviceAddress>().is_err(), "{name} should not parse");
        }
    }

    #[test]
    fn test_child_rejects_port_zero() {
        let bus = DeviceAddress::root_hub(1);
        assert!(matches!(bus.child(0), Err(TopologyError::InvalidAddress(_))));
        assert_eq!(bus.child(4).unwrap().sysfs_name(), "1-4");
        assert!(DeviceAddress::new(1, vec![1, 0]).is_err());
    }

    #[test]
    fn test_interface_address() {
        let iface: InterfaceAddress = "1-1.3:1.0".parse().unwrap();
        assert_eq!(iface.device().sysfs_name(), "1-1.3");
        assert_eq!(iface.config(), 1);
        assert_eq!(iface.number(), 0);
        assert_eq!(iface.sysfs_name(), "1-1.3:1.0");

        let root: InterfaceAddress = "1-0:1.0".parse().unwrap();
        assert!(root.device().is_root_hub());
        assert_eq!(root.sysfs_name(), "1-0:1.0");
    }

    #[test]
    fn test_rejects_malformed_interface_names() {
        for name in ["1-1:1", "1-1:.0", "1-1:1.x", "1-1", "usb1:1.0", "1-1:1.0:2.0"] {
            assert!(name.parse::<InterfaceAddress>().is_err(), "{name} should not parse");
        }
    }
}

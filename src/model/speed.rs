//! USB speed enumeration.

use std::fmt;

/// Signalling rates reported by the sysfs `speed` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsbSpeed {
    /// USB 1.0 Low Speed - 1.5 Mbps
    Low,
    /// USB 1.1 Full Speed - 12 Mbps
    Full,
    /// USB 2.0 High Speed - 480 Mbps
    High,
    /// Wireless USB - 53.3-480 Mbps (reported as 53.3 by some kernels)
    Wireless,
    /// USB 3.0/3.1 Gen 1 SuperSpeed - 5 Gbps
    Super,
    /// USB 3.1 Gen 2 SuperSpeed+ - 10 Gbps
    SuperPlus,
    /// USB 3.2 Gen 2x2 SuperSpeed+ - 20 Gbps
    SuperPlus2,
}

impl UsbSpeed {
    /// Parse the raw sysfs value (Mbps, `1.5` for low speed).
    pub fn from_sysfs(value: &str) -> Option<Self> {
        match value.trim() {
            "1.5" => Some(Self::Low),
            "53.3" => Some(Self::Wireless),
            other => other.parse().ok().and_then(Self::from_mbps),
        }
    }

    /// Parse from an integer Mbps value.
    pub fn from_mbps(mbps: u32) -> Option<Self> {
        match mbps {
            1 | 2 => Some(Self::Low), // 1.5 Mbps rounds to 1 or 2
            12 => Some(Self::Full),
            480 => Some(Self::High),
            5000 => Some(Self::Super),
            10000 => Some(Self::SuperPlus),
            20000 => Some(Self::SuperPlus2),
            _ => None,
        }
    }

    /// Returns true if this is a USB 3.x SuperSpeed variant.
    pub fn is_superspeed(&self) -> bool {
        matches!(self, Self::Super | Self::SuperPlus | Self::SuperPlus2)
    }

    /// Short display name for tree output.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Low => "1.5M",
            Self::Full => "12M",
            Self::High => "480M",
            Self::Wireless => "53M",
            Self::Super => "5G",
            Self::SuperPlus => "10G",
            Self::SuperPlus2 => "20G",
        }
    }
}

impl fmt::Display for UsbSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "Low Speed (1.5 Mbps)",
            Self::Full => "Full Speed (12 Mbps)",
            Self::High => "High Speed (480 Mbps)",
            Self::Wireless => "Wireless USB (53.3 Mbps)",
            Self::Super => "SuperSpeed (5 Gbps)",
            Self::SuperPlus => "SuperSpeed+ (10 Gbps)",
            Self::SuperPlus2 => "SuperSpeed+ 2x2 (20 Gbps)",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sysfs() {
        assert_eq!(UsbSpeed::from_sysfs("1.5\n"), Some(UsbSpeed::Low));
        assert_eq!(UsbSpeed::from_sysfs("480"), Some(UsbSpeed::High));
        assert_eq!(UsbSpeed::from_sysfs("5000"), Some(UsbSpeed::Super));
        assert_eq!(UsbSpeed::from_sysfs("53.3"), Some(UsbSpeed::Wireless));
        assert_eq!(UsbSpeed::from_sysfs("fast"), None);
    }

    #[test]
    fn test_from_mbps() {
        assert_eq!(UsbSpeed::from_mbps(10000), Some(UsbSpeed::SuperPlus));
        assert_eq!(UsbSpeed::from_mbps(999), None);
    }

    #[test]
    fn test_is_superspeed() {
        assert!(!UsbSpeed::High.is_superspeed());
        assert!(UsbSpeed::Super.is_superspeed());
        assert!(UsbSpeed::SuperPlus2.is_superspeed());
    }
}

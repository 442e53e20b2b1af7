//! Attribute files: one value per file, named after the attribute.

use crate::error::TopologyError;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Declare an attribute enum with its sysfs file names.
macro_rules! attributes {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $file:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every declared attribute, in sysfs file name order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// File name of this attribute inside the node directory.
            pub fn file_name(&self) -> &'static str {
                match self {
                    $($name::$variant => $file,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.file_name())
            }
        }

        impl FromStr for $name {
            type Err = TopologyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|attr| attr.file_name() == s)
                    .ok_or_else(|| TopologyError::UnknownAttribute(s.to_string()))
            }
        }
    };
}

attributes! {
    /// Attributes of device nodes (root hubs and ports).
    DeviceAttr {
        Authorized => "authorized",
        AuthorizedDefault => "authorized_default",
        AvoidResetQuirk => "avoid_reset_quirk",
        BcdDevice => "bcdDevice",
        ConfigurationValue => "bConfigurationValue",
        DeviceClass => "bDeviceClass",
        DeviceProtocol => "bDeviceProtocol",
        DeviceSubClass => "bDeviceSubClass",
        Attributes => "bmAttributes",
        MaxPacketSize0 => "bMaxPacketSize0",
        MaxPower => "bMaxPower",
        NumConfigurations => "bNumConfigurations",
        NumInterfaces => "bNumInterfaces",
        BusNum => "busnum",
        Dev => "dev",
        DevNum => "devnum",
        DevPath => "devpath",
        ProductId => "idProduct",
        VendorId => "idVendor",
        LtmCapable => "ltm_capable",
        Manufacturer => "manufacturer",
        MaxChild => "maxchild",
        Product => "product",
        Quirks => "quirks",
        Removable => "removable",
        Serial => "serial",
        Speed => "speed",
        Uevent => "uevent",
        UrbNum => "urbnum",
        Version => "version",
    }
}

attributes! {
    /// Attributes of interface nodes.
    InterfaceAttr {
        AlternateSetting => "bAlternateSetting",
        InterfaceClass => "bInterfaceClass",
        InterfaceNumber => "bInterfaceNumber",
        InterfaceProtocol => "bInterfaceProtocol",
        InterfaceSubClass => "bInterfaceSubClass",
        NumEndpoints => "bNumEndpoints",
        Interface => "interface",
        Modalias => "modalias",
        SupportsAutosuspend => "supports_autosuspend",
        Uevent => "uevent",
    }
}

/// Read `<dir>/<name>`, surfacing I/O failures.
pub fn try_read_attr(dir: &Path, name: &str) -> Result<String, TopologyError> {
    let bytes = std::fs::read(dir.join(name)).map_err(|source| {
        TopologyError::AttributeUnavailable {
            name: name.to_string(),
            source,
        }
    })?;
    Ok(clean_value(&bytes))
}

/// Read `<dir>/<name>`. Missing or unreadable files are absent, not errors.
pub fn read_attr(dir: &Path, name: &str) -> Option<String> {
    match try_read_attr(dir, name) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::trace!(dir = %dir.display(), "{}", e);
            None
        }
    }
}

/// Strip NUL bytes and surrounding whitespace from raw file content.
fn clean_value(bytes: &[u8]) -> String {
    let content = String::from_utf8_lossy(bytes);
    content.replace('\0', "").trim().to_string()
}

/// Parse a hexadecimal attribute (`idVendor`, `bDeviceClass`, ...).
pub(crate) fn parse_hex_u16(value: &str) -> Option<u16> {
    u16::from_str_radix(value.trim(), 16).ok()
}

pub(crate) fn parse_hex_u8(value: &str) -> Option<u8> {
    u8::from_str_radix(value.trim(), 16).ok()
}

/// Parse bMaxPower (format: "500mA" or "0mA").
pub(crate) fn parse_max_power(value: &str) -> Option<u16> {
    value.trim().trim_end_matches("mA").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_strips_newline_and_nul() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("idVendor"), b"0403\n\x00").unwrap();
        assert_eq!(read_attr(dir.path(), "idVendor").as_deref(), Some("0403"));
    }

    #[test]
    fn test_read_trims_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("product"), "  FT232R USB UART \n").unwrap();
        assert_eq!(
            read_attr(dir.path(), "product").as_deref(),
            Some("FT232R USB UART")
        );
    }

    #[test]
    fn test_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_attr(dir.path(), "serial"), None);
        let err = try_read_attr(dir.path(), "serial").unwrap_err();
        assert!(matches!(err, TopologyError::AttributeUnavailable { .. }));
    }

    #[test]
    fn test_directory_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("power")).unwrap();
        assert_eq!(read_attr(dir.path(), "power"), None);
    }

    #[test]
    fn test_empty_file_is_present() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bConfigurationValue"), "\n").unwrap();
        assert_eq!(
            read_attr(dir.path(), "bConfigurationValue").as_deref(),
            Some("")
        );
    }

    #[test]
    fn test_attribute_names() {
        assert_eq!("idVendor".parse::<DeviceAttr>().unwrap(), DeviceAttr::VendorId);
        assert_eq!(
            "bNumEndpoints".parse::<InterfaceAttr>().unwrap(),
            InterfaceAttr::NumEndpoints
        );
        assert!(matches!(
            "../../etc/passwd".parse::<DeviceAttr>(),
            Err(TopologyError::UnknownAttribute(_))
        ));
        assert!("idVendor".parse::<InterfaceAttr>().is_err());
        assert_eq!(DeviceAttr::ALL.len(), 30);
        assert_eq!(InterfaceAttr::ALL.len(), 10);
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_hex_u16("0403"), Some(0x0403));
        assert_eq!(parse_hex_u8("09"), Some(9));
        assert_eq!(parse_max_power("500mA"), Some(500));
        assert_eq!(parse_hex_u16(""), None);
    }
}

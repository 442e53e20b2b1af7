//! Parser for the linux-usb.org `usb.ids` file.
//!
//! Only the vendor/product section is read:
//!
//! ```text
//! # comment
//! 0403  Future Technology Devices International, Ltd
//! 	6001  FT232 Serial (UART) IC
//! 	6010  FT2232C/D/H Dual UART/FIFO IC
//! C 00  (Defined at Interface level)
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Display name for IDs missing from the database.
pub const UNKNOWN: &str = "UNKNOWN";

/// Errors that can occur while loading the database.
#[derive(Debug, Error)]
pub enum UsbIdsError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no usb.ids database found (searched {0})")]
    NotInstalled(String),
}

/// Maps vendor/product IDs (hex strings as found in `idVendor`/`idProduct`) to names.
pub trait VendorProductResolver {
    /// Vendor display name.
    fn vendor_name(&self, vendor_id: &str) -> Option<&str>;

    /// Product display name.
    fn product_name(&self, vendor_id: &str, product_id: &str) -> Option<&str>;

    /// Vendor and product names, `UNKNOWN` for anything not in the database.
    fn names(&self, vendor_id: &str, product_id: &str) -> (String, String) {
        (
            self.vendor_name(vendor_id).unwrap_or(UNKNOWN).to_string(),
            self.product_name(vendor_id, product_id)
                .unwrap_or(UNKNOWN)
                .to_string(),
        )
    }
}

#[derive(Debug, Default, Clone)]
struct Vendor {
    name: String,
    products: HashMap<u16, String>,
}

/// In-memory `usb.ids` vendor table.
#[derive(Debug, Default, Clone)]
pub struct UsbIds {
    vendors: HashMap<u16, Vendor>,
}

/// Well-known install locations, in search order.
pub fn default_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/share/hwdata/usb.ids"),
        PathBuf::from("/usr/share/misc/usb.ids"),
        PathBuf::from("/var/lib/usbutils/usb.ids"),
    ]
}

impl UsbIds {
    /// Load from a specific file.
    pub fn load(path: &Path) -> Result<Self, UsbIdsError> {
        // usb.ids is not guaranteed to be valid UTF-8
        let bytes = std::fs::read(path).map_err(|source| UsbIdsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ids = Self::parse(&String::from_utf8_lossy(&bytes));
        tracing::debug!(path = %path.display(), vendors = ids.vendor_count(), "loaded usb.ids");
        Ok(ids)
    }

    /// Load from the first existing default location.
    pub fn load_default() -> Result<Self, UsbIdsError> {
        let paths = default_paths();
        match paths.iter().find(|p| p.exists()) {
            Some(path) => Self::load(path),
            None => {
                let searched: Vec<String> =
                    paths.iter().map(|p| p.display().to_string()).collect();
                Err(UsbIdsError::NotInstalled(searched.join(", ")))
            }
        }
    }

    /// Parse database content. Malformed lines are skipped.
    pub fn parse(content: &str) -> Self {
        let mut vendors: HashMap<u16, Vendor> = HashMap::new();
        let mut current: Option<u16> = None;

        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('\t') {
                // Interface lines (two tabs) and lines outside a vendor block are ignored
                if rest.starts_with('\t') {
                    continue;
                }
                let Some(vendor_id) = current else {
                    continue;
                };
                match parse_id_line(rest) {
                    Some((product_id, name)) => {
                        if let Some(vendor) = vendors.get_mut(&vendor_id) {
                            vendor.products.insert(product_id, name.to_string());
                        }
                    }
                    None => tracing::debug!(line = lineno + 1, "skipping malformed product line"),
                }
                continue;
            }

            // Any other top-level line starts a vendor or another section (C, AT, HID, ...)
            current = parse_id_line(line).map(|(vendor_id, name)| {
                vendors.entry(vendor_id).or_default().name = name.to_string();
                vendor_id
            });
        }

        Self { vendors }
    }

    /// Number of vendors in the table.
    pub fn vendor_count(&self) -> usize {
        self.vendors.len()
    }

    fn vendor(&self, vendor_id: &str) -> Option<&Vendor> {
        self.vendors.get(&parse_hex_id(vendor_id)?)
    }
}

impl VendorProductResolver for UsbIds {
    fn vendor_name(&self, vendor_id: &str) -> Option<&str> {
        self.vendor(vendor_id).map(|v| v.name.as_str())
    }

    fn product_name(&self, vendor_id: &str, product_id: &str) -> Option<&str> {
        let vendor = self.vendor(vendor_id)?;
        vendor
            .products
            .get(&parse_hex_id(product_id)?)
            .map(|s| s.as_str())
    }
}

/// Four hex digits.
fn parse_hex_id(s: &str) -> Option<u16> {
    let s = s.trim();
    if s.len() != 4 {
        return None;
    }
    u16::from_str_radix(s, 16).ok()
}

/// `xxxx  Name`
fn parse_id_line(line: &str) -> Option<(u16, &str)> {
    let id = parse_hex_id(line.get(..4)?)?;
    let name = line.get(4..)?;
    if !name.starts_with(char::is_whitespace) {
        return None;
    }
    Some((id, name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# List of USB ID's
#
# Syntax:
# vendor  vendor_name
#\tdevice  device_name\t\t\t\t<-- single tab

0403  Future Technology Devices International, Ltd
\t6001  FT232 Serial (UART) IC
\t6010  FT2232C/D/H Dual UART/FIFO IC
1d6b  Linux Foundation
\t0002  2.0 root hub
\t\t00  interface line
\t0003  3.0 root hub

C 00  (Defined at Interface level)
\t01  Audio
C 09  Hub
\t00  Unused
";

    #[test]
    fn test_vendor_and_product_names() {
        let ids = UsbIds::parse(SAMPLE);
        assert_eq!(ids.vendor_count(), 2);
        assert_eq!(
            ids.vendor_name("0403"),
            Some("Future Technology Devices International, Ltd")
        );
        assert_eq!(
            ids.product_name("0403", "6010"),
            Some("FT2232C/D/H Dual UART/FIFO IC")
        );
        assert_eq!(ids.product_name("1D6B", "0003"), Some("3.0 root hub"));
    }

    #[test]
    fn test_unknown_ids_use_sentinel() {
        let ids = UsbIds::parse(SAMPLE);
        assert_eq!(
            ids.names("0403", "ffff"),
            (
                "Future Technology Devices International, Ltd".to_string(),
                UNKNOWN.to_string()
            )
        );
        assert_eq!(
            ids.names("dead", "beef"),
            (UNKNOWN.to_string(), UNKNOWN.to_string())
        );
        assert_eq!(ids.names("", "xyz").0, UNKNOWN);
    }

    #[test]
    fn test_class_section_does_not_leak() {
        let ids = UsbIds::parse(SAMPLE);
        // "\t01  Audio" under "C 00" must not become a product of 1d6b
        assert_eq!(ids.product_name("1d6b", "0001"), None);
        assert_eq!(ids.product_name("1d6b", "0002"), Some("2.0 root hub"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = UsbIds::load(&dir.path().join("usb.ids")).unwrap_err();
        assert!(matches!(err, UsbIdsError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usb.ids");
        std::fs::write(&path, SAMPLE).unwrap();
        let ids = UsbIds::load(&path).unwrap();
        assert_eq!(ids.vendor_name("1d6b"), Some("Linux Foundation"));
    }
}

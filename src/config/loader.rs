//! Configuration loading and management.

use crate::sysfs::SYSFS_USB_DEVICES;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Application configuration.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Global settings.
    #[serde(default)]
    pub settings: Settings,

    /// Device labels by sysfs name (e.g., "3-1.2").
    #[serde(default)]
    pub devices: HashMap<String, String>,

    /// Product labels by VID:PID (e.g., "0403:6001").
    #[serde(default)]
    pub products: HashMap<String, String>,
}

/// Global settings.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Directory holding the `usbN` entries.
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,

    /// usb.ids database; searched in the usual locations when unset.
    #[serde(default)]
    pub usb_ids: Option<PathBuf>,

    /// Log filter used when neither `--log-level` nor `RUST_LOG` is given.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Print raw attributes below each device in tree output.
    #[serde(default)]
    pub show_attributes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sysfs_root: default_sysfs_root(),
            usb_ids: None,
            log_level: default_log_level(),
            show_attributes: false,
        }
    }
}

fn default_sysfs_root() -> PathBuf {
    PathBuf::from(SYSFS_USB_DEVICES)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from default locations.
    /// Search order:
    /// 1. ./usbtopo.toml
    /// 2. ~/.config/usbtopo/config.toml
    /// 3. /etc/usbtopo.toml
    pub fn load() -> Result<Self, ConfigError> {
        let paths = Self::config_paths();

        for path in paths.into_iter().flatten() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        // No config file found - use defaults
        Ok(Config::default())
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Get list of possible config paths.
    fn config_paths() -> Vec<Option<PathBuf>> {
        vec![
            std::env::current_dir().ok().map(|p| p.join("usbtopo.toml")),
            dirs::config_dir().map(|p| p.join("usbtopo").join("config.toml")),
            Some(PathBuf::from("/etc/usbtopo.toml")),
        ]
    }

    /// Get label for a device, checking all sources in priority order:
    /// 1. Product (VID:PID) - all devices of this type
    /// 2. Device sysfs name - whatever is plugged into that port
    pub fn device_label(&self, name: &str, vid_pid: Option<&str>) -> Option<String> {
        if let Some(label) = vid_pid.and_then(|key| self.products.get(key)) {
            return Some(label.clone());
        }
        self.devices.get(name).cloned()
    }
}

/// Generate example configuration content.
pub fn example_config() -> &'static str {
    r#"# usbtopo configuration file
# Place in ./usbtopo.toml, ~/.config/usbtopo/config.toml, or /etc/usbtopo.toml

[settings]
# Directory holding the usbN entries
sysfs_root = "/sys/bus/usb/devices"
# usb.ids database (default: search /usr/share/hwdata, /usr/share/misc, /var/lib/usbutils)
# usb_ids = "/usr/share/hwdata/usb.ids"
# Log filter (overridden by --log-level and RUST_LOG)
log_level = "warn"
# Print raw attributes below each device in tree output
show_attributes = false

# Device labels by sysfs name
# Format: "bus-port.port.port" = "label"
[devices]
# "1-1" = "Desk Hub"
# "1-1.2" = "Debug Probe"

# Product labels (by VID:PID)
# Format: "vendor_id:product_id" = "label"
[products]
# "0403:6001" = "FTDI Serial Adapter"
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.settings.sysfs_root, PathBuf::from(SYSFS_USB_DEVICES));
        assert_eq!(config.settings.log_level, "warn");
        assert!(config.settings.usb_ids.is_none());
        assert!(!config.settings.show_attributes);
    }

    #[test]
    fn test_example_config_parses() {
        let config = Config::parse(example_config()).unwrap();
        assert!(config.devices.is_empty());
        assert!(config.products.is_empty());
    }

    #[test]
    fn test_label_priority() {
        let config = Config::parse(
            r#"
[settings]
sysfs_root = "/tmp/fake"

[devices]
"1-1.2" = "Port Label"

[products]
"0403:6001" = "FTDI"
"#,
        )
        .unwrap();
        assert_eq!(config.settings.sysfs_root, PathBuf::from("/tmp/fake"));
        assert_eq!(
            config.device_label("1-1.2", Some("0403:6001")).as_deref(),
            Some("FTDI")
        );
        assert_eq!(
            config.device_label("1-1.2", Some("1d6b:0002")).as_deref(),
            Some("Port Label")
        );
        assert_eq!(config.device_label("1-1.3", None), None);
    }

    #[test]
    fn test_malformed_config() {
        let err = Config::parse("[settings\nlog_level = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usbtopo.toml");
        std::fs::write(&path, "[settings]\nlog_level = \"debug\"\n").unwrap();
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.settings.log_level, "debug");

        let missing = Config::load_from_path(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}

//! Serial device lookup for interfaces.
//!
//! Drivers expose the tty in one of these layouts below the interface directory:
//!
//! ```text
//! 1-1.2:1.0/ttyUSB0                  usb-serial (ftdi_sio, cp210x, ...)
//! 1-1.2:1.0/tty/ttyACM0              cdc_acm
//! 1-1.2:1.0/1-1.2:1.0:1.0/ttyUSB0    tty carrier subdirectory
//! ```

use super::node::{Interface, list_entry_names};
use crate::model::address::parse_number;
use std::path::Path;

const TTY_PREFIX: &str = "tty";

/// Serial device name of `iface`, or `None` for non-serial interfaces.
pub fn resolve_tty(iface: &Interface) -> Option<String> {
    let dir = iface.fs_path();
    if let Some(tty) = find_tty(dir, true) {
        return Some(tty);
    }

    let own_name = iface.name();
    let carrier = list_entry_names(dir)
        .into_iter()
        .find(|name| is_carrier(&own_name, name))?;
    find_tty(&dir.join(carrier), true)
}

/// Search `dir` for a `tty*` entry, descending into a `tty` directory at most once.
fn find_tty(dir: &Path, descend: bool) -> Option<String> {
    let names = list_entry_names(dir);

    if let Some(direct) = names
        .iter()
        .find(|name| name.starts_with(TTY_PREFIX) && name.as_str() != TTY_PREFIX)
    {
        return Some(direct.clone());
    }

    let class_dir = dir.join(TTY_PREFIX);
    if descend && names.iter().any(|name| name == TTY_PREFIX) && class_dir.is_dir() {
        return find_tty(&class_dir, false);
    }

    None
}

/// `<interface name>:<config>.<num>`
fn is_carrier(iface_name: &str, entry: &str) -> bool {
    let Some(suffix) = entry
        .strip_prefix(iface_name)
        .and_then(|rest| rest.strip_prefix(':'))
    else {
        return false;
    };
    suffix
        .split_once('.')
        .is_some_and(|(config, num)| parse_number(config).is_some() && parse_number(num).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_carrier() {
        assert!(is_carrier("1-1:1.0", "1-1:1.0:1.0"));
        assert!(is_carrier("1-1.2:1.1", "1-1.2:1.1:2.3"));
        assert!(!is_carrier("1-1:1.0", "1-1:1.0"));
        assert!(!is_carrier("1-1:1.0", "1-1:1.0:1"));
        assert!(!is_carrier("1-1:1.0", "1-1:1.01"));
        assert!(!is_carrier("1-1:1.0", "ttyUSB0"));
    }

    #[test]
    fn test_find_tty_prefers_direct_entry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("tty/ttyACM3")).unwrap();
        std::fs::create_dir(dir.path().join("ttyUSB1")).unwrap();
        assert_eq!(find_tty(dir.path(), true).as_deref(), Some("ttyUSB1"));
    }

    #[test]
    fn test_find_tty_descends_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("tty/tty/ttyS0")).unwrap();
        assert_eq!(find_tty(dir.path(), true), None);
    }

    #[test]
    fn test_empty_tty_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("tty")).unwrap();
        assert_eq!(find_tty(dir.path(), true), None);
    }
}

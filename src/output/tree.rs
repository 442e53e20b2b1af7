//! Tree and list rendering.
//!
//! Directory enumeration order is unspecified, so every listing is sorted by
//! sysfs name before printing.

use crate::config::Config;
use crate::sysfs::{
    Device, DeviceAttr, Interface, Port, TopologyNode, UsbRoot, aggregate_interfaces, devices,
};
use crate::usbids::{UNKNOWN, VendorProductResolver};
use std::fmt::Write;

struct RenderContext<'a> {
    config: &'a Config,
    ids: Option<&'a dyn VendorProductResolver>,
}

/// Render the whole tree: buses, nested ports, interfaces and ttys.
pub fn render_tree(
    root: &UsbRoot,
    config: &Config,
    ids: Option<&dyn VendorProductResolver>,
) -> String {
    let ctx = RenderContext { config, ids };
    let mut out = String::new();

    let mut buses = root.buses();
    buses.sort_by_key(|bus| bus.number());

    for bus in &buses {
        render_device(&mut out, &ctx, bus, bus.ports(), 0);
    }
    if buses.is_empty() {
        let _ = writeln!(out, "No USB buses found at {}", root.fs_path().display());
    }
    out
}

fn render_device(
    out: &mut String,
    ctx: &RenderContext<'_>,
    device: &dyn Device,
    mut ports: Vec<Port>,
    depth: usize,
) {
    let indent = "  ".repeat(depth);
    let _ = writeln!(out, "{}{}", indent, device_line(ctx, device));

    if ctx.config.settings.show_attributes {
        for attr in [DeviceAttr::Manufacturer, DeviceAttr::Product, DeviceAttr::Serial] {
            if let Some(value) = device.attr(attr) {
                let _ = writeln!(out, "{}    - {}: {}", indent, attr, value);
            }
        }
    }

    let mut interfaces = device.interfaces();
    interfaces.sort_by_key(|iface| iface.name());
    for iface in &interfaces {
        let _ = writeln!(out, "{}  {}", indent, interface_line(iface));
    }

    ports.sort_by_key(|port| port.name());
    for port in &ports {
        render_device(out, ctx, port, port.ports(), depth + 1);
    }
}

/// `1-1.2  0403:6001  12M  FT232R USB UART (Future Technology ... / FT232 ...)`
fn device_line(ctx: &RenderContext<'_>, device: &dyn Device) -> String {
    let mut line = device.name();

    let vid_pid = device.vid_pid();
    if let Some(vid_pid) = &vid_pid {
        let _ = write!(line, "  {}", vid_pid);
    }
    if let Some(speed) = device.speed() {
        let _ = write!(line, "  {}", speed.short_name());
    }

    let title = ctx
        .config
        .device_label(&device.name(), vid_pid.as_deref())
        .unwrap_or_else(|| device.display_name());
    let _ = write!(line, "  {}", title);

    if let Some((vendor, product)) = database_names(ctx, device) {
        let _ = write!(line, " ({} / {})", vendor, product);
    }
    if device.is_hub() {
        line.push_str(" [hub]");
    }
    if !device.is_configured() && !device.is_hub() {
        line.push_str(" [NOT CONFIGURED]");
    }
    line
}

fn database_names(ctx: &RenderContext<'_>, device: &dyn Device) -> Option<(String, String)> {
    let ids = ctx.ids?;
    let vendor_id = device.attr(DeviceAttr::VendorId)?;
    let product_id = device.attr(DeviceAttr::ProductId)?;
    let names = ids.names(&vendor_id, &product_id);
    (names.0 != UNKNOWN || names.1 != UNKNOWN).then_some(names)
}

fn interface_line(iface: &Interface) -> String {
    let mut line = iface.name();
    if let Some(driver) = iface.driver() {
        let _ = write!(line, "  {}", driver);
    }
    if let Some(tty) = iface.tty() {
        let _ = write!(line, "  -> {}", tty);
    }
    line
}

/// Flat device list (the original `devicelist`), one line per bus/port.
pub fn render_device_list(
    root: &UsbRoot,
    config: &Config,
    ids: Option<&dyn VendorProductResolver>,
) -> String {
    let ctx = RenderContext { config, ids };
    let mut nodes = devices(&TopologyNode::Root(root.clone()));
    nodes.sort_by_key(|node| node.as_device().map(|d| d.address().clone()));

    let mut out = String::new();
    for node in &nodes {
        if let Some(device) = node.as_device() {
            let _ = writeln!(out, "{}", device_line(&ctx, device));
        }
    }
    out
}

/// Serial interfaces below `root`: `ttyUSB0  1-1.2:1.0  <device title>`.
pub fn render_tty_list(root: &UsbRoot, config: &Config) -> String {
    let mut ifaces = aggregate_interfaces(&TopologyNode::Root(root.clone()), true);
    ifaces.sort_by_key(|iface| iface.address().clone());

    let mut out = String::new();
    for iface in &ifaces {
        let Some(tty) = iface.tty() else {
            // Unplugged since the walk
            continue;
        };
        let title = iface
            .device()
            .and_then(|node| {
                node.as_device().map(|d| {
                    config
                        .device_label(&d.name(), d.vid_pid().as_deref())
                        .unwrap_or_else(|| d.display_name())
                })
            })
            .unwrap_or_default();
        let _ = writeln!(out, "{}  {}  {}", tty, iface.name(), title);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_device(dir: &Path, vid: &str, pid: &str, product: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("idVendor"), format!("{}\n", vid)).unwrap();
        fs::write(dir.join("idProduct"), format!("{}\n", pid)).unwrap();
        fs::write(dir.join("product"), format!("{}\n", product)).unwrap();
        fs::write(dir.join("bConfigurationValue"), "1\n").unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let bus = root.path().join("usb1");
        write_device(&bus, "1d6b", "0002", "EHCI Host Controller");
        fs::write(bus.join("bDeviceClass"), "09\n").unwrap();
        fs::write(bus.join("speed"), "480\n").unwrap();
        let port = bus.join("1-2");
        write_device(&port, "0403", "6001", "FT232R USB UART");
        fs::create_dir_all(port.join("1-2:1.0/ttyUSB0")).unwrap();
        let second = bus.join("1-10");
        write_device(&second, "046d", "c52b", "Receiver");
        root
    }

    #[test]
    fn test_render_tree_sorted_with_tty() {
        let dir = fixture();
        let root = UsbRoot::with_base_path(dir.path());
        let out = render_tree(&root, &Config::default(), None);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "usb1  1d6b:0002  480M  EHCI Host Controller [hub]"
        );
        // Lexicographic by name: 1-10 before 1-2
        assert!(lines[1].starts_with("  1-10  046d:c52b"));
        assert!(lines[2].starts_with("  1-2  0403:6001"));
        assert_eq!(lines[3], "    1-2:1.0  -> ttyUSB0");
    }

    #[test]
    fn test_render_tree_uses_labels() {
        let dir = fixture();
        let root = UsbRoot::with_base_path(dir.path());
        let config = Config::parse("[products]\n\"0403:6001\" = \"Console cable\"\n").unwrap();
        let out = render_tree(&root, &config, None);
        assert!(out.contains("1-2  0403:6001  Console cable"));
    }

    #[test]
    fn test_render_tree_database_names() {
        let dir = fixture();
        let root = UsbRoot::with_base_path(dir.path());
        let ids = crate::usbids::UsbIds::parse(
            "0403  Future Technology Devices International, Ltd\n\t6001  FT232 Serial (UART) IC\n",
        );
        let out = render_tree(&root, &Config::default(), Some(&ids));
        assert!(out.contains(
            "FT232R USB UART (Future Technology Devices International, Ltd / FT232 Serial (UART) IC)"
        ));
        // Unknown IDs get no database suffix
        assert!(out.contains("Receiver\n"));
    }

    #[test]
    fn test_render_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = UsbRoot::with_base_path(dir.path());
        let out = render_tree(&root, &Config::default(), None);
        assert!(out.starts_with("No USB buses found"));
    }

    #[test]
    fn test_render_tty_list() {
        let dir = fixture();
        let root = UsbRoot::with_base_path(dir.path());
        let out = render_tty_list(&root, &Config::default());
        assert_eq!(out, "ttyUSB0  1-2:1.0  FT232R USB UART\n");
    }

    #[test]
    fn test_render_device_list_order() {
        let dir = fixture();
        let root = UsbRoot::with_base_path(dir.path());
        let out = render_device_list(&root, &Config::default(), None);
        let names: Vec<&str> = out
            .lines()
            .map(|l| l.split_whitespace().next().unwrap())
            .collect();
        // Address order: numeric port comparison
        assert_eq!(names, vec!["usb1", "1-2", "1-10"]);
    }
}

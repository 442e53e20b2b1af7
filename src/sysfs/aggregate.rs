//! Depth-first collectors over a live subtree.

use super::node::{Interface, TopologyNode};

/// Collect the interfaces of `node` and of every bus/port below it.
///
/// Order is depth-first, parent before children, children in directory
/// enumeration order. With `tty_only`, only interfaces with a serial device are
/// kept. Nodes that disappear during the walk are skipped.
pub fn aggregate_interfaces(node: &TopologyNode, tty_only: bool) -> Vec<Interface> {
    let mut ifaces = Vec::new();
    collect_interfaces(node, tty_only, &mut ifaces);
    ifaces
}

fn collect_interfaces(node: &TopologyNode, tty_only: bool, ifaces: &mut Vec<Interface>) {
    for iface in node.interfaces() {
        if tty_only && iface.tty().is_none() {
            continue;
        }
        ifaces.push(iface);
    }
    for child in node.children() {
        collect_interfaces(&child, tty_only, ifaces);
    }
}

/// Every bus and port below `node` (and `node` itself if it is one), depth-first.
pub fn devices(node: &TopologyNode) -> Vec<TopologyNode> {
    let mut result = Vec::new();
    collect_devices(node, &mut result);
    result
}

fn collect_devices(node: &TopologyNode, result: &mut Vec<TopologyNode>) {
    if node.as_device().is_some() {
        result.push(node.clone());
    }
    for child in node.children() {
        collect_devices(&child, result);
    }
}

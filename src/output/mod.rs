//! Text rendering of the live topology.

mod tree;

pub use tree::{render_device_list, render_tree, render_tty_list};

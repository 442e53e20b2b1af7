//! USB Topology Reader - CLI entry point.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use usbtopo::config::{Config, example_config};
use usbtopo::output::{render_device_list, render_tree, render_tty_list};
use usbtopo::sysfs::{Container, Device, DeviceAttr, InterfaceAttr, TopologySnapshot};
use usbtopo::{
    DeviceAddress, InterfaceAddress, TopologyNode, UsbIds, UsbRoot, VendorProductResolver,
};

#[derive(Parser)]
#[command(name = "usbtopo")]
#[command(about = "Live USB topology reader for Linux sysfs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path (default: auto-detect)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Sysfs USB device directory (overrides config)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "usbtopo=trace" (overrides config)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show buses, ports, interfaces and ttys as a tree
    Tree {
        /// Print manufacturer, product and serial below each device
        #[arg(short, long)]
        attributes: bool,
    },

    /// List all devices, one per line
    List,

    /// List interfaces that provide a serial device
    Ttys,

    /// Show every attribute of one device or interface
    Show {
        /// Sysfs name, e.g. "1-1.2" or "1-1.2:1.0"
        name: String,
    },

    /// Dump a full snapshot of the topology as TOML
    Dump {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print example config file
    InitConfig,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions early (doesn't need config or sysfs)
    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "usbtopo", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load()?,
    };

    init_logging(cli.log_level.as_deref().unwrap_or(&config.settings.log_level));

    if let Some(root) = &cli.root {
        config.settings.sysfs_root = root.clone();
    }
    let root = UsbRoot::with_base_path(&config.settings.sysfs_root);
    tracing::debug!(root = %root.fs_path().display(), "reading USB topology");

    // Default: tree view
    let command = cli.command.unwrap_or(Commands::Tree { attributes: false });

    match command {
        Commands::Tree { attributes } => {
            config.settings.show_attributes |= attributes;
            let ids = load_usb_ids(&config);
            let ids = ids.as_ref().map(|i| i as &dyn VendorProductResolver);
            print!("{}", render_tree(&root, &config, ids));
        }
        Commands::List => {
            let ids = load_usb_ids(&config);
            let ids = ids.as_ref().map(|i| i as &dyn VendorProductResolver);
            print!("{}", render_device_list(&root, &config, ids));
        }
        Commands::Ttys => {
            print!("{}", render_tty_list(&root, &config));
        }
        Commands::Show { name } => {
            show_node(&root, &name)?;
        }
        Commands::Dump { output } => {
            let content = TopologySnapshot::capture(&root).to_toml()?;
            match output {
                Some(path) => std::fs::write(path, content)?,
                None => print!("{}", content),
            }
        }
        Commands::InitConfig => {
            print!("{}", example_config());
        }
        Commands::Completions { .. } => {
            // Handled above before loading config
            unreachable!()
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over the configured filter.
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The name database is optional; without it devices show their own strings.
fn load_usb_ids(config: &Config) -> Option<UsbIds> {
    let result = match &config.settings.usb_ids {
        Some(path) => UsbIds::load(path),
        None => UsbIds::load_default(),
    };
    match result {
        Ok(ids) => Some(ids),
        Err(e) => {
            tracing::warn!("vendor names unavailable: {}", e);
            None
        }
    }
}

/// Print every readable attribute of a device or interface.
fn show_node(root: &UsbRoot, name: &str) -> Result<()> {
    if name.contains(':') {
        let address: InterfaceAddress = name.parse()?;
        let iface = root.interface(&address)?;
        println!("{}", iface.name());
        for attr in InterfaceAttr::ALL {
            if let Some(value) = iface.attr(*attr) {
                println!("  {}: {}", attr, value);
            }
        }
        if let Some(driver) = iface.driver() {
            println!("  driver: {}", driver);
        }
        if let Some(tty) = iface.tty() {
            println!("  tty: {}", tty);
        }
        return Ok(());
    }

    let address: DeviceAddress = name.parse()?;
    let node = root.device(&address)?;
    let Some(device) = node.as_device() else {
        anyhow::bail!("{} is not a device", name);
    };
    println!("{}  path {:?}", device.name(), device.address().path());
    if let Some(speed) = device.speed() {
        println!("  negotiated: {}", speed);
    }
    for attr in DeviceAttr::ALL {
        if let Some(value) = device.attr(*attr) {
            println!("  {}: {}", attr, value);
        }
    }

    let mut ports: Vec<u32> = match &node {
        TopologyNode::Bus(bus) => bus.child_keys(),
        TopologyNode::Port(port) => port.child_keys(),
        _ => Vec::new(),
    };
    ports.sort_unstable();
    if !ports.is_empty() {
        println!("  ports in use: {:?}", ports);
    }
    for iface in device.interfaces() {
        println!("  interface {}", iface.name());
    }
    Ok(())
}

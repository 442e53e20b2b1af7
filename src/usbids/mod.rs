//! Vendor and product names from the `usb.ids` database.

mod database;

pub use database::{UNKNOWN, UsbIds, UsbIdsError, VendorProductResolver, default_paths};

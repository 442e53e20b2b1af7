//! USB address and value types.

pub mod address;
pub mod speed;

pub use address::{DeviceAddress, InterfaceAddress};
pub use speed::UsbSpeed;

//! External collaborator for `r2000-datalink`: the HTTP/JSON command client
//! (§6) and the parameter-builder/config surface used to request and
//! release stream handles. Out of scope for the core on purpose — a data
//! link only ever talks to the device through the
//! [`r2000_datalink::DeviceControl`] trait this crate implements.

pub mod client;
pub mod config;
pub mod error;
pub mod params;

pub use client::HttpDeviceControl;
pub use config::Config;
pub use error::ControlError;
pub use params::StreamParamsBuilder;

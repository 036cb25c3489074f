//! Data-plane client for a 2D rotating laser range-finder: decoding,
//! reassembling and republishing scan packets delivered over a stream or
//! datagram transport, with a watchdog-backed liveness signal and a
//! lock-free latest-scan read interface for consumer threads.
//!
//! The HTTP/JSON command client that requests and releases device handles
//! is an external collaborator, consumed here only through the
//! [`control::DeviceControl`] trait — see the `r2000-control` crate for a
//! concrete implementation.

pub mod control;
pub mod error;
pub mod exchange;
pub mod factory;
pub mod scan;
pub mod status;
pub mod transport;
pub mod watchdog;
pub mod wire;

mod datalink;

pub use control::{DeviceControl, DeviceHandle, StreamParams, TransportKind};
pub use datalink::DataLink;
pub use error::DataLinkError;
pub use exchange::LatestScan;
pub use scan::Scan;
pub use status::{Severity, StatusFlags};
pub use wire::{Distance, Header, PacketType};

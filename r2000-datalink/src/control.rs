//! The external HTTP/JSON control-plane collaborator (§6), expressed here
//! only as a trait plus the shared types both sides of the boundary need.
//! The concrete `reqwest`-backed implementation lives in `r2000-control`,
//! which depends on this crate — never the other way around.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::DataLinkError;
use crate::wire::PacketType;

/// A device-issued lease on one stream or datagram output. Immutable once
/// granted; `release_handle` is the only way to give it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    pub handle_id: String,
    pub watchdog_enabled: bool,
    pub watchdog_timeout: Duration,
    /// Port the device will deliver data on (assigned by the device for a
    /// stream handle, chosen by the caller for a datagram handle).
    pub port: u16,
}

/// Which socket shape a handle was requested for, and the shape-specific
/// parameters that go with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportKind {
    Stream,
    /// `address` is where the device should send datagrams.
    Datagram { address: String },
}

/// Parameters for a "request handle" call (§6). Built by
/// `r2000_control::params` and validated against the bounds in
/// `r2000_control::config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamParams {
    pub transport: TransportKind,
    pub packet_type: PacketType,
    /// 1/10000 degree units.
    pub start_angle: i32,
    pub watchdog: bool,
    pub watchdog_timeout: Duration,
    pub packet_crc: bool,
    pub max_num_points_scan: u16,
    pub skip_scans: u16,
}

/// The device's HTTP/JSON command surface, as consumed by the data-plane
/// core. Implemented concretely by `r2000_control::HttpDeviceControl`; the
/// core depends only on this trait so it never pulls in an HTTP client.
#[async_trait]
pub trait DeviceControl: Send + Sync {
    async fn request_handle_stream(
        &self,
        params: &StreamParams,
    ) -> Result<DeviceHandle, DataLinkError>;

    async fn request_handle_datagram(
        &self,
        params: &StreamParams,
    ) -> Result<DeviceHandle, DataLinkError>;

    async fn start_stream(&self, handle: &DeviceHandle) -> Result<(), DataLinkError>;

    async fn stop_stream(&self, handle: &DeviceHandle) -> Result<(), DataLinkError>;

    async fn feed_watchdog(&self, handle: &DeviceHandle) -> Result<(), DataLinkError>;

    async fn release_handle(&self, handle: &DeviceHandle) -> Result<(), DataLinkError>;
}

//! Builder for [`StreamParams`], validating the bounds in §6 before a
//! request ever reaches the device.

use std::time::Duration;

use r2000_datalink::{PacketType, StreamParams, TransportKind};

use crate::error::{ControlError, Result};

/// Device-documented bounds for `max_num_points_scan` (§6).
pub const MIN_SAMPLES_PER_SCAN: u16 = 72;
pub const MAX_SAMPLES_PER_SCAN: u16 = 25200;

/// Builds a [`StreamParams`] value, enforcing the bounds a raw struct
/// literal would silently skip.
#[derive(Debug, Clone)]
pub struct StreamParamsBuilder {
    transport: TransportKind,
    packet_type: PacketType,
    start_angle: i32,
    watchdog: bool,
    watchdog_timeout: Duration,
    packet_crc: bool,
    max_num_points_scan: u16,
    skip_scans: u16,
}

impl StreamParamsBuilder {
    pub fn stream(packet_type: PacketType) -> StreamParamsBuilder {
        StreamParamsBuilder {
            transport: TransportKind::Stream,
            packet_type,
            start_angle: 0,
            watchdog: true,
            watchdog_timeout: Duration::from_secs(5),
            packet_crc: false,
            max_num_points_scan: MAX_SAMPLES_PER_SCAN,
            skip_scans: 0,
        }
    }

    pub fn datagram(packet_type: PacketType, address: impl Into<String>) -> StreamParamsBuilder {
        StreamParamsBuilder {
            transport: TransportKind::Datagram {
                address: address.into(),
            },
            ..StreamParamsBuilder::stream(packet_type)
        }
    }

    pub fn start_angle(mut self, start_angle: i32) -> Self {
        self.start_angle = start_angle;
        self
    }

    pub fn watchdog(mut self, enabled: bool, timeout: Duration) -> Self {
        self.watchdog = enabled;
        self.watchdog_timeout = timeout;
        self
    }

    pub fn packet_crc(mut self, enabled: bool) -> Self {
        self.packet_crc = enabled;
        self
    }

    pub fn max_num_points_scan(mut self, points: u16) -> Self {
        self.max_num_points_scan = points;
        self
    }

    pub fn skip_scans(mut self, skip: u16) -> Self {
        self.skip_scans = skip;
        self
    }

    /// Validate the accumulated parameters and produce a [`StreamParams`].
    pub fn build(self) -> Result<StreamParams> {
        validate_samples_per_scan(self.max_num_points_scan)?;

        Ok(StreamParams {
            transport: self.transport,
            packet_type: self.packet_type,
            start_angle: self.start_angle,
            watchdog: self.watchdog,
            watchdog_timeout: self.watchdog_timeout,
            packet_crc: self.packet_crc,
            max_num_points_scan: self.max_num_points_scan,
            skip_scans: self.skip_scans,
        })
    }
}

pub fn validate_samples_per_scan(samples: u16) -> Result<()> {
    if !(MIN_SAMPLES_PER_SCAN..=MAX_SAMPLES_PER_SCAN).contains(&samples) {
        return Err(ControlError::Config(format!(
            "max_num_points_scan must be between {MIN_SAMPLES_PER_SCAN} and {MAX_SAMPLES_PER_SCAN}, got {samples}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_samples_per_scan_outside_device_bounds() {
        let err = StreamParamsBuilder::stream(PacketType::C)
            .max_num_points_scan(10)
            .build()
            .unwrap_err();
        assert!(matches!(err, ControlError::Config(_)));
    }

    #[test]
    fn accepts_samples_per_scan_within_bounds() {
        let params = StreamParamsBuilder::stream(PacketType::C)
            .max_num_points_scan(1000)
            .build()
            .expect("valid params");
        assert_eq!(params.max_num_points_scan, 1000);
        assert_eq!(params.transport, TransportKind::Stream);
    }

    #[test]
    fn datagram_builder_carries_the_target_address() {
        let params = StreamParamsBuilder::datagram(PacketType::B, "127.0.0.1:9000")
            .build()
            .expect("valid params");
        assert_eq!(
            params.transport,
            TransportKind::Datagram {
                address: "127.0.0.1:9000".into()
            }
        );
    }
}

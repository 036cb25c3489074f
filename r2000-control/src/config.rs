//! TOML-backed configuration for the CLI demo: device address plus the
//! stream parameters to request, loaded and validated in one call
//! (modeled on the teacher's `config::loader`/`config::validator` split).

use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ControlError, Result};
use crate::params::validate_samples_per_scan;

fn default_control_port() -> u16 {
    80
}

fn default_packet_type() -> String {
    "c".into()
}

fn default_samples_per_scan() -> u16 {
    25200
}

fn default_scan_frequency_mhz() -> u32 {
    20_000
}

fn default_watchdog_timeout_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

/// Top-level configuration for connecting to one device.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Device IP address, e.g. "192.168.0.1".
    pub device_address: IpAddr,
    /// Port the device's HTTP command interface listens on.
    #[serde(default = "default_control_port")]
    pub control_port: u16,
    /// Local address the device should send datagrams to, "host:port".
    /// Omit for a stream (TCP) connection.
    #[serde(default)]
    pub datagram_address: Option<String>,
    /// "a", "b" or "c" (case-insensitive).
    #[serde(default = "default_packet_type")]
    pub packet_type: String,
    #[serde(default = "default_samples_per_scan")]
    pub samples_per_scan: u16,
    /// Scan-head rotation frequency in mHz.
    #[serde(default = "default_scan_frequency_mhz")]
    pub scan_frequency_mhz: u32,
    #[serde(default = "default_true")]
    pub watchdog: bool,
    #[serde(default = "default_watchdog_timeout_ms")]
    pub watchdog_timeout_ms: u64,
}

impl Config {
    pub fn watchdog_timeout(&self) -> Duration {
        Duration::from_millis(self.watchdog_timeout_ms)
    }
}

pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
    let text = fs::read_to_string(&path)
        .map_err(|e| ControlError::Config(format!("failed to read config file: {e}")))?;
    let config: Config =
        toml::from_str(&text).map_err(|e| ControlError::Config(format!("failed to parse config: {e}")))?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    validate_samples_per_scan(config.samples_per_scan)?;

    if config.scan_frequency_mhz == 0 {
        return Err(ControlError::Config("scan_frequency_mhz must be > 0".into()));
    }

    match config.packet_type.to_ascii_lowercase().as_str() {
        "a" | "b" | "c" => {}
        other => {
            return Err(ControlError::Config(format!(
                "packet_type must be one of \"a\", \"b\", \"c\", got \"{other}\""
            )))
        }
    }

    if config.watchdog_timeout_ms == 0 {
        return Err(ControlError::Config("watchdog_timeout_ms must be > 0".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_packet_type() {
        let config = Config {
            device_address: "10.0.0.5".parse().unwrap(),
            control_port: 80,
            datagram_address: None,
            packet_type: "z".into(),
            samples_per_scan: 1000,
            scan_frequency_mhz: 20_000,
            watchdog: true,
            watchdog_timeout_ms: 5000,
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_zero_scan_frequency() {
        let config = Config {
            device_address: "10.0.0.5".parse().unwrap(),
            control_port: 80,
            datagram_address: None,
            packet_type: "c".into(),
            samples_per_scan: 1000,
            scan_frequency_mhz: 0,
            watchdog: true,
            watchdog_timeout_ms: 5000,
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn accepts_well_formed_config() {
        let config = Config {
            device_address: "10.0.0.5".parse().unwrap(),
            control_port: 8080,
            datagram_address: None,
            packet_type: "C".into(),
            samples_per_scan: 7200,
            scan_frequency_mhz: 20_000,
            watchdog: true,
            watchdog_timeout_ms: 5000,
        };
        assert!(validate(&config).is_ok());
    }
}

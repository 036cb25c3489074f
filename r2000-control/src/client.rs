//! `reqwest`-backed implementation of [`DeviceControl`] — the device's
//! HTTP/JSON command surface (§6).

use std::collections::HashMap;
use std::net::IpAddr;

use async_trait::async_trait;
use r2000_datalink::{DataLinkError, DeviceControl, DeviceHandle, StreamParams, TransportKind};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ControlError;

/// Every reply from the device carries these two fields alongside its
/// operation-specific payload (§6).
#[derive(Debug, Deserialize)]
struct Envelope {
    error_code: i64,
    #[serde(default)]
    error_text: String,
    #[serde(flatten)]
    fields: HashMap<String, Value>,
}

impl Envelope {
    fn into_result(self) -> Result<HashMap<String, Value>, ControlError> {
        if self.error_code == 0 {
            Ok(self.fields)
        } else {
            Err(ControlError::Device {
                code: self.error_code,
                text: self.error_text,
            })
        }
    }
}

fn field_str(fields: &HashMap<String, Value>, key: &str) -> Result<String, ControlError> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| ControlError::Config(format!("response missing string field `{key}`")))
}

fn field_u16(fields: &HashMap<String, Value>, key: &str) -> Result<u16, ControlError> {
    fields
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u16::try_from(v).ok())
        .ok_or_else(|| ControlError::Config(format!("response missing numeric field `{key}`")))
}

/// Talks to one device's HTTP command interface.
pub struct HttpDeviceControl {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDeviceControl {
    pub fn new(address: IpAddr, port: u16) -> HttpDeviceControl {
        HttpDeviceControl {
            base_url: format!("http://{address}:{port}"),
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<HashMap<String, Value>, ControlError> {
        debug!(path, "posting control-plane request");
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;
        let envelope: Envelope = response.json().await?;
        envelope.into_result()
    }

    fn request_handle_body(params: &StreamParams) -> Value {
        let mut body = serde_json::json!({
            "packet_type": format!("{:?}", params.packet_type).to_ascii_lowercase(),
            "start_angle": params.start_angle,
            "watchdog": params.watchdog,
            "watchdog_timeout": params.watchdog_timeout.as_millis() as u64,
            "packet_crc": params.packet_crc,
            "max_num_points_scan": params.max_num_points_scan,
            "skip_scans": params.skip_scans,
        });
        if let TransportKind::Datagram { address } = &params.transport {
            if let Some((host, port)) = address.rsplit_once(':') {
                body["address"] = Value::String(host.to_string());
                body["port"] = Value::String(port.to_string());
            }
        }
        body
    }
}

#[async_trait]
impl DeviceControl for HttpDeviceControl {
    async fn request_handle_stream(
        &self,
        params: &StreamParams,
    ) -> Result<DeviceHandle, DataLinkError> {
        let fields = self
            .post("/cmd/request_handle_tcp", &Self::request_handle_body(params))
            .await?;
        let handle_id = field_str(&fields, "handle")?;
        let port = field_u16(&fields, "port")?;
        Ok(DeviceHandle {
            handle_id,
            watchdog_enabled: params.watchdog,
            watchdog_timeout: params.watchdog_timeout,
            port,
        })
    }

    async fn request_handle_datagram(
        &self,
        params: &StreamParams,
    ) -> Result<DeviceHandle, DataLinkError> {
        let port = match &params.transport {
            TransportKind::Datagram { address } => address
                .rsplit_once(':')
                .and_then(|(_, p)| p.parse().ok())
                .ok_or_else(|| {
                    DataLinkError::from(ControlError::Config(
                        "datagram address must be host:port".into(),
                    ))
                })?,
            TransportKind::Stream => {
                return Err(DataLinkError::from(ControlError::Config(
                    "request_handle_datagram called with stream params".into(),
                )))
            }
        };
        let fields = self
            .post("/cmd/request_handle_udp", &Self::request_handle_body(params))
            .await?;
        let handle_id = field_str(&fields, "handle")?;
        Ok(DeviceHandle {
            handle_id,
            watchdog_enabled: params.watchdog,
            watchdog_timeout: params.watchdog_timeout,
            port,
        })
    }

    async fn start_stream(&self, handle: &DeviceHandle) -> Result<(), DataLinkError> {
        self.post(
            "/cmd/start_scanoutput",
            &serde_json::json!({ "handle": handle.handle_id }),
        )
        .await?;
        Ok(())
    }

    async fn stop_stream(&self, handle: &DeviceHandle) -> Result<(), DataLinkError> {
        self.post(
            "/cmd/stop_scanoutput",
            &serde_json::json!({ "handle": handle.handle_id }),
        )
        .await?;
        Ok(())
    }

    async fn feed_watchdog(&self, handle: &DeviceHandle) -> Result<(), DataLinkError> {
        self.post(
            "/cmd/feed_watchdog",
            &serde_json::json!({ "handle": handle.handle_id }),
        )
        .await?;
        Ok(())
    }

    async fn release_handle(&self, handle: &DeviceHandle) -> Result<(), DataLinkError> {
        self.post(
            "/cmd/release_handle",
            &serde_json::json!({ "handle": handle.handle_id }),
        )
        .await?;
        Ok(())
    }
}

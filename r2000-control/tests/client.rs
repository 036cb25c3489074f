//! Exercises `HttpDeviceControl` against a minimal hand-rolled HTTP
//! responder (no mock-server crate in the corpus to reach for).

use std::net::SocketAddr;

use r2000_control::{HttpDeviceControl, StreamParamsBuilder};
use r2000_datalink::{DeviceControl, PacketType};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Spawn a server that reads one HTTP request per connection and replies
/// with `body` as a `200 OK application/json` response, forever.
async fn spawn_json_responder(body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

#[tokio::test]
async fn request_handle_stream_parses_handle_and_port() {
    let addr = spawn_json_responder(r#"{"error_code":0,"error_text":"success","handle":"abc123","port":5000}"#).await;
    let control = HttpDeviceControl::new(addr.ip(), addr.port());
    let params = StreamParamsBuilder::stream(PacketType::C)
        .build()
        .expect("valid params");

    let handle = control
        .request_handle_stream(&params)
        .await
        .expect("request succeeds");

    assert_eq!(handle.handle_id, "abc123");
    assert_eq!(handle.port, 5000);
    assert!(handle.watchdog_enabled);
}

#[tokio::test]
async fn device_error_code_surfaces_as_a_failed_request() {
    let addr = spawn_json_responder(r#"{"error_code":7,"error_text":"busy"}"#).await;
    let control = HttpDeviceControl::new(addr.ip(), addr.port());
    let params = StreamParamsBuilder::stream(PacketType::A)
        .build()
        .expect("valid params");

    let result = control.request_handle_stream(&params).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn start_stream_succeeds_on_zero_error_code() {
    let addr = spawn_json_responder(r#"{"error_code":0,"error_text":"success"}"#).await;
    let control = HttpDeviceControl::new(addr.ip(), addr.port());
    let handle = r2000_datalink::DeviceHandle {
        handle_id: "abc123".into(),
        watchdog_enabled: true,
        watchdog_timeout: std::time::Duration::from_secs(5),
        port: 5000,
    };

    control.start_stream(&handle).await.expect("start succeeds");
}

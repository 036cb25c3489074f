//! Watchdog liveness-flip scenario (§8 scenario 6), against a stub
//! `DeviceControl` rather than a real device.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use r2000_datalink::control::{DeviceControl, DeviceHandle, StreamParams};
use r2000_datalink::error::DataLinkError;

struct FlakyControl {
    feed_count: AtomicUsize,
    fail_from: usize,
}

#[async_trait]
impl DeviceControl for FlakyControl {
    async fn request_handle_stream(&self, _: &StreamParams) -> Result<DeviceHandle, DataLinkError> {
        unimplemented!("not exercised by this test")
    }

    async fn request_handle_datagram(&self, _: &StreamParams) -> Result<DeviceHandle, DataLinkError> {
        unimplemented!("not exercised by this test")
    }

    async fn start_stream(&self, _: &DeviceHandle) -> Result<(), DataLinkError> {
        Ok(())
    }

    async fn stop_stream(&self, _: &DeviceHandle) -> Result<(), DataLinkError> {
        Ok(())
    }

    async fn feed_watchdog(&self, _: &DeviceHandle) -> Result<(), DataLinkError> {
        let count = self.feed_count.fetch_add(1, Ordering::SeqCst);
        if count >= self.fail_from {
            Err(DataLinkError::NetworkDisconnect)
        } else {
            Ok(())
        }
    }

    async fn release_handle(&self, _: &DeviceHandle) -> Result<(), DataLinkError> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn repeated_feed_failures_flip_is_connected_to_false() {
    let control: Arc<dyn DeviceControl> = Arc::new(FlakyControl {
        feed_count: AtomicUsize::new(0),
        fail_from: 3,
    });
    let handle = DeviceHandle {
        handle_id: "h1".into(),
        watchdog_enabled: true,
        watchdog_timeout: Duration::from_millis(10),
        port: 0,
    };
    let is_connected = Arc::new(AtomicBool::new(true));
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let task = tokio::spawn(r2000_datalink::watchdog::run(
        control,
        handle,
        is_connected.clone(),
        shutdown_rx,
    ));

    // Three successful ticks (feed_count 0, 1, 2) land at t=10/20/30ms.
    tokio::time::advance(Duration::from_millis(35)).await;
    assert!(is_connected.load(Ordering::SeqCst));

    // The fourth tick (feed_count 3, >= fail_from) lands at t=40ms and flips
    // the flag.
    tokio::time::advance(Duration::from_millis(10)).await;
    assert!(!is_connected.load(Ordering::SeqCst));

    shutdown_tx.send(true).expect("send shutdown");
    task.await.expect("watchdog task exits cleanly");
}

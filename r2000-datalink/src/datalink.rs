//! Owns one device connection end to end: requesting and holding the
//! handle, running the receive loop and watchdog, and tearing both down
//! cleanly (§4.3.3, §4.6).

use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::control::{DeviceControl, DeviceHandle, StreamParams, TransportKind};
use crate::error::DataLinkError;
use crate::exchange::LatestScan;
use crate::transport::{self, Transport};
use crate::Scan;

/// A live connection to one device stream or datagram output.
///
/// Holds the receive-loop task, the watchdog task (if enabled), the shared
/// exchange, a liveness flag fed by the watchdog, and the handle + control
/// client needed to tear the connection down.
pub struct DataLink {
    transport: Option<Transport>,
    watchdog: Option<tokio::task::JoinHandle<()>>,
    exchange: Arc<LatestScan>,
    is_connected: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
    handle: DeviceHandle,
    control: Arc<dyn DeviceControl>,
}

impl DataLink {
    /// Run the §4.3.3 startup protocol against `device_ip` and return a
    /// live `DataLink`. Fails construction (with no task left running) if
    /// the handle request or the stream start fails.
    pub async fn build(
        control: Arc<dyn DeviceControl>,
        device_ip: IpAddr,
        params: StreamParams,
    ) -> Result<DataLink, DataLinkError> {
        let handle = match &params.transport {
            TransportKind::Stream => control.request_handle_stream(&params).await?,
            TransportKind::Datagram { .. } => control.request_handle_datagram(&params).await?,
        };

        control.start_stream(&handle).await?;

        let exchange = Arc::new(LatestScan::new());
        let is_connected = Arc::new(AtomicBool::new(true));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let transport = match &params.transport {
            TransportKind::Stream => {
                let addr = SocketAddr::new(device_ip, handle.port);
                let socket = transport::connect(addr).await?;
                let receiver = transport::StreamReceiver::new(
                    socket,
                    exchange.clone(),
                    is_connected.clone(),
                    shutdown_rx.clone(),
                );
                Transport::spawn_stream(receiver)
            }
            TransportKind::Datagram { address } => {
                let local: SocketAddr = address
                    .parse()
                    .map_err(|_| DataLinkError::HandleRequestFailed)?;
                let remote = SocketAddr::new(device_ip, handle.port);
                let socket = transport::bind_and_connect(local, remote).await?;
                let receiver = transport::DatagramReceiver::new(
                    socket,
                    exchange.clone(),
                    is_connected.clone(),
                    shutdown_rx.clone(),
                );
                Transport::spawn_datagram(receiver)
            }
        };

        let watchdog = if handle.watchdog_enabled {
            Some(tokio::spawn(crate::watchdog::run(
                control.clone(),
                handle.clone(),
                is_connected.clone(),
                shutdown_rx,
            )))
        } else {
            None
        };

        Ok(DataLink {
            transport: Some(transport),
            watchdog,
            exchange,
            is_connected,
            shutdown: shutdown_tx,
            handle,
            control,
        })
    }

    /// As [`DataLink::build`], but fails with [`DataLinkError::Timeout`] if
    /// the whole startup protocol doesn't complete within `timeout`.
    /// Cancel-safe: tasks are only spawned once the handle is confirmed and
    /// the stream has started, so a timeout during either leaves nothing
    /// running.
    pub async fn build_with_timeout(
        control: Arc<dyn DeviceControl>,
        device_ip: IpAddr,
        params: StreamParams,
        timeout: Duration,
    ) -> Result<DataLink, DataLinkError> {
        tokio::time::timeout(timeout, Self::build(control, device_ip, params))
            .await
            .map_err(|_| DataLinkError::Timeout)?
    }

    /// Snapshot of the most recently completed scan. Never blocks.
    pub fn latest(&self) -> Scan {
        self.exchange.latest()
    }

    /// Wait for the next scan published after this call, or `timeout`
    /// elapsing, or teardown. `None` timeout waits indefinitely.
    pub async fn wait_for_next(&self, timeout: Option<Duration>) -> Option<Scan> {
        self.exchange.wait_for_next(timeout).await
    }

    /// Most recent watchdog-feed outcome. A consumer may still retrieve the
    /// last published scan even when this is `false`.
    pub fn is_alive(&self) -> bool {
        self.is_connected.load(Ordering::Acquire)
    }

    /// Orderly, best-effort teardown: signal shutdown, wait for both tasks
    /// to exit, then tell the device to stop the stream and release the
    /// handle. Releasing a handle on an already-dead connection is expected
    /// to fail and is tolerated (logged, not returned).
    pub async fn close(mut self) {
        self.teardown().await;
    }

    async fn teardown(&mut self) {
        let _ = self.shutdown.send(true);
        self.exchange.shutdown();

        if let Some(transport) = self.transport.take() {
            transport.join().await;
        }
        if let Some(watchdog) = self.watchdog.take() {
            if let Err(error) = watchdog.await {
                warn!(%error, "watchdog task panicked");
            }
        }

        if let Err(error) = self.control.stop_stream(&self.handle).await {
            warn!(handle = %self.handle.handle_id, %error, "stop stream failed during teardown");
        }
        if let Err(error) = self.control.release_handle(&self.handle).await {
            warn!(handle = %self.handle.handle_id, %error, "release handle failed during teardown");
        }
        info!(handle = %self.handle.handle_id, "data link closed");
    }
}

impl Drop for DataLink {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        self.exchange.shutdown();
    }
}

//! A dedicated task that keeps a device's stream alive by periodically
//! feeding its watchdog, and records the result as `is_connected` (§4.4).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::control::DeviceControl;
use crate::DeviceHandle;

/// Runs until `shutdown` fires, feeding `handle`'s watchdog every
/// `handle.watchdog_timeout` and recording the outcome into `is_connected`.
///
/// Never spawned for a handle with `watchdog_enabled == false` —
/// [`crate::DataLink::build`] skips the spawn entirely in that case, so
/// `is_connected` simply stays at its initial `true` for the life of the
/// link (there's nothing for this task to report).
pub async fn run(
    control: Arc<dyn DeviceControl>,
    handle: DeviceHandle,
    is_connected: Arc<AtomicBool>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(handle.watchdog_timeout);
    // The first tick fires immediately; skip it so the first feed happens
    // one full period after the stream started, not at time zero.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                info!(handle = %handle.handle_id, "watchdog stopping");
                return;
            }
            _ = ticker.tick() => {
                match control.feed_watchdog(&handle).await {
                    Ok(()) => {
                        is_connected.store(true, Ordering::Release);
                    }
                    Err(error) => {
                        warn!(handle = %handle.handle_id, %error, "watchdog feed failed");
                        is_connected.store(false, Ordering::Release);
                    }
                }
            }
        }
    }
}

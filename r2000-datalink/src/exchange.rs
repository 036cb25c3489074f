//! The lock-free, single-writer/many-reader handoff between the receive
//! loop and consumer threads (§4.5).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::Notify;

use crate::Scan;

/// Holds the most recently completed [`Scan`] and lets any number of
/// readers either peek at it without blocking or wait for the next one.
///
/// `publish` is the only write path and is wait-free: it stores the new
/// scan into the [`ArcSwap`] cell, then bumps a counter and wakes waiters.
/// It never holds a lock across I/O.
pub struct LatestScan {
    cell: ArcSwap<Scan>,
    counter: AtomicU64,
    notify: Notify,
    torn_down: AtomicBool,
}

impl Default for LatestScan {
    fn default() -> LatestScan {
        LatestScan {
            cell: ArcSwap::from_pointee(Scan::default()),
            counter: AtomicU64::new(0),
            notify: Notify::new(),
            torn_down: AtomicBool::new(false),
        }
    }
}

impl LatestScan {
    pub fn new() -> LatestScan {
        LatestScan::default()
    }

    /// Publish a freshly assembled scan. Producer-only; call from the
    /// receive loop exclusively.
    pub fn publish(&self, scan: Scan) {
        self.cell.store(Arc::new(scan));
        self.counter.fetch_add(1, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Return a snapshot of the most recently published scan. Never blocks.
    pub fn latest(&self) -> Scan {
        (**self.cell.load()).clone()
    }

    /// Wait for a scan published after this call started, or until
    /// `timeout` elapses. `None` timeout waits indefinitely. Returns `None`
    /// on timeout, and also on teardown once [`LatestScan::shutdown`] has
    /// been called.
    pub async fn wait_for_next(&self, timeout: Option<Duration>) -> Option<Scan> {
        let seen = self.counter.load(Ordering::Acquire);
        loop {
            // Register interest *before* the state check below: `Notified`
            // only catches a `notify_waiters()` that fires once it's been
            // polled (via `enable`), so checking first and registering
            // after would miss a `publish`/`shutdown` landing in the gap.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.counter.load(Ordering::Acquire) != seen {
                return Some(self.latest());
            }
            if self.torn_down.load(Ordering::Acquire) {
                return None;
            }

            let woke = match timeout {
                Some(d) => tokio::time::timeout(d, notified).await.is_ok(),
                None => {
                    notified.await;
                    true
                }
            };
            if !woke {
                return None;
            }
            if self.counter.load(Ordering::Acquire) != seen {
                return Some(self.latest());
            }
            if self.torn_down.load(Ordering::Acquire) {
                return None;
            }
        }
    }

    /// Wake every waiter without publishing a scan, and make every future
    /// call to `wait_for_next` return `None` immediately. Used by teardown.
    pub fn shutdown(&self) {
        self.torn_down.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }
}

//! Error type for the data-plane core.
//!
//! Packet-level anomalies (`bad-magic`, `bad-packet-type`, `short-read`) are
//! deliberately **not** represented here: they are local receive-loop
//! policy, logged and handled in place, never raised across the
//! watchdog/receive/reader thread boundaries (§7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataLinkError {
    #[error("device refused the handle request")]
    HandleRequestFailed,

    #[error("device is busy")]
    Busy,

    #[error("operation timed out")]
    Timeout,

    #[error("network disconnected")]
    NetworkDisconnect,

    #[error("a handle is already active for this connection")]
    AlreadyBusy,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DataLinkError>;

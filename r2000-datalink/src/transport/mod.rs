//! Receiving raw scan packets off the wire and feeding them to a scan
//! factory (§4.3). Two concrete transports share one receive-loop shape;
//! [`extract`] holds the logic common to both.

mod datagram;
mod extract;
mod stream;

pub use datagram::{bind_and_connect, DatagramReceiver};
pub use stream::{connect, StreamReceiver};

/// Lower bound of the stream receiver's receive-buffer resize range.
pub const DEFAULT_RECV: usize = 4096;
/// Upper bound of the stream receiver's receive-buffer resize range.
pub const MAX_RECV: usize = 32768;
/// Maximum size of a single datagram (one scan packet per datagram).
pub const DATAGRAM_SIZE: usize = 65535;

/// The two wire shapes a [`crate::DataLink`] can be built over (§9
/// "polymorphism over transports"). Modeled as a tagged enum rather than a
/// trait object: a `DataLink` holds exactly one of two known concrete
/// shapes, so a `dyn` boundary buys nothing here.
pub enum Transport {
    Stream(tokio::task::JoinHandle<()>),
    Datagram(tokio::task::JoinHandle<()>),
}

impl Transport {
    /// Spawn a stream receiver's run loop, returning the handle to it.
    pub fn spawn_stream(receiver: StreamReceiver) -> Transport {
        Transport::Stream(tokio::spawn(receiver.run()))
    }

    /// Spawn a datagram receiver's run loop, returning the handle to it.
    pub fn spawn_datagram(receiver: DatagramReceiver) -> Transport {
        Transport::Datagram(tokio::spawn(receiver.run()))
    }

    /// Wait for the receive loop to exit (normally, after a shutdown signal).
    pub async fn join(self) {
        let handle = match self {
            Transport::Stream(h) => h,
            Transport::Datagram(h) => h,
        };
        if let Err(error) = handle.await {
            tracing::warn!(%error, "receive loop task panicked");
        }
    }
}

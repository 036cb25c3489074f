//! TCP-backed receiver: an ordered byte stream with no message boundaries
//! (§4.3.1).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::DataLinkError;
use crate::exchange::LatestScan;
use crate::factory::{ScanFactory, StreamFactory};

use super::extract::{extract_one, Extracted};
use super::{DEFAULT_RECV, MAX_RECV};

/// Reads a TCP stream, reassembles scan packets in place, and publishes
/// completed scans to the shared exchange.
pub struct StreamReceiver {
    socket: TcpStream,
    exchange: Arc<LatestScan>,
    is_connected: Arc<AtomicBool>,
    shutdown: watch::Receiver<bool>,
}

impl StreamReceiver {
    pub fn new(
        socket: TcpStream,
        exchange: Arc<LatestScan>,
        is_connected: Arc<AtomicBool>,
        shutdown: watch::Receiver<bool>,
    ) -> StreamReceiver {
        StreamReceiver {
            socket,
            exchange,
            is_connected,
            shutdown,
        }
    }

    /// Run the receive loop until cancelled or the socket fails.
    pub async fn run(mut self) {
        let mut factory = StreamFactory::new();
        let mut extraction = BytesMut::with_capacity((DEFAULT_RECV as f64 * 1.5).ceil() as usize);
        let mut recv_capacity = DEFAULT_RECV;
        let mut next_read = recv_capacity;

        loop {
            let mut recv_buf = vec![0u8; next_read.clamp(1, MAX_RECV)];
            let n = tokio::select! {
                biased;
                _ = self.shutdown.changed() => {
                    info!("stream receiver shutting down");
                    return;
                }
                result = self.socket.read(&mut recv_buf) => result,
            };

            let n = match n {
                Ok(0) => {
                    warn!("stream receiver observed EOF");
                    self.is_connected.store(false, Ordering::Release);
                    return;
                }
                Ok(n) => n,
                Err(error) => {
                    warn!(%error, "stream receiver read failed");
                    self.is_connected.store(false, Ordering::Release);
                    return;
                }
            };

            extraction.extend_from_slice(&recv_buf[..n]);

            let mut missing = None;
            loop {
                match extract_one(&extraction, &mut factory) {
                    Extracted::Packet { consumed } => {
                        extraction.advance(consumed);
                        missing = None;

                        // Check and publish right after this packet, before
                        // extracting the next one: the next packet may
                        // belong to a new scan and clear the factory via
                        // `maybe_clear_for` before we ever get back here,
                        // silently dropping a completed-but-unpublished
                        // scan when one read spans a scan boundary.
                        if factory.is_complete() {
                            let needed: usize =
                                factory.headers().iter().map(|h| h.packet_size as usize).sum();
                            recv_capacity = needed.clamp(DEFAULT_RECV, MAX_RECV);
                            debug!(recv_capacity, "scan complete, resizing receive buffer");
                            let scan = factory.take();
                            self.exchange.publish(scan);
                        }
                    }
                    Extracted::NoMagic { retain } => {
                        let drop = extraction.len() - retain;
                        extraction.advance(drop);
                        break;
                    }
                    Extracted::HeaderIncomplete { header_offset } => {
                        extraction.advance(header_offset);
                        break;
                    }
                    Extracted::PayloadIncomplete {
                        header_offset,
                        missing: m,
                    } => {
                        extraction.advance(header_offset);
                        missing = Some(m);
                        break;
                    }
                }
            }

            next_read = match missing {
                Some(m) => m.min(recv_capacity),
                None => recv_capacity,
            };
        }
    }
}

/// Resolve the stream socket itself, surfacing connect failures as
/// [`DataLinkError::Io`].
pub async fn connect(addr: std::net::SocketAddr) -> Result<TcpStream, DataLinkError> {
    Ok(TcpStream::connect(addr).await?)
}

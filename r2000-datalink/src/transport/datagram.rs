//! UDP-backed receiver: unordered, message-boundary-preserving datagrams,
//! each carrying exactly one scan packet (§4.3.2).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::DataLinkError;
use crate::exchange::LatestScan;
use crate::factory::{DatagramFactory, ScanFactory};
use crate::wire::{decode_payload, find_magic, Header};

use super::DATAGRAM_SIZE;

/// Reads one datagram at a time, decodes it as a single scan packet, and
/// publishes completed scans to the shared exchange.
pub struct DatagramReceiver {
    socket: UdpSocket,
    exchange: Arc<LatestScan>,
    is_connected: Arc<AtomicBool>,
    shutdown: watch::Receiver<bool>,
}

impl DatagramReceiver {
    pub fn new(
        socket: UdpSocket,
        exchange: Arc<LatestScan>,
        is_connected: Arc<AtomicBool>,
        shutdown: watch::Receiver<bool>,
    ) -> DatagramReceiver {
        DatagramReceiver {
            socket,
            exchange,
            is_connected,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        let mut factory = DatagramFactory::new();
        let mut buf = vec![0u8; DATAGRAM_SIZE];

        loop {
            let n = tokio::select! {
                biased;
                _ = self.shutdown.changed() => {
                    info!("datagram receiver shutting down");
                    return;
                }
                result = self.socket.recv(&mut buf) => result,
            };

            let n = match n {
                Ok(n) => n,
                Err(error) => {
                    warn!(%error, "datagram receiver recv failed");
                    self.is_connected.store(false, Ordering::Release);
                    return;
                }
            };

            let datagram = &buf[..n];
            let Some(offset) = find_magic(datagram) else {
                warn!("datagram missing magic, dropping");
                continue;
            };
            let Some(header) = Header::decode(&datagram[offset..]) else {
                warn!("datagram too short for a header, dropping");
                continue;
            };
            let payload_start = offset + header.header_size as usize;
            let Some(payload) = datagram.get(payload_start..) else {
                warn!("datagram too short for its declared header size, dropping");
                continue;
            };

            factory.maybe_clear_for(&header);

            match decode_payload(&header, payload) {
                Some((distances, amplitudes, _consumed)) => {
                    factory.add_packet(header, distances, amplitudes);
                }
                None => {
                    warn!(packet_type = header.packet_type_raw, "dropping datagram with unknown packet type");
                    continue;
                }
            }

            if factory.is_complete() {
                debug!(packets = factory.headers().len(), "scan complete");
                let scan = factory.take();
                self.exchange.publish(scan);
            }
        }
    }
}

pub async fn bind_and_connect(
    local: std::net::SocketAddr,
    remote: std::net::SocketAddr,
) -> Result<UdpSocket, DataLinkError> {
    let socket = UdpSocket::bind(local).await?;
    socket.connect(remote).await?;
    Ok(socket)
}

//! End-to-end scenarios over real UDP sockets (§8 scenarios 2, 3).

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use r2000_datalink::exchange::LatestScan;
use r2000_datalink::transport::DatagramReceiver;
use r2000_datalink::wire::{Header, PacketType, MAGIC};
use tokio::net::UdpSocket;

fn encode_packet(
    packet_type: PacketType,
    scan: u16,
    packet: u16,
    num_points_scan: u16,
    payload: &[u8],
) -> Vec<u8> {
    let header = Header {
        magic: MAGIC,
        packet_type_raw: packet_type.into(),
        packet_size: (Header::SIZE + payload.len()) as u32,
        header_size: Header::SIZE as u16,
        scan_number: scan,
        packet_number: packet,
        timestamp_raw: 0,
        timestamp_sync: 0,
        status_flags: 0,
        scan_frequency: 20_000,
        num_points_scan,
        num_points_packet: (payload.len() / 4) as u16,
        first_index: 0,
        first_angle: 0,
        angular_increment: 0,
        iq_input: 0,
        iq_overload: 0,
        iq_timestamp_raw: 0,
        iq_timestamp_sync: 0,
    };
    let mut buf = header.encode().to_vec();
    buf.extend_from_slice(payload);
    buf
}

async fn spawn_datagram_receiver() -> (std::net::SocketAddr, Arc<LatestScan>, UdpSocket) {
    let server_socket = UdpSocket::bind("127.0.0.1:0").await.expect("bind server");
    let server_addr = server_socket.local_addr().expect("server addr");

    let sender = UdpSocket::bind("127.0.0.1:0").await.expect("bind sender");
    sender.connect(server_addr).await.expect("connect sender");

    let exchange = Arc::new(LatestScan::new());
    let is_connected = Arc::new(AtomicBool::new(true));
    let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let receiver = DatagramReceiver::new(server_socket, exchange.clone(), is_connected, shutdown_rx);
    tokio::spawn(receiver.run());

    (server_addr, exchange, sender)
}

#[tokio::test]
async fn reordered_datagrams_assemble_into_one_correctly_ordered_scan() {
    let (_addr, exchange, sender) = spawn_datagram_receiver().await;

    let mut payload2 = Vec::new();
    for v in [400u32, 500, 600, 700] {
        payload2.extend_from_slice(&v.to_le_bytes());
    }
    let mut payload1 = Vec::new();
    for v in [100u32, 200, 300, 0xFFFF_FFFF] {
        payload1.extend_from_slice(&v.to_le_bytes());
    }

    // Packet 2 arrives before packet 1.
    sender
        .send(&encode_packet(PacketType::A, 42, 2, 8, &payload2))
        .await
        .expect("send packet 2");
    sender
        .send(&encode_packet(PacketType::A, 42, 1, 8, &payload1))
        .await
        .expect("send packet 1");

    let scan = exchange
        .wait_for_next(Some(Duration::from_secs(2)))
        .await
        .expect("scan published");

    assert_eq!(
        scan.distances().iter().map(|d| d.value()).collect::<Vec<_>>(),
        vec![
            Some(100),
            Some(200),
            Some(300),
            None,
            Some(400),
            Some(500),
            Some(600),
            Some(700)
        ]
    );
}

#[tokio::test]
async fn type_c_packet_unpacks_distance_and_amplitude() {
    let (_addr, exchange, sender) = spawn_datagram_receiver().await;

    let mut payload = Vec::new();
    payload.extend_from_slice(&0x0030_1901u32.to_le_bytes());
    payload.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());

    sender
        .send(&encode_packet(PacketType::C, 1, 1, 2, &payload))
        .await
        .expect("send");

    let scan = exchange
        .wait_for_next(Some(Duration::from_secs(2)))
        .await
        .expect("scan published");

    assert_eq!(
        scan.distances().iter().map(|d| d.value()).collect::<Vec<_>>(),
        vec![Some(6401), None]
    );
    assert_eq!(scan.amplitudes(), &[3, 4095]);
}

use std::time::Instant;

use crate::wire::{Distance, Header};
use crate::Scan;

use super::ScanFactory;

type Packet = (Header, Vec<Distance>, Vec<u16>);

/// Assembles a scan from packets that may arrive out of order (the datagram
/// transport gives no ordering guarantee). Packets are buffered whole and
/// sorted by `packet_number` at [`take`](ScanFactory::take) time.
#[derive(Debug, Default)]
pub struct DatagramFactory {
    packets: Vec<Packet>,
    // Kept in insertion order alongside `packets` purely so `headers()` can
    // hand back a slice without allocating; boundary checks below compare
    // against `packets.last()` directly since that's the packet most
    // recently accepted regardless of its `packet_number`.
    headers: Vec<Header>,
    num_points: usize,
}

impl DatagramFactory {
    pub fn new() -> DatagramFactory {
        DatagramFactory::default()
    }
}

impl ScanFactory for DatagramFactory {
    fn add_packet(&mut self, header: Header, distances: Vec<Distance>, amplitudes: Vec<u16>) {
        self.num_points += distances.len();
        self.headers.push(header);
        self.packets.push((header, distances, amplitudes));
    }

    fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    fn is_complete(&self) -> bool {
        match self.packets.last() {
            Some((header, _, _)) => self.num_points >= header.num_points_scan as usize,
            None => false,
        }
    }

    fn take(&mut self) -> Scan {
        let mut packets = std::mem::take(&mut self.packets);
        self.headers.clear();
        self.num_points = 0;
        packets.sort_by_key(|(header, _, _)| header.packet_number);

        let mut distances = Vec::new();
        let mut amplitudes = Vec::new();
        let mut headers = Vec::with_capacity(packets.len());
        for (header, mut d, mut a) in packets {
            headers.push(header);
            distances.append(&mut d);
            amplitudes.append(&mut a);
        }
        Scan::new(distances, amplitudes, headers, Instant::now())
    }

    fn clear(&mut self) {
        self.packets.clear();
        self.headers.clear();
        self.num_points = 0;
    }

    fn headers(&self) -> &[Header] {
        &self.headers
    }

    fn is_different_scan(&self, header: &Header) -> bool {
        match self.packets.last() {
            Some((last, _, _)) => last.scan_number != header.scan_number,
            None => false,
        }
    }
}

use std::time::Instant;

use crate::wire::{Distance, Header};
use crate::Scan;

use super::ScanFactory;

/// Assembles a scan from packets known to arrive in order (the stream
/// transport's guarantee). Appending is therefore sufficient; no sorting is
/// needed at `take()` time.
#[derive(Debug, Default)]
pub struct StreamFactory {
    distances: Vec<Distance>,
    amplitudes: Vec<u16>,
    headers: Vec<Header>,
}

impl StreamFactory {
    pub fn new() -> StreamFactory {
        StreamFactory::default()
    }
}

impl ScanFactory for StreamFactory {
    fn add_packet(&mut self, header: Header, mut distances: Vec<Distance>, mut amplitudes: Vec<u16>) {
        self.distances.append(&mut distances);
        self.amplitudes.append(&mut amplitudes);
        self.headers.push(header);
    }

    fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    fn is_complete(&self) -> bool {
        match self.headers.first() {
            Some(first) => self.distances.len() >= first.num_points_scan as usize,
            None => false,
        }
    }

    fn take(&mut self) -> Scan {
        let distances = std::mem::take(&mut self.distances);
        let amplitudes = std::mem::take(&mut self.amplitudes);
        let headers = std::mem::take(&mut self.headers);
        Scan::new(distances, amplitudes, headers, Instant::now())
    }

    fn clear(&mut self) {
        self.distances.clear();
        self.amplitudes.clear();
        self.headers.clear();
    }

    fn headers(&self) -> &[Header] {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::PacketType;

    fn header(scan_number: u16, packet_number: u16, num_points_scan: u16) -> Header {
        Header {
            magic: crate::wire::MAGIC,
            packet_type_raw: PacketType::A.into(),
            packet_size: 0,
            header_size: 60,
            scan_number,
            packet_number,
            timestamp_raw: 0,
            timestamp_sync: 0,
            status_flags: 0,
            scan_frequency: 0,
            num_points_scan,
            num_points_packet: 4,
            first_index: 0,
            first_angle: 0,
            angular_increment: 0,
            iq_input: 0,
            iq_overload: 0,
            iq_timestamp_raw: 0,
            iq_timestamp_sync: 0,
        }
    }

    #[test]
    fn two_packets_assemble_into_one_ordered_scan() {
        let mut factory = StreamFactory::new();
        factory.maybe_clear_for(&header(42, 1, 8));
        factory.add_packet(
            header(42, 1, 8),
            vec![
                Distance::valid(100),
                Distance::valid(200),
                Distance::valid(300),
                Distance::INVALID,
            ],
            vec![0, 0, 0, 0],
        );
        assert!(!factory.is_complete());

        factory.maybe_clear_for(&header(42, 2, 8));
        factory.add_packet(
            header(42, 2, 8),
            vec![
                Distance::valid(400),
                Distance::valid(500),
                Distance::valid(600),
                Distance::valid(700),
            ],
            vec![0, 0, 0, 0],
        );
        assert!(factory.is_complete());

        let scan = factory.take();
        assert_eq!(scan.headers().len(), 2);
        assert_eq!(
            scan.distances()
                .iter()
                .map(|d| d.value())
                .collect::<Vec<_>>(),
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
        assert_eq!(scan.amplitudes(), &[0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(factory.is_empty());
    }

    #[test]
    fn differing_scan_number_clears_factory_first() {
        let mut factory = StreamFactory::new();
        factory.add_packet(header(1, 1, 4), vec![Distance::valid(1); 4], vec![0; 4]);
        assert!(!factory.is_empty());

        factory.maybe_clear_for(&header(2, 2, 4));
        assert!(factory.is_empty());
    }

    #[test]
    fn packet_number_one_resets_even_with_matching_scan_number() {
        let mut factory = StreamFactory::new();
        factory.add_packet(header(1, 2, 8), vec![Distance::valid(1); 4], vec![0; 4]);
        assert!(!factory.is_empty());

        // Same scan_number, but packet_number == 1 still means "start over".
        factory.maybe_clear_for(&header(1, 1, 8));
        assert!(factory.is_empty());
    }
}

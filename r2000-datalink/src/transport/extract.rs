//! The shared "find a header, check the payload is fully present, decode,
//! feed the factory" step used by both transports (§4.3).

use tracing::{debug, warn};

use crate::factory::ScanFactory;
use crate::wire::{decode_payload, find_magic, Header};

/// Outcome of trying to extract one packet from the front of a byte range.
pub enum Extracted {
    /// A full packet was decoded and handed to the factory. `consumed` bytes
    /// (from the start of the range) were used; the caller should advance
    /// past them and try again — more packets may follow in the same range.
    Packet { consumed: usize },
    /// No magic was found anywhere in the range. `retain` is how many
    /// trailing bytes to keep (at most 1, in case it's half of a magic that
    /// will complete on the next read) — the rest should be dropped
    /// (§7 `bad-magic`).
    NoMagic { retain: usize },
    /// Magic was found but the 60-byte header itself isn't fully present
    /// yet. `header_offset` is where the (still-incomplete) packet starts;
    /// bytes before it can be dropped, bytes from it onward must be kept.
    HeaderIncomplete { header_offset: usize },
    /// A complete header was found but its payload isn't fully present yet.
    /// `header_offset` marks where the still-incomplete packet starts;
    /// `missing` is the number of additional bytes needed to complete it.
    PayloadIncomplete {
        header_offset: usize,
        missing: usize,
    },
}

/// Try to extract exactly one packet from the start of `buf`.
///
/// Mirrors the original driver's `extractScanPacketFromByteRange`, with two
/// deliberate differences: it never reads past the end of `buf` (the
/// original computed the header's byte range without re-checking length,
/// which is undefined behaviour in C++ for a short buffer), and an unknown
/// packet type drops just that packet instead of throwing.
pub fn extract_one<F: ScanFactory>(buf: &[u8], factory: &mut F) -> Extracted {
    let Some(magic_offset) = find_magic(buf) else {
        let retain = buf.len().min(1);
        return Extracted::NoMagic { retain };
    };

    let Some(header) = Header::decode(&buf[magic_offset..]) else {
        return Extracted::HeaderIncomplete {
            header_offset: magic_offset,
        };
    };

    let payload_start = magic_offset + header.header_size as usize;
    let payload_size = (header.packet_size as usize).saturating_sub(header.header_size as usize);
    let available = buf.len().saturating_sub(payload_start);

    factory.maybe_clear_for(&header);

    if available < payload_size {
        let missing = payload_size - available;
        debug!(missing, scan = header.scan_number, packet = header.packet_number, "short read, deferring");
        return Extracted::PayloadIncomplete {
            header_offset: magic_offset,
            missing,
        };
    }

    let payload = &buf[payload_start..payload_start + payload_size];
    match decode_payload(&header, payload) {
        Some((distances, amplitudes, _consumed)) => {
            factory.add_packet(header, distances, amplitudes);
            Extracted::Packet {
                consumed: payload_start + payload_size - magic_offset,
            }
        }
        None => {
            warn!(packet_type = header.packet_type_raw, "dropping packet with unknown type");
            Extracted::Packet {
                consumed: payload_start + payload_size - magic_offset,
            }
        }
    }
}

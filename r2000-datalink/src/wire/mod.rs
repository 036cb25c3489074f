//! Little-endian primitive decoding: header parsing and payload extraction
//! for packet types A, B and C (§4.1).

mod header;
mod payload;

pub use header::{find_magic, parse_header, Header, PacketType, MAGIC};
pub use payload::{decode_payload_a, decode_payload_b, decode_payload_c, Distance};

/// Decode the payload of `header` from `buf` (which starts at the payload,
/// i.e. `header.header_size` bytes past the packet start).
///
/// Returns `None` for an unknown packet type — the caller (the transport)
/// applies the `bad-packet-type` policy from §7.
pub fn decode_payload(
    header: &Header,
    buf: &[u8],
) -> Option<(Vec<Distance>, Vec<u16>, usize)> {
    let n = header.num_points_packet as usize;
    match header.packet_type() {
        Ok(PacketType::A) => Some(decode_payload_a(buf, n)),
        Ok(PacketType::B) => Some(decode_payload_b(buf, n)),
        Ok(PacketType::C) => Some(decode_payload_c(buf, n)),
        Err(_) => None,
    }
}

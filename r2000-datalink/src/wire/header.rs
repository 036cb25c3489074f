//! The 60-byte little-endian scan packet header shared by every packet type.

/// Marks the start of a packet on the wire (`5C A2` little-endian).
pub const MAGIC: u16 = 0xA25C;

/// Identifies the shape of a packet's point payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    /// Distance only, one `u32` per point.
    A,
    /// Distance (`u32`) + amplitude (`u16`) per point.
    B,
    /// Distance and amplitude packed into a single `u32` per point.
    C,
}

impl TryFrom<u16> for PacketType {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x0041 => Ok(PacketType::A),
            0x0042 => Ok(PacketType::B),
            0x0043 => Ok(PacketType::C),
            other => Err(other),
        }
    }
}

impl From<PacketType> for u16 {
    fn from(t: PacketType) -> u16 {
        match t {
            PacketType::A => 0x0041,
            PacketType::B => 0x0042,
            PacketType::C => 0x0043,
        }
    }
}

/// Scan header prefix carried by every data packet, decoded from its 60-byte
/// little-endian wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: u16,
    pub packet_type_raw: u16,
    /// Total bytes of the packet, header included.
    pub packet_size: u32,
    /// Offset from the packet start to the payload. May exceed 60 on future
    /// device revisions; always honour it instead of assuming 60.
    pub header_size: u16,
    /// Monotonically increasing per scan; wraps.
    pub scan_number: u16,
    /// 1-based index of this packet within the current scan.
    pub packet_number: u16,
    pub timestamp_raw: u64,
    pub timestamp_sync: u64,
    pub status_flags: u32,
    /// Scan-head rotation frequency in mHz.
    pub scan_frequency: u32,
    /// Total points in the complete scan.
    pub num_points_scan: u16,
    /// Points carried by this packet.
    pub num_points_packet: u16,
    /// Index of the first point of this packet within the full scan.
    pub first_index: u16,
    /// Absolute angle of the first point, 1/10000 degree units.
    pub first_angle: i32,
    /// Angular delta between successive points, 1/10000 degree units.
    pub angular_increment: i32,
    pub iq_input: u32,
    pub iq_overload: u32,
    pub iq_timestamp_raw: u64,
    pub iq_timestamp_sync: u64,
}

impl Header {
    /// Wire size of the header prefix.
    pub const SIZE: usize = 60;

    /// Decode a header from the first [`Header::SIZE`] bytes of `buf`.
    ///
    /// Returns `None` if `buf` is shorter than [`Header::SIZE`]. Does not
    /// itself validate `magic` or `packet_type_raw` — callers go through
    /// [`super::find_magic`] / [`super::parse_header`] for that.
    pub fn decode(buf: &[u8]) -> Option<Header> {
        if buf.len() < Self::SIZE {
            return None;
        }
        let mut r = Reader(buf);
        Some(Header {
            magic: r.u16(),
            packet_type_raw: r.u16(),
            packet_size: r.u32(),
            header_size: r.u16(),
            scan_number: r.u16(),
            packet_number: r.u16(),
            timestamp_raw: r.u64(),
            timestamp_sync: r.u64(),
            status_flags: r.u32(),
            scan_frequency: r.u32(),
            num_points_scan: r.u16(),
            num_points_packet: r.u16(),
            first_index: r.u16(),
            first_angle: r.i32(),
            angular_increment: r.i32(),
            iq_input: r.u32(),
            iq_overload: r.u32(),
            iq_timestamp_raw: r.u64(),
            iq_timestamp_sync: r.u64(),
        })
    }

    /// Encode back to the 60-byte little-endian wire representation.
    /// Primarily used by tests to assert round-trip fidelity.
    pub fn encode(&self) -> [u8; Header::SIZE] {
        let mut out = [0u8; Header::SIZE];
        let mut w = Writer(&mut out);
        w.u16(self.magic);
        w.u16(self.packet_type_raw);
        w.u32(self.packet_size);
        w.u16(self.header_size);
        w.u16(self.scan_number);
        w.u16(self.packet_number);
        w.u64(self.timestamp_raw);
        w.u64(self.timestamp_sync);
        w.u32(self.status_flags);
        w.u32(self.scan_frequency);
        w.u16(self.num_points_scan);
        w.u16(self.num_points_packet);
        w.u16(self.first_index);
        w.i32(self.first_angle);
        w.i32(self.angular_increment);
        w.u32(self.iq_input);
        w.u32(self.iq_overload);
        w.u64(self.iq_timestamp_raw);
        w.u64(self.iq_timestamp_sync);
        out
    }

    pub fn packet_type(&self) -> Result<PacketType, u16> {
        PacketType::try_from(self.packet_type_raw)
    }
}

struct Reader<'a>(&'a [u8]);

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> &'a [u8] {
        let (head, tail) = self.0.split_at(n);
        self.0 = tail;
        head
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take(2).try_into().unwrap())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take(4).try_into().unwrap())
    }

    fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take(4).try_into().unwrap())
    }

    fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take(8).try_into().unwrap())
    }
}

struct Writer<'a>(&'a mut [u8]);

impl<'a> Writer<'a> {
    fn put(&mut self, bytes: &[u8]) {
        let n = bytes.len();
        let buf = std::mem::take(&mut self.0);
        let (head, tail) = buf.split_at_mut(n);
        head.copy_from_slice(bytes);
        self.0 = tail;
    }

    fn u16(&mut self, v: u16) {
        self.put(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.put(&v.to_le_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.put(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.put(&v.to_le_bytes());
    }
}

/// Search `buf` for the first little-endian occurrence of [`MAGIC`].
///
/// Returns the byte offset of the magic start, or `None` if fewer than two
/// bytes remain or the magic is absent.
pub fn find_magic(buf: &[u8]) -> Option<usize> {
    if buf.len() < 2 {
        return None;
    }
    buf.windows(2)
        .position(|w| u16::from_le_bytes([w[0], w[1]]) == MAGIC)
}

/// Locate and decode the next header in `buf`.
///
/// Returns `(magic_offset, header)`. `None` if no magic is found, or if
/// fewer than [`Header::SIZE`] bytes are available from the magic start.
pub fn parse_header(buf: &[u8]) -> Option<(usize, Header)> {
    let start = find_magic(buf)?;
    let header = Header::decode(&buf[start..])?;
    Some((start, header))
}

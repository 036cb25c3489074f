//! Scan assembly: turning an ordered or unordered stream of decoded packets
//! into complete [`Scan`](crate::Scan)s (§4.2).

mod datagram;
mod stream;

pub use datagram::DatagramFactory;
pub use stream::StreamFactory;

use crate::wire::{Distance, Header};
use crate::Scan;

/// Common contract for the two scan-assembly strategies (§9 "polymorphism
/// over factories"). The stream transport uses [`StreamFactory`] (packets
/// arrive in order); the datagram transport uses [`DatagramFactory`]
/// (packets may arrive out of order and are sorted before being emitted).
pub trait ScanFactory {
    /// Incorporate one decoded packet.
    fn add_packet(&mut self, header: Header, distances: Vec<Distance>, amplitudes: Vec<u16>);

    /// True if no packet has been accumulated.
    fn is_empty(&self) -> bool;

    /// True if enough points have been accumulated to complete the scan
    /// declared by the most recently seen header.
    fn is_complete(&self) -> bool;

    /// Assemble and return the accumulated scan, clearing internal state.
    fn take(&mut self) -> Scan;

    /// Clear any accumulated packets, preparing to assemble a different scan.
    fn clear(&mut self);

    /// Headers of every packet currently accumulated, in acceptance order.
    fn headers(&self) -> &[Header];

    /// True if `header` belongs to a different scan than the one currently
    /// being accumulated (compared against the most recently accepted
    /// header's `scan_number`).
    fn is_different_scan(&self, header: &Header) -> bool {
        match self.headers().last() {
            Some(last) => last.scan_number != header.scan_number,
            None => false,
        }
    }

    /// True if `header` is the first packet of a new scan.
    ///
    /// Both concrete factories use `packet_number == 1` — this is the
    /// resolution of the ambiguity recorded in SPEC_FULL.md's Open
    /// Questions: the original driver's stream variant tested
    /// `scan_number == 1` instead, which only ever matched the very first
    /// scan after startup.
    fn is_new_scan(&self, header: &Header) -> bool {
        header.packet_number == 1
    }

    /// Apply the shared scan-boundary policy: clear state before accepting
    /// a packet that starts a new scan or belongs to a different one.
    fn maybe_clear_for(&mut self, header: &Header) {
        if !self.is_empty() && (self.is_different_scan(header) || self.is_new_scan(header)) {
            self.clear();
        }
    }
}

//! Frame decoding: header, chained datagrams, pad region.
//!
//! The capture collaborator hands over raw octets plus frame metadata; this
//! module turns each frame into an [`DecodedFrame`]: the EtherCAT header,
//! the datagram chain in wire order, the trailing pad, and per-datagram
//! derived values (vendor timestamp, mailbox messages).

pub mod datagram;
mod decoder;
pub mod header;

use bytes::Bytes;

pub use datagram::{cmd, cmd_description, is_fixed_address, is_read, Datagram};
pub use decoder::{DecodeConfig, DecodedFrame, FrameDecoder};
pub use header::{EtherCatHeader, HeaderVariant, ETHERNET_HEADER_LEN, ETHERTYPE_ETHERCAT};

/// One captured frame as produced by the capture collaborator.
///
/// Immutable once produced: `number` ascends in capture order and `time` is
/// a monotonic capture timestamp in seconds.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Frame number (capture order, unique).
    pub number: u64,
    /// Capture timestamp in seconds (sub-millisecond resolution).
    pub time: f64,
    /// Captured octets, starting at the Ethernet header.
    pub data: Bytes,
}

impl RawFrame {
    pub fn new(number: u64, time: f64, data: Bytes) -> Self {
        Self { number, time, data }
    }
}

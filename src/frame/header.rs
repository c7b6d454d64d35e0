//! EtherCAT frame header.

use crate::codec::bit_slice;

/// EtherType for EtherCAT (IEEE 802 registry).
pub const ETHERTYPE_ETHERCAT: u16 = 0x88A4;

/// Ethernet II header length preceding the EtherCAT payload.
pub const ETHERNET_HEADER_LEN: usize = 14;

/// Bit layout of the 2-byte EtherCAT frame header.
///
/// Capture tooling in the field disagrees on how the header splits after the
/// 4-bit type: either a single reserved bit with an 11-bit length, or four
/// reserved bits with an 8-bit length. Both layouts occur in real decoders,
/// so the split is a configuration choice rather than a hardcoded constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderVariant {
    /// 4-bit type, 1-bit reserved, 11-bit length. Matches the EtherCAT
    /// specification and the datagram-level length word layout.
    #[default]
    ReservedOne,
    /// 4-bit type, 4-bit reserved, 8-bit length.
    ReservedFour,
}

impl HeaderVariant {
    /// Number of reserved bits after the type nibble.
    pub fn reserved_bits(&self) -> u32 {
        match self {
            HeaderVariant::ReservedOne => 1,
            HeaderVariant::ReservedFour => 4,
        }
    }

    /// Number of length bits at the end of the header word.
    pub fn length_bits(&self) -> u32 {
        16 - 4 - self.reserved_bits()
    }
}

/// Decoded EtherCAT frame header.
///
/// `raw` preserves the byte-swapped header word verbatim so the reserved
/// bits survive for round-trip and debug display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EtherCatHeader {
    /// 4-bit frame type tag (1 = DL-PDU).
    pub frame_type: u8,
    /// Reserved bits, width per [`HeaderVariant`].
    pub reserved: u8,
    /// Byte count of the datagram region following the header.
    pub length: u16,
    /// The swapped header word the fields were sliced from.
    pub raw: u16,
}

impl EtherCatHeader {
    /// Slice the header fields out of a byte-swapped header word.
    pub fn from_word(word: u16, variant: HeaderVariant) -> Self {
        let reserved_bits = variant.reserved_bits();
        Self {
            frame_type: bit_slice(word, 0, 4) as u8,
            reserved: bit_slice(word, 4, reserved_bits) as u8,
            length: bit_slice(word, 4 + reserved_bits, variant.length_bits()),
            raw: word,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_reserved_one() {
        // Swapped word 0x110a: type=1, reserved=0, 11-bit length=0x10a
        let hdr = EtherCatHeader::from_word(0x110a, HeaderVariant::ReservedOne);
        assert_eq!(hdr.frame_type, 1);
        assert_eq!(hdr.reserved, 0);
        assert_eq!(hdr.length, 0x10a);
        assert_eq!(hdr.raw, 0x110a);
    }

    #[test]
    fn test_header_reserved_four() {
        // Same word under the 4/4/8 split: reserved=0x1, length=0x0a
        let hdr = EtherCatHeader::from_word(0x110a, HeaderVariant::ReservedFour);
        assert_eq!(hdr.frame_type, 1);
        assert_eq!(hdr.reserved, 0x1);
        assert_eq!(hdr.length, 0x0a);
    }

    #[test]
    fn test_variant_bit_widths() {
        assert_eq!(HeaderVariant::ReservedOne.length_bits(), 11);
        assert_eq!(HeaderVariant::ReservedFour.length_bits(), 8);
        assert_eq!(HeaderVariant::default(), HeaderVariant::ReservedOne);
    }
}

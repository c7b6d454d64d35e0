//! EtherCAT datagram: one addressed read/write unit within a frame.

use bytes::Bytes;

use crate::codec::bit_slice;

/// EtherCAT command codes.
///
/// The low byte of each datagram selects how the address is interpreted and
/// whether devices read, write, or both.
#[allow(dead_code)]
pub mod cmd {
    /// Logical Read Write
    pub const LRW: u8 = 0x01;
    /// Logical Read
    pub const LRD: u8 = 0x02;
    /// Logical Write
    pub const LWR: u8 = 0x03;
    /// Broadcast Read
    pub const BRD: u8 = 0x04;
    /// Broadcast Write
    pub const BWR: u8 = 0x05;
    /// Auto Increment Read Multiple Write
    pub const ARMW: u8 = 0x07;
    /// Auto Increment Physical Read
    pub const APRD: u8 = 0x08;
    /// Auto Increment Physical Write
    pub const APWR: u8 = 0x09;
    /// Auto Increment Physical Read Write
    pub const APRW: u8 = 0x0a;
    /// Fixed Address Physical Read
    pub const FPRD: u8 = 0x0c;
    /// Fixed Address Physical Write
    pub const FPWR: u8 = 0x0d;
    /// Fixed Address Physical Read Write
    pub const FPRW: u8 = 0x0e;
}

/// Human-readable description for a command code.
pub fn cmd_description(code: u8) -> &'static str {
    match code {
        cmd::LRW => "LRW (Logical Read Write)",
        cmd::LRD => "LRD (Logical Read)",
        cmd::LWR => "LWR (Logical Write)",
        cmd::BRD => "BRD (Broadcast Read)",
        cmd::BWR => "BWR (Broadcast Write)",
        cmd::ARMW => "ARMW (Auto Increment Read Multiple Write)",
        cmd::APRD => "APRD (Auto Increment Physical Read)",
        cmd::APWR => "APWR (Auto Increment Physical Write)",
        cmd::APRW => "APRW (Auto Increment Physical Read Write)",
        cmd::FPRD => "FPRD (Fixed Address Physical Read)",
        cmd::FPWR => "FPWR (Fixed Address Physical Write)",
        cmd::FPRW => "FPRW (Fixed Address Physical Read Write)",
        _ => "CMD (unknown)",
    }
}

/// Whether the command addresses a device by fixed station address
/// (FPRD/FPWR/FPRW). Mailbox traffic only rides on these.
pub fn is_fixed_address(code: u8) -> bool {
    matches!(code, cmd::FPRD | cmd::FPWR | cmd::FPRW)
}

/// Whether the command reads from devices (FPRW counts as both).
pub fn is_read(code: u8) -> bool {
    matches!(
        code,
        cmd::LRW | cmd::LRD | cmd::BRD | cmd::APRD | cmd::APRW | cmd::FPRD | cmd::FPRW
    )
}

/// One datagram decoded from a frame's chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    /// Command code (see [`cmd`]).
    pub cmd: u8,
    /// Caller-assigned correlation tag.
    pub index: u8,
    /// Address Position half of the logical address (swapped to host order).
    pub adp: u16,
    /// Address Offset half of the logical address (swapped to host order).
    pub ado: u16,
    /// True only on the final datagram of a frame.
    pub last_indicator: bool,
    /// Round-trip bit from the length word.
    pub round_trip: bool,
    /// Reserved 3 bits of the length word, preserved verbatim.
    pub reserved: u8,
    /// Byte count of `data` (11-bit field).
    pub data_length: u16,
    /// Interrupt/IRQ field (swapped to host order).
    pub interrupt: u16,
    /// Payload, exactly `data_length` bytes (shares the frame buffer).
    pub data: Bytes,
    /// Working counter, incremented by each responding device.
    pub working_counter: u16,
}

impl Datagram {
    /// Combined logical address: `adp` in the high half, `ado` in the low.
    pub fn log_addr(&self) -> u32 {
        ((self.adp as u32) << 16) | self.ado as u32
    }

    /// Split a swapped 2-byte length word into its bit fields:
    /// last indicator (1), round trip (1), reserved (3), data length (11).
    pub fn split_length_word(word: u16) -> (bool, bool, u8, u16) {
        (
            bit_slice(word, 0, 1) == 1,
            bit_slice(word, 1, 1) == 1,
            bit_slice(word, 2, 3) as u8,
            bit_slice(word, 5, 11),
        )
    }

    /// Total wire size of a datagram carrying `data_length` payload bytes:
    /// cmd + index + adp + ado + length word + interrupt + data + wkc.
    pub fn wire_size(data_length: u16) -> usize {
        1 + 1 + 2 + 2 + 2 + 2 + data_length as usize + 2
    }
}

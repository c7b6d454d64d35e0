//! Bit-field and hex primitives shared by all decoders.
//!
//! EtherCAT packs its headers as little-endian 16-bit words carrying
//! sub-byte fields, so every multi-byte read goes through a byte swap
//! followed by MSB-first bit slicing. These helpers are pure functions
//! with no state.

use crate::error::DecodeError;

/// Reverse the two bytes of a 16-bit word (little-endian wire order to
/// big-endian display order). Self-inverse.
#[inline]
pub fn swap16(value: u16) -> u16 {
    value.swap_bytes()
}

/// Byte-level variant of [`swap16`]. The fixed-width array makes a
/// wrong-sized input a type error rather than a runtime condition.
#[inline]
pub fn swap16_bytes(bytes: [u8; 2]) -> [u8; 2] {
    [bytes[1], bytes[0]]
}

/// Extract `len` bits starting at bit `start` (MSB-first) from a 16-bit word.
///
/// Bit 0 is the most significant bit of the word, matching the binary-string
/// slicing convention the wire format is documented in. `len == 0` returns 0.
#[inline]
pub fn bit_slice(value: u16, start: u32, len: u32) -> u16 {
    if len == 0 {
        return 0;
    }
    debug_assert!(start + len <= 16, "bit slice out of range");
    let shift = 16 - start - len;
    let mask = if len >= 16 { u16::MAX } else { (1u16 << len) - 1 };
    (value >> shift) & mask
}

/// Parse a hex string (no `0x` prefix) into an unsigned integer.
pub fn hex_to_uint(hex: &str) -> Result<u64, DecodeError> {
    let trimmed = hex.strip_prefix("0x").unwrap_or(hex);
    if trimmed.is_empty() || trimmed.len() > 16 {
        return Err(DecodeError::MalformedHex {
            field: "hex_to_uint",
            input: hex.to_string(),
        });
    }
    u64::from_str_radix(trimmed, 16).map_err(|_| DecodeError::MalformedHex {
        field: "hex_to_uint",
        input: hex.to_string(),
    })
}

/// Format an unsigned integer as lowercase hex, zero-padded to `width` digits.
pub fn uint_to_hex(value: u64, width: usize) -> String {
    format!("{value:0width$x}")
}

/// Decode a hex string into raw bytes. Odd-length or non-hex input is
/// rejected. Capture tooling commonly hands frames around as hex dumps.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, DecodeError> {
    let trimmed = hex.strip_prefix("0x").unwrap_or(hex);
    // Non-ASCII input must fail as MalformedHex; the digit-pair slicing
    // below is only valid on single-byte characters.
    if trimmed.len() % 2 != 0 || !trimmed.is_ascii() {
        return Err(DecodeError::MalformedHex {
            field: "hex_to_bytes",
            input: hex.to_string(),
        });
    }
    (0..trimmed.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&trimmed[i..i + 2], 16).map_err(|_| DecodeError::MalformedHex {
                field: "hex_to_bytes",
                input: hex.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap16_self_inverse() {
        for v in [0u16, 1, 0x00ff, 0xff00, 0x1234, 0xabcd, u16::MAX] {
            assert_eq!(swap16(swap16(v)), v);
        }
        assert_eq!(swap16(0x1234), 0x3412);
    }

    #[test]
    fn test_swap16_bytes() {
        assert_eq!(swap16_bytes([0x0b, 0x10]), [0x10, 0x0b]);
        assert_eq!(swap16_bytes(swap16_bytes([0xde, 0xad])), [0xde, 0xad]);
    }

    #[test]
    fn test_bit_slice_msb_first() {
        // 0x110a swapped from wire 0x0a11: type=1, reserved=0, length=0x10a
        let word = 0x110au16;
        assert_eq!(bit_slice(word, 0, 4), 0x1); // type
        assert_eq!(bit_slice(word, 4, 1), 0x0); // reserved
        assert_eq!(bit_slice(word, 5, 11), 0x10a); // length
    }

    #[test]
    fn test_bit_slice_zero_length() {
        assert_eq!(bit_slice(0xffff, 3, 0), 0);
    }

    #[test]
    fn test_bit_slice_full_width() {
        assert_eq!(bit_slice(0xbeef, 0, 16), 0xbeef);
    }

    #[test]
    fn test_hex_to_uint() {
        assert_eq!(hex_to_uint("0c").unwrap(), 0x0c);
        assert_eq!(hex_to_uint("0x10aB").unwrap(), 0x10ab);
        assert!(hex_to_uint("zz").is_err());
        assert!(hex_to_uint("").is_err());
    }

    #[test]
    fn test_uint_to_hex_padding() {
        assert_eq!(uint_to_hex(0x0c, 2), "0c");
        assert_eq!(uint_to_hex(0x10a, 4), "010a");
        assert_eq!(uint_to_hex(0, 8), "00000000");
    }

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(hex_to_uint(&uint_to_hex(0xdead, 4)).unwrap(), 0xdead);
    }

    #[test]
    fn test_hex_to_bytes() {
        assert_eq!(hex_to_bytes("0c00").unwrap(), vec![0x0c, 0x00]);
        assert!(hex_to_bytes("abc").is_err()); // odd length
        assert!(hex_to_bytes("gg").is_err());
    }

    #[test]
    fn test_hex_to_bytes_rejects_non_ascii() {
        // Multi-byte characters give an even byte length but must still be
        // an error, not a slice panic at a char boundary.
        assert!(matches!(
            hex_to_bytes("a€b€"),
            Err(DecodeError::MalformedHex { .. })
        ));
        assert!(hex_to_uint("€€").is_err());
    }
}

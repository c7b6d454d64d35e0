//! Vendor timestamp extraction from frame pad bytes.
//!
//! Certain capture taps (ET2000-class hardware probes) append a timestamp to
//! each forwarded frame, landing in the pad region between the last datagram
//! and the Ethernet frame boundary. There is no standardized field for this:
//! the offsets and endianness here were inferred from observed vendor
//! traffic, so the extraction is a pluggable strategy rather than a protocol
//! guarantee.

use bytes::Bytes;
use tracing::trace;

/// Minimum pad size for a plain timestamp (bytes).
const PLAIN_MIN: usize = 16;
/// Pad size at which the extended vendor area is assumed present (bytes).
const EXTENDED_MIN: usize = 32;
/// Width of the extended-mode vendor area (bytes).
const EXTENDED_AREA: usize = 32;
/// Width of the timestamp field inside the vendor area (bytes).
const FIELD_LEN: usize = 16;

/// A timestamp recovered from a frame's pad region.
///
/// Never mutated after creation; `ticks` is interpreted as microseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorTimestamp {
    /// The pad bytes the value was decoded from.
    pub raw: Bytes,
    /// True when the pad carried the 32-byte vendor extension area.
    pub is_extended_mode: bool,
    /// Decoded tick count (microseconds).
    pub ticks: u64,
    /// How the bytes were ordered during decoding.
    pub byte_order_note: &'static str,
}

/// Strategy for interpreting a pad region as an optional timestamp.
///
/// Implementations must be pure over the pad bytes so frames can be decoded
/// in parallel. Substitute an implementation when a vendor tap uses a
/// different trailer convention.
pub trait TimestampStrategy: Send + Sync {
    fn extract(&self, pad: &Bytes) -> Option<VendorTimestamp>;
}

/// Default strategy matching observed ET2000 trailer layouts.
///
/// - pad shorter than 16 bytes: no timestamp;
/// - pad of 32 bytes or more: the last 32 bytes are the vendor extension
///   area and its first 16 bytes the timestamp field, stored little-endian
///   (decoded by pairwise byte reversal reading from the end); ticks keep
///   the low 64 bits;
/// - pad of 16 to 31 bytes: the pad itself read as a big-endian integer,
///   clamped to the final 8 bytes when wider than 64 bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Et2000Strategy;

impl TimestampStrategy for Et2000Strategy {
    fn extract(&self, pad: &Bytes) -> Option<VendorTimestamp> {
        if pad.len() < PLAIN_MIN {
            return None;
        }

        if pad.len() >= EXTENDED_MIN {
            let area_start = pad.len() - EXTENDED_AREA;
            let field = &pad[area_start..area_start + FIELD_LEN];
            trace!(area = ?&pad[area_start..], "extended vendor area");

            // Little-endian field: reversing the bytes end-to-start gives the
            // big-endian digit order. Only the low 64 bits are meaningful.
            let mut ticks: u64 = 0;
            for &b in field.iter().take(8).rev() {
                ticks = (ticks << 8) | b as u64;
            }
            trace!(ticks, "decoded extended timestamp");

            return Some(VendorTimestamp {
                raw: pad.clone(),
                is_extended_mode: true,
                ticks,
                byte_order_note: "little-endian field, pairwise byte reversal",
            });
        }

        // Plain mode: big-endian over the whole pad, final 8 bytes when the
        // value would overflow 64 bits.
        let tail = if pad.len() > 8 { &pad[pad.len() - 8..] } else { &pad[..] };
        let mut ticks: u64 = 0;
        for &b in tail {
            ticks = (ticks << 8) | b as u64;
        }
        trace!(ticks, "decoded plain timestamp");

        Some(VendorTimestamp {
            raw: pad.clone(),
            is_extended_mode: false,
            ticks,
            byte_order_note: "big-endian, clamped to final 8 bytes",
        })
    }
}

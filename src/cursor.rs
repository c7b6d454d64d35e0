//! Position-indexed reader over an immutable frame buffer.
//!
//! Datagram chains are variable-length records, so decoding walks a cursor
//! over the captured bytes instead of building recursive structures. All
//! reads return `Option`; a `None` means the buffer ended mid-field and maps
//! to the frame-level `truncated` flag at the call site.

use bytes::Bytes;

use crate::codec::swap16;

/// Cursor over an immutable byte buffer.
///
/// Sub-slices taken from the cursor share the underlying allocation via
/// [`Bytes`], so decoded datagrams reference the captured frame without
/// copying payload bytes.
#[derive(Debug, Clone)]
pub struct FrameCursor {
    buf: Bytes,
    pos: usize,
}

impl FrameCursor {
    pub fn new(buf: Bytes) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current byte offset from the start of the buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Skip `n` bytes without reading them. Returns `false` if the buffer
    /// is too short, leaving the position unchanged.
    pub fn skip(&mut self, n: usize) -> bool {
        if self.remaining() < n {
            return false;
        }
        self.pos += n;
        true
    }

    /// Read one byte.
    pub fn take_u8(&mut self) -> Option<u8> {
        let b = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    /// Read a 16-bit little-endian field and return it in host order.
    ///
    /// The wire carries the field low byte first; the swap yields the value
    /// as documented (big-endian display order).
    pub fn take_u16_le(&mut self) -> Option<u16> {
        if self.remaining() < 2 {
            return None;
        }
        let word = u16::from_be_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += 2;
        Some(swap16(word))
    }

    /// Read `n` bytes as a shared sub-slice of the underlying buffer.
    pub fn take_bytes(&mut self, n: usize) -> Option<Bytes> {
        if self.remaining() < n {
            return None;
        }
        let slice = self.buf.slice(self.pos..self.pos + n);
        self.pos += n;
        Some(slice)
    }

    /// Everything from the current position to the end of the buffer.
    pub fn rest(&mut self) -> Bytes {
        let slice = self.buf.slice(self.pos..);
        self.pos = self.buf.len();
        slice
    }

    /// Everything from `pos` to the end of the buffer, regardless of the
    /// current position. Lets a caller back up to a recorded position after
    /// a read failed partway through a record.
    pub fn rest_from(&mut self, pos: usize) -> Bytes {
        let pos = pos.min(self.buf.len());
        self.pos = self.buf.len();
        self.buf.slice(pos..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_u8_and_position() {
        let mut cur = FrameCursor::new(Bytes::from_static(&[0x0c, 0x80]));
        assert_eq!(cur.take_u8(), Some(0x0c));
        assert_eq!(cur.position(), 1);
        assert_eq!(cur.take_u8(), Some(0x80));
        assert_eq!(cur.take_u8(), None);
    }

    #[test]
    fn test_take_u16_le_swaps() {
        // Wire bytes 0x0a 0x11 are the little-endian word 0x110a.
        let mut cur = FrameCursor::new(Bytes::from_static(&[0x0a, 0x11]));
        assert_eq!(cur.take_u16_le(), Some(0x110a));
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn test_take_u16_le_short_buffer_keeps_position() {
        let mut cur = FrameCursor::new(Bytes::from_static(&[0x0a]));
        assert_eq!(cur.take_u16_le(), None);
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn test_take_bytes_shares_buffer() {
        let mut cur = FrameCursor::new(Bytes::from_static(&[1, 2, 3, 4]));
        let head = cur.take_bytes(2).unwrap();
        assert_eq!(&head[..], &[1, 2]);
        assert_eq!(cur.rest(), Bytes::from_static(&[3, 4]));
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn test_rest_from_backs_up_over_consumed_bytes() {
        let mut cur = FrameCursor::new(Bytes::from_static(&[1, 2, 3, 4]));
        let mark = cur.position();
        cur.take_u8().unwrap();
        cur.take_u8().unwrap();
        assert_eq!(cur.rest_from(mark), Bytes::from_static(&[1, 2, 3, 4]));
        assert_eq!(cur.remaining(), 0);
        // Out-of-range positions clamp to the end.
        assert_eq!(cur.rest_from(99), Bytes::new());
    }

    #[test]
    fn test_skip() {
        let mut cur = FrameCursor::new(Bytes::from_static(&[1, 2, 3]));
        assert!(cur.skip(2));
        assert!(!cur.skip(2));
        assert_eq!(cur.position(), 2);
    }
}

//! EtherCAT frame decoding: header, chained datagrams, pad region.

use bytes::Bytes;
use tracing::debug;

use crate::cursor::FrameCursor;
use crate::error::DecodeError;
use crate::mailbox::{decode_mailbox, MailboxMessage};
use crate::timestamp::{Et2000Strategy, TimestampStrategy, VendorTimestamp};

use super::datagram::Datagram;
use super::header::{EtherCatHeader, HeaderVariant, ETHERNET_HEADER_LEN};
use super::RawFrame;

/// Decoder configuration.
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    /// Byte offset of the EtherCAT payload within the captured frame
    /// (the Ethernet header preceding it, normally 14 bytes).
    pub ethercat_offset: usize,
    /// Frame header bit layout.
    pub variant: HeaderVariant,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            ethercat_offset: ETHERNET_HEADER_LEN,
            variant: HeaderVariant::default(),
        }
    }
}

/// A fully decoded frame: the unit handed to the presentation layer.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// Frame number in capture order.
    pub number: u64,
    /// Capture timestamp in seconds.
    pub time: f64,
    pub header: EtherCatHeader,
    /// Datagram chain in wire order.
    pub datagrams: Vec<Datagram>,
    /// True when the buffer ended mid-field and the chain was cut short.
    pub truncated: bool,
    /// Trailing bytes after the datagram region, up to the frame boundary.
    pub pad: Bytes,
    /// Vendor timestamp recovered from the pad, when present.
    pub timestamp: Option<VendorTimestamp>,
    /// Mailbox messages keyed by datagram position in `datagrams`.
    pub mailbox: Vec<(usize, MailboxMessage)>,
}

impl DecodedFrame {
    /// The vendor timestamp tick count, when one was recovered.
    pub fn ticks(&self) -> Option<u64> {
        self.timestamp.as_ref().map(|ts| ts.ticks)
    }
}

/// Decodes raw frames into [`DecodedFrame`]s.
///
/// Pure over its input: decoding holds no per-frame state, so one decoder
/// can serve any number of threads.
pub struct FrameDecoder {
    config: DecodeConfig,
    strategy: Box<dyn TimestampStrategy>,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DecodeConfig::default())
    }
}

impl FrameDecoder {
    pub fn new(config: DecodeConfig) -> Self {
        Self {
            config,
            strategy: Box::new(Et2000Strategy),
        }
    }

    /// Substitute the pad-timestamp strategy (vendor trailer conventions vary).
    pub fn with_strategy(mut self, strategy: Box<dyn TimestampStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decode one captured frame.
    ///
    /// Truncation mid-datagram is recoverable: the chain stops, already
    /// decoded datagrams are kept, and the result carries `truncated = true`.
    /// Only a frame too short for the 2-byte EtherCAT header is rejected.
    pub fn decode(&self, raw: &RawFrame) -> Result<DecodedFrame, DecodeError> {
        let offset = self.config.ethercat_offset;
        let mut cursor = FrameCursor::new(raw.data.clone());

        let word = if cursor.skip(offset) {
            cursor.take_u16_le()
        } else {
            None
        };
        let word = match word {
            Some(word) => word,
            None => {
                return Err(DecodeError::HeaderTooShort {
                    frame: raw.number,
                    offset,
                    needed: 2,
                    have: raw.data.len().saturating_sub(offset),
                })
            }
        };
        let header = EtherCatHeader::from_word(word, self.config.variant);

        let region_end = offset + 2 + header.length as usize;

        let mut datagrams = Vec::new();
        let mut truncated = false;
        // End of the last fully-decoded datagram; the pad starts here, so a
        // partial trailing datagram stays in the pad in full.
        let mut chain_end = cursor.position();

        while cursor.position() < region_end {
            match read_datagram(&mut cursor) {
                Some(dg) => {
                    let last = dg.last_indicator;
                    chain_end = cursor.position();
                    datagrams.push(dg);
                    if last {
                        break;
                    }
                }
                None => {
                    debug!(
                        frame = raw.number,
                        position = cursor.position(),
                        "datagram chain truncated"
                    );
                    truncated = true;
                    break;
                }
            }
        }

        let pad = cursor.rest_from(chain_end);
        let timestamp = self.strategy.extract(&pad);

        let mailbox = datagrams
            .iter()
            .enumerate()
            .filter_map(|(i, dg)| decode_mailbox(dg).map(|mb| (i, mb)))
            .collect();

        Ok(DecodedFrame {
            number: raw.number,
            time: raw.time,
            header,
            datagrams,
            truncated,
            pad,
            timestamp,
            mailbox,
        })
    }
}

/// Read one datagram at the cursor. `None` means the buffer ended inside a
/// field; the cursor may then sit mid-datagram and must not be reused.
fn read_datagram(cursor: &mut FrameCursor) -> Option<Datagram> {
    let cmd = cursor.take_u8()?;
    let index = cursor.take_u8()?;
    let adp = cursor.take_u16_le()?;
    let ado = cursor.take_u16_le()?;

    let length_word = cursor.take_u16_le()?;
    let (last_indicator, round_trip, reserved, data_length) =
        Datagram::split_length_word(length_word);

    let interrupt = cursor.take_u16_le()?;
    let data = cursor.take_bytes(data_length as usize)?;
    let working_counter = cursor.take_u16_le()?;

    Some(Datagram {
        cmd,
        index,
        adp,
        ado,
        last_indicator,
        round_trip,
        reserved,
        data_length,
        interrupt,
        data,
        working_counter,
    })
}

//! # ecat-dissect
//!
//! Bit-precise EtherCAT frame dissection.
//!
//! This crate decodes raw Ethernet frames carrying the EtherCAT field-bus
//! protocol into structured records: the frame header, the chained datagram
//! list with working counters, the trailing pad region with its optional
//! vendor timestamp, and embedded mailbox traffic (CoE/EoE/FoE/SoE/VoE with
//! CoE/SDO field decoding). A stateful aggregation layer derives inter-frame
//! deltas and SDO request/response pairs from the decoded stream.
//!
//! It is a pure in-process transformation: capture-file ingestion and any
//! presentation of the results belong to the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use bytes::Bytes;
//! use ecat_dissect::frame::{FrameDecoder, RawFrame};
//!
//! // One captured frame: Ethernet header, EtherCAT header (length = 12),
//! // and a single empty BRD datagram flagged as last.
//! let mut buf = vec![0u8; 12];
//! buf.extend_from_slice(&0x88a4u16.to_be_bytes());
//! buf.extend_from_slice(&0x100cu16.to_le_bytes());
//! buf.extend_from_slice(&[0x04, 0x00]);
//! buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
//! buf.extend_from_slice(&0x8000u16.to_le_bytes());
//! buf.extend_from_slice(&[0x00, 0x00]);
//! buf.extend_from_slice(&[0x02, 0x00]);
//!
//! let raw = RawFrame::new(1, 0.0, Bytes::from(buf));
//! let decoded = FrameDecoder::default().decode(&raw).unwrap();
//! assert_eq!(decoded.datagrams.len(), 1);
//! assert_eq!(decoded.datagrams[0].working_counter, 2);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------------------------------+
//! |                          ecat-dissect                            |
//! +------------------------------------------------------------------+
//! |  codec/      - byte swap, bit slicing, hex conversion            |
//! |  cursor/     - position-indexed reader over frame buffers        |
//! |  frame/      - EtherCAT header, datagram chain, pad region       |
//! |  timestamp/  - vendor (ET2000-style) pad timestamp strategies    |
//! |  mailbox/    - mailbox classification, CoE/SDO decoding          |
//! |  aggregate/  - ordered cross-frame deltas and SDO pairing        |
//! |  pipeline/   - parallel decode, ordered aggregation, cancel      |
//! |  error/      - error types                                       |
//! +------------------------------------------------------------------+
//! ```
//!
//! Decoding single frames is side-effect free and runs in parallel across
//! frames; aggregation folds the decoded stream strictly in capture order.

pub mod aggregate;
pub mod codec;
pub mod cursor;
pub mod error;
pub mod frame;
pub mod mailbox;
pub mod pipeline;
pub mod timestamp;

// Re-export commonly used types at crate root for convenience
pub use aggregate::{AggregateConfig, SequenceAggregator, SequenceEvent};
pub use error::{DecodeError, Error, Result};
pub use frame::{
    cmd_description, DecodeConfig, DecodedFrame, Datagram, EtherCatHeader, FrameDecoder,
    HeaderVariant, RawFrame,
};
pub use mailbox::{decode_mailbox, MailboxMessage, MailboxProtocol, SdoCommand};
pub use pipeline::{CancelFlag, DecodeOutcome, PipelineConfig, PipelineOutput};
pub use timestamp::{Et2000Strategy, TimestampStrategy, VendorTimestamp};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

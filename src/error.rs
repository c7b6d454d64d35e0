//! Error types for ecat-dissect.
//!
//! This module provides structured error types for all decoding operations:
//!
//! - [`enum@Error`] - Main error enum that wraps all error types
//! - [`DecodeError`] - Errors from EtherCAT frame decoding
//!
//! All errors implement `std::error::Error` and can be converted to `anyhow::Error`.
//!
//! Per-frame failures are always local: a malformed frame is reported on that
//! frame's record and the batch continues with the next frame.

use thiserror::Error;

/// Main error type for ecat-dissect operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error decoding an EtherCAT frame
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A decode worker task failed to complete
    #[error("worker task failed: {0}")]
    Worker(String),
}

/// Errors related to EtherCAT frame decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Non-hex characters where hex digits were expected
    #[error("malformed hex in {field}: {input:?}")]
    MalformedHex { field: &'static str, input: String },

    /// Frame too small even for the 2-byte EtherCAT header. Truncation past
    /// the header is not an error: the datagram chain stops at the break and
    /// the frame carries a `truncated` flag instead.
    #[error("frame {frame}: too short for EtherCAT header (need {needed} bytes at offset {offset}, have {have})")]
    HeaderTooShort {
        frame: u64,
        offset: usize,
        needed: usize,
        have: usize,
    },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::HeaderTooShort {
            frame: 7,
            offset: 14,
            needed: 2,
            have: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("frame 7"));
        assert!(msg.contains("offset 14"));
    }

    #[test]
    fn test_error_from_decode_error() {
        let err: Error = DecodeError::MalformedHex {
            field: "hex_to_bytes",
            input: "zz".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Decode(_)));
    }
}

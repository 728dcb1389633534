//! Error types for the protocol layer.
//!
//! Every variant here describes bytes that could not be framed or
//! unframed. They are always recoverable: the caller drops the malformed
//! unit and carries on.

use crate::{ENVELOPE_HEADER_SIZE, RECORD_HEADER_SIZE};

/// Errors that can occur while encoding or decoding wire data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Fewer bytes than the fixed record header were supplied.
    #[error(
        "truncated update record: {actual} bytes, need at least {}",
        RECORD_HEADER_SIZE
    )]
    TruncatedRecord { actual: usize },

    /// The record's `data_size` field claims more trailing bytes than
    /// the buffer actually holds.
    #[error(
        "update record claims {claimed} trailing bytes but only {available} are present"
    )]
    PayloadSizeMismatch { claimed: u32, available: usize },

    /// Fewer bytes than the 4-byte message kind were supplied.
    #[error(
        "truncated envelope: {actual} bytes, need at least {}",
        ENVELOPE_HEADER_SIZE
    )]
    TruncatedEnvelope { actual: usize },

    /// Trailing record data longer than the 32-bit `data_size` field
    /// can describe.
    #[error("trailing record data of {len} bytes does not fit a 32-bit size")]
    PayloadTooLarge { len: usize },
}

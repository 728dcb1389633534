//! Message envelopes: a 4-byte kind tag followed by the payload.
//!
//! ```text
//! ┌──────────────────┬──────────────────────────┐
//! │ kind (u32, LE)   │ payload (N bytes)        │
//! └──────────────────┴──────────────────────────┘
//! ```
//!
//! There is no length prefix. Message boundaries are the transport's job.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ProtocolError, UpdateRecord};

/// Size of the kind tag in bytes.
pub const ENVELOPE_HEADER_SIZE: usize = 4;

// ---------------------------------------------------------------------------
// MessageKind
// ---------------------------------------------------------------------------

/// The kind tag at the front of every envelope.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum MessageKind {
    #[default]
    Unknown,
    ServerHello,
    GenericText,
    GameMessage,
    GamePacket,
    Error,
    Track,
    ClientLogRequest,
    ClientLogResponse,
    /// A tag this client does not know, kept verbatim.
    Other(u32),
}

impl MessageKind {
    /// Maps a raw tag to a kind.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Unknown,
            1 => Self::ServerHello,
            2 => Self::GenericText,
            3 => Self::GameMessage,
            4 => Self::GamePacket,
            5 => Self::Error,
            6 => Self::Track,
            7 => Self::ClientLogRequest,
            8 => Self::ClientLogResponse,
            other => Self::Other(other),
        }
    }

    /// Returns the raw tag value.
    pub fn to_raw(self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::ServerHello => 1,
            Self::GenericText => 2,
            Self::GameMessage => 3,
            Self::GamePacket => 4,
            Self::Error => 5,
            Self::Track => 6,
            Self::ClientLogRequest => 7,
            Self::ClientLogResponse => 8,
            Self::Other(other) => other,
        }
    }

    /// Whether payloads of this kind carry text.
    pub fn carries_text(self) -> bool {
        matches!(
            self,
            Self::GenericText
                | Self::GameMessage
                | Self::Error
                | Self::Track
                | Self::ClientLogRequest
                | Self::ClientLogResponse
        )
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(raw) => write!(f, "Other({raw})"),
            known => fmt::Debug::fmt(known, f),
        }
    }
}

// ---------------------------------------------------------------------------
// frame / unframe
// ---------------------------------------------------------------------------

/// Frames `payload` behind the 4-byte little-endian `kind` tag.
///
/// The result is always `payload.len() + 4` bytes.
pub fn frame(kind: MessageKind, payload: &[u8]) -> Vec<u8> {
    framed(kind, payload.len(), |out| out.extend_from_slice(payload))
}

/// Frames `record` as a [`MessageKind::GamePacket`] without building an
/// [`Envelope`] around it.
pub fn frame_record(record: &UpdateRecord) -> Vec<u8> {
    framed(MessageKind::GamePacket, record.encoded_len(), |out| {
        record.encode_into(out)
    })
}

/// Writes the kind tag, then lets `body` append `body_len` payload bytes.
fn framed(
    kind: MessageKind,
    body_len: usize,
    body: impl FnOnce(&mut Vec<u8>),
) -> Vec<u8> {
    let mut out = Vec::with_capacity(ENVELOPE_HEADER_SIZE + body_len);
    out.extend_from_slice(&kind.to_raw().to_le_bytes());
    body(&mut out);
    out
}

/// Splits framed bytes into the kind tag and the payload.
///
/// # Errors
/// Returns [`ProtocolError::TruncatedEnvelope`] if fewer than 4 bytes are
/// supplied.
pub fn unframe(bytes: &[u8]) -> Result<(MessageKind, &[u8]), ProtocolError> {
    let Some((tag, payload)) =
        bytes.split_first_chunk::<ENVELOPE_HEADER_SIZE>()
    else {
        return Err(ProtocolError::TruncatedEnvelope {
            actual: bytes.len(),
        });
    };
    Ok((MessageKind::from_raw(u32::from_le_bytes(*tag)), payload))
}

// ---------------------------------------------------------------------------
// Payload / Envelope
// ---------------------------------------------------------------------------

/// What an envelope carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Opaque bytes.
    Raw(Vec<u8>),

    /// A text message, sent as its UTF-8 bytes.
    Text(String),

    /// An encoded update record.
    Record(UpdateRecord),
}

impl Payload {
    /// Appends the payload's wire bytes to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Self::Raw(bytes) => out.extend_from_slice(bytes),
            Self::Text(text) => out.extend_from_slice(text.as_bytes()),
            Self::Record(record) => record.encode_into(out),
        }
    }

    /// Length of the payload's wire bytes.
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Raw(bytes) => bytes.len(),
            Self::Text(text) => text.len(),
            Self::Record(record) => record.encoded_len(),
        }
    }
}

/// A typed message ready to be framed for the transport.
///
/// Built right before hand-off and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub kind: MessageKind,
    pub payload: Payload,
}

impl Envelope {
    /// A text message of the given kind.
    pub fn text(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            payload: Payload::Text(text.into()),
        }
    }

    /// An update record, tagged [`MessageKind::GamePacket`].
    pub fn record(record: UpdateRecord) -> Self {
        Self {
            kind: MessageKind::GamePacket,
            payload: Payload::Record(record),
        }
    }

    /// Opaque bytes of the given kind.
    pub fn raw(kind: MessageKind, bytes: Vec<u8>) -> Self {
        Self {
            kind,
            payload: Payload::Raw(bytes),
        }
    }

    /// Frames the envelope into transport bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        framed(self.kind, self.payload.encoded_len(), |out| {
            self.payload.encode_into(out)
        })
    }

    /// Parses framed bytes received from the transport.
    ///
    /// `GamePacket` payloads are decoded as update records. Text kinds are
    /// read as lossy UTF-8 with a single trailing NUL removed. Everything
    /// else stays raw.
    ///
    /// # Errors
    /// Any [`ProtocolError`] from [`unframe`] or [`UpdateRecord::decode`].
    pub fn parse(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let (kind, body) = unframe(bytes)?;

        let payload = if kind == MessageKind::GamePacket {
            Payload::Record(UpdateRecord::decode(body)?)
        } else if kind.carries_text() {
            let body = body.strip_suffix(&[0]).unwrap_or(body);
            Payload::Text(String::from_utf8_lossy(body).into_owned())
        } else {
            Payload::Raw(body.to_vec())
        };

        Ok(Self { kind, payload })
    }
}

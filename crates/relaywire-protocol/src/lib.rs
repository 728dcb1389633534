//! Wire protocol for relaywire.
//!
//! This crate defines the bytes a client hands to the transport:
//!
//! - **Vectors** ([`Vec2`], [`Vec3`]): plain value types used inside
//!   records.
//! - **Records** ([`UpdateRecord`], [`RecordKind`]): the fixed 60-byte
//!   game update layout, its codec, and a sparse debug rendering.
//! - **Envelopes** ([`Envelope`], [`MessageKind`], [`frame`],
//!   [`unframe`]): the 4-byte kind tag in front of every payload.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between the client (typed messages) and the
//! transport (opaque bytes). It knows nothing about hosts, peers, or
//! proxies.
//!
//! ```text
//! Client (Envelope) → Protocol (bytes) → Transport (datagrams)
//! ```

mod envelope;
mod error;
mod record;
mod vector;

pub use envelope::{
    ENVELOPE_HEADER_SIZE, Envelope, MessageKind, Payload, frame, frame_record,
    unframe,
};
pub use error::ProtocolError;
pub use record::{RECORD_HEADER_SIZE, RecordKind, UpdateRecord};
pub use vector::{Vec2, Vec2f, Vec2i, Vec3, Vec3f, Vec3i};

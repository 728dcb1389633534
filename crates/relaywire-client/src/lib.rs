//! Client session layer for relaywire.
//!
//! This crate owns everything a game client keeps between calls:
//!
//! 1. **Proxy parameters**: endpoint and credentials in bounded buffers
//!    that are zeroed when released ([`ProxyStore`])
//! 2. **Wire-mode negotiation**: which packet convention the open
//!    connection speaks ([`WireModeState`])
//! 3. **The connection itself**: connect, disconnect, and the send API
//!    ([`Client`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Game code (above)             ← builds records and text, calls send_*
//!     ↕
//! Client layer (this crate)     ← proxy params, wire mode, framing hand-off
//!     ↕
//! Protocol layer                ← UpdateRecord, Envelope, MessageKind
//!     ↕
//! Transport layer (below)       ← Host/Peer datagram transport
//! ```

mod client;
mod config;
mod credential;
mod error;
mod negotiation;
mod params;
mod sink;

pub use client::{Client, SendStatus, ServerTarget};
pub use config::{ClientConfig, ProxyAuthConfig, ProxyConfig};
pub use credential::{BoundedBuf, MAX_CREDENTIAL_LEN};
pub use error::ClientError;
pub use negotiation::WireModeState;
pub use params::ProxyStore;
pub use sink::{DiagnosticSink, NoopSink, TracingSink};

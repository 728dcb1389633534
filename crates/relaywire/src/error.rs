//! Unified error type for relaywire.

use relaywire_client::ClientError;
use relaywire_protocol::ProtocolError;
use relaywire_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `relaywire` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
#[derive(Debug, thiserror::Error)]
pub enum RelaywireError {
    /// A transport-level error (host creation, resolution, peer slots).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A malformed update record or envelope.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A client-level error (proxy bounds, connect, wire mode, config).
    #[error(transparent)]
    Client(#[from] ClientError),
}

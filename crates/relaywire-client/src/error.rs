//! Error types for the client layer.

use relaywire_transport::{TransportError, WireMode};

use crate::MAX_CREDENTIAL_LEN;

/// Errors that can occur while configuring or connecting a client.
///
/// Validation failures (`CredentialTooLong`, `InvalidAddress`) are
/// reported before anything reaches the transport. `ConnectFailed` wraps
/// whatever the transport reported; nothing here retries on its own.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A proxy host, username, or password exceeds the buffer bound.
    #[error("{field} is {len} bytes, limit is {}", MAX_CREDENTIAL_LEN)]
    CredentialTooLong { field: &'static str, len: usize },

    /// A host string is empty or contains a NUL byte, or a port is 0.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The transport could not create a host, resolve the target, or
    /// allocate a peer.
    #[error("connect to {target} failed: {source}")]
    ConnectFailed {
        target: String,
        #[source]
        source: TransportError,
    },

    /// The wire mode was already fixed for the current connection.
    #[error("wire mode already fixed to {0} for this connection")]
    ModeAlreadyFixed(WireMode),

    /// `reconnect` was called before any `connect`.
    #[error("no previous connection target to reopen")]
    NoPreviousTarget,

    /// The client configuration could not be parsed.
    #[error("invalid client config: {0}")]
    Config(#[from] serde_json::Error),
}

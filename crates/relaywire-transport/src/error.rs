/// Errors that can occur in the transport layer.
///
/// None of these are retried by the transport. Retry policy belongs to
/// whoever called `connect`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport could not allocate a host.
    #[error("host creation failed: {0}")]
    HostCreation(String),

    /// The target address could not be resolved.
    #[error("could not resolve address {0}")]
    AddressResolution(String),

    /// No peer slot could be allocated for the outgoing connection.
    #[error("peer allocation failed: {0}")]
    PeerAllocation(String),

    /// The proxy refused the tunnel or the supplied credentials.
    #[error("proxy rejected connection: {0}")]
    ProxyRejected(String),
}

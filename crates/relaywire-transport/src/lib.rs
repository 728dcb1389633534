//! Transport abstraction layer for relaywire.
//!
//! The datagram transport (host/peer/packet, congestion control,
//! compression, checksums, proxy tunneling) lives outside this workspace.
//! This crate only describes the seam: the [`Transport`] and [`Host`]
//! traits the client drives, plus the small value types that cross it.
//!
//! # Feature Flags
//!
//! - `loopback` (default): in-memory [`LoopbackTransport`] that reports
//!   every host, connect, and packet as a [`LoopbackEvent`]

mod error;
#[cfg(feature = "loopback")]
mod loopback;

pub use error::TransportError;
#[cfg(feature = "loopback")]
pub use loopback::{
    LoopbackEvent, LoopbackHost, LoopbackPeer, LoopbackRemote,
    LoopbackTransport, ProxySnapshot,
};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a peer allocated by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(u64);

impl PeerId {
    /// Creates a new `PeerId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// WireMode
// ---------------------------------------------------------------------------

/// Which packet-interpretation convention the remote peer speaks.
///
/// The two conventions are mutually incompatible, so the mode is chosen
/// once when the host is created and must not change while a peer is
/// attached.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum WireMode {
    /// The original packet convention.
    #[default]
    Legacy,

    /// The newer packet convention.
    New,
}

impl WireMode {
    /// Maps the transport's boolean "use new packet" switch to a mode.
    pub fn from_new_packet(new_packet: bool) -> Self {
        if new_packet { Self::New } else { Self::Legacy }
    }

    /// Returns the value for the transport's "use new packet" switch.
    pub fn uses_new_packet(self) -> bool {
        matches!(self, Self::New)
    }
}

impl fmt::Display for WireMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy"),
            Self::New => f.write_str("new"),
        }
    }
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// The delivery guarantee requested for one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    /// Delivered in order, no loss.
    #[default]
    Reliable,

    /// May be lost or reordered.
    Unreliable,
}

// ---------------------------------------------------------------------------
// Addresses and proxy targets
// ---------------------------------------------------------------------------

/// A host/port pair to connect to. Resolution is the transport's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub host: String,
    pub port: u16,
}

impl Address {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Username/password pair for proxy authentication, borrowed for the
/// duration of a single `connect` call.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ProxyCredentials<'a> {
    pub username: &'a [u8],
    pub password: &'a [u8],
}

impl fmt::Debug for ProxyCredentials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyCredentials")
            .field("username_len", &self.username.len())
            .field("password_len", &self.password.len())
            .finish()
    }
}

/// The proxy endpoint a connection should tunnel through.
///
/// Borrowed from the owner's parameter store. A transport that needs the
/// values after `connect` returns must copy them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyTarget<'a> {
    pub host: &'a str,
    pub port: u16,
    pub auth: Option<ProxyCredentials<'a>>,
}

// ---------------------------------------------------------------------------
// HostSettings
// ---------------------------------------------------------------------------

/// Parameters for creating a transport host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
    /// Maximum number of peers the host may allocate.
    pub peer_count: usize,

    /// Number of channels negotiated with each peer.
    pub channel_count: usize,

    /// Incoming bandwidth limit in bytes/sec. 0 means unlimited.
    pub incoming_bandwidth: u32,

    /// Outgoing bandwidth limit in bytes/sec. 0 means unlimited.
    pub outgoing_bandwidth: u32,

    /// Packet-interpretation convention for every peer on this host.
    pub wire_mode: WireMode,

    /// Attach CRC32 checksums to outgoing datagrams.
    pub checksum: bool,

    /// Compress datagrams with the range coder.
    pub range_coder: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            peer_count: 1,
            channel_count: 2,
            incoming_bandwidth: 0,
            outgoing_bandwidth: 0,
            wire_mode: WireMode::Legacy,
            checksum: true,
            range_coder: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Creates hosts. One transport may create many hosts over its lifetime,
/// but a client only holds one at a time.
pub trait Transport {
    /// The host type produced by this transport.
    type Host: Host;

    /// Allocates a new host configured with `settings`.
    fn create_host(
        &mut self,
        settings: &HostSettings,
    ) -> Result<Self::Host, TransportError>;
}

/// A local endpoint that owns peers and queues packets for them.
///
/// Dropping the host destroys it and releases every peer it owns.
pub trait Host {
    /// The peer handle type allocated by this host.
    type Peer;

    /// Returns the settings the host was created with.
    fn settings(&self) -> &HostSettings;

    /// Starts connecting to `address`.
    ///
    /// When `proxy` is given, the tunnel is established before the peer
    /// handshake. The call returns once the peer is allocated; the
    /// handshake completes later while the caller services the host.
    fn connect(
        &mut self,
        address: &Address,
        channel_count: usize,
        proxy: Option<ProxyTarget<'_>>,
    ) -> Result<Self::Peer, TransportError>;

    /// Queues `data` for `peer` on `channel`. Never blocks.
    fn send(
        &mut self,
        peer: &Self::Peer,
        channel: u8,
        data: &[u8],
        delivery: Delivery,
    );

    /// Pushes queued packets out immediately.
    fn flush(&mut self);

    /// Requests a graceful disconnect of `peer`.
    fn disconnect(&mut self, peer: Self::Peer);
}

//! The client session: one host, one peer, one wire mode at a time.
//!
//! # Lifecycle
//!
//! ```text
//! set_proxy()/set_proxy_auth()     (optional, any time)
//!        │
//!        ▼
//! connect(host, port, mode) ──→ [connected, mode fixed]
//!        │                              │
//!        │                    send_*() fire-and-forget
//!        ▼                              │
//! disconnect() ←────────────────────────┘
//!        │
//!        ▼
//! [idle, mode unset]  ──→ reconnect() / connect() again
//! ```
//!
//! All mutation goes through `&mut self`, so connect, disconnect, and proxy
//! changes can never overlap on one client. Sharing a client between
//! threads means wrapping it in a lock.

use std::fmt;

use relaywire_protocol::{Envelope, MessageKind, Payload, RecordKind, UpdateRecord};
use relaywire_transport::{Address, Delivery, Host, Transport, WireMode};

use crate::params::validate_host;
use crate::{
    ClientConfig, ClientError, DiagnosticSink, ProxyStore, TracingSink,
    WireModeState,
};

/// Every message goes out on this channel.
const SEND_CHANNEL: u8 = 0;

/// Outcome of a send. Neither case is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// Handed to the transport.
    Queued,

    /// No peer attached; nothing was sent.
    NotConnected,
}

impl SendStatus {
    pub fn is_queued(self) -> bool {
        matches!(self, Self::Queued)
    }
}

/// The address and mode of the most recent `connect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerTarget {
    pub address: Address,
    pub wire_mode: WireMode,
}

impl fmt::Display for ServerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address, self.wire_mode)
    }
}

struct Link<H: Host> {
    host: H,
    peer: H::Peer,
}

/// A client connection to a game server over transport `T`.
///
/// `S` receives debug echoes of outgoing messages; see
/// [`DiagnosticSink`].
pub struct Client<T: Transport, S: DiagnosticSink = TracingSink> {
    transport: T,
    sink: S,
    config: ClientConfig,
    proxy: ProxyStore,
    mode: WireModeState,
    target: Option<ServerTarget>,
    link: Option<Link<T::Host>>,
}

impl<T: Transport> Client<T> {
    /// Creates a client with the default config that echoes to `tracing`.
    pub fn new(transport: T) -> Self {
        Self::with_sink(transport, TracingSink)
    }
}

impl<T: Transport, S: DiagnosticSink> Client<T, S> {
    /// Creates a client with the default config and the given sink.
    pub fn with_sink(transport: T, sink: S) -> Self {
        Self {
            transport,
            sink,
            config: ClientConfig::default(),
            proxy: ProxyStore::new(),
            mode: WireModeState::Unset,
            target: None,
            link: None,
        }
    }

    /// Creates a client from `config`, applying its proxy section.
    ///
    /// The proxy section is moved into the client's [`ProxyStore`] and
    /// wiped; [`config`](Self::config) never returns it.
    ///
    /// # Errors
    /// Any validation error from [`ProxyStore::set_proxy`] or
    /// [`ProxyStore::set_proxy_auth`].
    pub fn with_config(
        transport: T,
        sink: S,
        mut config: ClientConfig,
    ) -> Result<Self, ClientError> {
        let mut client = Self::with_sink(transport, sink);
        if let Some(proxy) = config.proxy.take() {
            client.proxy.set_proxy(&proxy.host, proxy.port)?;
            if let Some(auth) = &proxy.auth {
                client.proxy.set_proxy_auth(&auth.username, &auth.password)?;
            }
        }
        client.config = config;
        Ok(client)
    }

    // -- Proxy parameters -------------------------------------------------

    /// See [`ProxyStore::set_proxy`].
    pub fn set_proxy(&mut self, host: &str, port: u16) -> Result<(), ClientError> {
        self.proxy.set_proxy(host, port)
    }

    /// See [`ProxyStore::set_proxy_auth`].
    pub fn set_proxy_auth(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        self.proxy.set_proxy_auth(username, password)
    }

    /// See [`ProxyStore::reset_proxy`]. Does not touch an open connection.
    pub fn reset_proxy(&mut self) {
        self.proxy.reset_proxy();
    }

    pub fn proxy(&self) -> &ProxyStore {
        &self.proxy
    }

    // -- Connection lifecycle ---------------------------------------------

    /// Opens a connection to `host:port` speaking `mode`.
    ///
    /// Any open connection is disconnected first. If a proxy is
    /// configured, it is passed to the transport in the same call as the
    /// target address. The wire mode is fixed only once the peer is
    /// allocated.
    ///
    /// # Errors
    /// - [`ClientError::InvalidAddress`] if `host` is empty or contains NUL
    /// - [`ClientError::ConnectFailed`] if the transport cannot create a
    ///   host, resolve the address, or allocate a peer
    pub fn connect(
        &mut self,
        host: &str,
        port: u16,
        mode: WireMode,
    ) -> Result<(), ClientError> {
        validate_host("server host", host)?;
        self.disconnect();

        let target = ServerTarget {
            address: Address::new(host, port),
            wire_mode: mode,
        };
        self.target = Some(target.clone());

        let settings = self.config.host_settings(mode);
        let mut new_host = self
            .transport
            .create_host(&settings)
            .map_err(|source| ClientError::ConnectFailed {
                target: target.to_string(),
                source,
            })?;
        tracing::debug!(%target, "transport host created");

        let peer = new_host
            .connect(
                &target.address,
                settings.channel_count,
                self.proxy.proxy_target(),
            )
            .map_err(|source| ClientError::ConnectFailed {
                target: target.to_string(),
                source,
            })?;

        self.mode.fix(mode)?;
        new_host.flush();
        self.link = Some(Link {
            host: new_host,
            peer,
        });

        tracing::info!(%target, proxied = self.proxy.is_configured(), "connected");
        Ok(())
    }

    /// Reopens the most recent target with the same wire mode.
    ///
    /// # Errors
    /// [`ClientError::NoPreviousTarget`] if `connect` was never called,
    /// otherwise anything [`connect`](Self::connect) returns.
    pub fn reconnect(&mut self) -> Result<(), ClientError> {
        let target = self.target.clone().ok_or(ClientError::NoPreviousTarget)?;
        self.connect(&target.address.host, target.address.port, target.wire_mode)
    }

    /// Says goodbye to the peer and releases the host.
    ///
    /// Sends a `Disconnect` update record first when a peer is attached.
    /// Does nothing harmful when no connection exists.
    pub fn disconnect(&mut self) {
        if self.link.is_some() {
            self.send_game_packet(&UpdateRecord::new(RecordKind::Disconnect));
        }

        if let Some(Link { mut host, peer }) = self.link.take() {
            host.disconnect(peer);
            host.flush();
            drop(host);
            tracing::info!(target = ?self.target, "disconnected");
        }
        self.mode.clear();
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// The wire mode of the open connection, if any.
    pub fn wire_mode(&self) -> Option<WireMode> {
        self.mode.current()
    }

    /// The most recently requested target, kept across disconnects.
    pub fn target(&self) -> Option<&ServerTarget> {
        self.target.as_ref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The host of the open connection, for the caller's event loop.
    pub fn host_mut(&mut self) -> Option<&mut T::Host> {
        self.link.as_mut().map(|link| &mut link.host)
    }

    pub fn host(&self) -> Option<&T::Host> {
        self.link.as_ref().map(|link| &link.host)
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // -- Sending ----------------------------------------------------------

    /// Frames `payload` behind `kind` and hands it to the transport.
    pub fn send_raw(&mut self, kind: MessageKind, payload: &[u8]) -> SendStatus {
        self.hand_off(kind, relaywire_protocol::frame(kind, payload))
    }

    /// Sends a `GenericText` message.
    pub fn send_generic_text(&mut self, text: &str) -> SendStatus {
        self.echo("SendGenericText", || text.to_owned());
        self.send_raw(MessageKind::GenericText, text.as_bytes())
    }

    /// Sends a `GameMessage` message.
    pub fn send_game_message(&mut self, text: &str) -> SendStatus {
        self.echo("SendGameMessage", || text.to_owned());
        self.send_raw(MessageKind::GameMessage, text.as_bytes())
    }

    /// Sends an update record as a `GamePacket` message.
    pub fn send_game_packet(&mut self, record: &UpdateRecord) -> SendStatus {
        self.echo("SendGamePacket", || record.render());

        let bytes = relaywire_protocol::frame_record(record);
        self.hand_off(MessageKind::GamePacket, bytes)
    }

    /// Sends a prepared envelope.
    pub fn send_envelope(&mut self, envelope: &Envelope) -> SendStatus {
        match &envelope.payload {
            Payload::Text(text) => self.echo("SendEnvelope", || text.clone()),
            Payload::Record(record) => self.echo("SendEnvelope", || record.render()),
            Payload::Raw(_) => {}
        }
        self.hand_off(envelope.kind, envelope.to_bytes())
    }

    fn hand_off(&mut self, kind: MessageKind, bytes: Vec<u8>) -> SendStatus {
        let Some(link) = self.link.as_mut() else {
            tracing::trace!(%kind, "send skipped, not connected");
            return SendStatus::NotConnected;
        };

        link.host
            .send(&link.peer, SEND_CHANNEL, &bytes, Delivery::Reliable);
        if self.config.flush_on_send {
            link.host.flush();
        }
        tracing::debug!(%kind, len = bytes.len(), "packet handed to transport");
        SendStatus::Queued
    }

    /// Closes the connection and zeroes every stored proxy parameter.
    fn release(&mut self) {
        self.disconnect();
        self.proxy.reset_proxy();
    }

    /// Passes a rendering to the sink in debug builds only. `render` is
    /// never called in release builds.
    fn echo(&self, label: &str, render: impl FnOnce() -> String) {
        if cfg!(debug_assertions) {
            self.sink.echo(label, &render());
        }
    }
}

impl<T: Transport, S: DiagnosticSink> Drop for Client<T, S> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: Transport, S: DiagnosticSink> fmt::Debug for Client<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("target", &self.target)
            .field("mode", &self.mode)
            .field("connected", &self.link.is_some())
            .field("proxy", &self.proxy)
            .finish()
    }
}

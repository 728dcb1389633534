//! In-memory transport that reports everything it is asked to do.
//!
//! Nothing leaves the process. Every host creation, connect, packet,
//! flush, and disconnect is pushed onto an unbounded channel as a
//! [`LoopbackEvent`], where a [`LoopbackRemote`] can inspect it. Sends stay
//! synchronous because an unbounded `send` never waits.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use crate::{
    Address, Delivery, Host, HostSettings, PeerId, ProxyTarget, Transport,
    TransportError,
};

/// Counter for generating unique peer IDs.
static NEXT_PEER_ID: AtomicU64 = AtomicU64::new(1);

/// An owned copy of the proxy target a connect call was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySnapshot {
    pub host: String,
    pub port: u16,
    pub username: Option<Vec<u8>>,
    pub password: Option<Vec<u8>>,
}

impl From<ProxyTarget<'_>> for ProxySnapshot {
    fn from(target: ProxyTarget<'_>) -> Self {
        Self {
            host: target.host.to_owned(),
            port: target.port,
            username: target.auth.map(|a| a.username.to_vec()),
            password: target.auth.map(|a| a.password.to_vec()),
        }
    }
}

/// Something the loopback transport was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopbackEvent {
    HostCreated(HostSettings),
    Connected {
        peer: PeerId,
        address: Address,
        channel_count: usize,
        proxy: Option<ProxySnapshot>,
    },
    Packet {
        peer: PeerId,
        channel: u8,
        delivery: Delivery,
        data: Vec<u8>,
    },
    Flushed,
    Disconnected {
        peer: PeerId,
    },
    HostDestroyed,
}

/// Receiving end of a [`LoopbackTransport`].
pub struct LoopbackRemote {
    rx: mpsc::UnboundedReceiver<LoopbackEvent>,
}

impl LoopbackRemote {
    /// Returns the next event if one is already queued.
    pub fn try_next(&mut self) -> Option<LoopbackEvent> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next event. Returns `None` once every host and the
    /// transport itself have been dropped.
    pub async fn next(&mut self) -> Option<LoopbackEvent> {
        self.rx.recv().await
    }

    /// Takes every event queued so far.
    pub fn drain(&mut self) -> Vec<LoopbackEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Takes every queued event and keeps only the packet payloads.
    pub fn drain_packets(&mut self) -> Vec<Vec<u8>> {
        self.drain()
            .into_iter()
            .filter_map(|event| match event {
                LoopbackEvent::Packet { data, .. } => Some(data),
                _ => None,
            })
            .collect()
    }
}

/// A [`Transport`] that keeps everything in memory.
#[derive(Debug)]
pub struct LoopbackTransport {
    events: mpsc::UnboundedSender<LoopbackEvent>,
    fail_host_creation: bool,
    fail_connect: bool,
}

impl LoopbackTransport {
    /// Creates a transport and the remote that observes it.
    pub fn new() -> (Self, LoopbackRemote) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Self {
            events: tx,
            fail_host_creation: false,
            fail_connect: false,
        };
        (transport, LoopbackRemote { rx })
    }

    /// Makes subsequent `create_host` calls fail.
    pub fn fail_host_creation(&mut self, fail: bool) {
        self.fail_host_creation = fail;
    }

    /// Makes `connect` on subsequently created hosts fail.
    pub fn fail_connect(&mut self, fail: bool) {
        self.fail_connect = fail;
    }
}

impl Transport for LoopbackTransport {
    type Host = LoopbackHost;

    fn create_host(
        &mut self,
        settings: &HostSettings,
    ) -> Result<Self::Host, TransportError> {
        if self.fail_host_creation {
            return Err(TransportError::HostCreation(
                "loopback host creation disabled".into(),
            ));
        }
        if settings.peer_count == 0 {
            return Err(TransportError::HostCreation(
                "peer count must be at least 1".into(),
            ));
        }

        let _ = self.events.send(LoopbackEvent::HostCreated(settings.clone()));
        tracing::debug!(
            wire_mode = %settings.wire_mode,
            peers = settings.peer_count,
            "loopback host created"
        );

        Ok(LoopbackHost {
            settings: settings.clone(),
            events: self.events.clone(),
            peers: HashSet::new(),
            fail_connect: self.fail_connect,
        })
    }
}

/// A peer handle allocated by a [`LoopbackHost`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct LoopbackPeer {
    id: PeerId,
}

impl LoopbackPeer {
    pub fn id(&self) -> PeerId {
        self.id
    }
}

/// A host created by [`LoopbackTransport`].
#[derive(Debug)]
pub struct LoopbackHost {
    settings: HostSettings,
    events: mpsc::UnboundedSender<LoopbackEvent>,
    peers: HashSet<PeerId>,
    fail_connect: bool,
}

impl LoopbackHost {
    /// Number of peers currently attached.
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }
}

impl Host for LoopbackHost {
    type Peer = LoopbackPeer;

    fn settings(&self) -> &HostSettings {
        &self.settings
    }

    fn connect(
        &mut self,
        address: &Address,
        channel_count: usize,
        proxy: Option<ProxyTarget<'_>>,
    ) -> Result<Self::Peer, TransportError> {
        if address.host.is_empty()
            || address.host.chars().any(char::is_whitespace)
        {
            return Err(TransportError::AddressResolution(address.to_string()));
        }
        if self.fail_connect {
            return Err(TransportError::PeerAllocation(
                "loopback connect disabled".into(),
            ));
        }
        if self.peers.len() >= self.settings.peer_count {
            return Err(TransportError::PeerAllocation(format!(
                "all {} peer slots in use",
                self.settings.peer_count
            )));
        }

        let id = PeerId::new(NEXT_PEER_ID.fetch_add(1, Ordering::Relaxed));
        self.peers.insert(id);

        let _ = self.events.send(LoopbackEvent::Connected {
            peer: id,
            address: address.clone(),
            channel_count,
            proxy: proxy.map(ProxySnapshot::from),
        });
        tracing::debug!(%id, %address, proxied = proxy.is_some(), "loopback peer allocated");

        Ok(LoopbackPeer { id })
    }

    fn send(
        &mut self,
        peer: &Self::Peer,
        channel: u8,
        data: &[u8],
        delivery: Delivery,
    ) {
        if !self.peers.contains(&peer.id) {
            tracing::trace!(peer = %peer.id, "dropping packet for detached peer");
            return;
        }
        let _ = self.events.send(LoopbackEvent::Packet {
            peer: peer.id,
            channel,
            delivery,
            data: data.to_vec(),
        });
    }

    fn flush(&mut self) {
        let _ = self.events.send(LoopbackEvent::Flushed);
    }

    fn disconnect(&mut self, peer: Self::Peer) {
        if self.peers.remove(&peer.id) {
            let _ = self
                .events
                .send(LoopbackEvent::Disconnected { peer: peer.id });
        }
    }
}

impl Drop for LoopbackHost {
    fn drop(&mut self) {
        let _ = self.events.send(LoopbackEvent::HostDestroyed);
    }
}

//! Client configuration.

use std::fmt;

use relaywire_transport::{HostSettings, WireMode};
use serde::{Deserialize, Serialize};

use crate::ClientError;
use crate::credential::wipe_string;

/// Settings applied to every host the client creates.
///
/// Every field has a default, so a config file only needs the fields it
/// changes:
///
/// ```json
/// { "default_wire_mode": "new", "proxy": { "host": "10.0.0.5", "port": 1080 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Peers the host may allocate.
    pub peer_count: usize,

    /// Channels negotiated with the peer. Messages go out on channel 0.
    pub channel_count: usize,

    /// Attach CRC32 checksums to datagrams.
    pub checksum: bool,

    /// Compress datagrams with the range coder.
    pub range_coder: bool,

    /// Flush the host after every send instead of waiting for the next
    /// service call.
    pub flush_on_send: bool,

    /// Mode used by callers that do not pick one per connection.
    pub default_wire_mode: WireMode,

    /// Proxy to configure when the client is built. `Client::with_config`
    /// moves this into the client's proxy store, so it is always `None` on
    /// a built client.
    pub proxy: Option<ProxyConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            peer_count: 1,
            channel_count: 2,
            checksum: true,
            range_coder: true,
            flush_on_send: true,
            default_wire_mode: WireMode::Legacy,
            proxy: None,
        }
    }
}

impl ClientConfig {
    /// Parses a JSON config.
    pub fn from_json(text: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Host settings for a connection in `mode`.
    pub fn host_settings(&self, mode: WireMode) -> HostSettings {
        HostSettings {
            peer_count: self.peer_count,
            channel_count: self.channel_count,
            wire_mode: mode,
            checksum: self.checksum,
            range_coder: self.range_coder,
            ..HostSettings::default()
        }
    }
}

/// Proxy section of [`ClientConfig`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub auth: Option<ProxyAuthConfig>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyAuthConfig {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("auth", &self.auth.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Drop for ProxyAuthConfig {
    fn drop(&mut self) {
        wipe_string(&mut self.username);
        wipe_string(&mut self.password);
    }
}

impl fmt::Debug for ProxyAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProxyAuthConfig(<redacted>)")
    }
}

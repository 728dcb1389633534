//! Proxy endpoint and credential storage.
//!
//! The store owns every proxy string the client knows about. The transport
//! only ever sees a borrowed [`ProxyTarget`] for the duration of one
//! `connect` call.
//!
//! ```text
//!            set_proxy             set_proxy_auth
//!   Empty ─────────────→ Endpoint ───────────────→ Endpoint + Auth
//!     ↑                     │                            │
//!     └─────────────── reset_proxy ──────────────────────┘
//! ```
//!
//! Replacing the endpoint with a different one also drops the stored
//! credentials, so a pair configured for one proxy is never offered to
//! another.

use relaywire_transport::{ProxyCredentials, ProxyTarget};

use crate::{BoundedBuf, ClientError};

#[derive(Debug)]
struct Endpoint {
    host: BoundedBuf,
    port: u16,
}

#[derive(Debug)]
struct Auth {
    username: BoundedBuf,
    password: BoundedBuf,
}

/// Proxy parameters owned by a single client.
#[derive(Debug, Default)]
pub struct ProxyStore {
    endpoint: Option<Endpoint>,
    auth: Option<Auth>,
}

impl ProxyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the proxy endpoint.
    ///
    /// The inputs are validated before anything is replaced; on error the
    /// previous configuration is left as it was.
    ///
    /// # Errors
    /// - [`ClientError::InvalidAddress`] if `host` is empty, contains a NUL
    ///   byte, or `port` is 0
    /// - [`ClientError::CredentialTooLong`] if `host` exceeds the bound
    pub fn set_proxy(&mut self, host: &str, port: u16) -> Result<(), ClientError> {
        validate_host("proxy host", host)?;
        if port == 0 {
            return Err(ClientError::InvalidAddress(format!(
                "proxy port for {host} is 0"
            )));
        }
        let host = BoundedBuf::try_new("proxy host", host)?;

        let replacing = self.endpoint.as_ref().is_some_and(|e| {
            e.port != port || e.host.as_bytes() != host.as_bytes()
        });
        if replacing && self.auth.is_some() {
            self.auth = None;
            tracing::debug!("proxy endpoint changed, stored credentials dropped");
        }

        // The replaced endpoint is zeroed as it drops.
        self.endpoint = Some(Endpoint { host, port });
        tracing::debug!(port, "proxy endpoint configured");
        Ok(())
    }

    /// Stores the proxy username/password pair, replacing any previous
    /// pair.
    ///
    /// # Errors
    /// Returns [`ClientError::CredentialTooLong`] if either value exceeds
    /// the bound. The previous pair is kept in that case.
    pub fn set_proxy_auth(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        let username = BoundedBuf::try_new("proxy username", username)?;
        let password = BoundedBuf::try_new("proxy password", password)?;

        self.auth = Some(Auth { username, password });
        tracing::debug!("proxy credentials configured");
        Ok(())
    }

    /// Zeroes and releases the endpoint and credentials. Safe to call any
    /// number of times.
    pub fn reset_proxy(&mut self) {
        let had_any = self.endpoint.is_some() || self.auth.is_some();
        self.endpoint = None;
        self.auth = None;
        if had_any {
            tracing::debug!("proxy configuration reset");
        }
    }

    /// Whether connections will tunnel through a proxy.
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Whether a credential pair is stored.
    pub fn has_auth(&self) -> bool {
        self.auth.is_some()
    }

    /// The configured endpoint as `(host, port)`.
    pub fn endpoint(&self) -> Option<(&str, u16)> {
        self.endpoint.as_ref().map(|e| (e.host.as_str(), e.port))
    }

    /// Borrowed view for the transport's connect call. `None` when no
    /// endpoint is configured, even if credentials are stored.
    pub fn proxy_target(&self) -> Option<ProxyTarget<'_>> {
        let endpoint = self.endpoint.as_ref()?;
        Some(ProxyTarget {
            host: endpoint.host.as_str(),
            port: endpoint.port,
            auth: self.auth.as_ref().map(|a| ProxyCredentials {
                username: a.username.as_bytes(),
                password: a.password.as_bytes(),
            }),
        })
    }
}

/// Rejects host strings the transport could never resolve.
pub(crate) fn validate_host(what: &str, host: &str) -> Result<(), ClientError> {
    if host.is_empty() {
        return Err(ClientError::InvalidAddress(format!("{what} is empty")));
    }
    if host.contains('\0') {
        return Err(ClientError::InvalidAddress(format!(
            "{what} contains a NUL byte"
        )));
    }
    Ok(())
}

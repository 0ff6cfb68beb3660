// Shared transport configuration for opening Socket.IO sessions.
//
// Translates the configured `http(s)://` server URL into the Engine.IO
// WebSocket endpoint and carries the per-wait timeout.

use std::time::Duration;

use url::Url;

use crate::error::Error;

const SOCKET_PATH: &str = "socket.io/";
const SOCKET_QUERY: &str = "EIO=4&transport=websocket";

/// Transport settings for a [`KumaClient`](crate::KumaClient) session.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound for the connect, every call, and every awaited push.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Build the WebSocket endpoint for a server base URL.
    ///
    /// `https://kuma.example/status` becomes
    /// `wss://kuma.example/status/socket.io/?EIO=4&transport=websocket`.
    pub fn socket_url(&self, base_url: &Url) -> Result<Url, Error> {
        let scheme = match base_url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(Error::Connect(format!("unsupported URL scheme '{other}'")));
            }
        };

        let mut url = base_url.clone();
        url.set_scheme(scheme)
            .map_err(|()| Error::Connect(format!("cannot switch {base_url} to {scheme}")))?;
        let path = format!("{}/{SOCKET_PATH}", base_url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.set_query(Some(SOCKET_QUERY));
        url.set_fragment(None);
        Ok(url)
    }
}

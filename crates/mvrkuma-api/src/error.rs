use thiserror::Error;

/// Top-level error type for the `mvrkuma-api` crate.
///
/// Covers every failure mode of a Socket.IO session against Uptime Kuma:
/// connection setup, authentication, the request/ack exchange, and payload
/// decoding. `mvrkuma-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// WebSocket connection could not be established.
    #[error("WebSocket connection failed: {0}")]
    Connect(String),

    /// The Engine.IO / Socket.IO handshake did not complete.
    #[error("Socket.IO handshake failed: {0}")]
    Handshake(String),

    /// The server closed the socket while a call was pending.
    #[error("Connection closed by server: {reason}")]
    Closed { reason: String },

    /// URL parsing or scheme translation failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A call or push did not arrive within the configured timeout.
    #[error("Timed out after {timeout_secs}s waiting for '{waiting_for}'")]
    Timeout {
        waiting_for: String,
        timeout_secs: u64,
    },

    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong credentials, 2FA required, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A call that needs a session was made before a successful login.
    #[error("Not logged in")]
    NotAuthenticated,

    // ── Calls ───────────────────────────────────────────────────────
    /// The server answered a call with `{ ok: false, msg }`.
    #[error("Server rejected '{event}': {message}")]
    Rejected { event: String, message: String },

    /// A frame that does not follow Engine.IO / Socket.IO framing.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// JSON deserialization failed, with the raw payload for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the failure came from the login step.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::NotAuthenticated)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connect(_) | Self::Timeout { .. } | Self::Closed { .. }
        )
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => Self::Closed {
                reason: err.to_string(),
            },
            other => Self::Connect(other.to_string()),
        }
    }
}

// ── Core error types ──
//
// User-facing errors from mvrkuma-core. Consumers never see Socket.IO
// frames or zip internals directly; the `From` impls below translate
// transport and show-file errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to Uptime Kuma at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Not authenticated: {message}")]
    NotAuthenticated { message: String },

    #[error("Uptime Kuma did not answer within {timeout_secs}s ({waiting_for})")]
    Timeout {
        waiting_for: String,
        timeout_secs: u64,
    },

    // ── Remote call errors ───────────────────────────────────────────
    #[error("{operation} failed: {message}")]
    RemoteCall { operation: String, message: String },

    // ── Show-file errors ─────────────────────────────────────────────
    #[error("Cannot read show file {path}: {reason}")]
    ParseFailed { path: String, reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Discovery errors ─────────────────────────────────────────────
    #[error("Network discovery failed: {message}")]
    Discovery { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap a failed remote call, naming the operation that was attempted.
    pub fn remote_call(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::RemoteCall {
            operation: operation.into(),
            message: err.to_string(),
        }
    }

    /// Errors that end the session: the operation aborts instead of
    /// recording the failure and moving on.
    pub fn is_session_failure(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::NotAuthenticated { .. } | Self::Timeout { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<mvrkuma_api::Error> for CoreError {
    fn from(err: mvrkuma_api::Error) -> Self {
        use mvrkuma_api::Error as ApiError;

        match err {
            ApiError::Connect(reason) | ApiError::Handshake(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason,
            },
            ApiError::Closed { reason } => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("connection closed: {reason}"),
            },
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::Timeout {
                waiting_for,
                timeout_secs,
            } => CoreError::Timeout {
                waiting_for,
                timeout_secs,
            },
            ApiError::Authentication { message } => CoreError::NotAuthenticated { message },
            ApiError::NotAuthenticated => CoreError::NotAuthenticated {
                message: "no session; log in first".into(),
            },
            ApiError::Rejected { event, message } => CoreError::RemoteCall {
                operation: event,
                message,
            },
            ApiError::Protocol(message) => CoreError::Internal(format!("Protocol error: {message}")),
            ApiError::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

impl From<mvrkuma_mvr::Error> for CoreError {
    fn from(err: mvrkuma_mvr::Error) -> Self {
        let path = match &err {
            mvrkuma_mvr::Error::Io { path, .. } => path.display().to_string(),
            _ => String::new(),
        };
        CoreError::ParseFailed {
            path,
            reason: err.to_string(),
        }
    }
}

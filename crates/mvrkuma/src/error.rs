//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use mvrkuma_config::ConfigError;
use mvrkuma_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const PARSE: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Uptime Kuma at {url}: {reason}")]
    #[diagnostic(
        code(mvrkuma::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             Try: mvrkuma status --url http://<host>:3001"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(mvrkuma::auth_failed),
        help(
            "Verify the username and password.\n\
             Run: mvrkuma config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No password configured for '{user}'")]
    #[diagnostic(
        code(mvrkuma::no_credentials),
        help(
            "Store one with: mvrkuma config set-password\n\
             Or set the MVRKUMA_PASSWORD environment variable."
        )
    )]
    NoCredentials { user: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(mvrkuma::not_found),
        help("Run: mvrkuma status to see monitors and tags on the server")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    // ── Remote calls ─────────────────────────────────────────────────
    #[error("{operation} failed: {message}")]
    #[diagnostic(code(mvrkuma::remote_call))]
    RemoteCall { operation: String, message: String },

    #[error("{failed} of the {operation} steps failed")]
    #[diagnostic(
        code(mvrkuma::partial_failure),
        help("Everything else was applied. Run the same command again to retry the failed steps.")
    )]
    PartialFailure { operation: String, failed: usize },

    // ── Show files ───────────────────────────────────────────────────
    #[error("Cannot read show file {path}: {reason}")]
    #[diagnostic(
        code(mvrkuma::parse_failed),
        help("Check that the file is a valid MVR archive with a GeneralSceneDescription.xml.")
    )]
    ParseFailed { path: String, reason: String },

    // ── Discovery ────────────────────────────────────────────────────
    #[error("Network discovery failed: {message}")]
    #[diagnostic(
        code(mvrkuma::discovery),
        help("Pick the interface facing the lighting network with --bind <IP>.")
    )]
    Discovery { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(mvrkuma::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No Uptime Kuma server configured")]
    #[diagnostic(
        code(mvrkuma::no_config),
        help(
            "Create a config with: mvrkuma config init\n\
             Or pass --url and --username.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(mvrkuma::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(mvrkuma::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Uptime Kuma did not answer within {seconds}s ({waiting_for})")]
    #[diagnostic(
        code(mvrkuma::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout { seconds: u64, waiting_for: String },

    // ── IO / internal ────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(mvrkuma::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::ParseFailed { .. } => exit_code::PARSE,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::NotAuthenticated { message } => CliError::AuthFailed { message },

            CoreError::Timeout {
                waiting_for,
                timeout_secs,
            } => CliError::Timeout {
                seconds: timeout_secs,
                waiting_for,
            },

            CoreError::RemoteCall { operation, message } => {
                CliError::RemoteCall { operation, message }
            }

            CoreError::ParseFailed { path, reason } => CliError::ParseFailed { path, reason },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                resource_type: entity_type,
                identifier,
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Discovery { message } => CliError::Discovery { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { user } => CliError::NoCredentials { user },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_exit_codes() {
        let cases = [
            (
                CoreError::ConnectionFailed {
                    url: "http://kuma".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::NotAuthenticated {
                    message: "bad password".into(),
                },
                exit_code::AUTH,
            ),
            (
                CoreError::Timeout {
                    waiting_for: "login".into(),
                    timeout_secs: 10,
                },
                exit_code::TIMEOUT,
            ),
            (
                CoreError::ParseFailed {
                    path: "show.mvr".into(),
                    reason: "not a zip".into(),
                },
                exit_code::PARSE,
            ),
            (
                CoreError::NotFound {
                    entity_type: "Tag".into(),
                    identifier: "Wash".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::ValidationFailed {
                    message: "same file".into(),
                },
                exit_code::USAGE,
            ),
            (CoreError::Internal("boom".into()), exit_code::GENERAL),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn missing_password_is_an_auth_error() {
        let err = CliError::from(ConfigError::NoCredentials {
            user: "admin@http://kuma".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}

// ── Runtime connection configuration ──
//
// These types describe how to reach an Uptime Kuma server and how new
// monitors are shaped. They carry credentials but never touch disk; the
// CLI builds them from `mvrkuma-config` and hands them in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::model::MonitorKind;

/// Connection settings for one Uptime Kuma server.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server URL (e.g., `http://10.0.0.2:3001`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// Bound on the connect and on every call.
    pub timeout: Duration,
}

/// Shape of monitors created for fixtures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    pub kind: MonitorKind,
    /// Seconds between checks.
    pub interval: u32,
    pub retry_interval: u32,
    pub resend_interval: u32,
    pub max_retries: u32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            kind: MonitorKind::Http,
            interval: 60,
            retry_interval: 60,
            resend_interval: 0,
            max_retries: 0,
        }
    }
}

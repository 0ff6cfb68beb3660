//! Shared configuration for mvrkuma.
//!
//! TOML file + environment layering, credential resolution (env, keyring,
//! plaintext), and translation to the `mvrkuma_core` runtime types. The
//! CLI adds flag-aware overrides on top.

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use mvrkuma_core::{ConnectionConfig, MonitorKind, MonitorSettings, TagCategories};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "MVRKUMA_CONFIG";

/// Environment variable holding the server password.
pub const PASSWORD_ENV: &str = "MVRKUMA_PASSWORD";

/// Keyring service name for stored passwords.
pub const KEYRING_SERVICE: &str = "mvrkuma";

const ENV_PREFIX: &str = "MVRKUMA_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for '{user}'")]
    NoCredentials { user: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub tags: TagsConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// `[server]`: where Uptime Kuma lives and how to log in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server base URL (e.g., "http://10.0.0.2:3001").
    pub url: Option<String>,

    pub username: Option<String>,

    /// Password (plaintext, prefer the keyring or `MVRKUMA_PASSWORD`).
    pub password: Option<String>,

    /// Seconds to wait for the connect and for each call.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

/// `[discovery]`: Art-Net polling.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    /// Seconds to collect replies.
    #[serde(default = "default_discovery_timeout")]
    pub timeout: f64,

    /// Local IPv4 address to poll from.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout: default_discovery_timeout(),
            bind: default_bind(),
        }
    }
}

fn default_discovery_timeout() -> f64 {
    1.5
}
fn default_bind() -> String {
    "0.0.0.0".into()
}

/// `[tags]`: which tag categories are attached to monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TagsConfig {
    #[serde(default = "enabled")]
    pub layers: bool,
    #[serde(default = "enabled")]
    pub classes: bool,
    #[serde(default = "enabled")]
    pub positions: bool,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            layers: true,
            classes: true,
            positions: true,
        }
    }
}

fn enabled() -> bool {
    true
}

/// `[monitor]`: shape of created monitors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub kind: MonitorKind,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default = "default_interval")]
    pub retry_interval: u32,
    #[serde(default)]
    pub resend_interval: u32,
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            kind: MonitorKind::default(),
            interval: default_interval(),
            retry_interval: default_interval(),
            resend_interval: 0,
            max_retries: 0,
        }
    }
}

fn default_interval() -> u32 {
    60
}

/// `[display]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Show uuids and ids in listings.
    #[serde(default)]
    pub details: bool,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `MVRKUMA_CONFIG`, else the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("org", "mvrkuma", "mvrkuma").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("mvrkuma");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the file at `path` + environment.
///
/// A missing file is not an error; defaults and environment still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["config", "password"])
                .split("__"),
        );

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Load the full Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "saved configuration");
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Credential resolution ───────────────────────────────────────────

/// Keyring account for a server login: `<username>@<url>`.
pub fn keyring_user(username: &str, url: &str) -> String {
    format!("{username}@{url}")
}

/// Resolve the password: `MVRKUMA_PASSWORD`, then the system keyring,
/// then plaintext in the config.
pub fn resolve_password(server: &ServerConfig) -> Result<SecretString, ConfigError> {
    let env = std::env::var(PASSWORD_ENV).ok();
    resolve_password_with(server, env, |user| {
        keyring::Entry::new(KEYRING_SERVICE, user)
            .and_then(|entry| entry.get_password())
            .ok()
    })
}

fn resolve_password_with(
    server: &ServerConfig,
    env: Option<String>,
    keyring_lookup: impl FnOnce(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let user = keyring_user(
        server.username.as_deref().unwrap_or_default(),
        server.url.as_deref().unwrap_or_default(),
    );

    // 1. Env var
    if let Some(pw) = env.filter(|pw| !pw.is_empty()) {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Some(pw) = keyring_lookup(&user) {
        debug!(user = %user, "password from keyring");
        return Ok(SecretString::from(pw));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = server.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials { user })
}

/// Store a password in the system keyring for `username` at `url`.
pub fn store_password(username: &str, url: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(username, url))?;
    entry.set_password(password)?;
    Ok(())
}

// ── Translation to runtime types ────────────────────────────────────

impl Config {
    /// Parsed and validated server URL.
    pub fn server_url(&self) -> Result<url::Url, ConfigError> {
        let raw = self
            .server
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| invalid("server.url", "not set"))?;
        let url: url::Url = raw
            .trim()
            .parse()
            .map_err(|e| invalid("server.url", format!("'{raw}': {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(
                "server.url",
                format!("expected an http or https URL, got scheme '{other}'"),
            )),
        }
    }

    pub fn server_timeout(&self) -> Result<Duration, ConfigError> {
        if self.server.timeout == 0 {
            return Err(invalid("server.timeout", "must be at least 1 second"));
        }
        Ok(Duration::from_secs(self.server.timeout))
    }

    /// Build a `ConnectionConfig`, resolving the password.
    pub fn connection_config(&self) -> Result<ConnectionConfig, ConfigError> {
        let url = self.server_url()?;
        let username = self
            .server
            .username
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| invalid("server.username", "not set"))?;
        let password = resolve_password(&self.server)?;

        Ok(ConnectionConfig {
            url,
            username,
            password,
            timeout: self.server_timeout()?,
        })
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            kind: self.monitor.kind,
            interval: self.monitor.interval,
            retry_interval: self.monitor.retry_interval,
            resend_interval: self.monitor.resend_interval,
            max_retries: self.monitor.max_retries,
        }
    }

    pub fn tag_categories(&self) -> TagCategories {
        TagCategories {
            layers: self.tags.layers,
            classes: self.tags.classes,
            positions: self.tags.positions,
        }
    }

    pub fn discovery_bind(&self) -> Result<Ipv4Addr, ConfigError> {
        self.discovery
            .bind
            .trim()
            .parse()
            .map_err(|e| invalid("discovery.bind", format!("'{}': {e}", self.discovery.bind)))
    }

    pub fn discovery_timeout(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.discovery.timeout)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or_else(|| {
                invalid(
                    "discovery.timeout",
                    format!("expected a positive number of seconds, got {}", self.discovery.timeout),
                )
            })
    }
}

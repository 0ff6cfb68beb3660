//! CLI configuration: thin wrapper around `mvrkuma_config`.
//!
//! Re-exports the shared types and applies `GlobalOpts` flag overrides
//! (--url, --username, --timeout, --details) on top of the loaded file.

use std::path::PathBuf;

use mvrkuma_core::{Controller, KumaConnector};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use mvrkuma_config::{
    Config, config_path, keyring_user, load_config_from, save_config_to, store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// The config file in effect: `--config`, else the default location.
pub fn active_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the config file and apply flag overrides.
///
/// Flags take priority over environment, which takes priority over the file.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config_from(&active_path(global))?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref url) = global.url {
        cfg.server.url = Some(url.clone());
    }
    if let Some(ref username) = global.username {
        cfg.server.username = Some(username.clone());
    }
    if let Some(timeout) = global.timeout {
        cfg.server.timeout = timeout;
    }
    if global.details {
        cfg.display.details = true;
    }
}

/// Build a controller for the configured server.
pub fn controller(cfg: &Config, global: &GlobalOpts) -> Result<Controller<KumaConnector>, CliError> {
    if cfg.server.url.as_deref().is_none_or(|u| u.trim().is_empty()) {
        return Err(CliError::NoConfig {
            path: active_path(global).display().to_string(),
        });
    }
    let connection = cfg.connection_config()?;
    tracing::debug!(url = %connection.url, user = %connection.username, "server configured");
    Ok(Controller::new(
        KumaConnector::new(connection),
        cfg.monitor_settings(),
    ))
}

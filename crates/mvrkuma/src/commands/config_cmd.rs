//! Config subcommand handlers.

use dialoguer::{Input, Select};

use mvrkuma_core::MonitorKind;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

const REDACTED: &str = "****";

/// Copy of the config that is safe to print.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    if cfg.server.password.is_some() {
        cfg.server.password = Some(REDACTED.into());
    }
    cfg
}

/// Format config for display in TOML layout.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    let _ = writeln!(out, "[server]");
    if let Some(ref url) = cfg.server.url {
        let _ = writeln!(out, "url = \"{url}\"");
    }
    if let Some(ref user) = cfg.server.username {
        let _ = writeln!(out, "username = \"{user}\"");
    }
    if let Some(ref pw) = cfg.server.password {
        let _ = writeln!(out, "password = \"{pw}\"");
    }
    let _ = writeln!(out, "timeout = {}", cfg.server.timeout);

    let _ = writeln!(out, "\n[discovery]");
    let _ = writeln!(out, "timeout = {}", cfg.discovery.timeout);
    let _ = writeln!(out, "bind = \"{}\"", cfg.discovery.bind);

    let _ = writeln!(out, "\n[tags]");
    let _ = writeln!(out, "layers = {}", cfg.tags.layers);
    let _ = writeln!(out, "classes = {}", cfg.tags.classes);
    let _ = writeln!(out, "positions = {}", cfg.tags.positions);

    let _ = writeln!(out, "\n[monitor]");
    let _ = writeln!(out, "kind = \"{}\"", cfg.monitor.kind);
    let _ = writeln!(out, "interval = {}", cfg.monitor.interval);
    let _ = writeln!(out, "retry_interval = {}", cfg.monitor.retry_interval);
    let _ = writeln!(out, "resend_interval = {}", cfg.monitor.resend_interval);
    let _ = writeln!(out, "max_retries = {}", cfg.monitor.max_retries);

    let _ = writeln!(out, "\n[display]");
    let _ = write!(out, "details = {}", cfg.display.details);
    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_password() -> Result<String, CliError> {
    let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if pass.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(pass)
}

/// Offer the keyring or plaintext config for the password.
///
/// Returns `Some(password)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_password_storage(
    password: &str,
    username: &str,
    url: &str,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_password(username, url, password)?;
        eprintln!("   ✓ Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(password.to_owned()))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::active_path(global);
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            eprintln!("mvrkuma configuration wizard");
            eprintln!("   Config path: {}\n", path.display());

            let mut cfg = config::load(global)?;

            let url: String = Input::new()
                .with_prompt("Uptime Kuma URL")
                .default(
                    cfg.server
                        .url
                        .clone()
                        .unwrap_or_else(|| "http://localhost:3001".into()),
                )
                .interact_text()
                .map_err(prompt_err)?;
            cfg.server.url = Some(url.trim().to_owned());
            cfg.server_url()?;

            let username: String = Input::new()
                .with_prompt("Username")
                .default(cfg.server.username.clone().unwrap_or_else(|| "admin".into()))
                .interact_text()
                .map_err(prompt_err)?;
            if username.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "username".into(),
                    reason: "username cannot be empty".into(),
                });
            }
            cfg.server.username = Some(username.trim().to_owned());

            let password = prompt_password()?;
            cfg.server.password = prompt_password_storage(
                &password,
                username.trim(),
                url.trim(),
            )?;

            let kinds = [MonitorKind::Http, MonitorKind::Ping];
            let labels = &["HTTP (GET http://<fixture ip>)", "Ping"];
            let kind = Select::new()
                .with_prompt("Monitor type")
                .items(labels)
                .default(usize::from(cfg.monitor.kind == MonitorKind::Ping))
                .interact()
                .map_err(prompt_err)?;
            cfg.monitor.kind = kinds[kind];

            config::save_config_to(&cfg, &path)?;

            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("\n  Test it: mvrkuma status");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load(global)?);
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                path.display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        // ── Set password ────────────────────────────────────────────
        ConfigCommand::SetPassword => {
            let cfg = config::load(global)?;
            let url = cfg.server_url()?;
            let username = cfg
                .server
                .username
                .clone()
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| CliError::Validation {
                    field: "server.username".into(),
                    reason: "not set; pass --username or run: mvrkuma config init".into(),
                })?;
            let raw_url = cfg.server.url.as_deref().unwrap_or(url.as_str());

            let password = prompt_password()?;
            config::store_password(&username, raw_url, &password)?;
            eprintln!(
                "✓ Password for {} stored in system keyring",
                config::keyring_user(&username, raw_url)
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_never_prints_the_password() {
        let mut cfg = Config::default();
        cfg.server.url = Some("http://kuma:3001".into());
        cfg.server.password = Some("hunter2".into());

        let text = format_config(&redacted(&cfg));
        assert!(text.contains("password = \"****\""));
        assert!(!text.contains("hunter2"));
        assert!(text.contains("url = \"http://kuma:3001\""));
    }

    #[test]
    fn keyring_only_config_has_no_password_line() {
        let text = format_config(&redacted(&Config::default()));
        assert!(!text.contains("password"));
        assert!(text.contains("[monitor]\nkind = \"http\""));
    }
}

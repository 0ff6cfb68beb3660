//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use mvrkuma_core::{DesiredState, SyncReport};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, `--yes` is mandatory.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Spinner on stderr while a server round-trip runs. Hidden when quiet
/// or when stderr is not a terminal.
pub fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Import every file into one desired state, stopping at the first
/// file that cannot be read.
pub fn load_desired(paths: &[PathBuf]) -> Result<DesiredState, CliError> {
    let mut desired = DesiredState::new();
    for path in paths {
        let summary = desired.import(path)?;
        debug!(
            path = %path.display(),
            classes = summary.classes,
            positions = summary.positions,
            "show file tags"
        );
    }
    Ok(desired)
}

/// Turn per-call failures into a non-zero exit once the report is shown.
pub fn ensure_clean(report: &SyncReport, operation: &str) -> Result<(), CliError> {
    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            operation: operation.into(),
            failed: report.failures.len(),
        })
    }
}

//! `status`: what is on the server right now.

use tabled::Tabled;

use mvrkuma_core::{ActualState, Monitor, RemoteTag};

use crate::cli::GlobalOpts;
use crate::commands::util;
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct MonitorRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

#[derive(Tabled)]
struct MonitorDetailRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Fixture UUID")]
    uuid: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
}

#[derive(Tabled)]
struct TagDetailRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "Color")]
    color: String,
}

fn monitor_target(m: &Monitor) -> String {
    m.target.clone().unwrap_or_default()
}

fn render_state(state: &ActualState, details: bool) -> String {
    let monitors = if state.monitors.is_empty() {
        "No monitors.".to_owned()
    } else if details {
        output::render_table(
            &state
                .monitors
                .iter()
                .map(|m| MonitorDetailRow {
                    id: m.id,
                    name: m.name.clone(),
                    target: monitor_target(m),
                    uuid: m.uuid.clone(),
                    tags: m.tags.join(", "),
                })
                .collect::<Vec<_>>(),
        )
    } else {
        output::render_table(
            &state
                .monitors
                .iter()
                .map(|m| MonitorRow {
                    id: m.id,
                    name: m.name.clone(),
                    target: monitor_target(m),
                    tags: m.tags.join(", "),
                })
                .collect::<Vec<_>>(),
        )
    };

    let tags = if state.tags.is_empty() {
        "No tags.".to_owned()
    } else if details {
        output::render_table(&state.tags.iter().map(tag_detail_row).collect::<Vec<_>>())
    } else {
        output::render_table(
            &state
                .tags
                .iter()
                .map(|t| TagRow {
                    id: t.id,
                    name: t.name.clone(),
                })
                .collect::<Vec<_>>(),
        )
    };

    format!(
        "Monitors ({})\n{monitors}\n\nTags ({})\n{tags}",
        state.monitors.len(),
        state.tags.len()
    )
}

fn tag_detail_row(t: &RemoteTag) -> TagDetailRow {
    TagDetailRow {
        id: t.id,
        name: t.name.clone(),
        uuid: t.uuid.clone().unwrap_or_default(),
        color: t.color.clone().unwrap_or_default(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let controller = config::controller(cfg, global)?;

    let spinner = util::spinner("Fetching monitors and tags…", global.quiet);
    let state = controller.fetch().await;
    spinner.finish_and_clear();
    let state = state?;

    let details = cfg.display.details;
    let out = output::render_single(
        &global.output,
        &state,
        |s| render_state(s, details),
        |s| {
            s.monitors
                .iter()
                .map(|m| m.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

//! `show`: what the show files would put on the server.

use serde::Serialize;
use tabled::Tabled;

use mvrkuma_core::{DesiredState, Fixture, Tag};

use crate::cli::{GlobalOpts, ShowArgs};
use crate::commands::util;
use crate::config::Config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ShowView<'a> {
    fixtures: Vec<&'a Fixture>,
    tags: Vec<&'a Tag>,
}

#[derive(Tabled)]
struct FixtureRow {
    #[tabled(rename = "Layer")]
    layer: String,
    #[tabled(rename = "Fixture")]
    name: String,
    #[tabled(rename = "IPv4")]
    ipv4: String,
    #[tabled(rename = "DMX")]
    dmx: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Position")]
    position: String,
}

#[derive(Tabled)]
struct FixtureDetailRow {
    #[tabled(rename = "Layer")]
    layer: String,
    #[tabled(rename = "Fixture")]
    name: String,
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "FixtureID")]
    fixture_id: String,
    #[tabled(rename = "IPv4")]
    ipv4: String,
    #[tabled(rename = "DMX")]
    dmx: String,
}

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Tag")]
    name: String,
    #[tabled(rename = "UUID")]
    uuid: String,
}

/// Name of the class or position a fixture points at.
fn tag_name(pool: &[Tag], uuid: Option<&str>) -> String {
    uuid.and_then(|u| pool.iter().find(|t| t.uuid == u))
        .map(|t| t.name.clone())
        .unwrap_or_default()
}

fn dmx(fixture: &Fixture) -> String {
    fixture
        .dmx_address()
        .map(|a| format!("{}.{}", a.universe, a.address))
        .unwrap_or_default()
}

fn render_desired(desired: &DesiredState, details: bool) -> String {
    let fixtures = if desired.fixture_count() == 0 {
        "No fixtures.".to_owned()
    } else if details {
        output::render_table(
            &desired
                .fixtures()
                .map(|f| FixtureDetailRow {
                    layer: f.layer_name.clone(),
                    name: f.name.clone(),
                    uuid: f.uuid.clone(),
                    fixture_id: f.fixture_id.clone().unwrap_or_default(),
                    ipv4: f.ipv4().unwrap_or_default().to_owned(),
                    dmx: dmx(f),
                })
                .collect::<Vec<_>>(),
        )
    } else {
        output::render_table(
            &desired
                .fixtures()
                .map(|f| FixtureRow {
                    layer: f.layer_name.clone(),
                    name: f.name.clone(),
                    ipv4: f.ipv4().unwrap_or_default().to_owned(),
                    dmx: dmx(f),
                    class: tag_name(&desired.classes, f.classing.as_deref()),
                    position: tag_name(&desired.positions, f.position.as_deref()),
                })
                .collect::<Vec<_>>(),
        )
    };

    let tags = output::render_table(
        &desired
            .tags()
            .map(|t| TagRow {
                category: t.category.to_string(),
                name: t.name.clone(),
                uuid: t.uuid.clone(),
            })
            .collect::<Vec<_>>(),
    );

    let monitored = desired.fixtures().filter(|f| f.has_uuid() && f.ipv4().is_some()).count();
    format!(
        "{fixtures}\n\n{tags}\n\n{monitored} of {} fixtures have an address to monitor",
        desired.fixture_count()
    )
}

pub fn handle(args: &ShowArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let desired = util::load_desired(&args.files)?;
    let view = ShowView {
        fixtures: desired.fixtures().collect(),
        tags: desired.tags().collect(),
    };

    let details = cfg.display.details;
    let out = output::render_single(
        &global.output,
        &view,
        |_| render_desired(&desired, details),
        |v| {
            v.fixtures
                .iter()
                .map(|f| f.name.clone())
                .collect::<Vec<_>>()
                .join("\n")
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

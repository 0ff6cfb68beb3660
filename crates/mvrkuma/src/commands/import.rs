//! `import` and `tags create`: push show files to the server.

use mvrkuma_core::TagCategories;

use crate::cli::{CategoryFlags, GlobalOpts, ImportArgs, TagsArgs, TagsCommand};
use crate::commands::util;
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// Apply `--[no-]layers` style flags over the configured categories.
fn categories(base: TagCategories, flags: &CategoryFlags) -> TagCategories {
    let pick = |current: bool, on: bool, off: bool| {
        if on {
            true
        } else if off {
            false
        } else {
            current
        }
    };
    TagCategories {
        layers: pick(base.layers, flags.layers, flags.no_layers),
        classes: pick(base.classes, flags.classes, flags.no_classes),
        positions: pick(base.positions, flags.positions, flags.no_positions),
    }
}

pub async fn handle(args: ImportArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let desired = util::load_desired(&args.files)?;
    let controller = config::controller(cfg, global)?;
    let categories = categories(cfg.tag_categories(), &args.categories);

    let spinner = util::spinner(
        &format!("Importing {} fixtures…", desired.fixture_count()),
        global.quiet,
    );
    let report = controller.import(&desired, categories).await;
    spinner.finish_and_clear();
    let report = report?;

    output::print_output(&output::render_report(&global.output, &report), global.quiet);
    util::ensure_clean(&report, "import")
}

pub async fn handle_tags(args: TagsArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        TagsCommand::Create { files } => {
            let desired = util::load_desired(&files)?;
            let controller = config::controller(cfg, global)?;

            let spinner = util::spinner("Creating tags…", global.quiet);
            let report = controller.ensure_tags(&desired).await;
            spinner.finish_and_clear();
            let report = report?;

            output::print_output(&output::render_report(&global.output, &report), global.quiet);
            util::ensure_clean(&report, "tag creation")
        }
    }
}

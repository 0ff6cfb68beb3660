//! `retag`: replace the tag set of selected monitors.

use crate::cli::{GlobalOpts, RetagArgs};
use crate::commands::util;
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: RetagArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let controller = config::controller(cfg, global)?;

    if args.tags.is_empty() {
        let message = format!("Remove every tag from {} monitor(s)?", args.monitors.len());
        if !util::confirm(&message, "retag", global.yes)? {
            output::print_status("Aborted.", global.quiet);
            return Ok(());
        }
    }

    let spinner = util::spinner("Updating tags…", global.quiet);
    let report = controller.retag(&args.monitors, &args.tags).await;
    spinner.finish_and_clear();
    let report = report?;

    output::print_output(&output::render_report(&global.output, &report), global.quiet);
    util::ensure_clean(&report, "retag")
}

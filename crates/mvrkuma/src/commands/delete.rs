//! `delete monitors|tags`: remove everything, or only what show files describe.

use mvrkuma_core::{DeleteScope, DesiredState};

use crate::cli::{DeleteArgs, DeleteCommand, DeleteTarget, GlobalOpts};
use crate::commands::util;
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

fn scope_of(target: &DeleteTarget) -> Result<(DeleteScope, DesiredState), CliError> {
    if target.all {
        Ok((DeleteScope::All, DesiredState::new()))
    } else {
        let desired = util::load_desired(&target.mvr)?;
        Ok((DeleteScope::ReferencedByDesiredState, desired))
    }
}

fn prompt(what: &str, scope: DeleteScope, url: &str) -> String {
    match scope {
        DeleteScope::All => format!("Delete ALL {what} on {url}?"),
        DeleteScope::ReferencedByDesiredState => {
            format!("Delete the {what} of the given show files on {url}?")
        }
    }
}

pub async fn handle(args: DeleteArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let (what, target) = match &args.command {
        DeleteCommand::Monitors(target) => ("monitors", target),
        DeleteCommand::Tags(target) => ("tags", target),
    };
    let (scope, desired) = scope_of(target)?;
    let controller = config::controller(cfg, global)?;

    let url = controller.connector().config().url.to_string();
    if !util::confirm(&prompt(what, scope, &url), &format!("delete {what}"), global.yes)? {
        output::print_status("Aborted.", global.quiet);
        return Ok(());
    }

    let spinner = util::spinner(&format!("Deleting {what}…"), global.quiet);
    let report = match args.command {
        DeleteCommand::Monitors(_) => controller.delete_monitors(scope, &desired).await,
        DeleteCommand::Tags(_) => controller.delete_tags(scope, &desired).await,
    };
    spinner.finish_and_clear();
    let report = report?;

    output::print_output(&output::render_report(&global.output, &report), global.quiet);
    util::ensure_clean(&report, &format!("delete {what}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_the_scope() {
        assert_eq!(
            prompt("tags", DeleteScope::All, "http://kuma:3001/"),
            "Delete ALL tags on http://kuma:3001/?"
        );
        assert!(
            prompt("monitors", DeleteScope::ReferencedByDesiredState, "http://kuma/")
                .contains("show files")
        );
    }

    #[test]
    fn all_needs_no_show_files() {
        let target = DeleteTarget {
            all: true,
            mvr: Vec::new(),
        };
        let (scope, desired) = match scope_of(&target) {
            Ok(pair) => pair,
            Err(e) => panic!("{e}"),
        };
        assert_eq!(scope, DeleteScope::All);
        assert!(desired.is_empty());
    }
}

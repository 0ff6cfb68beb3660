//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod delete;
pub mod discover;
pub mod import;
pub mod merge;
pub mod retag;
pub mod show;
pub mod status;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Dispatch a command that needs the loaded config.
///
/// Server-bound handlers build their own controller, so local commands
/// (show, merge, discover) work without a configured server.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(cfg, global).await,
        Command::Show(args) => show::handle(&args, cfg, global),
        Command::Import(args) => import::handle(args, cfg, global).await,
        Command::Tags(args) => import::handle_tags(args, cfg, global).await,
        Command::Delete(args) => delete::handle(args, cfg, global).await,
        Command::Retag(args) => retag::handle(args, cfg, global).await,
        Command::Merge(args) => merge::handle(args, global),
        Command::Discover(args) => discover::handle(args, cfg, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are not dispatched".into(),
        )),
    }
}

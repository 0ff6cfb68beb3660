//! Clap derive structures for the `mvrkuma` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// mvrkuma -- keep Uptime Kuma monitors in sync with MVR show files
#[derive(Debug, Parser)]
#[command(
    name = "mvrkuma",
    version,
    about = "Monitor lighting fixtures from MVR show files in Uptime Kuma",
    long_about = "Creates one Uptime Kuma monitor per networked fixture of an MVR \
        (My Virtual Rig) show file,\ntags it with its layer, class and position, \
        and keeps the server in sync as the show evolves.\n\n\
        Also merges scanned network data into show files and discovers \
        Art-Net nodes.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "MVRKUMA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Uptime Kuma URL (overrides config)
    #[arg(long, short = 'u', env = "MVRKUMA_URL", global = true)]
    pub url: Option<String>,

    /// Uptime Kuma username (overrides config)
    #[arg(long, env = "MVRKUMA_USERNAME", global = true)]
    pub username: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "MVRKUMA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MVRKUMA_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Show uuids and ids in listings
    #[arg(long, global = true)]
    pub details: bool,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the monitors and tags on the server
    #[command(alias = "st")]
    Status,

    /// Read show files and list their layers, fixtures and tags
    Show(ShowArgs),

    /// Create tags and monitors for the fixtures of show files
    #[command(alias = "sync")]
    Import(ImportArgs),

    /// Manage tags on the server
    Tags(TagsArgs),

    /// Delete monitors or tags from the server
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// Replace the tags of selected monitors
    Retag(RetagArgs),

    /// Copy network addresses from one show file into another
    Merge(MergeArgs),

    /// Find Art-Net nodes on the network and save them as a show file
    Discover(DiscoverArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Show file arguments ──────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// MVR files to read
    #[arg(required = true, value_name = "MVR")]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// MVR files to import
    #[arg(required = true, value_name = "MVR")]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub categories: CategoryFlags,
}

/// Per-run overrides of the `[tags]` config section.
#[derive(Debug, Args)]
pub struct CategoryFlags {
    /// Tag monitors with their layer
    #[arg(long, overrides_with = "no_layers")]
    pub layers: bool,
    /// Do not tag monitors with their layer
    #[arg(long, overrides_with = "layers")]
    pub no_layers: bool,

    /// Tag monitors with their class
    #[arg(long, overrides_with = "no_classes")]
    pub classes: bool,
    /// Do not tag monitors with their class
    #[arg(long, overrides_with = "classes")]
    pub no_classes: bool,

    /// Tag monitors with their position
    #[arg(long, overrides_with = "no_positions")]
    pub positions: bool,
    /// Do not tag monitors with their position
    #[arg(long, overrides_with = "positions")]
    pub no_positions: bool,
}

// ── Tags ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TagsArgs {
    #[command(subcommand)]
    pub command: TagsCommand,
}

#[derive(Debug, Subcommand)]
pub enum TagsCommand {
    /// Create the layer, class and position tags of show files
    Create {
        /// MVR files to read tags from
        #[arg(required = true, value_name = "MVR")]
        files: Vec<PathBuf>,
    },
}

// ── Delete ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[command(subcommand)]
    pub command: DeleteCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeleteCommand {
    /// Delete monitors
    Monitors(DeleteTarget),
    /// Delete tags
    Tags(DeleteTarget),
}

#[derive(Debug, Args)]
pub struct DeleteTarget {
    /// Delete everything on the server
    #[arg(long, conflicts_with = "mvr", required_unless_present = "mvr")]
    pub all: bool,

    /// Delete only what these show files would create
    #[arg(long, value_name = "MVR", num_args = 1..)]
    pub mvr: Vec<PathBuf>,
}

// ── Retag ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RetagArgs {
    /// Monitor id (repeatable)
    #[arg(long = "monitor", short = 'm', value_name = "ID", required = true, num_args = 1..)]
    pub monitors: Vec<u64>,

    /// Tag name the monitors should end up with (repeatable; none clears)
    #[arg(long = "tag", short = 't', value_name = "NAME", num_args = 1..)]
    pub tags: Vec<String>,
}

// ── Merge ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Show file that receives the networks
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Show file that provides the networks (e.g. a discovery export)
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Output file [default: merged_with_network.mvr]
    #[arg(long = "out", value_name = "OUT")]
    pub out: Option<PathBuf>,
}

// ── Discover ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Local IPv4 address to poll from (overrides config)
    #[arg(long)]
    pub bind: Option<Ipv4Addr>,

    /// Seconds to wait for replies (overrides config)
    #[arg(long = "scan-timeout", value_name = "SECS")]
    pub scan_timeout: Option<f64>,

    /// Output file [default: discovered_devices.mvr]
    #[arg(long = "out", value_name = "OUT")]
    pub out: Option<PathBuf>,

    /// List the devices without writing a show file
    #[arg(long)]
    pub no_save: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init,

    /// Display the resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Store the server password in the system keyring
    SetPassword,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

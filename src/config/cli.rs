use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use uuid::Uuid;

/// Command-line arguments for the static-export binary.
#[derive(Debug, Parser)]
#[command(
    name = "static-export",
    version,
    about = "Purge and rebuild statically exported site pages"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "STATIC_EXPORT_CONFIG_FILE",
        value_name = "PATH"
    )]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Purge the exported copies of resources changed by a publish.
    Purge(PurgeArgs),
    /// Export every exportable resource once.
    Launch(LaunchArgs),
    /// Export periodically until interrupted.
    Schedule(ScheduleArgs),
    /// Report whether repository paths are exportable and where they land.
    Check(CheckArgs),
}

impl Command {
    pub fn overrides(&self) -> &ExportOverrides {
        match self {
            Command::Purge(args) => &args.overrides,
            Command::Launch(args) => &args.overrides,
            Command::Schedule(args) => &args.overrides,
            Command::Check(args) => &args.overrides,
        }
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct ExportOverrides {
    /// Override the directory exported files are written to.
    #[arg(long = "export-root", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub export_root: Option<PathBuf>,

    /// Override the directory resources are rendered from.
    #[arg(long = "source-root", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub source_root: Option<PathBuf>,

    /// Override the purge strategy (none|subtree_html|multi_language).
    #[arg(long = "strategy", value_name = "STRATEGY")]
    pub strategy: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct PurgeArgs {
    #[command(flatten)]
    pub overrides: ExportOverrides,

    /// Identifier of the publish; a fresh one is generated when omitted.
    #[arg(long = "publish-id", value_name = "UUID")]
    pub publish_id: Option<Uuid>,

    /// Repository paths changed by the publish.
    #[arg(
        long = "resource",
        value_name = "VFS_PATH",
        required = true,
        num_args = 1..
    )]
    pub resources: Vec<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct LaunchArgs {
    #[command(flatten)]
    pub overrides: ExportOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub overrides: ExportOverrides,

    /// Override the export cadence.
    #[arg(long = "scheduler-cadence-seconds", value_name = "SECONDS")]
    pub scheduler_cadence_seconds: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub overrides: ExportOverrides,

    /// Repository paths to check.
    #[arg(value_name = "VFS_PATH", required = true)]
    pub paths: Vec<String>,
}

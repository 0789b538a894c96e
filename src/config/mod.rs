//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::domain::types::Locale;
use crate::export::{ExportRule, StrategyKind};

mod cli;

pub use cli::{
    CheckArgs, CliArgs, Command, ExportOverrides, LaunchArgs, PurgeArgs, ScheduleArgs,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "static-export";
const ENV_PREFIX: &str = "STATIC_EXPORT";
const DEFAULT_EXPORT_ROOT: &str = "export";
const DEFAULT_SOURCE_ROOT: &str = "site";
const DEFAULT_VFS_PREFIX: &str = "/";
const DEFAULT_CHECK_RESOURCE: &str = "/export-check.html";
const DEFAULT_LOCALE: &str = "en";
const DEFAULT_SCHEDULER_CADENCE_SECS: u64 = 3600;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub export: ExportSettings,
    pub scheduler: SchedulerSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Directory exported files live in.
    pub root: PathBuf,
    /// Directory resources are rendered from by the mirror renderer.
    pub source_root: PathBuf,
    /// Leading part of every repository path that maps onto `root`.
    pub vfs_prefix: String,
    pub strategy: StrategyKind,
    /// Exportable areas, as regular expressions over repository paths.
    pub folders: Vec<String>,
    pub check_resource: String,
    pub default_locales: Vec<Locale>,
    pub rules: Vec<ExportRule>,
}

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub cadence: Duration,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    load_layered(
        cli,
        Environment::with_prefix(ENV_PREFIX).separator("__"),
    )
}

fn load_layered(cli: &CliArgs, environment: Environment) -> Result<Settings, LoadError> {
    let builder = file_sources(cli).add_source(environment);
    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    raw.apply_export_overrides(cli.command.overrides());
    if let Command::Schedule(args) = &cli.command
        && let Some(cadence) = args.scheduler_cadence_seconds
    {
        raw.scheduler.cadence_seconds = Some(cadence);
    }

    Settings::from_raw(raw)
}

fn file_sources(cli: &CliArgs) -> ConfigBuilder<DefaultState> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }
    builder
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    export: RawExportSettings,
    scheduler: RawSchedulerSettings,
}

impl RawSettings {
    fn apply_export_overrides(&mut self, overrides: &ExportOverrides) {
        if let Some(root) = overrides.export_root.as_ref() {
            self.export.root = Some(root.clone());
        }
        if let Some(root) = overrides.source_root.as_ref() {
            self.export.source_root = Some(root.clone());
        }
        if let Some(strategy) = overrides.strategy.as_ref() {
            self.export.strategy = Some(strategy.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            export,
            scheduler,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let export = build_export_settings(export)?;
        let scheduler = build_scheduler_settings(scheduler)?;

        Ok(Self {
            logging,
            export,
            scheduler,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_export_settings(export: RawExportSettings) -> Result<ExportSettings, LoadError> {
    let root = non_empty_path(export.root, DEFAULT_EXPORT_ROOT, "export.root")?;
    let source_root = non_empty_path(
        export.source_root,
        DEFAULT_SOURCE_ROOT,
        "export.source_root",
    )?;

    let vfs_prefix = export
        .vfs_prefix
        .unwrap_or_else(|| DEFAULT_VFS_PREFIX.to_string());
    if !vfs_prefix.starts_with('/') {
        return Err(LoadError::invalid(
            "export.vfs_prefix",
            "must start with `/`",
        ));
    }

    let strategy = match export.strategy {
        Some(value) => StrategyKind::parse(&value).ok_or_else(|| {
            LoadError::invalid(
                "export.strategy",
                format!("unknown strategy `{value}` (expected none|subtree_html|multi_language)"),
            )
        })?,
        None => StrategyKind::default(),
    };

    let check_resource = export
        .check_resource
        .unwrap_or_else(|| DEFAULT_CHECK_RESOURCE.to_string());
    if check_resource.trim().is_empty() {
        return Err(LoadError::invalid(
            "export.check_resource",
            "must not be empty",
        ));
    }

    let default_locales = export
        .default_locales
        .unwrap_or_else(|| vec![DEFAULT_LOCALE.to_string()])
        .into_iter()
        .map(|value| {
            Locale::new(value)
                .map_err(|err| LoadError::invalid("export.default_locales", err.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if default_locales.is_empty() {
        return Err(LoadError::invalid(
            "export.default_locales",
            "at least one default locale is required",
        ));
    }

    let rules = export
        .rules
        .into_iter()
        .map(|rule| {
            let locale = Locale::new(rule.locale)
                .map_err(|err| LoadError::invalid("export.rules.locale", err.to_string()))?;
            ExportRule::new(locale, &rule.source, rule.target)
                .map_err(|err| LoadError::invalid("export.rules", err.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExportSettings {
        root,
        source_root,
        vfs_prefix,
        strategy,
        folders: export.folders,
        check_resource,
        default_locales,
        rules,
    })
}

fn build_scheduler_settings(
    scheduler: RawSchedulerSettings,
) -> Result<SchedulerSettings, LoadError> {
    let cadence_seconds = scheduler
        .cadence_seconds
        .unwrap_or(DEFAULT_SCHEDULER_CADENCE_SECS);
    if cadence_seconds == 0 {
        return Err(LoadError::invalid(
            "scheduler.cadence_seconds",
            "must be greater than zero",
        ));
    }

    Ok(SchedulerSettings {
        cadence: Duration::from_secs(cadence_seconds),
    })
}

fn non_empty_path(
    value: Option<PathBuf>,
    default: &str,
    key: &'static str,
) -> Result<PathBuf, LoadError> {
    let path = value.unwrap_or_else(|| PathBuf::from(default));
    if path.as_os_str().is_empty() {
        return Err(LoadError::invalid(key, "path must not be empty"));
    }
    Ok(path)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawExportSettings {
    root: Option<PathBuf>,
    source_root: Option<PathBuf>,
    vfs_prefix: Option<String>,
    strategy: Option<String>,
    folders: Vec<String>,
    check_resource: Option<String>,
    default_locales: Option<Vec<String>>,
    rules: Vec<RawExportRule>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawExportRule {
    locale: String,
    source: String,
    target: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSchedulerSettings {
    cadence_seconds: Option<u64>,
}

#[cfg(test)]
mod tests;

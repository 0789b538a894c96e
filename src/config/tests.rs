use std::fs;

use super::*;

fn environment(vars: &[(&str, &str)]) -> Environment {
    let map: config::Map<String, String> = vars
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .source(Some(map))
}

const FILE_SETTINGS: &str = r#"
[logging]
level = "warn"

[export]
root = "/srv/file-export"
strategy = "subtree_html"
folders = ["/sites/.*"]
default_locales = ["en", "de"]

[[export.rules]]
locale = "de"
source = "^/srv/file-export/(.*)$"
target = "/srv/file-export/de/$1"

[[export.rules]]
locale = "fr"
source = "^/srv/file-export/(.*)$"
target = "/srv/file-export/fr/$1"

[scheduler]
cadence_seconds = 60
"#;

fn with_config_file(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("static-export.toml");
    fs::write(&path, contents).expect("write config file");
    (dir, path)
}

#[test]
fn defaults_are_valid() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(settings.export.root, PathBuf::from(DEFAULT_EXPORT_ROOT));
    assert_eq!(settings.export.strategy, StrategyKind::None);
    assert_eq!(settings.export.check_resource, DEFAULT_CHECK_RESOURCE);
    assert_eq!(settings.export.default_locales.len(), 1);
    assert!(settings.export.rules.is_empty());
    assert_eq!(
        settings.scheduler.cadence,
        Duration::from_secs(DEFAULT_SCHEDULER_CADENCE_SECS)
    );
}

#[test]
fn file_settings_are_loaded() {
    let (_dir, path) = with_config_file(FILE_SETTINGS);
    let args = CliArgs::parse_from([
        "static-export",
        "--config-file",
        path.to_str().expect("utf-8 path"),
        "launch",
    ]);

    let settings = load_layered(&args, environment(&[])).expect("settings load");

    assert_eq!(settings.logging.level, LevelFilter::WARN);
    assert_eq!(settings.export.root, PathBuf::from("/srv/file-export"));
    assert_eq!(settings.export.strategy, StrategyKind::SubtreeHtml);
    assert_eq!(settings.export.folders, ["/sites/.*"]);
    assert_eq!(settings.export.rules.len(), 2);
    assert_eq!(settings.scheduler.cadence, Duration::from_secs(60));
}

#[test]
fn environment_overrides_file_and_cli_overrides_environment() {
    let (_dir, path) = with_config_file(FILE_SETTINGS);
    let env = [
        ("STATIC_EXPORT__EXPORT__STRATEGY", "multi_language"),
        ("STATIC_EXPORT__EXPORT__ROOT", "/srv/env-export"),
    ];

    let args = CliArgs::parse_from([
        "static-export",
        "--config-file",
        path.to_str().expect("utf-8 path"),
        "launch",
    ]);
    let settings = load_layered(&args, environment(&env)).expect("settings load");
    assert_eq!(settings.export.strategy, StrategyKind::MultiLanguage);
    assert_eq!(settings.export.root, PathBuf::from("/srv/env-export"));

    let args = CliArgs::parse_from([
        "static-export",
        "--config-file",
        path.to_str().expect("utf-8 path"),
        "launch",
        "--strategy",
        "none",
        "--log-level",
        "debug",
    ]);
    let settings = load_layered(&args, environment(&env)).expect("settings load");
    assert_eq!(settings.export.strategy, StrategyKind::None);
    assert_eq!(settings.export.root, PathBuf::from("/srv/env-export"));
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn schedule_cadence_can_be_overridden_via_cli() {
    let args = CliArgs::parse_from([
        "static-export",
        "schedule",
        "--scheduler-cadence-seconds",
        "15",
    ]);

    let settings = load_layered(&args, environment(&[])).expect("settings load");
    assert_eq!(settings.scheduler.cadence, Duration::from_secs(15));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ExportOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_export_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn unknown_strategy_is_rejected() {
    let mut raw = RawSettings::default();
    raw.export.strategy = Some("everything".to_string());

    let err = Settings::from_raw(raw).expect_err("strategy must be known");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "export.strategy",
            ..
        }
    ));
}

#[test]
fn invalid_rule_pattern_is_rejected() {
    let mut raw = RawSettings::default();
    raw.export.rules.push(RawExportRule {
        locale: "de".to_string(),
        source: "^/srv/(unclosed$".to_string(),
        target: "/srv/de/$1".to_string(),
    });

    let err = Settings::from_raw(raw).expect_err("rule must compile");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "export.rules",
            ..
        }
    ));
}

#[test]
fn zero_cadence_is_rejected() {
    let mut raw = RawSettings::default();
    raw.scheduler.cadence_seconds = Some(0);

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn parse_purge_arguments() {
    let args = CliArgs::parse_from([
        "static-export",
        "purge",
        "--publish-id",
        "67e55044-10b1-426f-9247-bb680e5fe0c8",
        "--resource",
        "/sites/index.html",
        "/sites/news/",
        "--export-root",
        "/tmp/export",
    ]);

    match args.command {
        Command::Purge(purge) => {
            assert_eq!(
                purge.publish_id.map(|id| id.to_string()).as_deref(),
                Some("67e55044-10b1-426f-9247-bb680e5fe0c8")
            );
            assert_eq!(purge.resources, ["/sites/index.html", "/sites/news/"]);
            assert_eq!(
                purge.overrides.export_root.as_deref(),
                Some(std::path::Path::new("/tmp/export"))
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_check_arguments() {
    let args = CliArgs::parse_from(["static-export", "check", "/a.html", "/b/"]);

    match args.command {
        Command::Check(check) => assert_eq!(check.paths, ["/a.html", "/b/"]),
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn purge_requires_resources() {
    let result = CliArgs::try_parse_from(["static-export", "purge"]);
    assert!(result.is_err());
}

use std::{process, sync::Arc};

use static_export::{
    application::{
        error::{AppError, ErrorReport},
        jobs::{ExportContext, ScheduledExport, spawn_schedule},
        repos::ExportManager,
    },
    config,
    export::{ReportSink, StdoutReport},
    infra::{
        error::InfraError,
        manager::{ConfiguredExportManager, ConfiguredLocales},
        mirror::MirrorRenderer,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(i32::from(error.exit_code()));
    }
}

fn report_application_error(error: &AppError) {
    let report = ErrorReport::from_error("static-export", error);
    if dispatcher::has_been_set() {
        error!(source = report.source, error = %report, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(source = report.source, error = %report, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;
    let runtime = build_runtime(&settings)?;

    match cli_args.command {
        config::Command::Purge(args) => run_purge(&runtime, args).await,
        config::Command::Launch(_) => run_launch(&runtime).await,
        config::Command::Schedule(_) => run_schedule(&runtime, &settings).await,
        config::Command::Check(args) => run_check(&runtime, args),
    }
}

struct Runtime {
    manager: Arc<ConfiguredExportManager>,
    context: ExportContext,
}

fn build_runtime(settings: &config::Settings) -> Result<Runtime, AppError> {
    let export = &settings.export;
    let manager = Arc::new(ConfiguredExportManager::new(export)?);
    let renderer = Arc::new(MirrorRenderer::new(
        export.source_root.clone(),
        export.vfs_prefix.clone(),
    ));
    let locales = ConfiguredLocales::new(export.default_locales.clone());

    let manager_dyn: Arc<dyn ExportManager> = manager.clone();
    let context = ExportContext::new(manager_dyn, &locales, renderer, export.strategy);

    info!(
        target = "static_export::bootstrap",
        root = %export.root.display(),
        strategy = export.strategy.as_str(),
        patterns = manager.matcher().len(),
        rules = context.registry.len(),
        "export runtime ready"
    );

    Ok(Runtime { manager, context })
}

async fn run_purge(runtime: &Runtime, args: config::PurgeArgs) -> Result<(), AppError> {
    let publish_id = args.publish_id.unwrap_or_else(Uuid::new_v4);
    runtime
        .manager
        .record_publish_as(publish_id, args.resources);

    let summary = runtime
        .context
        .handler
        .perform_event_publish_project(publish_id, Some(&StdoutReport))
        .await;

    if summary.failed > 0 {
        warn!(
            target = "static_export::purge",
            %publish_id,
            failed = summary.failed,
            "purge left stale files behind"
        );
    }
    Ok(())
}

async fn run_launch(runtime: &Runtime) -> Result<(), AppError> {
    let job = ScheduledExport::new(runtime.context.clone());
    job.launch(Some(&StdoutReport)).await;
    Ok(())
}

async fn run_schedule(runtime: &Runtime, settings: &config::Settings) -> Result<(), AppError> {
    let cadence = settings.scheduler.cadence;
    let job = Arc::new(ScheduledExport::new(runtime.context.clone()));
    let handle = spawn_schedule(job, cadence);

    info!(
        target = "static_export::schedule",
        cadence_secs = cadence.as_secs(),
        "scheduled export running; press Ctrl-C to stop"
    );

    let result = tokio::signal::ctrl_c()
        .await
        .map_err(|err| AppError::from(InfraError::from(err)));

    handle.abort();
    let _ = handle.await;
    info!(target = "static_export::schedule", "scheduled export stopped");

    result
}

fn run_check(runtime: &Runtime, args: config::CheckArgs) -> Result<(), AppError> {
    let report = StdoutReport;
    let strategy = runtime.context.handler.strategy();

    for vfs_path in &args.paths {
        match runtime.manager.export_file_name(vfs_path) {
            Ok(Some(export_file)) => {
                report.info(&format!("{vfs_path} -> {}", export_file.display()));
                for related in strategy.related_files(&export_file, vfs_path) {
                    report.info(&format!("  related ({}): {}", strategy.name(), related.display()));
                }
            }
            Ok(None) => report.warn(&format!("{vfs_path} is not exportable")),
            Err(err) => report.error(&err.to_string()),
        }
    }
    Ok(())
}

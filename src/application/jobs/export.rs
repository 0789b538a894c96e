//! Full-site export, run once or on a fixed cadence.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::export::{ExportError, LogReport, ReportSink};

use super::context::ExportContext;

const METRIC_LAUNCH_WRITTEN: &str = "static_export_launch_written_total";
const METRIC_LAUNCH_MS: &str = "static_export_launch_ms";

/// Counters for one full export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// The export did not run because a purge was in progress.
    pub deferred: bool,
    pub resources: usize,
    pub written: usize,
    pub failed: usize,
    /// Resources outside every exportable area or without an export path.
    pub skipped: usize,
    /// Internal links found in the written units.
    pub internal_links: usize,
}

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.deferred {
            return f.write_str("deferred");
        }
        write!(
            f,
            "resources: {}, written: {}, failed: {}, skipped: {}, internal links: {}",
            self.resources, self.written, self.failed, self.skipped, self.internal_links
        )
    }
}

/// Renders every exportable resource and writes it below the export root.
pub struct ScheduledExport {
    context: ExportContext,
}

impl ScheduledExport {
    pub fn new(context: ExportContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &ExportContext {
        &self.context
    }

    /// Run one full export.
    ///
    /// Failures are written to `report` (or the process log) and counted; the
    /// export itself never fails.
    pub async fn launch(&self, report: Option<&dyn ReportSink>) -> ExportSummary {
        let report = report.unwrap_or(&LogReport);
        let mut summary = ExportSummary::default();

        if self.context.handler.is_busy() {
            summary.deferred = true;
            report.warn("export deferred: a publish purge is in progress");
            return summary;
        }

        let started_at = Instant::now();
        let resources = match self.context.renderer.exportable_resources().await {
            Ok(resources) => resources,
            Err(err) => {
                report.error(&format!("cannot list exportable resources: {err}"));
                return summary;
            }
        };

        info!(
            target = "static_export::application::jobs::export",
            resources = resources.len(),
            "export starting"
        );

        for vfs_path in &resources {
            summary.resources += 1;
            self.export_resource(vfs_path, report, &mut summary).await;
        }

        counter!(METRIC_LAUNCH_WRITTEN).increment(summary.written as u64);
        histogram!(METRIC_LAUNCH_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);

        info!(
            target = "static_export::application::jobs::export",
            summary = %summary,
            "export complete"
        );
        report.info(&format!("export finished ({summary})"));
        summary
    }

    async fn export_resource(
        &self,
        vfs_path: &str,
        report: &dyn ReportSink,
        summary: &mut ExportSummary,
    ) {
        let export_file = match self.context.manager.export_file_name(vfs_path) {
            Ok(Some(path)) => path,
            Ok(None) => {
                debug!(
                    target = "static_export::application::jobs::export",
                    vfs_path, "resource is not exportable"
                );
                summary.skipped += 1;
                return;
            }
            Err(err) => {
                report.error(&err.to_string());
                summary.skipped += 1;
                return;
            }
        };

        let unit = match self.context.renderer.render(vfs_path).await {
            Ok(unit) => unit,
            Err(err) => {
                report.error(&err.to_string());
                summary.failed += 1;
                return;
            }
        };

        match write_export(&export_file, &unit.content).await {
            Ok(()) => {
                summary.written += 1;
                summary.internal_links += unit.links.internal_links().count();
                report.info(&format!("exported {vfs_path} to {}", export_file.display()));
            }
            Err(err) => {
                summary.failed += 1;
                report.error(&err.to_string());
            }
        }
    }
}

async fn write_export(path: &Path, content: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| ExportError::io(parent, err))?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|err| ExportError::io(path, err))
}

/// Launch `job` every `cadence`, starting one cadence from now.
pub fn spawn_schedule(job: Arc<ScheduledExport>, cadence: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cadence);
        interval.tick().await; // Skip the first immediate tick
        loop {
            interval.tick().await;
            let summary = job.launch(None).await;
            debug!(
                target = "static_export::application::jobs::export",
                summary = %summary,
                "scheduled export ran"
            );
        }
    })
}

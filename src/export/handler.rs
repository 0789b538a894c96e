//! Publish-triggered purge orchestration.
//!
//! For every resource of a publish the handler resolves the exported file,
//! asks the configured strategy for related files and deletes all of them.
//! Purging is best effort: every failure is reported and the run carries on.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::application::repos::ExportManager;

use super::error::ExportError;
use super::prefix_filter::PrefixFileFilter;
use super::report::{LogReport, ReportSink};
use super::strategy::RelatedFiles;

const METRIC_PURGE_DELETED: &str = "static_export_purge_deleted_total";
const METRIC_PURGE_FAILED: &str = "static_export_purge_failed_total";
const METRIC_PURGE_MS: &str = "static_export_purge_ms";

/// Counters for one purge run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeSummary {
    /// Resources listed by the publish.
    pub resources: usize,
    /// Files deleted.
    pub purged: usize,
    /// Deletions that found nothing on disk.
    pub missing: usize,
    /// Deletions that failed for any other reason.
    pub failed: usize,
    /// Resources that were not exportable or could not be resolved.
    pub skipped: usize,
}

impl fmt::Display for PurgeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "resources: {}, purged: {}, missing: {}, failed: {}, skipped: {}",
            self.resources, self.purged, self.missing, self.failed, self.skipped
        )
    }
}

/// Purges exported files after a publish.
pub struct ExportHandler {
    manager: Arc<dyn ExportManager>,
    strategy: Arc<dyn RelatedFiles>,
    active_runs: AtomicUsize,
}

impl ExportHandler {
    pub fn new(manager: Arc<dyn ExportManager>, strategy: Arc<dyn RelatedFiles>) -> Self {
        Self {
            manager,
            strategy,
            active_runs: AtomicUsize::new(0),
        }
    }

    pub fn strategy(&self) -> &Arc<dyn RelatedFiles> {
        &self.strategy
    }

    pub fn manager(&self) -> &Arc<dyn ExportManager> {
        &self.manager
    }

    /// Whether a purge run is currently in progress.
    ///
    /// Advisory: a full export checks it before starting, nothing blocks on it.
    pub fn is_busy(&self) -> bool {
        self.active_runs.load(Ordering::SeqCst) > 0
    }

    /// Purge everything the publish `publish_id` made stale.
    ///
    /// Lines go to `report`, or to the process log when it is `None`. The run
    /// never fails; the returned summary says what happened.
    #[instrument(skip(self, report), fields(strategy = self.strategy.name()))]
    pub async fn perform_event_publish_project(
        &self,
        publish_id: Uuid,
        report: Option<&dyn ReportSink>,
    ) -> PurgeSummary {
        let _run = RunToken::acquire(&self.active_runs);
        let started_at = Instant::now();
        let report = report.unwrap_or(&LogReport);
        let mut summary = PurgeSummary::default();

        let resources = match self.manager.published_resources(publish_id).await {
            Ok(resources) => resources,
            Err(err) => {
                report.error(&format!(
                    "cannot list resources of publish {publish_id}: {err}"
                ));
                return summary;
            }
        };

        info!(
            target = "static_export::export::handler",
            %publish_id,
            resources = resources.len(),
            "purge starting"
        );

        for vfs_path in &resources {
            summary.resources += 1;
            self.purge_resource(vfs_path, report, &mut summary).await;
        }

        counter!(METRIC_PURGE_DELETED).increment(summary.purged as u64);
        counter!(METRIC_PURGE_FAILED).increment(summary.failed as u64);
        histogram!(METRIC_PURGE_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);

        info!(
            target = "static_export::export::handler",
            %publish_id,
            summary = %summary,
            "purge complete"
        );
        report.info(&format!("purge of publish {publish_id} finished ({summary})"));

        summary
    }

    async fn purge_resource(
        &self,
        vfs_path: &str,
        report: &dyn ReportSink,
        summary: &mut PurgeSummary,
    ) {
        let export_file = match self.manager.export_file_name(vfs_path) {
            Ok(Some(path)) => path,
            Ok(None) => {
                debug!(
                    target = "static_export::export::handler",
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

        let is_folder = vfs_path.ends_with('/');
        for primary in primary_candidates(&export_file, vfs_path) {
            let related = self
                .strategy
                .related_files(&primary, vfs_path)
                .into_iter()
                .filter(|related| related != &primary);
            let targets: Vec<PathBuf> = std::iter::once(primary.clone()).chain(related).collect();

            for target in targets {
                // Directories standing for a folder stay; only their files are purged.
                if is_folder && target.is_dir() {
                    debug!(
                        target = "static_export::export::handler",
                        vfs_path,
                        path = %target.display(),
                        "keeping folder directory"
                    );
                    continue;
                }
                delete_file(&target, report, summary).await;
            }
        }
    }
}

/// Existing export files standing for `export_file`.
///
/// A missing file whose extension is unknown up front is looked up by its
/// name without extension; missing folders have nothing to purge.
fn primary_candidates(export_file: &Path, vfs_path: &str) -> Vec<PathBuf> {
    if export_file.symlink_metadata().is_ok() {
        return vec![export_file.to_path_buf()];
    }
    if vfs_path.ends_with('/') {
        return Vec::new();
    }
    PrefixFileFilter::new(export_file.with_extension("")).matching_files()
}

async fn delete_file(path: &Path, report: &dyn ReportSink, summary: &mut PurgeSummary) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            summary.purged += 1;
            report.info(&format!("purged {}", path.display()));
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            summary.missing += 1;
            report.warn(&format!("nothing to purge at {}", path.display()));
        }
        Err(source) => {
            summary.failed += 1;
            let error = ExportError::Deletion {
                path: path.to_path_buf(),
                source,
            };
            report.error(&error.to_string());
        }
    }
}

/// Marks a run as active for as long as it is alive.
struct RunToken<'a> {
    active: &'a AtomicUsize,
}

impl<'a> RunToken<'a> {
    fn acquire(active: &'a AtomicUsize) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self { active }
    }
}

impl Drop for RunToken<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

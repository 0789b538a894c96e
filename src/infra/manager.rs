//! Settings-backed export manager and locale policy.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::application::repos::{ExportManager, LocaleManager, RepoError};
use crate::config::ExportSettings;
use crate::domain::types::Locale;
use crate::export::lock::Guarded;
use crate::export::{ExportError, ExportRule, FolderMatcher};

/// Maps repository paths below `vfs_prefix` onto files below the export root.
///
/// Publishes are recorded in memory by whoever drives the purge and handed
/// back once by id; a purged publish is forgotten.
#[derive(Debug)]
pub struct ConfiguredExportManager {
    root: PathBuf,
    vfs_prefix: String,
    matcher: FolderMatcher,
    rules: Vec<ExportRule>,
    publishes: Guarded<HashMap<Uuid, Vec<String>>>,
}

impl ConfiguredExportManager {
    pub fn new(settings: &ExportSettings) -> Result<Self, ExportError> {
        let matcher = FolderMatcher::new(&settings.folders, &settings.check_resource)?;
        Ok(Self::from_parts(
            settings.root.clone(),
            settings.vfs_prefix.clone(),
            matcher,
            settings.rules.clone(),
        ))
    }

    pub fn from_parts(
        root: PathBuf,
        vfs_prefix: impl Into<String>,
        matcher: FolderMatcher,
        rules: Vec<ExportRule>,
    ) -> Self {
        Self {
            root,
            vfs_prefix: vfs_prefix.into(),
            matcher,
            rules,
            publishes: Guarded::new("infra::manager", HashMap::new()),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn matcher(&self) -> &FolderMatcher {
        &self.matcher
    }

    /// Remember the resources of a new publish and return its id.
    pub fn record_publish<I, S>(&self, resources: I) -> Uuid
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let publish_id = Uuid::new_v4();
        self.record_publish_as(publish_id, resources);
        publish_id
    }

    /// Remember the resources of the publish `publish_id`, replacing any
    /// earlier record under the same id.
    pub fn record_publish_as<I, S>(&self, publish_id: Uuid, resources: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let resources: Vec<String> = resources.into_iter().map(Into::into).collect();
        debug!(
            target = "static_export::infra::manager",
            %publish_id,
            resources = resources.len(),
            "publish recorded"
        );
        self.publishes.lock("record_publish").insert(publish_id, resources);
    }
}

#[async_trait]
impl ExportManager for ConfiguredExportManager {
    async fn published_resources(&self, publish_id: Uuid) -> Result<Vec<String>, RepoError> {
        self.publishes
            .lock("published_resources")
            .remove(&publish_id)
            .ok_or(RepoError::PublishNotFound(publish_id))
    }

    fn export_file_name(&self, vfs_path: &str) -> Result<Option<PathBuf>, ExportError> {
        if !self.matcher.is_match(vfs_path) {
            return Ok(None);
        }

        let relative = vfs_path.strip_prefix(self.vfs_prefix.as_str()).ok_or_else(|| {
            ExportError::resolution(
                vfs_path,
                format!("path is outside the export prefix `{}`", self.vfs_prefix),
            )
        })?;
        if relative.split('/').any(|segment| segment == "..") {
            return Err(ExportError::resolution(
                vfs_path,
                "parent directory segments are not allowed",
            ));
        }

        let relative = relative.trim_matches('/');
        if relative.is_empty() {
            return Ok(Some(self.root.clone()));
        }
        Ok(Some(
            relative
                .split('/')
                .filter(|segment| !segment.is_empty())
                .fold(self.root.clone(), |path, segment| path.join(segment)),
        ))
    }

    fn rules(&self) -> &[ExportRule] {
        &self.rules
    }
}

/// Fixed locale policy read from settings.
#[derive(Debug, Clone)]
pub struct ConfiguredLocales {
    defaults: Vec<Locale>,
}

impl ConfiguredLocales {
    pub fn new(defaults: Vec<Locale>) -> Self {
        Self { defaults }
    }
}

impl LocaleManager for ConfiguredLocales {
    fn default_locales(&self) -> Vec<Locale> {
        self.defaults.clone()
    }
}

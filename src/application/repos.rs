//! Collaborator traits the export core reads from.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::links::LinkTable;
use crate::domain::types::Locale;
use crate::export::{ExportError, ExportRule};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("publish `{0}` not found")]
    PublishNotFound(Uuid),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Resolves repository paths to their exported copies.
#[async_trait]
pub trait ExportManager: Send + Sync {
    /// Repository paths touched by the given publish transaction.
    async fn published_resources(&self, publish_id: Uuid) -> Result<Vec<String>, RepoError>;

    /// Physical export path for `vfs_path`.
    ///
    /// `Ok(None)` means the path lies outside every exportable area.
    fn export_file_name(&self, vfs_path: &str) -> Result<Option<PathBuf>, ExportError>;

    /// Configured export rules, in configuration order.
    fn rules(&self) -> &[ExportRule];
}

/// Supplies the site's locale policy.
pub trait LocaleManager: Send + Sync {
    fn default_locales(&self) -> Vec<Locale>;
}

/// Output of rendering one resource.
#[derive(Debug, Clone, Default)]
pub struct RenderedUnit {
    pub content: Vec<u8>,
    pub links: LinkTable,
}

/// Produces exportable output for repository resources.
#[async_trait]
pub trait SiteRenderer: Send + Sync {
    async fn exportable_resources(&self) -> Result<Vec<String>, RepoError>;

    async fn render(&self, vfs_path: &str) -> Result<RenderedUnit, ExportError>;
}

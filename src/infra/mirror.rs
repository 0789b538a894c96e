//! Renderer that exports resources straight from a source tree.

use std::cell::RefCell;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use async_trait::async_trait;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use tracing::{debug, warn};
use url::Url;
use walkdir::WalkDir;

use crate::application::repos::{RenderedUnit, RepoError, SiteRenderer};
use crate::domain::links::{LinkKind, LinkTable};
use crate::export::ExportError;

/// Serves each repository path from the file of the same relative name below
/// `source_root`. HTML pages are scanned for `href`/`src` references.
#[derive(Debug, Clone)]
pub struct MirrorRenderer {
    source_root: PathBuf,
    vfs_prefix: String,
}

impl MirrorRenderer {
    pub fn new(source_root: impl Into<PathBuf>, vfs_prefix: impl Into<String>) -> Self {
        Self {
            source_root: source_root.into(),
            vfs_prefix: vfs_prefix.into(),
        }
    }

    fn source_path(&self, vfs_path: &str) -> Result<PathBuf, ExportError> {
        let relative = vfs_path
            .strip_prefix(self.vfs_prefix.as_str())
            .ok_or_else(|| ExportError::rendering(vfs_path, "path is outside the source prefix"))?;
        if relative.split('/').any(|segment| segment == "..") {
            return Err(ExportError::rendering(
                vfs_path,
                "parent directory segments are not allowed",
            ));
        }

        Ok(relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.source_root.clone(), |path, segment| path.join(segment)))
    }
}

/// Collect the links of the HTML document `vfs_path`, in document order.
pub fn collect_links(vfs_path: &str, html: &str) -> Result<LinkTable, ExportError> {
    let links = Rc::new(RefCell::new(LinkTable::new()));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("[href]", {
                    let links = Rc::clone(&links);
                    move |el| {
                        record_link(&links, &el.tag_name(), el.get_attribute("href"));
                        Ok(())
                    }
                }),
                element!("[src]", {
                    let links = Rc::clone(&links);
                    move |el| {
                        record_link(&links, &el.tag_name(), el.get_attribute("src"));
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| ExportError::rendering(vfs_path, format!("link scan failed: {err}")))?;

    Ok(links.replace(LinkTable::new()))
}

fn record_link(links: &RefCell<LinkTable>, element: &str, value: Option<String>) {
    let Some(value) = value else {
        return;
    };
    let target = value.trim();
    if target.is_empty() || target.starts_with('#') {
        return;
    }
    links
        .borrow_mut()
        .add(LinkKind::for_element(element), target, is_internal(target));
}

/// Relative references stay inside the repository; anything carrying a
/// scheme or a network host does not.
fn is_internal(target: &str) -> bool {
    match Url::parse(target) {
        Ok(_) => false,
        Err(url::ParseError::RelativeUrlWithoutBase) => !target.starts_with("//"),
        Err(_) => false,
    }
}

fn is_html_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("html" | "htm")
    )
}

fn vfs_name(prefix: &str, relative: &Path) -> String {
    let segments: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("{}/{}", prefix.trim_end_matches('/'), segments.join("/"))
}

#[async_trait]
impl SiteRenderer for MirrorRenderer {
    async fn exportable_resources(&self) -> Result<Vec<String>, RepoError> {
        let root = self.source_root.clone();
        let prefix = self.vfs_prefix.clone();

        tokio::task::spawn_blocking(move || {
            let mut resources = Vec::new();
            for entry in WalkDir::new(&root).follow_links(false) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        warn!(
                            target = "static_export::infra::mirror",
                            error = %err,
                            "skipping unreadable source entry"
                        );
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Ok(relative) = entry.path().strip_prefix(&root) {
                    resources.push(vfs_name(&prefix, relative));
                }
            }
            resources.sort();
            resources
        })
        .await
        .map_err(RepoError::from_persistence)
    }

    async fn render(&self, vfs_path: &str) -> Result<RenderedUnit, ExportError> {
        let source = self.source_path(vfs_path)?;
        let content = tokio::fs::read(&source).await.map_err(|err| match err.kind() {
            ErrorKind::NotFound => ExportError::rendering(vfs_path, "source file not found"),
            _ => ExportError::rendering(vfs_path, err.to_string()),
        })?;

        let links = if is_html_path(&source) {
            collect_links(vfs_path, &String::from_utf8_lossy(&content))?
        } else {
            LinkTable::new()
        };

        debug!(
            target = "static_export::infra::mirror",
            vfs_path,
            bytes = content.len(),
            links = links.len(),
            "resource rendered"
        );

        Ok(RenderedUnit { content, links })
    }
}

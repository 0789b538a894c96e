//! Fuzzy lookup for exported files whose extension is not known up front.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Accepts files named exactly `base.<ext>` where `<ext>` is one non-empty
/// segment without further dots.
#[derive(Debug, Clone)]
pub struct PrefixFileFilter {
    directory: PathBuf,
    prefix: String,
}

impl PrefixFileFilter {
    /// Build a filter for `base`, a path without its extension.
    pub fn new(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        let directory = base
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let stem = base
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            directory,
            prefix: format!("{stem}."),
        }
    }

    /// Whether the file name of `path` is `base.<single-segment>`.
    pub fn accept(&self, path: impl AsRef<Path>) -> bool {
        let Some(name) = path.as_ref().file_name() else {
            return false;
        };
        self.accept_name(&name.to_string_lossy())
    }

    pub fn accept_name(&self, name: &str) -> bool {
        match name.strip_prefix(self.prefix.as_str()) {
            Some(extension) => !extension.is_empty() && !extension.contains('.'),
            None => false,
        }
    }

    /// Regular files next to the base that this filter accepts, sorted.
    pub fn matching_files(&self) -> Vec<PathBuf> {
        let directory = if self.directory.as_os_str().is_empty() {
            Path::new(".")
        } else {
            self.directory.as_path()
        };

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(
                    target = "static_export::export::prefix_filter",
                    directory = %directory.display(),
                    error = %err,
                    "prefix lookup skipped"
                );
                return Vec::new();
            }
        };

        let mut matches: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
            .filter(|entry| self.accept_name(&entry.file_name().to_string_lossy()))
            .map(|entry| entry.path())
            .collect();
        matches.sort();
        matches
    }
}

//! Locale-specific export rules.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::domain::types::Locale;

use super::error::ExportError;

/// Maps a canonical export path to the copy rendered for one locale.
///
/// `source` is matched against the export file path and the first match is
/// replaced with `target`, which may reference capture groups (`$1`,
/// `${name}`).
#[derive(Debug, Clone)]
pub struct ExportRule {
    locale: Locale,
    source: Regex,
    target: String,
}

impl ExportRule {
    pub fn new(locale: Locale, source: &str, target: impl Into<String>) -> Result<Self, ExportError> {
        let source = Regex::new(source).map_err(|err| ExportError::configuration(source, err))?;
        let target = target.into();
        if target.trim().is_empty() {
            return Err(ExportError::configuration(
                source.as_str(),
                "rule target must not be empty",
            ));
        }

        Ok(Self {
            locale,
            source,
            target,
        })
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn source(&self) -> &str {
        self.source.as_str()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// The locale-qualified path for `export_file`, if this rule applies.
    pub fn qualified_path(&self, export_file: &Path) -> Option<PathBuf> {
        let path = export_file.to_string_lossy();
        if !self.source.is_match(&path) {
            return None;
        }
        let qualified = self.source.replace(&path, self.target.as_str());
        Some(PathBuf::from(qualified.into_owned()))
    }
}

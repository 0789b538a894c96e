//! Purge expansion strategies.
//!
//! When a published resource's export file is purged, a strategy decides
//! which *additional* files became stale with it. The primary file is never
//! part of a strategy's answer; the handler deletes it separately.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::registry::RuleRegistry;

const HTML_SUFFIXES: [&str; 2] = [".html", ".htm"];

/// Computes the files related to one purged export file.
pub trait RelatedFiles: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Additional physical files to delete alongside `export_file_name`.
    fn related_files(&self, export_file_name: &Path, vfs_name: &str) -> BTreeSet<PathBuf>;
}

/// Which strategy a site uses, as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    #[default]
    None,
    SubtreeHtml,
    MultiLanguage,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::None => "none",
            StrategyKind::SubtreeHtml => "subtree_html",
            StrategyKind::MultiLanguage => "multi_language",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Some(StrategyKind::None),
            "subtree_html" => Some(StrategyKind::SubtreeHtml),
            "multi_language" => Some(StrategyKind::MultiLanguage),
            _ => None,
        }
    }

    /// Instantiate the configured strategy.
    pub fn build(self, registry: Arc<RuleRegistry>) -> Arc<dyn RelatedFiles> {
        match self {
            StrategyKind::None => Arc::new(NoExpansion),
            StrategyKind::SubtreeHtml => Arc::new(SubtreeHtmlExpansion),
            StrategyKind::MultiLanguage => Arc::new(MultiLanguageExpansion::new(registry)),
        }
    }
}

/// Purges nothing beyond the primary file.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExpansion;

impl RelatedFiles for NoExpansion {
    fn name(&self) -> &'static str {
        "none"
    }

    fn related_files(&self, _export_file_name: &Path, _vfs_name: &str) -> BTreeSet<PathBuf> {
        BTreeSet::new()
    }
}

/// Purges every exported HTML page below a folder.
///
/// Suffixes are compared case-sensitively. Symbolic links are neither
/// followed nor returned, so the walk stays inside the export root.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubtreeHtmlExpansion;

impl RelatedFiles for SubtreeHtmlExpansion {
    fn name(&self) -> &'static str {
        "subtree_html"
    }

    fn related_files(&self, export_file_name: &Path, vfs_name: &str) -> BTreeSet<PathBuf> {
        let mut files = BTreeSet::new();
        if !export_file_name.is_dir() {
            return files;
        }

        for entry in WalkDir::new(export_file_name).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(
                        target = "static_export::export::strategy",
                        vfs_name,
                        error = %err,
                        "skipping unreadable export entry"
                    );
                    continue;
                }
            };

            if entry.file_type().is_file() && is_html(&entry.file_name().to_string_lossy()) {
                files.insert(entry.into_path());
            }
        }

        files.remove(export_file_name);
        debug!(
            target = "static_export::export::strategy",
            vfs_name,
            related = files.len(),
            "subtree html expansion"
        );
        files
    }
}

fn is_html(name: &str) -> bool {
    HTML_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Purges the copy of a file rendered for each default locale.
#[derive(Debug, Clone)]
pub struct MultiLanguageExpansion {
    registry: Arc<RuleRegistry>,
}

impl MultiLanguageExpansion {
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self { registry }
    }
}

impl RelatedFiles for MultiLanguageExpansion {
    fn name(&self) -> &'static str {
        "multi_language"
    }

    fn related_files(&self, export_file_name: &Path, vfs_name: &str) -> BTreeSet<PathBuf> {
        let mut files: BTreeSet<PathBuf> = self
            .registry
            .rules()
            .iter()
            .filter_map(|rule| rule.qualified_path(export_file_name))
            .collect();
        files.remove(export_file_name);

        debug!(
            target = "static_export::export::strategy",
            vfs_name,
            rules = self.registry.len(),
            related = files.len(),
            "multi-language expansion"
        );
        files
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::domain::types::Locale;
    use crate::export::rules::ExportRule;

    fn locale(value: &str) -> Locale {
        Locale::new(value).expect("valid locale")
    }

    fn localized_rule(value: &str) -> ExportRule {
        ExportRule::new(
            locale(value),
            "^/srv/export/(.*)$",
            format!("/srv/export/{value}/$1"),
        )
        .expect("valid rule")
    }

    #[test]
    fn no_expansion_is_empty() {
        let files = NoExpansion.related_files(Path::new("/srv/export/a.html"), "/a.html");
        assert!(files.is_empty());
    }

    #[test]
    fn subtree_collects_html_case_sensitively() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir(root.join("sub")).expect("sub dir");
        fs::write(root.join("a.html"), "a").expect("a.html");
        fs::write(root.join("a.HTML"), "A").expect("a.HTML");
        fs::write(root.join("a.js"), "js").expect("a.js");
        fs::write(root.join("sub").join("b.htm"), "b").expect("b.htm");

        let files = SubtreeHtmlExpansion.related_files(root, "/folder/");

        let expected: BTreeSet<PathBuf> =
            [root.join("a.html"), root.join("sub").join("b.htm")].into();
        assert_eq!(files, expected);
    }

    #[test]
    fn subtree_of_missing_or_file_root_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("page.html");
        fs::write(&file, "x").expect("page");

        assert!(SubtreeHtmlExpansion.related_files(&file, "/page.html").is_empty());
        assert!(
            SubtreeHtmlExpansion
                .related_files(&dir.path().join("missing"), "/missing/")
                .is_empty()
        );
    }

    #[cfg(unix)]
    #[test]
    fn subtree_does_not_follow_symlinks() {
        let outside = tempfile::tempdir().expect("outside");
        fs::write(outside.path().join("secret.html"), "x").expect("outside page");

        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("index.html"), "x").expect("index");
        std::os::unix::fs::symlink(outside.path(), dir.path().join("linked"))
            .expect("dir symlink");
        std::os::unix::fs::symlink(
            outside.path().join("secret.html"),
            dir.path().join("alias.html"),
        )
        .expect("file symlink");

        let files = SubtreeHtmlExpansion.related_files(dir.path(), "/");

        let expected: BTreeSet<PathBuf> = [dir.path().join("index.html")].into();
        assert_eq!(files, expected);
    }

    #[test]
    fn multi_language_uses_default_locale_rules_only() {
        let registry = Arc::new(RuleRegistry::build(
            [
                localized_rule("en"),
                localized_rule("de"),
                localized_rule("fr"),
            ],
            &[locale("en"), locale("de")],
        ));
        let strategy = MultiLanguageExpansion::new(registry);

        for export in ["/srv/export/index.html", "/srv/export/news/2024/item.html"] {
            let files = strategy.related_files(Path::new(export), "/index.html");
            assert_eq!(files.len(), 2, "{export}");
            let rest = export.trim_start_matches("/srv/export/");
            assert!(files.contains(&PathBuf::from(format!("/srv/export/en/{rest}"))));
            assert!(files.contains(&PathBuf::from(format!("/srv/export/de/{rest}"))));
        }
    }

    #[test]
    fn multi_language_never_returns_primary() {
        let identity = ExportRule::new(locale("en"), "^(/srv/export/.*)$", "$1").expect("rule");
        let registry = Arc::new(RuleRegistry::build(
            [identity, localized_rule("de")],
            &[locale("en"), locale("de")],
        ));
        let strategy = MultiLanguageExpansion::new(registry);

        let primary = Path::new("/srv/export/a.html");
        let files = strategy.related_files(primary, "/a.html");

        assert_eq!(files.len(), 1);
        assert!(!files.contains(primary));
    }

    #[test]
    fn kind_parsing_and_build() {
        assert_eq!(StrategyKind::parse("subtree-html"), Some(StrategyKind::SubtreeHtml));
        assert_eq!(StrategyKind::parse(" Multi_Language "), Some(StrategyKind::MultiLanguage));
        assert_eq!(StrategyKind::parse("bogus"), None);

        let registry = Arc::new(RuleRegistry::default());
        for kind in [
            StrategyKind::None,
            StrategyKind::SubtreeHtml,
            StrategyKind::MultiLanguage,
        ] {
            assert_eq!(kind.build(Arc::clone(&registry)).name(), kind.as_str());
        }
    }
}

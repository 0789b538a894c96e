//! Export-eligibility matching for repository paths.

use regex::Regex;

use super::error::ExportError;

/// Decides whether a repository path lies inside an exportable area.
///
/// Patterns are checked in configuration order against the whole path. The
/// check resource is appended as a literal, so it always matches itself even
/// when it contains regex metacharacters.
#[derive(Debug, Clone)]
pub struct FolderMatcher {
    patterns: Vec<Regex>,
}

impl FolderMatcher {
    pub fn new<I, S>(patterns: I, check_resource: &str) -> Result<Self, ExportError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        for pattern in patterns {
            compiled.push(compile_anchored(pattern.as_ref())?);
        }
        compiled.push(compile_anchored(&regex::escape(check_resource))?);

        Ok(Self { patterns: compiled })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(path))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn compile_anchored(pattern: &str) -> Result<Regex, ExportError> {
    Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|err| ExportError::configuration(pattern, err))
}

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the export core.
///
/// Only `Configuration` ever escapes to a caller; the others are written to
/// the active report and the run moves on to the next resource.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid export configuration for `{pattern}`: {reason}")]
    Configuration { pattern: String, reason: String },
    #[error("cannot resolve export path for `{vfs_path}`: {reason}")]
    Resolution { vfs_path: String, reason: String },
    #[error("failed to purge `{}`: {source}", path.display())]
    Deletion {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render `{vfs_path}`: {reason}")]
    Rendering { vfs_path: String, reason: String },
    #[error("io error on `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub fn configuration(pattern: impl Into<String>, reason: impl ToString) -> Self {
        Self::Configuration {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }

    pub fn resolution(vfs_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            vfs_path: vfs_path.into(),
            reason: reason.into(),
        }
    }

    pub fn rendering(vfs_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rendering {
            vfs_path: vfs_path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

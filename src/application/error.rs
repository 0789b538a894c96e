use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::{config::LoadError, export::ExportError, infra::error::InfraError};

/// An error flattened into its message chain, outermost first.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages.join(": "))
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl AppError {
    /// Process exit code for the binary, following sysexits conventions.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Export(ExportError::Configuration { .. }) => 78,
            AppError::Infra(InfraError::Io(_)) | AppError::Export(_) => 74,
            AppError::Infra(InfraError::Telemetry(_)) => 70,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_walks_source_chain() {
        let err = ExportError::Deletion {
            path: "/srv/export/a.html".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };

        let report = ErrorReport::from_error("test", &err);

        assert_eq!(report.messages.len(), 2);
        assert_eq!(report.messages[1], "denied");
        assert!(report.to_string().ends_with(": denied"));
    }

    #[test]
    fn configuration_errors_exit_with_config_code() {
        let err = AppError::from(ExportError::configuration("(", "unclosed group"));
        assert_eq!(err.exit_code(), 78);

        let io = AppError::from(InfraError::from(std::io::Error::other("disk gone")));
        assert_eq!(io.exit_code(), 74);
    }
}

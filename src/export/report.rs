//! Line-oriented progress reporting for purge and export runs.

use std::fmt;

use tracing::{error, info, warn};

use super::lock::Guarded;

/// Severity of a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReportLevel {
    Info,
    Warn,
    Error,
}

impl ReportLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportLevel::Info => "info",
            ReportLevel::Warn => "warn",
            ReportLevel::Error => "error",
        }
    }
}

/// Accepts progress and error lines from a run.
pub trait ReportSink: Send + Sync {
    fn line(&self, level: ReportLevel, message: &str);

    fn info(&self, message: &str) {
        self.line(ReportLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.line(ReportLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.line(ReportLevel::Error, message);
    }
}

/// Forwards report lines to the process log. Used when no report is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReport;

impl ReportSink for LogReport {
    fn line(&self, level: ReportLevel, message: &str) {
        match level {
            ReportLevel::Info => info!(target: "static_export::report", "{message}"),
            ReportLevel::Warn => warn!(target: "static_export::report", "{message}"),
            ReportLevel::Error => error!(target: "static_export::report", "{message}"),
        }
    }
}

/// Writes report lines to standard output, prefixed with their level.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutReport;

impl ReportSink for StdoutReport {
    fn line(&self, level: ReportLevel, message: &str) {
        println!("[{}] {message}", level.as_str());
    }
}

/// One collected report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub level: ReportLevel,
    pub message: String,
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.message)
    }
}

/// Collects report lines in memory.
#[derive(Debug)]
pub struct MemoryReport {
    lines: Guarded<Vec<ReportLine>>,
}

impl Default for MemoryReport {
    fn default() -> Self {
        Self {
            lines: Guarded::new("export::report", Vec::new()),
        }
    }
}

impl MemoryReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<ReportLine> {
        self.lines.lock("lines").clone()
    }

    pub fn count(&self, level: ReportLevel) -> usize {
        self.lines.lock("count")
            .iter()
            .filter(|line| line.level == level)
            .count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock("contains")
            .iter()
            .any(|line| line.message.contains(needle))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock("is_empty").is_empty()
    }
}

impl ReportSink for MemoryReport {
    fn line(&self, level: ReportLevel, message: &str) {
        self.lines.lock("line").push(ReportLine {
            level,
            message: message.to_string(),
        });
    }
}

//! Static export purge core.
//!
//! After a publish, [`ExportHandler`] turns every published repository path
//! into the set of exported files that went stale and deletes them. What
//! "related" means is decided by a [`RelatedFiles`] strategy chosen in
//! configuration.

mod error;
mod handler;
pub(crate) mod lock;
mod matcher;
mod prefix_filter;
mod registry;
mod report;
mod rules;
mod strategy;

pub use error::ExportError;
pub use handler::{ExportHandler, PurgeSummary};
pub use matcher::FolderMatcher;
pub use prefix_filter::PrefixFileFilter;
pub use registry::RuleRegistry;
pub use report::{LogReport, MemoryReport, ReportLevel, ReportLine, ReportSink, StdoutReport};
pub use rules::ExportRule;
pub use strategy::{
    MultiLanguageExpansion, NoExpansion, RelatedFiles, StrategyKind, SubtreeHtmlExpansion,
};

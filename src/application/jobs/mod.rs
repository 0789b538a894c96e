mod context;
mod export;

pub use context::ExportContext;
pub use export::{ExportSummary, ScheduledExport, spawn_schedule};

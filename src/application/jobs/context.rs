use std::sync::Arc;

use crate::{
    application::repos::{ExportManager, LocaleManager, SiteRenderer},
    export::{ExportHandler, RuleRegistry, StrategyKind},
};

/// Shared collaborators for purge runs and full exports.
#[derive(Clone)]
pub struct ExportContext {
    pub manager: Arc<dyn ExportManager>,
    pub renderer: Arc<dyn SiteRenderer>,
    pub registry: Arc<RuleRegistry>,
    pub handler: Arc<ExportHandler>,
}

impl ExportContext {
    /// Build the rule registry from the manager's rules and the default
    /// locales, then the handler around the configured strategy.
    pub fn new(
        manager: Arc<dyn ExportManager>,
        locales: &dyn LocaleManager,
        renderer: Arc<dyn SiteRenderer>,
        strategy: StrategyKind,
    ) -> Self {
        let registry = Arc::new(RuleRegistry::build(
            manager.rules().iter().cloned(),
            &locales.default_locales(),
        ));
        let handler = Arc::new(ExportHandler::new(
            Arc::clone(&manager),
            strategy.build(Arc::clone(&registry)),
        ));

        Self {
            manager,
            renderer,
            registry,
            handler,
        }
    }
}

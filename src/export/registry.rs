//! Immutable registry of export rules used for multi-language purges.

use std::collections::BTreeSet;

use tracing::info;

use crate::domain::types::Locale;

use super::rules::ExportRule;

/// The export rules whose locale is a default locale.
///
/// Built once during startup and shared by reference afterwards; changing
/// rules requires building a new registry.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<ExportRule>,
}

impl RuleRegistry {
    /// Keep only the rules whose locale appears in `default_locales`,
    /// preserving configuration order.
    pub fn build<I>(rules: I, default_locales: &[Locale]) -> Self
    where
        I: IntoIterator<Item = ExportRule>,
    {
        let defaults: BTreeSet<&Locale> = default_locales.iter().collect();
        let mut excluded = 0usize;
        let rules: Vec<ExportRule> = rules
            .into_iter()
            .filter(|rule| {
                let keep = defaults.contains(rule.locale());
                if !keep {
                    excluded += 1;
                }
                keep
            })
            .collect();

        info!(
            target = "static_export::export::registry",
            rules = rules.len(),
            excluded,
            "export rule registry built"
        );

        Self { rules }
    }

    pub fn rules(&self) -> &[ExportRule] {
        &self.rules
    }

    pub fn locales(&self) -> impl Iterator<Item = &Locale> {
        self.rules.iter().map(ExportRule::locale)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

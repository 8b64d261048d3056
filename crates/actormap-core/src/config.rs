//! Coordinator configuration

use actormap_history::HistoryConfig;
use actormap_timeline::{OrphanPolicy, COPY_SUFFIX, INITIAL_STATE_LABEL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Coordinator configuration
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// orphan_policy = "retain"
/// persist_debounce_ms = 250
///
/// [history]
/// max_undo = 100
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// Undo/redo stack bounds
    pub history: HistoryConfig,
    /// What happens to children of a deleted state
    pub orphan_policy: OrphanPolicy,
    /// Quiet period before a scheduled persistence write runs
    pub persist_debounce_ms: u64,
    /// Label of the root state of new timelines
    pub initial_state_label: String,
    /// Appended to the source label of duplicated states
    pub copy_suffix: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            history: HistoryConfig::default(),
            orphan_policy: OrphanPolicy::default(),
            persist_debounce_ms: 1000,
            initial_state_label: INITIAL_STATE_LABEL.to_string(),
            copy_suffix: COPY_SUFFIX.to_string(),
        }
    }
}

impl CoordinatorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// Returns error on malformed TOML or unknown keys
    pub fn from_toml_str(toml: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml)
    }

    #[inline]
    #[must_use]
    pub fn with_history(mut self, history: HistoryConfig) -> Self {
        self.history = history;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_persist_debounce_ms(mut self, ms: u64) -> Self {
        self.persist_debounce_ms = ms;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_initial_state_label(mut self, label: impl Into<String>) -> Self {
        self.initial_state_label = label.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_copy_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.copy_suffix = suffix.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_constants() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.history.max_undo, 50);
        assert_eq!(config.history.max_redo, 50);
        assert_eq!(config.orphan_policy, OrphanPolicy::ReparentToGrandparent);
        assert_eq!(config.persist_debounce(), Duration::from_secs(1));
        assert_eq!(config.initial_state_label, "Initial State");
        assert_eq!(config.copy_suffix, " (Copy)");
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = CoordinatorConfig::from_toml_str(
            r#"
            orphan_policy = "retain"
            persist_debounce_ms = 250

            [history]
            max_undo = 100
            "#,
        )
        .unwrap();

        assert_eq!(config.orphan_policy, OrphanPolicy::Retain);
        assert_eq!(config.persist_debounce_ms, 250);
        assert_eq!(config.history.max_undo, 100);
        assert_eq!(config.history.max_redo, 50);
        assert_eq!(config.copy_suffix, " (Copy)");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CoordinatorConfig::from_toml_str("max_states = 3").is_err());
        assert!(CoordinatorConfig::from_toml_str("[history]\nmax_undo_entries = 3").is_err());
    }

    #[test]
    fn builders_chain() {
        let config = CoordinatorConfig::new()
            .with_orphan_policy(OrphanPolicy::Retain)
            .with_copy_suffix(" copy")
            .with_initial_state_label("Baseline")
            .with_persist_debounce_ms(0)
            .with_history(HistoryConfig::default().with_max_undo(5));

        assert_eq!(config.copy_suffix, " copy");
        assert_eq!(config.initial_state_label, "Baseline");
        assert_eq!(config.persist_debounce(), Duration::ZERO);
        assert_eq!(config.history.max_undo, 5);
    }
}

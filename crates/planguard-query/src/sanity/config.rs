//! Sanity checker configuration.

use serde::Deserialize;

use crate::warning::{WarningCollector, WarningCollectorConfig};

/// Configuration for the [`PlanSanityChecker`](super::PlanSanityChecker).
///
/// Missing fields take their default values when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlanSanityConfig {
    /// Run the type validator.
    /// Default: true
    pub validate_types: bool,

    /// Reject plans with repeated node ids.
    /// Default: true
    pub validate_unique_node_ids: bool,

    /// Require final plans to have a single root output node.
    /// Default: true
    pub validate_single_output: bool,

    /// Warning collection settings for each validation run.
    pub warnings: WarningCollectorConfig,
}

impl Default for PlanSanityConfig {
    fn default() -> Self {
        Self {
            validate_types: true,
            validate_unique_node_ids: true,
            validate_single_output: true,
            warnings: WarningCollectorConfig::default(),
        }
    }
}

impl PlanSanityConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the type validator.
    #[must_use]
    pub fn with_validate_types(mut self, enabled: bool) -> Self {
        self.validate_types = enabled;
        self
    }

    /// Enable or disable the node id uniqueness check.
    #[must_use]
    pub fn with_validate_unique_node_ids(mut self, enabled: bool) -> Self {
        self.validate_unique_node_ids = enabled;
        self
    }

    /// Enable or disable the single output check.
    #[must_use]
    pub fn with_validate_single_output(mut self, enabled: bool) -> Self {
        self.validate_single_output = enabled;
        self
    }

    /// Set the warning collection settings.
    #[must_use]
    pub fn with_warnings(mut self, warnings: WarningCollectorConfig) -> Self {
        self.warnings = warnings;
        self
    }

    /// Creates an empty warning collector for one validation run.
    #[must_use]
    pub fn warning_collector(&self) -> WarningCollector {
        WarningCollector::new(self.warnings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PlanSanityConfig::default();
        assert!(config.validate_types);
        assert!(config.validate_unique_node_ids);
        assert!(config.validate_single_output);
        assert_eq!(config.warnings.max_warnings, 1000);
    }

    #[test]
    fn builders() {
        let config = PlanSanityConfig::new()
            .with_validate_types(false)
            .with_validate_single_output(false)
            .with_warnings(WarningCollectorConfig::new().with_max_warnings(3));

        assert!(!config.validate_types);
        assert!(config.validate_unique_node_ids);
        assert!(!config.validate_single_output);
        assert_eq!(config.warnings.max_warnings, 3);
    }

    #[test]
    fn deserialize_partial() {
        let config: PlanSanityConfig = serde_json::from_str(
            r#"{ "validate_single_output": false, "warnings": { "max_warnings": 10 } }"#,
        )
        .unwrap();

        assert!(config.validate_types);
        assert!(!config.validate_single_output);
        assert_eq!(config.warnings.max_warnings, 10);
    }

    #[test]
    fn deserialize_empty() {
        let config: PlanSanityConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PlanSanityConfig::default());
    }
}

//! Planning warnings.
//!
//! Warnings are the non-fatal side channel of analysis. They are collected
//! per query into a [`WarningCollector`] that caps how many it keeps.

use std::fmt;

use serde::Deserialize;
use tracing::warn;

/// Default cap on collected warnings.
pub const DEFAULT_MAX_WARNINGS: usize = 1000;

/// Category of a planning warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum WarningCode {
    /// A deprecated function was called.
    DeprecatedFunction,
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeprecatedFunction => write!(f, "DEPRECATED_FUNCTION"),
        }
    }
}

/// A warning raised while planning a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanWarning {
    /// The warning category.
    pub code: WarningCode,
    /// Human readable message.
    pub message: String,
}

impl PlanWarning {
    /// Creates a warning.
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Configuration for a [`WarningCollector`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WarningCollectorConfig {
    /// Maximum number of warnings kept; later ones are dropped.
    /// Default: 1000
    pub max_warnings: usize,
}

impl Default for WarningCollectorConfig {
    fn default() -> Self {
        Self { max_warnings: DEFAULT_MAX_WARNINGS }
    }
}

impl WarningCollectorConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of warnings kept.
    #[must_use]
    pub fn with_max_warnings(mut self, max_warnings: usize) -> Self {
        self.max_warnings = max_warnings;
        self
    }
}

/// Collects warnings for a single query.
#[derive(Debug, Clone, Default)]
pub struct WarningCollector {
    config: WarningCollectorConfig,
    warnings: Vec<PlanWarning>,
    dropped: usize,
}

impl WarningCollector {
    /// Creates a collector with the given configuration.
    #[must_use]
    pub fn new(config: WarningCollectorConfig) -> Self {
        Self { config, warnings: Vec::new(), dropped: 0 }
    }

    /// Adds a warning, dropping it if the collector is full.
    pub fn add(&mut self, warning: PlanWarning) {
        if self.warnings.len() >= self.config.max_warnings {
            if self.dropped == 0 {
                warn!(
                    max_warnings = self.config.max_warnings,
                    "warning limit reached, dropping warnings"
                );
            }
            self.dropped += 1;
            return;
        }
        self.warnings.push(warning);
    }

    /// Returns the collected warnings in insertion order.
    #[must_use]
    pub fn warnings(&self) -> &[PlanWarning] {
        &self.warnings
    }

    /// Returns how many warnings were dropped because the collector was full.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Returns true if no warnings were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Consumes the collector, returning the warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<PlanWarning> {
        self.warnings
    }
}

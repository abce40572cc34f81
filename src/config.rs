//! Configuration options for rule dispatch.
//!
//! This module provides the [`OverdoConfig`] struct which controls how a
//! dispatcher compiles its rule index and how it treats unmatched keys.

use crate::error::{MarcError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of rules compiled into one branch of the rule index.
///
/// Keeps each compiled alternation below a 100 capture group ceiling.
pub const DEFAULT_BRANCH_SIZE: usize = 99;

/// Where rules contributed by rule packs go relative to explicitly registered
/// rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackOrder {
    /// Explicit rules first, pack rules afterward
    #[default]
    PacksLast,
    /// Pack rules first, explicit rules afterward
    PacksFirst,
}

impl fmt::Display for PackOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PacksLast => write!(f, "packs-last"),
            Self::PacksFirst => write!(f, "packs-first"),
        }
    }
}

/// Configuration for a dispatcher.
///
/// # Examples
///
/// ```
/// use marcdo::config::{OverdoConfig, PackOrder};
///
/// let config = OverdoConfig::new()
///     .with_branch_size(50)
///     .with_strict_mode(true)
///     .with_pack_order(PackOrder::PacksFirst);
/// assert!(config.strict);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverdoConfig {
    /// Maximum number of rules compiled into a single regex branch.
    pub branch_size: usize,

    /// Default strictness used by [`Overdo::apply`](crate::Overdo::apply).
    ///
    /// When true, a key without a matching rule aborts the transform.
    /// When false (default), such keys are dropped from the output.
    pub strict: bool,

    /// Placement of rule pack contributions in the rule list.
    pub pack_order: PackOrder,
}

impl Default for OverdoConfig {
    fn default() -> Self {
        Self {
            branch_size: DEFAULT_BRANCH_SIZE,
            strict: false,
            pack_order: PackOrder::default(),
        }
    }
}

impl OverdoConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of rules per compiled branch.
    #[must_use]
    pub const fn with_branch_size(mut self, branch_size: usize) -> Self {
        self.branch_size = branch_size;
        self
    }

    /// Enables strict mode.
    #[must_use]
    pub const fn with_strict_mode(mut self, enabled: bool) -> Self {
        self.strict = enabled;
        self
    }

    /// Sets where rule pack contributions are placed.
    #[must_use]
    pub const fn with_pack_order(mut self, order: PackOrder) -> Self {
        self.pack_order = order;
        self
    }

    /// Load a configuration from a JSON document; missing members keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the configuration is
    /// invalid.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MarcError::InvalidConfig(format!("Failed to parse configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the index cannot work with.
    ///
    /// # Errors
    ///
    /// Returns an error if `branch_size` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.branch_size == 0 {
            return Err(MarcError::InvalidConfig(
                "branch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

//! Engine configuration
//!
//! ```rust
//! use gridguard_core::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{
//!     "history_capacity": 50,
//!     "default_policy": { "mode": "trend_only", "trend": { "max_delta": 100.0 } },
//!     "policies": {
//!         "apg_imbalance_austria": {
//!             "mode": "bounds_then_trend",
//!             "bounds": { "min": -1000.0, "max": 1000.0 },
//!             "trend": { "max_delta": 200.0, "anchor": "latest_timestamp" }
//!         }
//!     }
//! }"#)?;
//!
//! assert_eq!(config.history_capacity, 50);
//! assert!(config.policy_for("apg_imbalance_austria").bounds().is_some());
//! assert!(config.policy_for("anything_else").bounds().is_none());
//! # Ok::<(), gridguard_core::config::ConfigError>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::{constants::DEFAULT_HISTORY_CAPACITY, policy::ValidationPolicy};

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Input was not valid configuration JSON
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// A policy carries limits that cannot be applied
    #[error("Invalid policy for '{key}': {reason}")]
    InvalidPolicy {
        /// Series key, or `"default"` for the default policy
        key: String,
        reason: &'static str,
    },
}

/// Settings for a [`ValidationEngine`](crate::engine::ValidationEngine)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Readings retained per series
    pub history_capacity: usize,

    /// Policy for series without an explicit entry
    pub default_policy: ValidationPolicy,

    /// Per-series policies, keyed by series key
    pub policies: BTreeMap<String, ValidationPolicy>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            default_policy: ValidationPolicy::default(),
            policies: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn with_default_policy(mut self, policy: ValidationPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Register a policy for one series key
    pub fn with_policy(mut self, key: impl Into<String>, policy: ValidationPolicy) -> Self {
        self.policies.insert(key.into(), policy);
        self
    }

    /// Policy applied to `key`
    pub fn policy_for(&self, key: &str) -> &ValidationPolicy {
        self.policies.get(key).unwrap_or(&self.default_policy)
    }

    /// Reject limits that would make every comparison meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_policy("default", &self.default_policy)?;
        for (key, policy) in &self.policies {
            check_policy(key, policy)?;
        }
        Ok(())
    }
}

fn check_policy(key: &str, policy: &ValidationPolicy) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidPolicy {
        key: key.to_string(),
        reason,
    };

    if let Some(bounds) = policy.bounds() {
        if !bounds.min().is_finite() || !bounds.max().is_finite() {
            return Err(invalid("bounds must be finite"));
        }
        if bounds.min() > bounds.max() {
            return Err(invalid("minimum exceeds maximum"));
        }
    }

    if let Some(trend) = policy.trend() {
        if !trend.max_delta().is_finite() || trend.max_delta() < 0.0 {
            return Err(invalid("max_delta must be a finite, non-negative number"));
        }
    }

    Ok(())
}

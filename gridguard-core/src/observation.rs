//! Observations and series keys
//!
//! An [`Observation`] is one timestamped value for one series. Collectors
//! first decode into a [`RawObservation`], whose fields may be absent, and
//! presence is checked explicitly before anything reaches a validator.

use alloc::string::String;
use core::fmt;

use crate::errors::Rejection;
use crate::time::Timestamp;

/// A single timestamped value for a series key
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    /// Logical series, e.g. `apg_imbalance_austria`
    pub key: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: Timestamp,
    pub value: f64,
}

impl Observation {
    pub fn new(key: impl Into<String>, timestamp: Timestamp, value: f64) -> Self {
        Self {
            key: key.into(),
            timestamp,
            value,
        }
    }
}

/// Decoded ingress record with optional fields
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawObservation {
    pub key: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp: Option<Timestamp>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: Option<f64>,
}

impl RawObservation {
    pub fn new(key: impl Into<String>, timestamp: Option<Timestamp>, value: Option<f64>) -> Self {
        Self {
            key: key.into(),
            timestamp,
            value,
        }
    }

    /// Promote to an [`Observation`] once both fields are present
    ///
    /// The value is checked before the timestamp, so a record missing both
    /// reports the value.
    pub fn into_observation(self) -> Result<Observation, Rejection> {
        let value = self.value.ok_or(Rejection::MissingField { field: "value" })?;
        let timestamp = self
            .timestamp
            .ok_or(Rejection::MissingField { field: "timestamp" })?;

        Ok(Observation {
            key: self.key,
            timestamp,
            value,
        })
    }
}

/// Metric plus optional geographic scope
///
/// Renders as `metric_scope`, or just `metric` when unscoped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    pub metric: String,
    pub scope: Option<String>,
}

impl SeriesKey {
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            scope: None,
        }
    }

    pub fn scoped(metric: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            scope: Some(scope.into()),
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}_{}", self.metric, scope),
            None => f.write_str(&self.metric),
        }
    }
}

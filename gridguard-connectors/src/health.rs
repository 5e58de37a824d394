//! Liveness report
//!
//! Serialises as `{"status": "healthy", "timestamp": "<RFC 3339>", ...}`,
//! the shape container health checks poll for.

use chrono::{SecondsFormat, TimeZone, Utc};
use gridguard_core::{time::TimeSource, EngineStats, Timestamp};
use serde::{Deserialize, Serialize};

pub const HEALTHY: &str = "healthy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    /// RFC 3339 rendering of `checked_at`
    pub timestamp: String,
    /// Milliseconds since the Unix epoch
    pub checked_at: Timestamp,
    /// Engine counters, when an engine was supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineCounters>,
}

/// Serialisable copy of [`EngineStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineCounters {
    pub accepted: u64,
    pub rejected: u64,
    pub adjusted: u64,
}

impl From<EngineStats> for EngineCounters {
    fn from(stats: EngineStats) -> Self {
        Self {
            accepted: stats.accepted,
            rejected: stats.rejected,
            adjusted: stats.adjusted,
        }
    }
}

impl HealthStatus {
    /// Healthy as of `clock.now()`
    pub fn healthy(clock: &dyn TimeSource) -> Self {
        Self::at(clock.now())
    }

    /// Healthy as of `checked_at`
    pub fn at(checked_at: Timestamp) -> Self {
        Self {
            status: HEALTHY.to_string(),
            timestamp: rfc3339(checked_at),
            checked_at,
            engine: None,
        }
    }

    pub fn with_engine(mut self, stats: EngineStats) -> Self {
        self.engine = Some(stats.into());
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HEALTHY
    }
}

fn rfc3339(timestamp: Timestamp) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
        .map(|datetime| datetime.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| timestamp.to_string())
}

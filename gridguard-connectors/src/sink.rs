//! Persistence sinks
//!
//! Accepted points are stored under the natural key `(time, metric,
//! scope)`. Saving is an upsert: the same point saved twice leaves one row,
//! which is what makes re-fetching overlapping windows harmless.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use gridguard_core::{SeriesKey, Timestamp, TimestampedReading};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sink errors
#[derive(Debug, Error)]
pub enum SinkError {
    /// Backing storage rejected or failed the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Sink lock poisoned")]
    Poisoned,
}

/// A stored data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedPoint {
    /// Milliseconds since the Unix epoch
    pub time: Timestamp,
    pub metric: String,
    pub scope: String,
    pub value: f64,
}

impl PersistedPoint {
    pub fn new(time: Timestamp, metric: impl Into<String>, scope: impl Into<String>, value: f64) -> Self {
        Self {
            time,
            metric: metric.into(),
            scope: scope.into(),
            value,
        }
    }

    /// Series this point belongs to
    pub fn series_key(&self) -> SeriesKey {
        SeriesKey::scoped(self.metric.clone(), self.scope.clone())
    }

    pub fn reading(&self) -> TimestampedReading {
        TimestampedReading::new(self.value, self.time)
    }
}

/// Durable storage for accepted points
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Upsert on `(time, metric, scope)`
    ///
    /// Returns `true` when a new row was written and `false` when an
    /// existing row was overwritten.
    async fn save(&self, point: &PersistedPoint) -> Result<bool, SinkError>;

    /// Up to `limit` most recent points for a series, newest first
    async fn recent(
        &self,
        metric: &str,
        scope: &str,
        limit: usize,
    ) -> Result<Vec<PersistedPoint>, SinkError>;
}

type Row = (String, String, Timestamp);

/// In-memory sink, ordered by series then time
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Mutex<BTreeMap<Row, f64>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored value for one natural key
    pub fn get(&self, metric: &str, scope: &str, time: Timestamp) -> Option<f64> {
        self.snapshot()
            .get(&(metric.to_string(), scope.to_string(), time))
            .copied()
    }

    /// Every stored point, by series then time
    pub fn points(&self) -> Vec<PersistedPoint> {
        self.snapshot()
            .iter()
            .map(|((metric, scope, time), value)| {
                PersistedPoint::new(*time, metric.as_str(), scope.as_str(), *value)
            })
            .collect()
    }

    fn rows(&self) -> Result<MutexGuard<'_, BTreeMap<Row, f64>>, SinkError> {
        self.rows.lock().map_err(|_| SinkError::Poisoned)
    }

    /// Read access for inspection; a poisoned lock still holds whole rows
    fn snapshot(&self) -> MutexGuard<'_, BTreeMap<Row, f64>> {
        match self.rows.lock() {
            Ok(rows) => rows,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl PersistenceSink for MemorySink {
    async fn save(&self, point: &PersistedPoint) -> Result<bool, SinkError> {
        let key = (point.metric.clone(), point.scope.clone(), point.time);
        Ok(self.rows()?.insert(key, point.value).is_none())
    }

    async fn recent(
        &self,
        metric: &str,
        scope: &str,
        limit: usize,
    ) -> Result<Vec<PersistedPoint>, SinkError> {
        let rows = self.rows()?;
        let from = (metric.to_string(), scope.to_string(), Timestamp::MIN);
        let to = (metric.to_string(), scope.to_string(), Timestamp::MAX);

        Ok(rows
            .range(from..=to)
            .rev()
            .take(limit)
            .map(|((metric, scope, time), value)| {
                PersistedPoint::new(*time, metric.as_str(), scope.as_str(), *value)
            })
            .collect())
    }
}

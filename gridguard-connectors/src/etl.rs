//! ETL Cycle: Fetch → Validate → Persist
//!
//! ## Overview
//!
//! Every tick the pipeline asks its source for the last `window_minutes`
//! of data, runs each published row through the validation engine and
//! persists what was accepted:
//!
//! ```text
//! tick ─→ restore history (first cycle only)
//!      ─→ fetch [now - window, now]
//!      ─→ for each row newer than the watermark:
//!             engine.submit_raw ─→ accepted?  ─→ sink.save(value)
//!                               └→ clamped?  ─→ sink.save(adjusted)  [persist_adjusted]
//! ```
//!
//! Windows overlap (30 minutes fetched every minute). The watermark, the
//! newest row timestamp already submitted, keeps a row from being
//! validated twice; the upserting sink keeps a row from being stored twice.
//!
//! ## Restarts
//!
//! On its first cycle the pipeline reloads the most recent persisted points
//! into the engine's history, so the first live row is trend-checked
//! against what was stored before the restart.
//!
//! ## Failure
//!
//! A failed fetch or store fault fails the cycle. A failed save only fails
//! that point: the point is queued and saved again at the start of every
//! later cycle until it goes through. The row already passed the watermark
//! and sits in history, so it is never resubmitted to the engine.
//! [`EtlPipeline::run_every`] logs a failed cycle and waits for the next
//! tick.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use gridguard_core::{
    constants::{DEFAULT_FETCH_WINDOW_MINUTES, DEFAULT_POLL_INTERVAL_SECS, MS_PER_MINUTE},
    time::TimeSource,
    SeriesKey, Timestamp, ValidationEngine,
};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::{
    apg,
    sink::{PersistedPoint, PersistenceSink},
    source::DataSource,
    ConnectorError,
};

/// Points reloaded from the sink after a restart
pub const DEFAULT_SEED_LIMIT: usize = 5;

/// Settings for one metric/scope pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    pub metric: String,
    pub scope: String,
    /// Length of each fetched window
    pub window_minutes: u64,
    /// Pause between cycles
    pub interval_secs: u64,
    /// Store the clamped value of an out-of-range reading
    pub persist_adjusted: bool,
    /// Persisted points reloaded into history on the first cycle
    pub seed_limit: usize,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            metric: "apg_imbalance".to_string(),
            scope: "austria".to_string(),
            window_minutes: DEFAULT_FETCH_WINDOW_MINUTES,
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            persist_adjusted: false,
            seed_limit: DEFAULT_SEED_LIMIT,
        }
    }
}

impl EtlConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConnectorError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConnectorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        if self.metric.is_empty() {
            return Err(ConnectorError::Config("metric must not be empty".into()));
        }
        if self.window_minutes == 0 {
            return Err(ConnectorError::Config("window_minutes must be at least 1".into()));
        }
        if self.interval_secs == 0 {
            return Err(ConnectorError::Config("interval_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Engine key of this pipeline's series
    pub fn series_key(&self) -> String {
        if self.scope.is_empty() {
            SeriesKey::new(self.metric.as_str()).to_string()
        } else {
            SeriesKey::scoped(self.metric.as_str(), self.scope.as_str()).to_string()
        }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_minutes.saturating_mul(MS_PER_MINUTE)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// What one cycle did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: u64,
    pub window_start: Timestamp,
    pub window_end: Timestamp,
    /// Rows with a published value
    pub fetched: usize,
    /// Rows at or before the watermark
    pub skipped: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// New rows written
    pub inserted: usize,
    /// Existing rows overwritten
    pub updated: usize,
    /// Rejected rows stored with their clamped value
    pub adjusted_persisted: usize,
    /// Queued saves from earlier cycles attempted again
    pub retried: usize,
    /// Saves that failed, retries included
    pub failed: usize,
}

/// Point whose save failed, waiting for the next cycle
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSave {
    value: f64,
    adjusted: bool,
}

/// Fetch → validate → persist for one series
pub struct EtlPipeline {
    config: EtlConfig,
    key: String,
    engine: Arc<ValidationEngine>,
    source: Arc<dyn DataSource>,
    sink: Arc<dyn PersistenceSink>,
    clock: Arc<dyn TimeSource>,
    cycles: AtomicU64,
    /// Newest row timestamp submitted so far; 0 before the first
    watermark: AtomicU64,
    restored: AtomicBool,
    /// Failed saves by row time
    pending: Mutex<BTreeMap<Timestamp, PendingSave>>,
}

impl EtlPipeline {
    pub fn new(
        config: EtlConfig,
        engine: Arc<ValidationEngine>,
        source: Arc<dyn DataSource>,
        sink: Arc<dyn PersistenceSink>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        let key = config.series_key();
        Self {
            config,
            key,
            engine,
            source,
            sink,
            clock,
            cycles: AtomicU64::new(0),
            watermark: AtomicU64::new(0),
            restored: AtomicBool::new(false),
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    pub fn series_key(&self) -> &str {
        &self.key
    }

    pub fn engine(&self) -> &Arc<ValidationEngine> {
        &self.engine
    }

    /// Cycles started so far
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Points whose save failed and will be retried next cycle
    pub fn pending_saves(&self) -> usize {
        self.pending().len()
    }

    /// Run one cycle
    pub async fn run_cycle(&self) -> Result<CycleReport, ConnectorError> {
        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        self.restore_history().await?;

        let mut report = CycleReport {
            cycle,
            ..CycleReport::default()
        };
        self.retry_pending(&mut report).await;

        let window_end = self.clock.now();
        let window_start = window_end.saturating_sub(self.config.window_ms());
        log::debug!(
            "cycle {} fetching {} from {} for [{}, {}]",
            cycle,
            self.key,
            self.source.name(),
            window_start,
            window_end
        );

        let response = self.source.fetch_window(window_start, window_end).await?;
        let rows = apg::extract_observations(&response, &self.key);

        report.window_start = window_start;
        report.window_end = window_end;
        report.fetched = rows.len();

        let watermark = self.watermark.load(Ordering::Relaxed);
        for raw in rows {
            let timestamp = raw.timestamp;
            if matches!(timestamp, Some(ts) if ts <= watermark) {
                report.skipped += 1;
                continue;
            }

            let verdict = self.engine.submit_raw(raw)?;
            if let Some(ts) = timestamp {
                self.watermark.fetch_max(ts, Ordering::Relaxed);
            }

            let value = if verdict.is_valid() {
                report.accepted += 1;
                Some(verdict.original_value())
            } else {
                report.rejected += 1;
                verdict.adjusted_value().filter(|_| self.config.persist_adjusted)
            };

            let (Some(time), Some(value)) = (timestamp, value) else {
                continue;
            };

            let save = PendingSave {
                value,
                adjusted: !verdict.is_valid(),
            };
            self.persist(time, save, &mut report).await;
        }

        log::info!(
            "cycle {} for {}: {} fetched, {} accepted, {} rejected, {} skipped, {} saved, {} failed, {} pending",
            cycle,
            self.key,
            report.fetched,
            report.accepted,
            report.rejected,
            report.skipped,
            report.inserted + report.updated,
            report.failed,
            self.pending_saves()
        );

        Ok(report)
    }

    /// Run a cycle on every tick until `shutdown` turns true or its sender
    /// is dropped; returns the number of cycles that succeeded
    pub async fn run_every(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut ticker = interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut succeeded = 0;

        log::info!("starting pipeline for {} every {:?}", self.key, self.config.interval());

        while !*shutdown.borrow() {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_cycle().await {
                        Ok(_) => succeeded += 1,
                        Err(e) => log::error!("cycle for {} failed: {}", self.key, e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        log::info!("stopping pipeline for {} after {} cycles", self.key, self.cycles());
        succeeded
    }

    async fn retry_pending(&self, report: &mut CycleReport) {
        let queued: Vec<(Timestamp, PendingSave)> =
            self.pending().iter().map(|(time, save)| (*time, *save)).collect();

        for (time, save) in queued {
            report.retried += 1;
            self.persist(time, save, report).await;
        }
    }

    /// Save one point; a failure leaves it queued for the next cycle
    async fn persist(&self, time: Timestamp, save: PendingSave, report: &mut CycleReport) {
        let point = PersistedPoint::new(
            time,
            self.config.metric.as_str(),
            self.config.scope.as_str(),
            save.value,
        );

        match self.sink.save(&point).await {
            Ok(inserted) => {
                if inserted {
                    report.inserted += 1;
                } else {
                    report.updated += 1;
                }
                if save.adjusted {
                    report.adjusted_persisted += 1;
                }
                self.pending().remove(&time);
            }
            Err(e) => {
                log::error!("failed to save {} at {}: {}", self.key, time, e);
                report.failed += 1;
                self.pending().insert(time, save);
            }
        }
    }

    fn pending(&self) -> MutexGuard<'_, BTreeMap<Timestamp, PendingSave>> {
        match self.pending.lock() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    async fn restore_history(&self) -> Result<(), ConnectorError> {
        if self.restored.load(Ordering::Acquire) {
            return Ok(());
        }

        if self.config.seed_limit > 0 && self.engine.readings(&self.key)?.is_empty() {
            let recent = self
                .sink
                .recent(&self.config.metric, &self.config.scope, self.config.seed_limit)
                .await?;

            if let Some(newest) = recent.iter().map(|point| point.time).max() {
                self.watermark.fetch_max(newest, Ordering::Relaxed);
                self.engine
                    .seed_history(&self.key, recent.iter().map(PersistedPoint::reading))?;
                log::info!("restored {} persisted points into {}", recent.len(), self.key);
            }
        }

        self.restored.store(true, Ordering::Release);
        Ok(())
    }
}

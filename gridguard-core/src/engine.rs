//! Validation Engine: Policy Composition over the History Store
//!
//! ## Overview
//!
//! The engine is the single entry point for observations. For each one it:
//!
//! ```text
//! observation ─→ finite? ─→ bounds ─→ ┌──────── series lock ────────┐
//!                  │           │      │ trend vs history → append   │
//!                  ↓           ↓      └─────────────────────────────┘
//!               reject      reject              │
//!                                               ↓
//!                                  verdict + observer callback
//! ```
//!
//! - Checks run in policy order and stop at the first failure.
//! - History is written only after every check has passed, so a rejected
//!   observation never changes what later observations are compared with.
//! - The trend decision and the append happen under the same series lock;
//!   two concurrent observations for one key cannot both decide against
//!   the same history.
//!
//! ## Errors
//!
//! Rejections are verdicts. The only `Err` is a [`StoreError`], surfaced
//! unretried.
//!
//! ## Example
//!
//! ```rust
//! use gridguard_core::{EngineConfig, Observation, ValidationEngine, ValidationPolicy};
//!
//! let engine = ValidationEngine::new(
//!     EngineConfig::default().with_default_policy(ValidationPolicy::grid_imbalance()),
//! );
//!
//! let first = engine.submit(&Observation::new("apg_imbalance_austria", 60_000, 120.0))?;
//! let spike = engine.submit(&Observation::new("apg_imbalance_austria", 120_000, 480.0))?;
//!
//! assert!(first.is_valid());
//! assert!(!spike.is_valid());
//! assert_eq!(engine.history("apg_imbalance_austria")?, vec![120.0]);
//! # Ok::<(), gridguard_core::StoreError>(())
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    config::EngineConfig,
    errors::{Rejection, StoreError},
    observation::{Observation, RawObservation},
    observer::{LogObserver, ValidationObserver},
    policy::ValidationPolicy,
    store::HistoryStore,
    time::Timestamp,
    traits::{TimestampedReading, Validatable, Validator},
    verdict::ValidationVerdict,
};

/// Running totals of engine outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Observations that passed every check
    pub accepted: u64,
    /// Inputs rejected for any reason
    pub rejected: u64,
    /// Rejections that carried a clamped value
    pub adjusted: u64,
}

#[derive(Debug, Default)]
struct Counters {
    accepted: AtomicU64,
    rejected: AtomicU64,
    adjusted: AtomicU64,
}

/// Validates observations and maintains per-series history
pub struct ValidationEngine {
    config: EngineConfig,
    store: HistoryStore,
    observer: Box<dyn ValidationObserver>,
    counters: Counters,
}

impl ValidationEngine {
    /// Engine that reports through [`LogObserver`]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_observer(config, LogObserver)
    }

    /// Engine that reports to `observer`
    pub fn with_observer(config: EngineConfig, observer: impl ValidationObserver + 'static) -> Self {
        let store = HistoryStore::new(config.history_capacity);
        Self {
            config,
            store,
            observer: Box::new(observer),
            counters: Counters::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Validate using the policy configured for the observation's key
    pub fn submit(&self, observation: &Observation) -> Result<ValidationVerdict, StoreError> {
        let policy = *self.config.policy_for(&observation.key);
        self.submit_with(observation, &policy)
    }

    /// Validate an ingress record whose fields may be absent
    ///
    /// `value` is checked before `timestamp`. A record without a value
    /// yields a verdict whose original value is NaN.
    pub fn submit_raw(&self, raw: RawObservation) -> Result<ValidationVerdict, StoreError> {
        let original = raw.value.unwrap_or(f64::NAN);
        let timestamp = raw.timestamp;
        let key = raw.key.clone();

        match raw.into_observation() {
            Ok(observation) => self.submit(&observation),
            Err(rejection) => Ok(self.reject(&key, timestamp, original, rejection)),
        }
    }

    /// Validate with an explicit policy
    pub fn submit_with(
        &self,
        observation: &Observation,
        policy: &ValidationPolicy,
    ) -> Result<ValidationVerdict, StoreError> {
        let value = observation.value;
        let timestamp = Some(observation.timestamp);

        // Comparisons against NaN are meaningless; stop here
        if !value.is_valid() {
            return Ok(self.reject(
                &observation.key,
                timestamp,
                value,
                Rejection::InvalidNumeric { value },
            ));
        }

        let mut verdict = ValidationVerdict::accepted(value);
        if let Some(bounds) = policy.bounds() {
            verdict = bounds.validate(value);
            if let Some(rejection) = verdict.rejection().copied() {
                return Ok(self.reject(&observation.key, timestamp, value, rejection));
            }
        }

        let reading = TimestampedReading::new(value, observation.timestamp);
        let trend = policy.trend().copied();
        let (verdict, history_len) = self.store.with_history(&observation.key, |history| {
            if let Some(trend) = trend {
                let checked = trend.check(value, history);
                if !checked.is_valid() {
                    return (checked, history.len());
                }
                verdict = checked;
            }
            history.push(reading);
            (verdict, history.len())
        })?;

        match verdict.rejection().copied() {
            Some(rejection) => Ok(self.reject(&observation.key, timestamp, value, rejection)),
            None => {
                self.counters.accepted.fetch_add(1, Ordering::Relaxed);
                self.observer.accepted(observation, &verdict, history_len);
                Ok(verdict)
            }
        }
    }

    /// Accepted values for `key`, oldest first
    pub fn history(&self, key: &str) -> Result<Vec<f64>, StoreError> {
        self.store.get(key)
    }

    /// Accepted readings for `key`, oldest first
    pub fn readings(&self, key: &str) -> Result<Vec<TimestampedReading>, StoreError> {
        self.store.readings(key)
    }

    /// Restore the history of `key` from durable storage
    pub fn seed_history<I>(&self, key: &str, readings: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = TimestampedReading>,
    {
        self.store.seed(key, readings)
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            accepted: self.counters.accepted.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            adjusted: self.counters.adjusted.load(Ordering::Relaxed),
        }
    }

    fn reject(
        &self,
        key: &str,
        timestamp: Option<Timestamp>,
        value: f64,
        rejection: Rejection,
    ) -> ValidationVerdict {
        let verdict = ValidationVerdict::rejected(value, rejection);

        self.counters.rejected.fetch_add(1, Ordering::Relaxed);
        if verdict.adjusted_value().is_some() {
            self.counters.adjusted.fetch_add(1, Ordering::Relaxed);
        }
        self.observer.rejected(key, timestamp, &verdict);

        verdict
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

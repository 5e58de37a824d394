//! Common test utilities for gridguard-core integration tests
//!
//! - Deterministic grid-like series generators
//! - A recording observer for asserting what the engine reported
//! - Engine builders with the observer wired in

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use gridguard_core::{
    EngineConfig, Observation, Timestamp, ValidationEngine, ValidationObserver, ValidationPolicy,
    ValidationVerdict,
};

/// One APG reporting step
pub const MINUTE_MS: Timestamp = 60_000;

/// 2024-01-01T00:00:00Z
pub const START_MS: Timestamp = 1_704_067_200_000;

/// What the engine told its observer
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Accepted { key: String, value: f64, history_len: usize },
    Rejected { key: String, timestamp: Option<Timestamp>, reason: String },
}

/// Observer that keeps every callback for later inspection
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    outcomes: Arc<Mutex<Vec<Outcome>>>,
}

impl RecordingObserver {
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().unwrap().clone()
    }

    pub fn rejected_count(&self) -> usize {
        self.outcomes()
            .iter()
            .filter(|o| matches!(o, Outcome::Rejected { .. }))
            .count()
    }
}

impl ValidationObserver for RecordingObserver {
    fn accepted(&self, observation: &Observation, verdict: &ValidationVerdict, history_len: usize) {
        self.outcomes.lock().unwrap().push(Outcome::Accepted {
            key: observation.key.clone(),
            value: verdict.original_value(),
            history_len,
        });
    }

    fn rejected(&self, key: &str, timestamp: Option<Timestamp>, verdict: &ValidationVerdict) {
        self.outcomes.lock().unwrap().push(Outcome::Rejected {
            key: key.to_string(),
            timestamp,
            reason: verdict.reason().unwrap_or_default(),
        });
    }
}

/// Engine with a recorder attached; the returned handle shares its log
pub fn recorded_engine(config: EngineConfig) -> (ValidationEngine, RecordingObserver) {
    let recorder = RecordingObserver::default();
    let engine = ValidationEngine::with_observer(config, recorder.clone());
    (engine, recorder)
}

/// Engine applying `policy` to every key
pub fn engine_with(policy: ValidationPolicy) -> (ValidationEngine, RecordingObserver) {
    recorded_engine(EngineConfig::default().with_default_policy(policy))
}

/// Minute-spaced observations for `key` starting at [`START_MS`]
pub fn minute_series(key: &str, values: &[f64]) -> Vec<Observation> {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| Observation::new(key, START_MS + i as u64 * MINUTE_MS, value))
        .collect()
}

/// Smooth imbalance-like walk that never jumps more than `step`
///
/// Deterministic so failures reproduce without a seed.
pub fn smooth_walk(len: usize, step: f64) -> Vec<f64> {
    let mut value: f64 = 0.0;
    (0..len)
        .map(|i| {
            // Sign flips every 7 samples, magnitude cycles through 1..=step
            let direction = if (i / 7) % 2 == 0 { 1.0 } else { -1.0 };
            let magnitude = ((i % 5) as f64 + 1.0) / 5.0 * step;
            value = (value + direction * magnitude).clamp(-900.0, 900.0);
            value
        })
        .collect()
}

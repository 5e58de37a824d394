//! Engine scenario tests
//!
//! Each test follows one series through the engine the way a collector
//! would feed it: minute-spaced APG-style readings, solar plant output,
//! restarts that reseed history, and concurrent workers.

mod common;

use std::sync::Arc;
use std::thread;

use common::{engine_with, minute_series, recorded_engine, smooth_walk, Outcome, MINUTE_MS, START_MS};
use gridguard_core::{
    validate_bounds, validate_trend, BoundsValidator, EngineConfig, Observation, RawObservation,
    RejectionKind, TimestampedReading, TrendValidator, ValidationEngine, ValidationPolicy,
};

// ===== BOUNDS =====

#[test]
fn solar_below_minimum_clamps_to_zero() {
    let verdict = validate_bounds(-5.0, 0.0, 5000.0);

    assert!(!verdict.is_valid());
    assert!(verdict.reason().unwrap().contains("below minimum"));
    assert_eq!(verdict.adjusted_value(), Some(0.0));
    assert_eq!(verdict.original_value(), -5.0);
}

#[test]
fn solar_above_maximum_clamps_to_capacity() {
    let verdict = validate_bounds(6000.0, 0.0, 5000.0);

    assert!(!verdict.is_valid());
    assert!(verdict.reason().unwrap().contains("above maximum"));
    assert_eq!(verdict.adjusted_value(), Some(5000.0));
}

// ===== TREND =====

#[test]
fn jump_of_150_exceeds_limit_of_100() {
    let verdict = validate_trend(250.0, &[100.0], 100.0);

    assert!(!verdict.is_valid());
    assert_eq!(
        verdict.reason().as_deref(),
        Some("value jump too large: 150 from previous value 100")
    );
    assert_eq!(verdict.adjusted_value(), None);
}

#[test]
fn bounds_failure_on_empty_history_never_reaches_trend() {
    let (engine, recorder) = engine_with(ValidationPolicy::BoundsThenTrend {
        bounds: BoundsValidator::new(0.0, 5000.0),
        trend: TrendValidator::new(100.0),
    });

    let verdict = engine.submit(&Observation::new("plant", START_MS, 99999.0)).unwrap();

    assert_eq!(verdict.kind(), Some(RejectionKind::OutOfRange));
    assert!(engine.history("plant").unwrap().is_empty());
    assert_eq!(recorder.rejected_count(), 1);
}

// ===== HISTORY =====

#[test]
fn capacity_100_keeps_last_100_of_105() {
    let (engine, _) = recorded_engine(
        EngineConfig::default()
            .with_capacity(100)
            .with_default_policy(ValidationPolicy::time_series()),
    );

    let values: Vec<f64> = (1..=105).map(f64::from).collect();
    for observation in minute_series("series", &values) {
        assert!(engine.submit(&observation).unwrap().is_valid());
    }

    let expected: Vec<f64> = (6..=105).map(f64::from).collect();
    assert_eq!(engine.history("series").unwrap(), expected);
}

#[test]
fn smooth_imbalance_day_is_fully_accepted() {
    let (engine, recorder) = engine_with(ValidationPolicy::grid_imbalance());
    let values = smooth_walk(1440, 150.0);

    for observation in minute_series("apg_imbalance_austria", &values) {
        engine.submit(&observation).unwrap();
    }

    assert_eq!(recorder.rejected_count(), 0);
    assert_eq!(engine.stats().accepted, 1440);
    assert_eq!(engine.history("apg_imbalance_austria").unwrap().len(), 100);
}

#[test]
fn spike_is_rejected_and_series_continues_from_last_good_value() {
    let (engine, recorder) = engine_with(ValidationPolicy::grid_imbalance());
    let key = "apg_imbalance_austria";

    for observation in minute_series(key, &[120.0, 180.0, 750.0, 240.0]) {
        engine.submit(&observation).unwrap();
    }

    // 750 is inside ±1000 but 570 MW away from 180
    assert_eq!(engine.history(key).unwrap(), vec![120.0, 180.0, 240.0]);
    assert_eq!(
        recorder.outcomes()[2],
        Outcome::Rejected {
            key: key.to_string(),
            timestamp: Some(START_MS + 2 * MINUTE_MS),
            reason: "value jump too large: 570 from previous value 180".to_string(),
        }
    );
}

#[test]
fn late_reading_is_compared_with_latest_timestamp() {
    let (engine, _) = engine_with(ValidationPolicy::grid_imbalance());
    let key = "apg_imbalance_austria";

    engine.submit(&Observation::new(key, START_MS + 2 * MINUTE_MS, 500.0)).unwrap();
    // Arrives late but within 200 of the newest reading
    engine.submit(&Observation::new(key, START_MS, 400.0)).unwrap();

    // Appended last, yet 500 still anchors the next check
    let verdict = engine
        .submit(&Observation::new(key, START_MS + 3 * MINUTE_MS, 680.0))
        .unwrap();
    assert!(verdict.is_valid());
}

#[test]
fn restart_reseeds_trend_context() {
    let key = "apg_imbalance_austria";
    let persisted = vec![
        TimestampedReading::new(-300.0, START_MS),
        TimestampedReading::new(-250.0, START_MS + MINUTE_MS),
    ];

    let (engine, _) = engine_with(ValidationPolicy::grid_imbalance());
    engine.seed_history(key, persisted).unwrap();

    let after_restart = Observation::new(key, START_MS + 2 * MINUTE_MS, 100.0);
    assert_eq!(
        engine.submit(&after_restart).unwrap().kind(),
        Some(RejectionKind::ImplausibleTrend)
    );
}

#[test]
fn missing_value_reported_before_missing_timestamp() {
    let (engine, recorder) = engine_with(ValidationPolicy::grid_imbalance());

    let verdict = engine
        .submit_raw(RawObservation::new("apg_imbalance_austria", None, None))
        .unwrap();

    assert_eq!(verdict.kind(), Some(RejectionKind::MissingField));
    assert_eq!(verdict.reason().as_deref(), Some("missing required field: value"));
    assert_eq!(
        recorder.outcomes(),
        vec![Outcome::Rejected {
            key: "apg_imbalance_austria".to_string(),
            timestamp: None,
            reason: "missing required field: value".to_string(),
        }]
    );
}

// ===== CONCURRENCY =====

#[test]
fn distinct_keys_processed_concurrently_do_not_interfere() {
    let (engine, _) = engine_with(ValidationPolicy::time_series());
    let engine = Arc::new(engine);

    let handles: Vec<_> = ["A", "B"]
        .into_iter()
        .enumerate()
        .map(|(offset, key)| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let values: Vec<f64> = (0..60).map(|i| (offset * 1000 + i) as f64).collect();
                for observation in minute_series(key, &values) {
                    assert!(engine.submit(&observation).unwrap().is_valid());
                }
                values
            })
        })
        .collect();

    let expected: Vec<Vec<f64>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(engine.history("A").unwrap(), expected[0]);
    assert_eq!(engine.history("B").unwrap(), expected[1]);
}

#[test]
fn same_key_decisions_are_serialised() {
    // Threads offer +90 or -90 from a seeded 0. Whichever lands first sets
    // the anchor; the opposite sign is then 180 away and must be rejected.
    let engine = Arc::new(ValidationEngine::with_observer(
        EngineConfig::default().with_default_policy(ValidationPolicy::time_series()),
        gridguard_core::NoopObserver,
    ));
    engine.seed_history("shared", [TimestampedReading::new(0.0, START_MS)]).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let value = if t % 2 == 0 { 90.0 } else { -90.0 };
                engine
                    .submit(&Observation::new("shared", START_MS + MINUTE_MS, value))
                    .unwrap()
                    .is_valid()
            })
        })
        .collect();

    let accepted = handles.into_iter().filter_map(|h| h.join().ok()).filter(|&ok| ok).count();
    let history = engine.history("shared").unwrap();

    // Consecutive entries never differ by more than the limit
    assert_eq!(history.len(), accepted + 1);
    assert!(history.windows(2).all(|w| (w[1] - w[0]).abs() <= 100.0));
}

//! ETL cycle integration tests
//!
//! Drives full fetch → validate → persist cycles against fixture payloads
//! shaped like the APG one-minute imbalance feed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gridguard_connectors::{
    apg::ImbalanceResponse,
    etl::{EtlConfig, EtlPipeline},
    sink::{MemorySink, PersistedPoint, PersistenceSink, SinkError},
    source::{DataSource, StaticSource},
    ConnectorError,
};
use gridguard_core::{
    time::FixedTime, EngineConfig, NoopObserver, Timestamp, ValidationEngine, ValidationPolicy,
};
use serde_json::json;
use tokio::sync::watch;

// ===== TEST CONSTANTS =====

/// 2025-05-06T12:00:00Z
const T_1200: Timestamp = 1_746_532_800_000;

/// 2025-05-06T12:30:00Z, the clock for every cycle
const T_1230: Timestamp = 1_746_534_600_000;

const MINUTE_MS: Timestamp = 60_000;

// ===== FIXTURES =====

/// Payload with one row per `(HH:MM, value)` on 06.05.2025
fn payload(rows: &[(&str, Option<f64>)]) -> String {
    let rows: Vec<_> = rows
        .iter()
        .map(|(time, value)| {
            json!({
                "DF": "06.05.2025", "TF": time,
                "DT": "06.05.2025", "TT": time,
                "V": [ { "V": value, "E": false, "M": false } ]
            })
        })
        .collect();

    json!({
        "ResponseData": {
            "Description": "Regelzonenbilanz",
            "ValueColumns": [ { "InternalName": "DRZ" } ],
            "ValueRows": rows
        }
    })
    .to_string()
}

fn engine(policy: ValidationPolicy) -> Arc<ValidationEngine> {
    Arc::new(ValidationEngine::with_observer(
        EngineConfig::default().with_default_policy(policy),
        NoopObserver,
    ))
}

fn pipeline(
    config: EtlConfig,
    engine: Arc<ValidationEngine>,
    source: Arc<dyn DataSource>,
    sink: Arc<dyn PersistenceSink>,
) -> EtlPipeline {
    EtlPipeline::new(config, engine, source, sink, Arc::new(FixedTime::new(T_1230)))
}

fn imbalance_day() -> String {
    payload(&[
        ("12:00", Some(100.0)),
        ("12:01", Some(120.0)),
        ("12:02", Some(700.0)),  // glitch, 580 MW jump
        ("12:03", Some(150.0)),
        ("12:04", None),         // not yet published
        ("12:05", Some(1500.0)), // outside ±1000
    ])
}

struct FailingSink;

#[async_trait]
impl PersistenceSink for FailingSink {
    async fn save(&self, _point: &PersistedPoint) -> Result<bool, SinkError> {
        Err(SinkError::Unavailable("connection refused".into()))
    }

    async fn recent(&self, _: &str, _: &str, _: usize) -> Result<Vec<PersistedPoint>, SinkError> {
        Ok(Vec::new())
    }
}

/// Memory sink that refuses every save while `down` is set
#[derive(Default)]
struct FlakySink {
    inner: MemorySink,
    down: AtomicBool,
}

impl FlakySink {
    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }
}

#[async_trait]
impl PersistenceSink for FlakySink {
    async fn save(&self, point: &PersistedPoint) -> Result<bool, SinkError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(SinkError::Unavailable("connection reset".into()));
        }
        self.inner.save(point).await
    }

    async fn recent(&self, metric: &str, scope: &str, limit: usize) -> Result<Vec<PersistedPoint>, SinkError> {
        self.inner.recent(metric, scope, limit).await
    }
}

struct FailingSource;

#[async_trait]
impl DataSource for FailingSource {
    async fn fetch_window(&self, _: Timestamp, _: Timestamp) -> Result<ImbalanceResponse, ConnectorError> {
        Err(ConnectorError::Source("Server error 503".into()))
    }
}

// ===== CYCLES =====

#[tokio::test]
async fn test_cycle_validates_and_persists_window() {
    let source = Arc::new(StaticSource::from_json(&imbalance_day()).unwrap());
    let sink = Arc::new(MemorySink::new());
    let engine = engine(ValidationPolicy::grid_imbalance());
    let etl = pipeline(EtlConfig::default(), engine.clone(), source.clone(), sink.clone());

    let report = etl.run_cycle().await.unwrap();

    assert_eq!(report.cycle, 1);
    assert_eq!((report.window_start, report.window_end), (T_1230 - 30 * MINUTE_MS, T_1230));
    assert_eq!(source.requests(), vec![(T_1230 - 30 * MINUTE_MS, T_1230)]);
    assert_eq!(report.fetched, 5);
    assert_eq!(report.accepted, 3);
    assert_eq!(report.rejected, 2);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.adjusted_persisted, 0);

    assert_eq!(engine.history("apg_imbalance_austria").unwrap(), vec![100.0, 120.0, 150.0]);
    assert_eq!(sink.get("apg_imbalance", "austria", T_1200 + 3 * MINUTE_MS), Some(150.0));
    assert_eq!(sink.get("apg_imbalance", "austria", T_1200 + 2 * MINUTE_MS), None);
}

#[tokio::test]
async fn test_overlapping_window_is_not_reprocessed() {
    let source = Arc::new(StaticSource::from_json(&imbalance_day()).unwrap());
    let sink = Arc::new(MemorySink::new());
    let engine = engine(ValidationPolicy::grid_imbalance());
    let etl = pipeline(EtlConfig::default(), engine.clone(), source, sink.clone());

    etl.run_cycle().await.unwrap();
    let second = etl.run_cycle().await.unwrap();

    assert_eq!(second.cycle, 2);
    assert_eq!(second.skipped, 5);
    assert_eq!(second.accepted + second.rejected, 0);
    assert_eq!(sink.len(), 3);
    assert_eq!(engine.history("apg_imbalance_austria").unwrap().len(), 3);
}

#[tokio::test]
async fn test_restart_restores_trend_context_from_sink() {
    let sink = Arc::new(MemorySink::new());
    let first = pipeline(
        EtlConfig::default(),
        engine(ValidationPolicy::grid_imbalance()),
        Arc::new(StaticSource::from_json(&imbalance_day()).unwrap()),
        sink.clone(),
    );
    first.run_cycle().await.unwrap();

    // Fresh process: new engine, same storage
    let engine = engine(ValidationPolicy::grid_imbalance());
    let after_restart = payload(&[
        ("12:03", Some(150.0)),
        ("12:06", Some(420.0)), // 270 MW from the persisted 150
        ("12:07", Some(200.0)),
    ]);
    let second = pipeline(
        EtlConfig::default(),
        engine.clone(),
        Arc::new(StaticSource::from_json(&after_restart).unwrap()),
        sink.clone(),
    );

    let report = second.run_cycle().await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.rejected, 1);
    assert_eq!(report.accepted, 1);
    assert_eq!(
        engine.history("apg_imbalance_austria").unwrap(),
        vec![100.0, 120.0, 150.0, 200.0]
    );
}

#[tokio::test]
async fn test_clamped_values_persisted_when_enabled() {
    let config = EtlConfig {
        metric: "solar_production".into(),
        scope: "plant_7".into(),
        persist_adjusted: true,
        ..EtlConfig::default()
    };
    let source = payload(&[("12:00", Some(1200.0)), ("12:01", Some(6000.0)), ("12:02", Some(-5.0))]);
    let sink = Arc::new(MemorySink::new());
    let etl = pipeline(
        config,
        engine(ValidationPolicy::solar_production()),
        Arc::new(StaticSource::from_json(&source).unwrap()),
        sink.clone(),
    );

    let report = etl.run_cycle().await.unwrap();

    assert_eq!((report.accepted, report.rejected), (1, 2));
    assert_eq!(report.adjusted_persisted, 2);
    let values: Vec<f64> = sink.points().iter().map(|p| p.value).collect();
    assert_eq!(values, vec![1200.0, 5000.0, 0.0]);
}

#[tokio::test]
async fn test_failed_saves_do_not_fail_the_cycle() {
    let etl = pipeline(
        EtlConfig::default(),
        engine(ValidationPolicy::grid_imbalance()),
        Arc::new(StaticSource::from_json(&imbalance_day()).unwrap()),
        Arc::new(FailingSink),
    );

    let report = etl.run_cycle().await.unwrap();

    assert_eq!(report.accepted, 3);
    assert_eq!(report.failed, 3);
    assert_eq!(report.inserted, 0);
    assert_eq!(etl.pending_saves(), 3);
}

#[tokio::test]
async fn test_failed_save_is_retried_once_sink_recovers() {
    let sink = Arc::new(FlakySink::default());
    let engine = engine(ValidationPolicy::grid_imbalance());
    let etl = pipeline(
        EtlConfig::default(),
        engine.clone(),
        Arc::new(StaticSource::from_json(&payload(&[("12:00", Some(100.0))])).unwrap()),
        sink.clone(),
    );

    sink.set_down(true);
    let first = etl.run_cycle().await.unwrap();
    assert_eq!((first.accepted, first.failed), (1, 1));
    assert_eq!(etl.pending_saves(), 1);

    // Still down: the point stays queued
    let second = etl.run_cycle().await.unwrap();
    assert_eq!((second.retried, second.failed, second.skipped), (1, 1, 1));
    assert_eq!(etl.pending_saves(), 1);

    sink.set_down(false);
    let third = etl.run_cycle().await.unwrap();
    assert_eq!((third.retried, third.inserted, third.failed), (1, 1, 0));
    assert_eq!(third.skipped, 1);
    assert_eq!(etl.pending_saves(), 0);

    assert_eq!(sink.inner.len(), 1);
    assert_eq!(sink.inner.get("apg_imbalance", "austria", T_1200), Some(100.0));
    // The row entered history once, not once per attempt
    assert_eq!(engine.history("apg_imbalance_austria").unwrap(), vec![100.0]);

    let fourth = etl.run_cycle().await.unwrap();
    assert_eq!((fourth.retried, fourth.inserted), (0, 0));
}

#[tokio::test]
async fn test_source_failure_fails_the_cycle() {
    let etl = pipeline(
        EtlConfig::default(),
        engine(ValidationPolicy::grid_imbalance()),
        Arc::new(FailingSource),
        Arc::new(MemorySink::new()),
    );

    assert!(matches!(etl.run_cycle().await, Err(ConnectorError::Source(_))));
    assert_eq!(etl.cycles(), 1);
}

// ===== SCHEDULING =====

#[tokio::test]
async fn test_run_every_stops_on_shutdown() {
    let etl = Arc::new(pipeline(
        EtlConfig::default(),
        engine(ValidationPolicy::grid_imbalance()),
        Arc::new(StaticSource::from_json(&imbalance_day()).unwrap()),
        Arc::new(MemorySink::new()),
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let runner = Arc::clone(&etl);
    let handle = tokio::spawn(async move { runner.run_every(shutdown_rx).await });

    // The first tick fires immediately; the next is a minute away
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(true).unwrap();

    let succeeded = handle.await.unwrap();
    assert_eq!(succeeded, 1);
    assert_eq!(etl.cycles(), 1);
}

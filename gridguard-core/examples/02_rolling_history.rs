//! Rolling History Example
//!
//! Feeds a short grid imbalance series with a feed glitch through the
//! engine and shows how history evolves.
//!
//! ## What You'll Learn
//!
//! - Configuring the engine from JSON
//! - Why a rejected reading never becomes the next reference
//! - Restoring history after a restart
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_rolling_history
//! ```

use gridguard_core::{
    EngineConfig, NoopObserver, Observation, SeriesKey, StoreError, TimestampedReading,
    ValidationEngine,
};

const CONFIG: &str = r#"{
    "history_capacity": 5,
    "default_policy": {
        "mode": "bounds_then_trend",
        "bounds": { "min": -1000.0, "max": 1000.0 },
        "trend": { "max_delta": 200.0, "anchor": "latest_timestamp" }
    }
}"#;

/// 2024-01-01T00:00:00Z
const START_MS: u64 = 1_704_067_200_000;
const MINUTE_MS: u64 = 60_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("GridGuard Rolling History Example");
    println!("=================================\n");

    let config = EngineConfig::from_json_str(CONFIG)?;
    let engine = ValidationEngine::with_observer(config, NoopObserver);
    let key = SeriesKey::scoped("apg_imbalance", "austria").to_string();

    // 880 is a one-minute glitch; 1500 is outside the grid's range
    let readings = [40.0, 95.0, 150.0, 880.0, 210.0, 1500.0, 260.0, 300.0];

    for (minute, value) in readings.iter().enumerate() {
        let observation = Observation::new(&key, START_MS + minute as u64 * MINUTE_MS, *value);
        let verdict = engine.submit(&observation)?;

        let status = if verdict.is_valid() { "ok" } else { "REJECTED" };
        println!("t+{}min {:>7.1} MW  {:<9} history={:?}", minute, value, status, engine.history(&key)?);
        if let Some(reason) = verdict.reason() {
            println!("              {}", reason);
        }
    }

    let stats = engine.stats();
    println!(
        "\n{} accepted, {} rejected ({} with an adjusted value)",
        stats.accepted, stats.rejected, stats.adjusted
    );

    restart(&key, engine.readings(&key)?)?;
    Ok(())
}

/// Simulate a process restart that restores the persisted tail
fn restart(key: &str, persisted: Vec<TimestampedReading>) -> Result<(), StoreError> {
    println!("\nRestarting with {} persisted readings", persisted.len());

    let engine = ValidationEngine::with_observer(EngineConfig::default(), NoopObserver);
    engine.seed_history(key, persisted)?;
    println!("Restored history: {:?}", engine.history(key)?);
    Ok(())
}

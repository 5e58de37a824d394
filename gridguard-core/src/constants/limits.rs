//! Admissible Ranges and Jump Thresholds
//!
//! Static limits for the metrics GridGuard ships presets for. Bounds are
//! inclusive: a value equal to a limit is admissible.

// ===== SOLAR PRODUCTION =====

/// Minimum plausible output of a solar plant (kW).
///
/// Plants do not consume through the production meter; negative readings
/// are metering faults.
pub const SOLAR_MIN_KW: f64 = 0.0;

/// Maximum plausible output of a single monitored plant (kW).
///
/// Nameplate ceiling for the plants in the reference deployment.
pub const SOLAR_MAX_KW: f64 = 5000.0;

// ===== GRID IMBALANCE =====

/// Lower bound for control-area imbalance (MW).
///
/// Typical imbalance sits within ±500 MW; ±1000 MW leaves room for
/// exceptional but real events.
///
/// Source: APG control-area balancing history
pub const IMBALANCE_MIN_MW: f64 = -1000.0;

/// Upper bound for control-area imbalance (MW).
///
/// Source: APG control-area balancing history
pub const IMBALANCE_MAX_MW: f64 = 1000.0;

/// Largest credible change between consecutive one-minute imbalance
/// values (MW).
///
/// Larger steps are treated as feed glitches rather than grid events.
pub const IMBALANCE_MAX_JUMP_MW: f64 = 200.0;

// ===== GENERIC TIME SERIES =====

/// Default jump threshold for unit-less time series.
pub const TIME_SERIES_MAX_JUMP: f64 = 100.0;

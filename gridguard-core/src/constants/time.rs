//! Time-Related Constants
//!
//! Conversion factors and the cadence used by collectors.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u64 = 60;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: u64 = MS_PER_SECOND * SECONDS_PER_MINUTE;

// ===== COLLECTION CADENCE =====

/// Width of the window fetched on every poll (minutes).
///
/// The upstream publishes one-minute values with a short delay and may
/// revise recent rows, so each poll re-reads the last half hour. Rows
/// already persisted are skipped by the idempotent sink.
pub const DEFAULT_FETCH_WINDOW_MINUTES: u64 = 30;

/// Delay between polls (seconds).
///
/// Matches the one-minute resolution of the upstream feed.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

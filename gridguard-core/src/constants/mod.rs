//! Constants for GridGuard Core
//!
//! This module provides centralized, documented constants used throughout
//! GridGuard. All numeric values are defined here with an explanation of
//! their purpose and where they come from.
//!
//! ## Organization
//!
//! Constants are grouped by domain:
//! - **Limits**: Admissible ranges and jump thresholds per metric
//! - **History**: Rolling history sizing
//! - **Time**: Unit conversions and collection cadence
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Include units in names (`_KW`, `_MW`, `_MS`)
//! 3. State the source of each limit

/// Admissible ranges and jump thresholds per metric.
pub mod limits;

/// Rolling history sizing.
pub mod history;

/// Time conversions and collection cadence.
pub mod time;

// Re-export commonly used constants for convenience
pub use limits::{
    SOLAR_MIN_KW, SOLAR_MAX_KW,
    IMBALANCE_MIN_MW, IMBALANCE_MAX_MW, IMBALANCE_MAX_JUMP_MW,
    TIME_SERIES_MAX_JUMP,
};

pub use history::DEFAULT_HISTORY_CAPACITY;

pub use time::{
    MS_PER_SECOND, MS_PER_MINUTE,
    DEFAULT_FETCH_WINDOW_MINUTES, DEFAULT_POLL_INTERVAL_SECS,
};

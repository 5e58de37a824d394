//! Bounds and Trend Validators
//!
//! ## Overview
//!
//! Every grid metric GridGuard handles is checked by some combination of
//! two rules:
//!
//! ### 1. Bounds Validation
//! Static limits on what the metric can plausibly report:
//! ```rust
//! use gridguard_core::validators::validate_bounds;
//!
//! // A solar plant cannot produce negative power
//! let verdict = validate_bounds(-5.0, 0.0, 5000.0);
//! assert_eq!(verdict.adjusted_value(), Some(0.0));
//! ```
//!
//! ### 2. Trend Validation
//! How far a value may move from the previous accepted one:
//! ```rust
//! use gridguard_core::validators::validate_trend;
//!
//! // A 150 MW step in one minute is a feed glitch, not the grid
//! assert!(!validate_trend(250.0, &[100.0], 100.0).is_valid());
//! ```
//!
//! Both rules are pure. The engine decides which of them run for a series
//! (see [`ValidationPolicy`](crate::policy::ValidationPolicy)) and owns the
//! history the trend rule reads.
//!
//! ## Outcomes
//!
//! | Rule | Rejection | Adjusted value |
//! |------|-----------|----------------|
//! | Bounds | below minimum / above maximum | the violated limit |
//! | Trend | implausible trend | none |
//!
//! ## Customization
//!
//! ```rust
//! use gridguard_core::validators::{BoundsValidator, TrendAnchor, TrendValidator};
//!
//! // Frequency deviation in mHz, ±800 with at most 50 per sample
//! let bounds = BoundsValidator::new(-800.0, 800.0);
//! let trend = TrendValidator::new(50.0).with_anchor(TrendAnchor::LatestTimestamp);
//! # let _ = (bounds, trend);
//! ```

mod bounds;
mod trend;
pub mod utils;

pub use bounds::{validate_bounds, BoundsValidator};
pub use trend::{validate_trend, validate_trend_by_timestamp, TrendAnchor, TrendValidator};

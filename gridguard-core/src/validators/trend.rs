//! Trend validator
//!
//! Rejects implausible discontinuities: a new value may not differ from
//! the previous accepted value by more than `max_delta`. Only the single
//! previous value is consulted, never a moving average.

use crate::{
    constants::{IMBALANCE_MAX_JUMP_MW, TIME_SERIES_MAX_JUMP},
    history::RollingHistory,
    traits::{TimestampedReading, Validator},
    verdict::ValidationVerdict,
};

use super::utils;

/// Check `value` against the last element of `history`
///
/// `history` is in insertion order, which is chronological; it is never
/// re-sorted. An empty history passes any finite value; NaN and ±Inf are
/// always rejected as `InvalidNumeric`, as is a non-finite last element.
///
/// ```rust
/// use gridguard_core::validators::validate_trend;
///
/// assert!(!validate_trend(250.0, &[100.0], 100.0).is_valid());
/// assert!(validate_trend(99999.0, &[], 100.0).is_valid());
/// ```
pub fn validate_trend(value: f64, history: &[f64], max_delta: f64) -> ValidationVerdict {
    verdict(value, utils::check_jump(value, history.last().copied(), max_delta))
}

/// Check `value` against the reading with the greatest timestamp
///
/// For histories whose order the caller cannot vouch for, e.g. rows merged
/// from storage and live state. Equal timestamps resolve to the later
/// entry.
pub fn validate_trend_by_timestamp(
    value: f64,
    history: &[TimestampedReading],
    max_delta: f64,
) -> ValidationVerdict {
    let previous = utils::latest_by_timestamp(history).map(|reading| reading.value);
    verdict(value, utils::check_jump(value, previous, max_delta))
}

fn verdict(value: f64, outcome: Result<(), crate::errors::Rejection>) -> ValidationVerdict {
    match outcome {
        Ok(()) => ValidationVerdict::accepted(value),
        Err(rejection) => ValidationVerdict::rejected(value, rejection),
    }
}

/// Which history entry counts as "previous"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TrendAnchor {
    /// Most recently appended reading
    #[default]
    LastAppended,
    /// Reading with the greatest timestamp
    LatestTimestamp,
}

/// Trend validator with a fixed jump threshold
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrendValidator {
    /// Largest admissible absolute change from the previous value
    max_delta: f64,

    #[cfg_attr(feature = "serde", serde(default))]
    anchor: TrendAnchor,
}

impl TrendValidator {
    pub fn new(max_delta: f64) -> Self {
        Self {
            max_delta: libm::fabs(max_delta),
            anchor: TrendAnchor::LastAppended,
        }
    }

    pub fn with_anchor(mut self, anchor: TrendAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Unit-less series, jumps up to 100
    pub fn time_series() -> Self {
        Self::new(TIME_SERIES_MAX_JUMP)
    }

    /// One-minute imbalance, jumps up to 200 MW, anchored on timestamps
    pub fn grid_imbalance() -> Self {
        Self::new(IMBALANCE_MAX_JUMP_MW).with_anchor(TrendAnchor::LatestTimestamp)
    }

    pub fn max_delta(&self) -> f64 {
        self.max_delta
    }

    pub fn anchor(&self) -> TrendAnchor {
        self.anchor
    }

    /// Reference reading this validator would compare against
    pub fn reference<'a>(&self, history: &'a RollingHistory) -> Option<&'a TimestampedReading> {
        match self.anchor {
            TrendAnchor::LastAppended => history.last(),
            TrendAnchor::LatestTimestamp => utils::latest_by_timestamp(history),
        }
    }
}

impl Validator for TrendValidator {
    fn check(&self, value: f64, history: &RollingHistory) -> ValidationVerdict {
        let previous = self.reference(history).map(|reading| reading.value);
        verdict(value, utils::check_jump(value, previous, self.max_delta))
    }
}

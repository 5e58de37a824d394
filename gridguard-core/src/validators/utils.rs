//! Common Validation Utilities
//!
//! ## Overview
//!
//! Shared building blocks for the bounds and trend validators, kept here so
//! both apply identical arithmetic.
//!
//! ## Design Principles
//!
//! ### 1. Pure Functions
//! Nothing here touches shared state. That makes the helpers trivial to
//! test and safe to call while a series lock is held.
//!
//! ### 2. Zero Allocation
//! Reference selection walks the history in place; nothing is sorted into
//! a scratch buffer.
//!
//! ## Reference Selection
//!
//! The trend check compares against exactly one earlier reading, never a
//! moving statistic. Which one depends on the anchor:
//!
//! ```text
//! appended:   [t=3 v=30] [t=1 v=10] [t=2 v=20]
//! last appended     → v=20
//! latest timestamp  → v=30
//! ```
//!
//! Ties on the timestamp resolve to the later-appended reading, the same
//! answer a stable sort followed by "take the last" would give.
//!
//! ## Non-finite Input
//!
//! NaN compares false against everything and infinity clamps like an
//! ordinary outlier, so both checks reject non-finite numbers before any
//! comparison. That covers the reference reading too.

use crate::{
    errors::Rejection,
    traits::{TimestampedReading, Validatable},
};

/// Reject NaN and ±Inf
pub fn check_finite(value: f64) -> Result<(), Rejection> {
    if value.is_valid() {
        Ok(())
    } else {
        Err(Rejection::InvalidNumeric { value })
    }
}

/// Check if a value is within the inclusive range `[min, max]`
pub fn check_range(value: f64, min: f64, max: f64) -> Result<(), Rejection> {
    check_finite(value)?;

    if value < min {
        Err(Rejection::BelowMinimum { value, min })
    } else if value > max {
        Err(Rejection::AboveMaximum { value, max })
    } else {
        Ok(())
    }
}

/// Check a value against its reference reading
///
/// No reference means there is nothing to compare with, which passes.
pub fn check_jump(value: f64, previous: Option<f64>, max_delta: f64) -> Result<(), Rejection> {
    check_finite(value)?;
    let Some(previous) = previous else {
        return Ok(());
    };
    check_finite(previous)?;

    let delta = absolute_delta(value, previous);
    if delta > max_delta {
        Err(Rejection::ImplausibleTrend { value, previous, delta })
    } else {
        Ok(())
    }
}

/// Absolute difference between two readings
pub fn absolute_delta(current: f64, previous: f64) -> f64 {
    libm::fabs(current - previous)
}

/// Reading with the greatest timestamp, later entries winning ties
pub fn latest_by_timestamp<'a, I>(readings: I) -> Option<&'a TimestampedReading>
where
    I: IntoIterator<Item = &'a TimestampedReading>,
{
    readings.into_iter().fold(None, |latest, reading| match latest {
        Some(current) if current.timestamp > reading.timestamp => Some(current),
        _ => Some(reading),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_check() {
        assert!(check_range(5.0, 0.0, 10.0).is_ok());
        assert!(check_range(0.0, 0.0, 10.0).is_ok());
        assert!(check_range(10.0, 0.0, 10.0).is_ok());
        assert_eq!(
            check_range(-1.0, 0.0, 10.0),
            Err(Rejection::BelowMinimum { value: -1.0, min: 0.0 })
        );
        assert_eq!(
            check_range(11.0, 0.0, 10.0),
            Err(Rejection::AboveMaximum { value: 11.0, max: 10.0 })
        );
    }

    #[test]
    fn jump_check() {
        assert!(check_jump(250.0, None, 100.0).is_ok());
        assert!(check_jump(200.0, Some(100.0), 100.0).is_ok());
        assert_eq!(
            check_jump(250.0, Some(100.0), 100.0),
            Err(Rejection::ImplausibleTrend { value: 250.0, previous: 100.0, delta: 150.0 })
        );
        // Downward jumps count the same
        assert!(check_jump(-50.0, Some(100.0), 100.0).is_err());
    }

    #[test]
    fn non_finite_rejected_before_comparison() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(check_finite(value), Err(Rejection::InvalidNumeric { .. })));
            assert!(matches!(
                check_range(value, 0.0, 10.0),
                Err(Rejection::InvalidNumeric { .. })
            ));
            assert!(matches!(
                check_jump(value, None, 100.0),
                Err(Rejection::InvalidNumeric { .. })
            ));
            // A corrupt reference cannot anchor the comparison
            assert!(matches!(
                check_jump(5.0, Some(value), 100.0),
                Err(Rejection::InvalidNumeric { .. })
            ));
        }
        assert!(check_finite(-0.0).is_ok());
    }

    #[test]
    fn latest_prefers_timestamp_then_insertion() {
        let readings = [
            TimestampedReading::new(30.0, 3),
            TimestampedReading::new(10.0, 1),
            TimestampedReading::new(31.0, 3),
            TimestampedReading::new(20.0, 2),
        ];

        assert_eq!(latest_by_timestamp(&readings).map(|r| r.value), Some(31.0));
        let empty: [TimestampedReading; 0] = [];
        assert!(latest_by_timestamp(&empty).is_none());
    }
}

//! Bounds validator
//!
//! Static admissibility range. A value outside the range is rejected and
//! the verdict carries the violated limit as the clamped value, so callers
//! that prefer a corrected series can persist that instead.

use crate::{
    constants::{IMBALANCE_MAX_MW, IMBALANCE_MIN_MW, SOLAR_MAX_KW, SOLAR_MIN_KW},
    history::RollingHistory,
    traits::Validator,
    verdict::ValidationVerdict,
};

use super::utils;

/// Check `value` against the inclusive range `[min, max]`
///
/// NaN and ±Inf are rejected as `InvalidNumeric` without a clamped value.
///
/// ```rust
/// use gridguard_core::validators::validate_bounds;
///
/// let verdict = validate_bounds(-5.0, 0.0, 5000.0);
/// assert!(!verdict.is_valid());
/// assert_eq!(verdict.adjusted_value(), Some(0.0));
/// ```
pub fn validate_bounds(value: f64, min: f64, max: f64) -> ValidationVerdict {
    match utils::check_range(value, min, max) {
        Ok(()) => ValidationVerdict::accepted(value),
        Err(rejection) => ValidationVerdict::rejected(value, rejection),
    }
}

/// Bounds validator with fixed limits
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundsValidator {
    /// Lowest admissible value
    min: f64,

    /// Highest admissible value
    max: f64,
}

impl BoundsValidator {
    /// Create validator with custom limits
    pub fn new(min: f64, max: f64) -> Self {
        // Sanity check: can't have min > max
        let (min, max) = if min > max { (max, min) } else { (min, max) };

        Self { min, max }
    }

    /// Solar plant output, 0 to 5000 kW
    pub fn solar_production() -> Self {
        Self::new(SOLAR_MIN_KW, SOLAR_MAX_KW)
    }

    /// Control-area imbalance, ±1000 MW
    pub fn grid_imbalance() -> Self {
        Self::new(IMBALANCE_MIN_MW, IMBALANCE_MAX_MW)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Validate without history
    pub fn validate(&self, value: f64) -> ValidationVerdict {
        validate_bounds(value, self.min, self.max)
    }
}

impl Validator for BoundsValidator {
    fn check(&self, value: f64, _history: &RollingHistory) -> ValidationVerdict {
        self.validate(value)
    }
}

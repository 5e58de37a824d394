//! Core traits for validators
//!
//! These traits define the interface all validators implement.
//! Keep them simple: a validator sees one value and, at most, the
//! rolling history of its series.

use crate::history::RollingHistory;
use crate::time::Timestamp;
use crate::verdict::ValidationVerdict;

/// Single accepted reading with timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimestampedReading {
    pub value: f64,
    pub timestamp: Timestamp,
}

impl TimestampedReading {
    pub fn new(value: f64, timestamp: Timestamp) -> Self {
        Self { value, timestamp }
    }
}

/// Core validator trait - implement this for each check
pub trait Validator {
    /// Check a single value against this validator's rule
    ///
    /// Implementations must be pure: the history is read, never written.
    fn check(&self, value: f64, history: &RollingHistory) -> ValidationVerdict;
}

/// Trait for values that can be validated
pub trait Validatable {
    /// Check if the value is a usable number (not NaN, infinite, etc)
    fn is_valid(&self) -> bool;
}

impl Validatable for f32 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

impl Validatable for f64 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validatable_floats() {
        assert!(5.0f64.is_valid());
        assert!(!f64::NAN.is_valid());
        assert!(!f64::INFINITY.is_valid());
        assert!(!f64::NEG_INFINITY.is_valid());
        assert!(!f32::NAN.is_valid());
    }
}

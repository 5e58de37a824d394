//! Validation verdicts
//!
//! A verdict is the only thing a check hands back. It keeps the structured
//! [`Rejection`] rather than a pre-rendered string, so the two invariants
//! of the outcome hold by construction:
//!
//! - a reason exists exactly when the verdict is invalid;
//! - an adjusted value exists only when a bounds check clamped the input.
//!
//! [`VerdictRecord`] is the flat, serialisable shape handed to egress.

use alloc::string::{String, ToString};

use crate::errors::{Rejection, RejectionKind};

/// Outcome of validating one value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationVerdict {
    rejection: Option<Rejection>,
    original_value: f64,
}

impl ValidationVerdict {
    /// Passing verdict for `value`
    pub fn accepted(value: f64) -> Self {
        Self {
            rejection: None,
            original_value: value,
        }
    }

    /// Failing verdict for `value`
    pub fn rejected(value: f64, rejection: Rejection) -> Self {
        Self {
            rejection: Some(rejection),
            original_value: value,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.rejection.is_none()
    }

    /// Human-readable reason, present iff the verdict is invalid
    pub fn reason(&self) -> Option<String> {
        self.rejection.as_ref().map(ToString::to_string)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        self.rejection.as_ref()
    }

    pub fn kind(&self) -> Option<RejectionKind> {
        self.rejection.as_ref().map(Rejection::kind)
    }

    /// The value as submitted (NaN when the input had no value at all)
    pub fn original_value(&self) -> f64 {
        self.original_value
    }

    /// Clamped value, only after a bounds failure
    pub fn adjusted_value(&self) -> Option<f64> {
        self.rejection.as_ref().and_then(Rejection::adjusted_value)
    }
}

/// Flat verdict shape for logs, APIs and persistence
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerdictRecord {
    pub is_valid: bool,
    pub reason: Option<String>,
    pub original_value: f64,
    pub adjusted_value: Option<f64>,
}

impl From<&ValidationVerdict> for VerdictRecord {
    fn from(verdict: &ValidationVerdict) -> Self {
        Self {
            is_valid: verdict.is_valid(),
            reason: verdict.reason(),
            original_value: verdict.original_value(),
            adjusted_value: verdict.adjusted_value(),
        }
    }
}

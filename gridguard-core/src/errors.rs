//! Rejection Reasons and Store Faults
//!
//! ## Design Philosophy
//!
//! GridGuard separates two very different kinds of failure:
//!
//! 1. **Rejections** are ordinary outcomes of validation. An out-of-range or
//!    implausible reading is data, not a crash, so rejections are carried
//!    inside a [`ValidationVerdict`](crate::verdict::ValidationVerdict) and
//!    never returned as `Err`.
//!
//! 2. **Store faults** mean the rolling history itself could not be
//!    consulted (a lock was poisoned by a panicking writer). These are the
//!    only errors the engine returns, and they are never retried here.
//!
//! Both types are `Copy` and allocation-free so they can be stored in
//! verdicts and counters without touching the heap.
//!
//! ## Rejection Categories
//!
//! | Variant | Kind | Adjusted value |
//! |---------|------|----------------|
//! | `BelowMinimum` | out of range | the minimum |
//! | `AboveMaximum` | out of range | the maximum |
//! | `ImplausibleTrend` | implausible trend | none |
//! | `MissingField` | missing field | none |
//! | `InvalidNumeric` | invalid numeric | none |
//!
//! ```rust
//! use gridguard_core::{Rejection, RejectionKind};
//!
//! let rejection = Rejection::BelowMinimum { value: -5.0, min: 0.0 };
//! assert_eq!(rejection.kind(), RejectionKind::OutOfRange);
//! assert_eq!(rejection.adjusted_value(), Some(0.0));
//! ```

use thiserror_no_std::Error;

/// Why an observation was not admitted
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// Value under the static lower bound
    #[error("value below minimum threshold ({min})")]
    BelowMinimum {
        /// The reading that failed the check
        value: f64,
        /// Lower admissible bound, also the clamped value
        min: f64,
    },

    /// Value over the static upper bound
    #[error("value above maximum threshold ({max})")]
    AboveMaximum {
        /// The reading that failed the check
        value: f64,
        /// Upper admissible bound, also the clamped value
        max: f64,
    },

    /// Discontinuity against the previous accepted reading
    #[error("value jump too large: {delta} from previous value {previous}")]
    ImplausibleTrend {
        /// The reading that failed the check
        value: f64,
        /// Reference reading taken from the rolling history
        previous: f64,
        /// Absolute difference between the two
        delta: f64,
    },

    /// A required input field was absent
    #[error("missing required field: {field}")]
    MissingField {
        /// Name of the absent field (`"value"` or `"timestamp"`)
        field: &'static str,
    },

    /// NaN or infinite input, rejected before any comparison
    #[error("value is not a finite number ({value})")]
    InvalidNumeric {
        /// The offending input
        value: f64,
    },
}

/// Coarse classification of a [`Rejection`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RejectionKind {
    /// Bounds check failed; the verdict carries a clamped value
    OutOfRange,
    /// Trend check failed; no adjustment is attempted
    ImplausibleTrend,
    /// Value or timestamp absent
    MissingField,
    /// NaN or infinity
    InvalidNumeric,
}

impl Rejection {
    /// Classify this rejection
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::BelowMinimum { .. } | Self::AboveMaximum { .. } => RejectionKind::OutOfRange,
            Self::ImplausibleTrend { .. } => RejectionKind::ImplausibleTrend,
            Self::MissingField { .. } => RejectionKind::MissingField,
            Self::InvalidNumeric { .. } => RejectionKind::InvalidNumeric,
        }
    }

    /// Clamped value for bounds failures, `None` for everything else
    pub fn adjusted_value(&self) -> Option<f64> {
        match *self {
            Self::BelowMinimum { min, .. } => Some(min),
            Self::AboveMaximum { max, .. } => Some(max),
            _ => None,
        }
    }
}

/// Fault raised by the rolling history store
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// A writer panicked while holding the named lock
    #[error("history store lock poisoned: {lock}")]
    Poisoned {
        /// Which lock was poisoned (`"key map"` or `"series history"`)
        lock: &'static str,
    },
}

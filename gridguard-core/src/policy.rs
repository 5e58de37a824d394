//! Validation policies
//!
//! A policy names which checks run for a series and in what order. The
//! engine runs them left to right and stops at the first failure.

use crate::validators::{BoundsValidator, TrendValidator};

/// Checks to apply to one series
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "snake_case"))]
pub enum ValidationPolicy {
    /// Static range only; history is still recorded on success
    BoundsOnly { bounds: BoundsValidator },
    /// Jump check against history only
    TrendOnly { trend: TrendValidator },
    /// Range first, then jump check if the range passed
    BoundsThenTrend {
        bounds: BoundsValidator,
        trend: TrendValidator,
    },
}

impl ValidationPolicy {
    /// Solar plant output: 0 to 5000 kW, no trend check
    pub fn solar_production() -> Self {
        Self::BoundsOnly {
            bounds: BoundsValidator::solar_production(),
        }
    }

    /// Generic time series: jumps up to 100 against the last value
    pub fn time_series() -> Self {
        Self::TrendOnly {
            trend: TrendValidator::time_series(),
        }
    }

    /// Grid imbalance: ±1000 MW, then jumps up to 200 MW against the
    /// latest-timestamped value
    pub fn grid_imbalance() -> Self {
        Self::BoundsThenTrend {
            bounds: BoundsValidator::grid_imbalance(),
            trend: TrendValidator::grid_imbalance(),
        }
    }

    pub fn bounds(&self) -> Option<&BoundsValidator> {
        match self {
            Self::BoundsOnly { bounds } | Self::BoundsThenTrend { bounds, .. } => Some(bounds),
            Self::TrendOnly { .. } => None,
        }
    }

    pub fn trend(&self) -> Option<&TrendValidator> {
        match self {
            Self::TrendOnly { trend } | Self::BoundsThenTrend { trend, .. } => Some(trend),
            Self::BoundsOnly { .. } => None,
        }
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::time_series()
    }
}

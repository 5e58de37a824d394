//! Core validation engine for GridGuard
//!
//! Decides whether a timestamped grid measurement is admissible and keeps
//! the bounded per-series history that decision depends on.
//!
//! Two rules cover every metric:
//! - bounds: a static range, with the violated limit reported as the
//!   adjusted value
//! - trend: maximum jump from the previous accepted value
//!
//! Validators are pure and build without `std`. The keyed history store,
//! the engine and JSON configuration need the `std` feature (on by default).
//!
//! ```rust
//! use gridguard_core::{Observation, ValidationEngine, ValidationPolicy};
//!
//! let engine = ValidationEngine::default();
//! let reading = Observation::new("solar_plant_7", 1_700_000_000_000, 7200.0);
//!
//! let verdict = engine.submit_with(&reading, &ValidationPolicy::solar_production())?;
//! assert!(!verdict.is_valid());
//! assert_eq!(verdict.adjusted_value(), Some(5000.0));
//! # Ok::<(), gridguard_core::StoreError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod constants;
pub mod errors;
pub mod history;
pub mod observation;
pub mod observer;
pub mod policy;
pub mod time;
pub mod traits;
pub mod validators;
pub mod verdict;

#[cfg(feature = "std")]
pub mod config;
#[cfg(feature = "std")]
pub mod engine;
#[cfg(feature = "std")]
pub mod store;

// Public API
pub use errors::{Rejection, RejectionKind, StoreError};
pub use history::RollingHistory;
pub use observation::{Observation, RawObservation, SeriesKey};
pub use observer::{LogObserver, NoopObserver, ValidationObserver};
pub use policy::ValidationPolicy;
pub use time::{TimeSource, Timestamp};
pub use traits::{TimestampedReading, Validator};
pub use validators::{
    validate_bounds, validate_trend, validate_trend_by_timestamp, BoundsValidator, TrendAnchor,
    TrendValidator,
};
pub use verdict::{ValidationVerdict, VerdictRecord};

#[cfg(feature = "std")]
pub use config::{ConfigError, EngineConfig};
#[cfg(feature = "std")]
pub use engine::{EngineStats, ValidationEngine};
#[cfg(feature = "std")]
pub use store::HistoryStore;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

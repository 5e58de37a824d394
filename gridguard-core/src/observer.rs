//! Validation observers
//!
//! The engine reports every outcome to an injected observer instead of
//! writing to a global logger. [`LogObserver`] forwards to the `log`
//! facade; tests plug in their own recorder.

use crate::observation::Observation;
use crate::time::Timestamp;
use crate::verdict::ValidationVerdict;

// Macros for optional logging
#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

/// Receives validation outcomes from the engine
///
/// Both callbacks run after the series lock has been released.
pub trait ValidationObserver: Send + Sync {
    /// An observation passed every check and was appended to history
    fn accepted(&self, observation: &Observation, verdict: &ValidationVerdict, history_len: usize) {
    }

    /// An input was rejected; history was not touched
    ///
    /// `timestamp` is `None` when the input never had one.
    fn rejected(&self, key: &str, timestamp: Option<Timestamp>, verdict: &ValidationVerdict) {
    }
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ValidationObserver for NoopObserver {}

/// Observer that writes through the `log` facade
///
/// Accepted points are logged at `info`, rejections at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

// Arguments go unused when the `log` feature is off
#[allow(unused_variables)]
impl ValidationObserver for LogObserver {
    fn accepted(&self, observation: &Observation, verdict: &ValidationVerdict, history_len: usize) {
        log_info!(
            "accepted {} for {} at {}; history now holds {} values",
            verdict.original_value(),
            observation.key,
            observation.timestamp,
            history_len
        );
    }

    fn rejected(&self, key: &str, timestamp: Option<Timestamp>, verdict: &ValidationVerdict) {
        log_warn!(
            "rejected {} for {} at {:?}: {}",
            verdict.original_value(),
            key,
            timestamp,
            verdict.reason().unwrap_or_default()
        );
    }
}

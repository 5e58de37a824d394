//! Rolling History Sizing

/// Default number of accepted readings retained per series.
///
/// 100 one-minute samples cover well over an hour of imbalance data,
/// far more than the single previous value the trend check needs, while
/// keeping per-series state small enough for durable key-value storage.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

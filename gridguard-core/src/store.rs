//! Per-Series Rolling History Store
//!
//! ## Overview
//!
//! The store maps each series key to its own [`RollingHistory`]. It is the
//! only shared mutable state in the engine, so its locking discipline is
//! what makes concurrent validation correct.
//!
//! ## Locking
//!
//! ```text
//! RwLock<HashMap<key, Arc<Mutex<RollingHistory>>>>
//!   │                     │
//!   │                     └── per-series lock, held for read → decide → append
//!   └── taken for write only to create a missing series
//! ```
//!
//! - Two observations for the same key are serialised by that key's mutex,
//!   so neither can decide against a history the other is about to change.
//! - Observations for different keys only share a read lock on the map and
//!   proceed in parallel.
//! - A history is created lazily on first write and lives as long as the
//!   store.
//!
//! ## Failure
//!
//! A writer that panics while holding a lock poisons it. The store reports
//! that as [`StoreError::Poisoned`] and never retries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::{
    constants::DEFAULT_HISTORY_CAPACITY,
    errors::StoreError,
    history::RollingHistory,
    traits::TimestampedReading,
};

type Slot = Arc<Mutex<RollingHistory>>;

/// Thread-safe keyed store of rolling histories
#[derive(Debug)]
pub struct HistoryStore {
    /// Capacity given to every new history
    capacity: usize,

    /// Histories indexed by series key
    slots: RwLock<HashMap<String, Slot>>,
}

impl HistoryStore {
    /// Create an empty store whose histories retain `capacity` readings
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Values for `key`, oldest first; empty for an unseen key
    pub fn get(&self, key: &str) -> Result<Vec<f64>, StoreError> {
        self.read(key, RollingHistory::values)
    }

    /// Readings for `key`, oldest first; empty for an unseen key
    pub fn readings(&self, key: &str) -> Result<Vec<TimestampedReading>, StoreError> {
        self.read(key, RollingHistory::to_vec)
    }

    /// Number of readings held for `key`
    pub fn len(&self, key: &str) -> Result<usize, StoreError> {
        self.read(key, RollingHistory::len)
    }

    /// Append a bare value to `key`
    ///
    /// The value inherits the timestamp of the current last reading (0 for
    /// an empty history), so it still counts as the latest reading for
    /// timestamp-anchored trend checks.
    pub fn append(&self, key: &str, value: f64) -> Result<(), StoreError> {
        self.with_history(key, |history| {
            let timestamp = history.last().map_or(0, |last| last.timestamp);
            history.push(TimestampedReading::new(value, timestamp));
        })
    }

    /// Append a timestamped reading to `key`, evicting the oldest if full
    pub fn append_reading(&self, key: &str, reading: TimestampedReading) -> Result<(), StoreError> {
        self.with_history(key, |history| history.push(reading))
    }

    /// Replace the history of `key` with `readings`
    ///
    /// Readings are ordered by timestamp first (stable, so equal timestamps
    /// keep their given order); only the newest `capacity` survive. Used to
    /// restore state from durable storage after a restart.
    pub fn seed<I>(&self, key: &str, readings: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = TimestampedReading>,
    {
        let mut ordered: Vec<TimestampedReading> = readings.into_iter().collect();
        ordered.sort_by_key(|reading| reading.timestamp);
        let capacity = self.capacity;

        self.with_history(key, move |history| {
            *history = RollingHistory::from_readings(capacity, ordered);
        })
    }

    /// Run `f` with exclusive access to the history of `key`
    ///
    /// The series lock is held for the whole closure, which is how the
    /// engine makes read → decide → append atomic per key. The history is
    /// created empty if the key is unseen.
    pub fn with_history<R, F>(&self, key: &str, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut RollingHistory) -> R,
    {
        let slot = self.slot(key)?;
        let mut history = slot
            .lock()
            .map_err(|_| StoreError::Poisoned { lock: "series history" })?;

        Ok(f(&mut history))
    }

    /// Keys with a history, in no particular order
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| StoreError::Poisoned { lock: "key map" })?;

        Ok(slots.keys().cloned().collect())
    }

    fn read<R, F>(&self, key: &str, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&RollingHistory) -> R,
        R: Default,
    {
        let slot = {
            let slots = self
                .slots
                .read()
                .map_err(|_| StoreError::Poisoned { lock: "key map" })?;
            match slots.get(key) {
                Some(slot) => Arc::clone(slot),
                None => return Ok(R::default()),
            }
        };

        let history = slot
            .lock()
            .map_err(|_| StoreError::Poisoned { lock: "series history" })?;

        Ok(f(&history))
    }

    fn slot(&self, key: &str) -> Result<Slot, StoreError> {
        {
            let slots = self
                .slots
                .read()
                .map_err(|_| StoreError::Poisoned { lock: "key map" })?;
            if let Some(slot) = slots.get(key) {
                return Ok(Arc::clone(slot));
            }
        }

        let mut slots = self
            .slots
            .write()
            .map_err(|_| StoreError::Poisoned { lock: "key map" })?;

        // Another writer may have created it between the two locks
        let slot = slots
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(RollingHistory::with_capacity(self.capacity))));

        Ok(Arc::clone(slot))
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

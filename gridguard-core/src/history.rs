//! Capacity-Bounded Rolling History for a Single Series
//!
//! ## Overview
//!
//! This module provides the circular (ring) buffer that backs each series'
//! rolling history. The trend check consults it to find the previous
//! accepted reading, and the store hands copies of it out for short-term
//! recall. Unlike a const-generic ring, the capacity here is chosen at
//! runtime because it comes from configuration (default 100).
//!
//! ## Design Rationale
//!
//! ### Why a Circular Buffer?
//!
//! A history must:
//! - keep the most recent `capacity` accepted readings;
//! - discard the oldest first when full (FIFO eviction);
//! - never reorder what it keeps.
//!
//! A ring gives O(1) insertion that overwrites the oldest slot, O(1) access
//! to the most recent reading and chronological iteration, with storage
//! that stops growing once `capacity` readings have been seen.
//!
//! ### Memory Layout
//!
//! ```text
//! RollingHistory (capacity 5) after 7 pushes of A..G:
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  F  │  G  │  C  │  D  │  E  │  ← physical slots
//! └─────┴─────┴─────┴─────┴─────┘
//!              ↑
//!              └── write_pos = 2 (oldest reading, next overwrite)
//!
//! Logical view: [C, D, E, F, G]
//! ```
//!
//! ### Zero Capacity
//!
//! A capacity of zero is a valid configuration that never remembers
//! anything: `push` is a no-op and the history stays empty.
//!
//! ## Usage Example
//!
//! ```rust
//! use gridguard_core::history::RollingHistory;
//! use gridguard_core::traits::TimestampedReading;
//!
//! let mut history = RollingHistory::with_capacity(3);
//! for (i, value) in [10.0, 11.0, 12.0, 13.0].into_iter().enumerate() {
//!     history.push(TimestampedReading::new(value, i as u64 * 60_000));
//! }
//!
//! assert_eq!(history.values(), vec![11.0, 12.0, 13.0]);
//! assert_eq!(history.last().map(|r| r.value), Some(13.0));
//! ```

use alloc::vec::Vec;

use crate::traits::TimestampedReading;

/// Runtime-capacity circular buffer of accepted readings
///
/// ## Internal Invariants
///
/// - `data.len() <= capacity`
/// - `write_pos < capacity` whenever `capacity > 0`
/// - Once full, the oldest reading lives at `write_pos`
///
/// ## Thread Safety
///
/// This type is not thread-safe. The [`HistoryStore`](crate::store::HistoryStore)
/// wraps each series' history in its own mutex.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingHistory {
    /// Physical slots, grows until `capacity` then stays fixed
    data: Vec<TimestampedReading>,

    /// Maximum number of readings retained
    capacity: usize,

    /// Index where the next write will occur once full
    write_pos: usize,
}

impl RollingHistory {
    /// Creates an empty history that retains at most `capacity` readings
    ///
    /// Storage is reserved lazily, so large capacities cost nothing until
    /// readings arrive.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::new(),
            capacity,
            write_pos: 0,
        }
    }

    /// Builds a history from readings in chronological order
    ///
    /// Only the last `capacity` readings are retained.
    pub fn from_readings<I>(capacity: usize, readings: I) -> Self
    where
        I: IntoIterator<Item = TimestampedReading>,
    {
        let mut history = Self::with_capacity(capacity);
        for reading in readings {
            history.push(reading);
        }
        history
    }

    /// Adds a reading, overwriting the oldest when full
    pub fn push(&mut self, reading: TimestampedReading) {
        if self.capacity == 0 {
            return;
        }

        if self.data.len() < self.capacity {
            self.data.push(reading);
        } else {
            self.data[self.write_pos] = reading;
        }
        self.write_pos = (self.write_pos + 1) % self.capacity;
    }

    /// Get number of stored readings
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if history is full
    pub fn is_full(&self) -> bool {
        self.data.len() == self.capacity
    }

    /// Maximum number of retained readings
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the most recently appended reading
    pub fn last(&self) -> Option<&TimestampedReading> {
        if self.is_empty() {
            return None;
        }

        // Most recent is one before write position
        let idx = if self.write_pos == 0 {
            self.data.len() - 1
        } else {
            self.write_pos - 1
        };

        self.data.get(idx)
    }

    /// Iterate over readings from oldest to newest
    pub fn iter(&self) -> RollingHistoryIter<'_> {
        RollingHistoryIter {
            history: self,
            index: 0,
        }
    }

    /// Values from oldest to newest
    pub fn values(&self) -> Vec<f64> {
        self.iter().map(|reading| reading.value).collect()
    }

    /// Readings from oldest to newest
    pub fn to_vec(&self) -> Vec<TimestampedReading> {
        self.iter().copied().collect()
    }

    /// Clear all readings, keeping the capacity
    pub fn clear(&mut self) {
        self.data.clear();
        self.write_pos = 0;
    }

    /// Gets a reading by its logical index (0 = oldest, len-1 = newest)
    ///
    /// When the history is not full, logical and physical indices match.
    /// When full, the oldest element is at `write_pos`, so we offset:
    ///
    /// ```text
    /// Physical:  [D, E, A, B, C]  (write_pos = 2)
    /// Logical:   [A, B, C, D, E]
    /// logical[0] = physical[(2 + 0) % 5] = A
    /// ```
    pub fn get(&self, index: usize) -> Option<&TimestampedReading> {
        if index >= self.data.len() {
            return None;
        }

        let actual_index = if self.data.len() < self.capacity {
            index
        } else {
            (self.write_pos + index) % self.capacity
        };

        self.data.get(actual_index)
    }
}

/// Iterator over rolling history contents, oldest first
pub struct RollingHistoryIter<'a> {
    history: &'a RollingHistory,
    index: usize,
}

impl<'a> Iterator for RollingHistoryIter<'a> {
    type Item = &'a TimestampedReading;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.history.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.history.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RollingHistoryIter<'_> {}

impl<'a> IntoIterator for &'a RollingHistory {
    type Item = &'a TimestampedReading;
    type IntoIter = RollingHistoryIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self::with_capacity(crate::constants::DEFAULT_HISTORY_CAPACITY)
    }
}

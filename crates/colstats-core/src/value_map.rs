//! Frequency tables consumed by histogram builders
//!
//! The sampling subsystem that scans a column produces, for every distinct
//! non-null value, the number of times it was observed. [`FrequencySource`]
//! is the read interface histogram builders consume; [`ValueMap`] is the
//! in-memory implementation.

use crate::{Collation, Error, HistogramValue, Result};
use std::collections::BTreeMap;

/// Ordered `(value, count)` table plus aggregate column metadata
pub trait FrequencySource<T: HistogramValue> {
    /// Distinct non-null values with their counts, in ascending value order
    fn frequencies(&self) -> Box<dyn Iterator<Item = (&T, u64)> + '_>;

    /// Number of distinct non-null values
    fn total_distinct_count(&self) -> usize;

    /// Number of NULL observations
    fn null_count(&self) -> u64;

    /// Fraction of the column that was sampled, in `(0, 1]`
    fn sampling_rate(&self) -> f64;

    /// Collation of the column (meaningful for string columns only)
    fn collation(&self) -> Collation;
}

/// In-memory frequency table keyed by value
#[derive(Debug, Clone)]
pub struct ValueMap<T: HistogramValue> {
    counts: BTreeMap<T, u64>,
    null_count: u64,
    sampling_rate: f64,
    collation: Collation,
}

impl<T: HistogramValue> Default for ValueMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HistogramValue> ValueMap<T> {
    /// Create an empty, fully sampled map with the binary collation
    pub fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
            null_count: 0,
            sampling_rate: 1.0,
            collation: Collation::Binary,
        }
    }

    /// Set the sampling rate
    pub fn with_sampling_rate(mut self, sampling_rate: f64) -> Result<Self> {
        if !(sampling_rate > 0.0 && sampling_rate <= 1.0) {
            return Err(Error::InvalidArgument(format!(
                "sampling rate {sampling_rate} must be in (0, 1]"
            )));
        }
        self.sampling_rate = sampling_rate;
        Ok(self)
    }

    /// Set the collation
    pub fn with_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }

    /// Record `count` more observations of `value`
    ///
    /// Values that compare equal under their order are merged. Zero counts
    /// are ignored so every stored value has been observed at least once.
    pub fn add_values(&mut self, value: T, count: u64) {
        if count == 0 {
            return;
        }
        *self.counts.entry(value).or_insert(0) += count;
    }

    /// Record `count` more NULL observations
    pub fn add_null_values(&mut self, count: u64) {
        self.null_count += count;
    }

    /// Number of distinct non-null values
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count recorded for `value`
    pub fn get(&self, value: &T) -> Option<u64> {
        self.counts.get(value).copied()
    }

    /// Sum of all non-null counts
    pub fn non_null_count(&self) -> u64 {
        self.counts.values().sum()
    }
}

impl<T: HistogramValue> FrequencySource<T> for ValueMap<T> {
    fn frequencies(&self) -> Box<dyn Iterator<Item = (&T, u64)> + '_> {
        Box::new(self.counts.iter().map(|(value, count)| (value, *count)))
    }

    fn total_distinct_count(&self) -> usize {
        self.counts.len()
    }

    fn null_count(&self) -> u64 {
        self.null_count
    }

    fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    fn collation(&self) -> Collation {
        self.collation
    }
}

impl<T: HistogramValue> Extend<(T, u64)> for ValueMap<T> {
    fn extend<I: IntoIterator<Item = (T, u64)>>(&mut self, iter: I) {
        for (value, count) in iter {
            self.add_values(value, count);
        }
    }
}

impl<T: HistogramValue> FromIterator<(T, u64)> for ValueMap<T> {
    fn from_iter<I: IntoIterator<Item = (T, u64)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

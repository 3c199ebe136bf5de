//! Equi-height histogram buckets

use colstats_core::HistogramValue;
use std::fmt;

/// A single bucket in an equi-height histogram
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket<T: HistogramValue> {
    /// Lowest value in the bucket (inclusive)
    lower_inclusive: T,
    /// Highest value in the bucket (inclusive)
    upper_inclusive: T,
    /// Fraction of all rows, NULLs included, with a value <= `upper_inclusive`
    cumulative_frequency: f64,
    /// Estimated number of distinct values in the bucket
    num_distinct: u64,
}

impl<T: HistogramValue> Bucket<T> {
    /// Create a new bucket
    pub fn new(lower_inclusive: T, upper_inclusive: T, cumulative_frequency: f64, num_distinct: u64) -> Self {
        debug_assert!(lower_inclusive <= upper_inclusive, "bucket endpoints out of order");
        Self {
            lower_inclusive,
            upper_inclusive,
            cumulative_frequency,
            num_distinct,
        }
    }

    pub fn lower_inclusive(&self) -> &T {
        &self.lower_inclusive
    }

    pub fn upper_inclusive(&self) -> &T {
        &self.upper_inclusive
    }

    pub fn cumulative_frequency(&self) -> f64 {
        self.cumulative_frequency
    }

    pub fn num_distinct(&self) -> u64 {
        self.num_distinct
    }

    /// Check if a value falls within this bucket
    pub fn contains(&self, value: &T) -> bool {
        *value >= self.lower_inclusive && *value <= self.upper_inclusive
    }

    /// Whether the bucket holds a single value
    pub fn is_singleton(&self) -> bool {
        self.lower_inclusive == self.upper_inclusive
    }

    /// Normalized distance of `value` from the lower endpoint, in `[0, 1]`
    pub fn distance_from_lower(&self, value: &T) -> f64 {
        T::normalized_position(&self.lower_inclusive, &self.upper_inclusive, value)
    }

    /// Normalized distance of `value` from the upper endpoint, in `[0, 1]`
    pub fn distance_from_upper(&self, value: &T) -> f64 {
        1.0 - self.distance_from_lower(value)
    }
}

impl<T: HistogramValue> fmt::Display for Bucket<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}, {:?}]: cumulative_frequency={:.6}, num_distinct={}",
            self.lower_inclusive, self.upper_inclusive, self.cumulative_frequency, self.num_distinct
        )
    }
}

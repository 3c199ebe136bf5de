//! Equi-height histogram representation

use crate::bucket::Bucket;
use chrono::{DateTime, SubsecRound, Utc};
use colstats_core::{Collation, HistogramValue, ValueKind};
use std::fmt;

/// Null fraction of a histogram that has not been built yet
pub const INVALID_NULL_VALUES_FRACTION: f64 = -1.0;

/// Histogram type name written to persisted documents
pub const EQUI_HEIGHT: &str = "equi-height";

/// An equi-height histogram over a single column
///
/// Once built, a histogram is an immutable snapshot. Cloning it copies every
/// bucket and every owned string payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram<T: HistogramValue> {
    /// Ordered, non-overlapping buckets
    buckets: Vec<Bucket<T>>,
    /// Fraction of rows that are NULL
    null_values_fraction: f64,
    /// Fraction of the column that was sampled
    sampling_rate: f64,
    /// Bucket count the histogram was requested with
    num_buckets_specified: usize,
    /// Collation of string endpoints
    collation: Collation,
    /// When the histogram was built
    last_updated: DateTime<Utc>,
}

impl<T: HistogramValue> Histogram<T> {
    /// Create an empty histogram that has not been built yet
    pub(crate) fn new(num_buckets_specified: usize, sampling_rate: f64, collation: Collation) -> Self {
        Self {
            buckets: Vec::new(),
            null_values_fraction: INVALID_NULL_VALUES_FRACTION,
            sampling_rate,
            num_buckets_specified,
            collation,
            last_updated: Utc::now().trunc_subsecs(6),
        }
    }

    /// Reassemble a histogram from decoded parts
    pub(crate) fn from_parts(
        buckets: Vec<Bucket<T>>,
        null_values_fraction: f64,
        sampling_rate: f64,
        num_buckets_specified: usize,
        collation: Collation,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            buckets,
            null_values_fraction,
            sampling_rate,
            num_buckets_specified,
            collation,
            last_updated,
        }
    }

    /// Get the buckets
    pub fn buckets(&self) -> &[Bucket<T>] {
        &self.buckets
    }

    /// Get mutable access to buckets (for internal use)
    pub(crate) fn buckets_mut(&mut self) -> &mut Vec<Bucket<T>> {
        &mut self.buckets
    }

    pub(crate) fn set_null_values_fraction(&mut self, fraction: f64) {
        self.null_values_fraction = fraction;
    }

    /// Get the number of buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if the histogram has no buckets
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Whether the histogram has been built or decoded
    pub fn is_valid(&self) -> bool {
        self.null_values_fraction != INVALID_NULL_VALUES_FRACTION
    }

    pub fn null_values_fraction(&self) -> f64 {
        self.null_values_fraction
    }

    /// Fraction of rows that are not NULL
    pub fn non_null_values_fraction(&self) -> f64 {
        1.0 - self.null_values_fraction
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    pub fn num_buckets_specified(&self) -> usize {
        self.num_buckets_specified
    }

    pub fn collation(&self) -> Collation {
        self.collation
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Value kind the histogram was built over
    pub fn value_kind(&self) -> ValueKind {
        T::KIND
    }

    pub fn histogram_type(&self) -> &'static str {
        EQUI_HEIGHT
    }

    /// Estimated number of distinct non-null values across all buckets
    pub fn num_distinct_values(&self) -> u64 {
        self.buckets.iter().map(Bucket::num_distinct).sum()
    }

    /// Index of the bucket containing `value`, if any
    pub fn find_bucket(&self, value: &T) -> Option<usize> {
        let idx = self.buckets.partition_point(|b| b.upper_inclusive() < value);
        self.buckets
            .get(idx)
            .filter(|b| b.lower_inclusive() <= value)
            .map(|_| idx)
    }

    /// Check that buckets are well formed, sorted and pairwise disjoint
    pub fn is_well_formed(&self) -> bool {
        self.buckets
            .iter()
            .all(|b| b.lower_inclusive() <= b.upper_inclusive())
            && self
                .buckets
                .windows(2)
                .all(|w| w[0].upper_inclusive() < w[1].lower_inclusive())
    }
}

impl<T: HistogramValue> fmt::Display for Histogram<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Histogram({}, {} buckets of {} requested, null_fraction={:.3}, sampling_rate={:.3})",
            T::KIND,
            self.len(),
            self.num_buckets_specified,
            self.null_values_fraction,
            self.sampling_rate
        )
    }
}

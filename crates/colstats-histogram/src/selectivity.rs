//! Selectivity estimation over equi-height histograms
//!
//! Buckets are located by binary search on their upper endpoints. Inside a
//! bucket, rows are assumed to be spread uniformly over its distinct values
//! (for equality) or over its value range (for range predicates). A value
//! falling between two buckets was never observed and matches nothing.

use crate::bucket::Bucket;
use crate::histogram::Histogram;
use crate::traits::SelectivityEstimator;
use colstats_core::HistogramValue;

impl<T: HistogramValue> Histogram<T> {
    /// Index of the first bucket whose upper endpoint is >= `value`
    fn lower_bound(&self, value: &T) -> usize {
        self.buckets().partition_point(|b| b.upper_inclusive() < value)
    }

    /// Index of the first bucket whose upper endpoint is > `value`
    fn upper_bound(&self, value: &T) -> usize {
        self.buckets().partition_point(|b| b.upper_inclusive() <= value)
    }

    /// Cumulative frequency of the bucket before `idx`, or 0 for the first
    fn prior_cumulative_frequency(&self, idx: usize) -> f64 {
        idx.checked_sub(1)
            .map_or(0.0, |prev| self.buckets()[prev].cumulative_frequency())
    }

    /// Fraction of rows that fall inside the bucket at `idx`
    fn bucket_frequency(&self, idx: usize) -> f64 {
        self.buckets()[idx].cumulative_frequency() - self.prior_cumulative_frequency(idx)
    }
}

impl<T: HistogramValue> SelectivityEstimator<T> for Histogram<T> {
    fn equal_to(&self, value: &T) -> f64 {
        let idx = self.lower_bound(value);
        let Some(found) = self.buckets().get(idx) else {
            // Past the last bucket
            return 0.0;
        };

        // Before the first bucket, or between two buckets
        if value < found.lower_inclusive() {
            return 0.0;
        }

        let bucket_frequency = self.bucket_frequency(idx);
        debug_assert!(bucket_frequency >= 0.0);
        debug_assert!(bucket_frequency <= self.non_null_values_fraction() + 1e-12);
        bucket_frequency / found.num_distinct() as f64
    }

    fn less_than(&self, value: &T) -> f64 {
        // Buckets before the found one lie entirely below `value`
        let idx = self.lower_bound(value);
        let Some(found) = self.buckets().get(idx) else {
            return self.non_null_values_fraction();
        };

        let prior = self.prior_cumulative_frequency(idx);
        if found.lower_inclusive() < value {
            // lower < value <= upper, so the bucket spans more than one value
            let distance = found.distance_from_lower(value);
            debug_assert!((0.0..=1.0).contains(&distance));
            prior + self.bucket_frequency(idx) * distance
        } else {
            prior
        }
    }

    fn greater_than(&self, value: &T) -> f64 {
        // Buckets after the found one lie entirely above `value`
        let idx = self.upper_bound(value);
        let Some(found) = self.buckets().get(idx) else {
            return 0.0;
        };

        let bucket_frequency = self.bucket_frequency(idx);
        let next_buckets_frequency = self.non_null_values_fraction() - found.cumulative_frequency();
        if value < found.lower_inclusive() {
            bucket_frequency + next_buckets_frequency
        } else {
            // lower <= value < upper
            let distance = found.distance_from_upper(value);
            debug_assert!((0.0..=1.0).contains(&distance));
            distance * bucket_frequency + next_buckets_frequency
        }
    }
}

impl<T: HistogramValue> Histogram<T> {
    /// Estimated fraction of rows with `column <= value`
    pub fn less_than_or_equal(&self, value: &T) -> f64 {
        self.less_than(value) + self.equal_to(value)
    }

    /// Estimated fraction of rows with `column >= value`
    pub fn greater_than_or_equal(&self, value: &T) -> f64 {
        self.greater_than(value) + self.equal_to(value)
    }

    /// Bucket containing `value`, if any
    pub fn bucket_for(&self, value: &T) -> Option<&Bucket<T>> {
        self.find_bucket(value).map(|idx| &self.buckets()[idx])
    }
}

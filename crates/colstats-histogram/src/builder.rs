//! Equi-height histogram construction
//!
//! The builder walks the frequency table once in ascending value order and
//! greedily closes buckets as the running row count approaches the next
//! multiple of `non_null_total / num_buckets`.
//!
//! Two row counters are kept. `cumulative_sum` runs from the first value and
//! is never reset; it decides where bucket boundaries fall and becomes the
//! numerator of each bucket's cumulative frequency. The per-bucket sum is
//! reset at every boundary and only feeds the distinct-value estimate.

use crate::bucket::Bucket;
use crate::config::{HistogramConfig, DEFAULT_DISTINCT_ESTIMATOR_THRESHOLD};
use crate::histogram::Histogram;
use crate::traits::HistogramBuilder;
use colstats_core::{Error, FrequencySource, HistogramValue, Result};
use tracing::{debug, instrument, trace};

/// Equi-height histogram builder
///
/// Creates a histogram with at most the requested number of buckets, each
/// holding roughly the same number of rows.
#[derive(Debug, Clone)]
pub struct EquiHeightBuilder {
    num_buckets: usize,
    distinct_estimator_threshold: f64,
}

impl EquiHeightBuilder {
    /// Create a new builder targeting `num_buckets` buckets
    ///
    /// A zero bucket count is reported by [`HistogramBuilder::build`].
    pub fn new(num_buckets: usize) -> Self {
        Self {
            num_buckets,
            distinct_estimator_threshold: DEFAULT_DISTINCT_ESTIMATOR_THRESHOLD,
        }
    }

    /// Create a builder from a configuration
    pub fn from_config(config: &HistogramConfig) -> Self {
        Self {
            num_buckets: config.num_buckets,
            distinct_estimator_threshold: config.distinct_estimator_threshold,
        }
    }

    /// Set the sampling rate below which distinct counts are estimated
    pub fn with_distinct_estimator_threshold(mut self, threshold: f64) -> Self {
        self.distinct_estimator_threshold = threshold;
        self
    }

    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }
}

impl Default for EquiHeightBuilder {
    fn default() -> Self {
        Self::from_config(&HistogramConfig::default())
    }
}

/// Running totals of the bucket being filled
#[derive(Debug, Default)]
struct BucketAccumulator {
    /// Rows in the bucket
    sum: u64,
    /// Distinct values in the bucket
    distinct: u64,
    /// Values in the bucket observed exactly once
    singlecount: u64,
}

impl BucketAccumulator {
    fn add(&mut self, count: u64) {
        self.sum += count;
        self.distinct += 1;
        if count == 1 {
            self.singlecount += 1;
        }
    }
}

/// Decide whether the current bucket ends at the value just added
///
/// If adding the next value overshoots the threshold, the boundary goes on
/// whichever side lands closer to it, ties closing now. Otherwise the bucket
/// keeps growing unless fewer values remain than buckets still to be filled.
fn should_close(
    threshold: f64,
    cumulative_sum: u64,
    next_count: u64,
    values_remaining: usize,
    buckets_needed: usize,
) -> bool {
    let extended_sum = cumulative_sum + next_count;
    if extended_sum as f64 > threshold {
        let close_distance = (threshold - cumulative_sum as f64).abs();
        let extend_distance = (threshold - extended_sum as f64).abs();
        close_distance <= extend_distance
    } else {
        values_remaining < buckets_needed
    }
}

/// Estimate the number of distinct values in a bucket
///
/// Below `threshold` this is the unsmoothed first-order jackknife
/// estimator `d / (1 - (1 - q) * f1 / n)`, where `q` is the sampling rate,
/// `d` the observed distinct count, `f1` the number of values seen once and
/// `n` the rows in the bucket. The result is never below 1.
pub fn estimate_num_distinct(
    distinct: u64,
    singlecount: u64,
    bucket_sum: u64,
    sampling_rate: f64,
    threshold: f64,
) -> u64 {
    if sampling_rate >= threshold || bucket_sum == 0 {
        return distinct.max(1);
    }
    let corrected =
        distinct as f64 / (1.0 - ((1.0 - sampling_rate) * singlecount as f64) / bucket_sum as f64);
    if !corrected.is_finite() {
        return distinct.max(1);
    }
    (corrected.round() as u64).max(1)
}

impl<T: HistogramValue> HistogramBuilder<T> for EquiHeightBuilder {
    #[instrument(skip(self, source), fields(kind = %T::KIND, num_buckets = self.num_buckets))]
    fn build(&self, source: &dyn FrequencySource<T>) -> Result<Histogram<T>> {
        if self.num_buckets == 0 {
            return Err(Error::InvalidArgument(
                "histogram needs at least one bucket".to_string(),
            ));
        }

        let sampling_rate = source.sampling_rate();
        let collation = source.collation();
        let mut histogram = Histogram::new(self.num_buckets, sampling_rate, collation);

        let non_null_total: u64 = source.frequencies().map(|(_, count)| count).sum();
        let null_count = source.null_count();

        // A column without non-null observations gets no buckets
        if non_null_total == 0 {
            let fraction = if null_count > 0 { 1.0 } else { 0.0 };
            histogram.set_null_values_fraction(fraction);
            debug!(null_count, "no non-null values, histogram left empty");
            return Ok(histogram);
        }

        let total = non_null_total + null_count;
        histogram.set_null_values_fraction(null_count as f64 / total as f64);

        let distinct_count = source.total_distinct_count();
        // With enough buckets every distinct value gets its own
        let one_per_value = distinct_count <= self.num_buckets;

        let avg_bucket_size = non_null_total as f64 / self.num_buckets as f64;
        let mut threshold = avg_bucket_size;

        let buckets = histogram.buckets_mut();
        let reserve = self.num_buckets.min(distinct_count);
        buckets
            .try_reserve_exact(reserve)
            .map_err(|e| Error::allocation(reserve, e))?;

        let mut cumulative_sum: u64 = 0;
        let mut acc = BucketAccumulator::default();
        let mut values_remaining = distinct_count;
        let mut lowest: Option<&T> = None;
        let mut values = source.frequencies().peekable();

        while let Some((value, count)) = values.next() {
            // Endpoints are persisted under the column's collation
            if let Some(found) = value.value_collation().filter(|c| *c != collation) {
                return Err(Error::InvalidArgument(format!(
                    "value {value:?} uses collation {found} but the column uses {collation}"
                )));
            }
            let lower = *lowest.get_or_insert(value);
            acc.add(count);
            cumulative_sum += count;
            values_remaining = values_remaining.saturating_sub(1);

            if let Some(&(_, next_count)) = values.peek() {
                let buckets_needed = self.num_buckets.saturating_sub(buckets.len());
                if !one_per_value
                    && !should_close(threshold, cumulative_sum, next_count, values_remaining, buckets_needed)
                {
                    continue;
                }
            }

            let cumulative_frequency = cumulative_sum as f64 / total as f64;
            let num_distinct = estimate_num_distinct(
                acc.distinct,
                acc.singlecount,
                acc.sum,
                sampling_rate,
                self.distinct_estimator_threshold,
            );
            let bucket = Bucket::new(lower.clone(), value.clone(), cumulative_frequency, num_distinct);
            trace!(bucket = %bucket, "closed bucket");

            if buckets.len() == buckets.capacity() {
                buckets
                    .try_reserve(1)
                    .map_err(|e| Error::allocation(buckets.len() + 1, e))?;
            }
            debug_assert!(
                buckets
                    .last()
                    .map_or(true, |prev| prev.upper_inclusive() < bucket.lower_inclusive()),
                "buckets overlap"
            );
            buckets.push(bucket);

            acc = BucketAccumulator::default();
            threshold = avg_bucket_size * (buckets.len() + 1) as f64;
            lowest = None;
        }

        debug_assert!(histogram.len() <= self.num_buckets);
        debug_assert!(histogram.is_well_formed());
        debug!(
            buckets = histogram.len(),
            distinct_count,
            null_values_fraction = histogram.null_values_fraction(),
            "built equi-height histogram"
        );
        Ok(histogram)
    }

    fn target_buckets(&self) -> Option<usize> {
        Some(self.num_buckets)
    }
}

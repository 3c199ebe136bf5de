//! Core traits for histogram building and selectivity estimation

use crate::histogram::Histogram;
use colstats_core::{FrequencySource, HistogramValue, Result};

/// Trait for building histograms from a frequency table
pub trait HistogramBuilder<T: HistogramValue> {
    /// Build a histogram from the given frequency source
    ///
    /// A failed build never exposes a partially built histogram.
    fn build(&self, source: &dyn FrequencySource<T>) -> Result<Histogram<T>>;

    /// Get the target number of buckets (if known)
    fn target_buckets(&self) -> Option<usize> {
        None
    }
}

/// Selectivity queries answered from a finished histogram
///
/// All results are fractions of the total row population, NULLs included.
pub trait SelectivityEstimator<T: HistogramValue> {
    /// Estimated fraction of rows with `column = value`
    fn equal_to(&self, value: &T) -> f64;

    /// Estimated fraction of rows with `column < value`
    fn less_than(&self, value: &T) -> f64;

    /// Estimated fraction of rows with `column > value`
    fn greater_than(&self, value: &T) -> f64;
}

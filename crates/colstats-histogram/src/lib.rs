//! Equi-height column histograms for query optimizer statistics
//!
//! This crate builds compact summaries of a column's value distribution and
//! answers selectivity questions from them: what fraction of rows have a
//! column equal to, below or above a given value. Histograms persist as JSON
//! documents and can be republished atomically as statistics are refreshed.
//!
//! # Key Features
//!
//! - **Equi-height buckets**: each bucket holds roughly the same number of rows
//! - **Distinct-value estimation**: sampled columns get jackknife corrected
//!   per-bucket distinct counts
//! - **Every value kind**: floats, integers, decimals, temporal values and
//!   collated strings share one generic implementation
//! - **Persistence**: a self-describing document form, validated on decode
//! - **Publication**: [`PublishedHistogram`] swaps snapshots without locking
//!
//! # Examples
//!
//! ## Building and Querying
//!
//! ```rust
//! use colstats_histogram::{EquiHeightBuilder, HistogramBuilder, SelectivityEstimator};
//! use colstats_core::ValueMap;
//!
//! let mut values = ValueMap::<i64>::new();
//! values.add_values(1, 5);
//! values.add_values(2, 3);
//! values.add_values(3, 2);
//!
//! let histogram = EquiHeightBuilder::new(2).build(&values).unwrap();
//! assert_eq!(histogram.len(), 2);
//!
//! assert_eq!(histogram.equal_to(&1), 0.5);
//! assert_eq!(histogram.less_than(&2), 0.5);
//! assert_eq!(histogram.greater_than(&3), 0.0);
//! ```
//!
//! ## Persisting
//!
//! ```rust
//! use colstats_histogram::{equi_height, ColumnHistogram, Histogram};
//! use colstats_core::{ValueKind, ValueMap};
//!
//! let values: ValueMap<u64> = (0..100u64).map(|v| (v, 1)).collect();
//! let histogram = equi_height(&values, 10).unwrap();
//!
//! let json = histogram.to_json_string();
//! let decoded = Histogram::<u64>::from_json_str(&json).unwrap();
//! assert_eq!(decoded.buckets(), histogram.buckets());
//!
//! // Without knowing the kind up front
//! let column = ColumnHistogram::from_json_str(&json).unwrap();
//! assert_eq!(column.value_kind(), ValueKind::Uint);
//! ```

pub mod bucket;
pub mod builder;
pub mod codec;
pub mod column;
pub mod config;
pub mod histogram;
pub mod selectivity;
pub mod snapshot;
pub mod traits;

// Re-export main types and traits
pub use bucket::Bucket;
pub use builder::{estimate_num_distinct, EquiHeightBuilder};
pub use column::ColumnHistogram;
pub use config::HistogramConfig;
pub use histogram::{Histogram, EQUI_HEIGHT};
pub use snapshot::PublishedHistogram;
pub use traits::{HistogramBuilder, SelectivityEstimator};

use colstats_core::{FrequencySource, HistogramValue};

// Convenience functions
/// Build an equi-height histogram with at most `num_buckets` buckets
pub fn equi_height<T: HistogramValue>(source: &dyn FrequencySource<T>, num_buckets: usize) -> Result<Histogram<T>> {
    EquiHeightBuilder::new(num_buckets).build(source)
}

pub use colstats_core::{Error, Result};

//! Column statistics for query optimizers
//!
//! `colstats` summarizes the value distribution of a table column in an
//! equi-height histogram and estimates the selectivity of `=`, `<` and `>`
//! predicates from it. Histograms persist as JSON documents and can be
//! reloaded without knowing the column's type in advance.
//!
//! # Crates
//!
//! - [`values`]: value kinds, collations, frequency sources and errors
//! - [`histogram`]: buckets, the builder, selectivity estimation, the
//!   document codec and snapshot publication
//!
//! # Example
//!
//! ```rust
//! use colstats::prelude::*;
//!
//! let mut values = ValueMap::<i64>::new();
//! values.extend([(10, 2), (20, 2), (30, 2), (40, 2)]);
//! values.add_null_values(2);
//!
//! let histogram = EquiHeightBuilder::new(2).build(&values)?;
//! assert_eq!(histogram.equal_to(&25), 0.0); // Never observed
//! assert!((histogram.less_than(&25) - 0.4).abs() < 1e-12);
//!
//! let reloaded = ColumnHistogram::from_json_str(&histogram.to_json_string())?;
//! assert_eq!(reloaded.value_kind(), ValueKind::Int);
//! # Ok::<(), colstats::Error>(())
//! ```

pub use colstats_core as values;
pub use colstats_histogram as histogram;

pub use colstats_core::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use colstats_core::prelude::*;
    pub use colstats_histogram::{
        ColumnHistogram, EquiHeightBuilder, Histogram, HistogramBuilder, HistogramConfig, PublishedHistogram,
        SelectivityEstimator,
    };
}

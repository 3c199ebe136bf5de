//! Core types for column statistics
//!
//! This crate provides the value model that column histograms are built
//! over, independent of any particular histogram layout.
//!
//! # Overview
//!
//! - **Value kinds**: [`HistogramValue`] is implemented for floating point,
//!   signed and unsigned integers, [`Decimal`], dates, times, datetimes and
//!   [`CollatedString`]
//! - **Collations**: [`Collation`] defines string order and equality
//! - **Frequency sources**: [`FrequencySource`] is what a histogram builder
//!   consumes, and [`ValueMap`] is the in-memory implementation
//! - **Errors**: a single [`Error`] type shared by all colstats crates
//!
//! # Example
//!
//! ```rust
//! use colstats_core::{FrequencySource, ValueMap};
//!
//! let mut values = ValueMap::<i64>::new();
//! values.add_values(1, 5);
//! values.add_values(2, 3);
//! values.add_null_values(2);
//!
//! assert_eq!(values.total_distinct_count(), 2);
//! assert_eq!(values.null_count(), 2);
//! ```

pub mod collation;
pub mod decimal;
pub mod error;
pub mod string;
pub mod value;
pub mod value_map;

// Re-export core types
pub use collation::Collation;
pub use decimal::Decimal;
pub use error::{Error, Result};
pub use string::CollatedString;
pub use value::{linear_position, HistogramValue, ValueKind};
pub use value_map::{FrequencySource, ValueMap};

pub use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
pub use ordered_float::OrderedFloat;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CollatedString, Collation, Decimal, FrequencySource, HistogramValue, Result, ValueKind,
        ValueMap,
    };
}

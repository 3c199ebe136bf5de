//! Histograms over any value kind behind one type
//!
//! A catalog that loads persisted histograms does not know a column's kind
//! until it reads the document's `data_type` tag. [`ColumnHistogram`]
//! dispatches on that tag.

use crate::codec::data_type_of;
use crate::histogram::Histogram;
use chrono::{DateTime, Utc};
use colstats_core::{
    CollatedString, Collation, Decimal, HistogramValue, NaiveDate, NaiveDateTime, NaiveTime, OrderedFloat, Result,
    ValueKind,
};
use serde_json::Value;
use std::any::Any;
use std::fmt;

/// A histogram of any supported value kind
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnHistogram {
    Double(Histogram<OrderedFloat<f64>>),
    Int(Histogram<i64>),
    Uint(Histogram<u64>),
    Decimal(Histogram<Decimal>),
    Date(Histogram<NaiveDate>),
    Time(Histogram<NaiveTime>),
    Datetime(Histogram<NaiveDateTime>),
    String(Histogram<CollatedString>),
}

/// Apply `$body` to the typed histogram inside `$self`
macro_rules! dispatch {
    ($self:expr, $hist:ident => $body:expr) => {
        match $self {
            ColumnHistogram::Double($hist) => $body,
            ColumnHistogram::Int($hist) => $body,
            ColumnHistogram::Uint($hist) => $body,
            ColumnHistogram::Decimal($hist) => $body,
            ColumnHistogram::Date($hist) => $body,
            ColumnHistogram::Time($hist) => $body,
            ColumnHistogram::Datetime($hist) => $body,
            ColumnHistogram::String($hist) => $body,
        }
    };
}

impl ColumnHistogram {
    /// Decode a document of any value kind
    ///
    /// An unknown `data_type` is reported as a malformed document.
    pub fn from_document(document: &Value) -> Result<Self> {
        Ok(match data_type_of(document)? {
            ValueKind::Double => Self::Double(Histogram::from_document(document)?),
            ValueKind::Int => Self::Int(Histogram::from_document(document)?),
            ValueKind::Uint => Self::Uint(Histogram::from_document(document)?),
            ValueKind::Decimal => Self::Decimal(Histogram::from_document(document)?),
            ValueKind::Date => Self::Date(Histogram::from_document(document)?),
            ValueKind::Time => Self::Time(Histogram::from_document(document)?),
            ValueKind::Datetime => Self::Datetime(Histogram::from_document(document)?),
            ValueKind::String => Self::String(Histogram::from_document(document)?),
        })
    }

    /// Decode JSON text of any value kind
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(json)?;
        Self::from_document(&document)
    }

    pub fn to_document(&self) -> Value {
        dispatch!(self, h => h.to_document())
    }

    pub fn to_json_string(&self) -> String {
        self.to_document().to_string()
    }

    pub fn value_kind(&self) -> ValueKind {
        dispatch!(self, h => h.value_kind())
    }

    pub fn len(&self) -> usize {
        dispatch!(self, h => h.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_values_fraction(&self) -> f64 {
        dispatch!(self, h => h.null_values_fraction())
    }

    pub fn sampling_rate(&self) -> f64 {
        dispatch!(self, h => h.sampling_rate())
    }

    pub fn num_buckets_specified(&self) -> usize {
        dispatch!(self, h => h.num_buckets_specified())
    }

    pub fn collation(&self) -> Collation {
        dispatch!(self, h => h.collation())
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        dispatch!(self, h => h.last_updated())
    }

    pub fn num_distinct_values(&self) -> u64 {
        dispatch!(self, h => h.num_distinct_values())
    }

    /// Borrow the typed histogram if it holds values of type `T`
    pub fn downcast_ref<T: HistogramValue>(&self) -> Option<&Histogram<T>> {
        dispatch!(self, h => (h as &dyn Any).downcast_ref::<Histogram<T>>())
    }
}

impl fmt::Display for ColumnHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, h => fmt::Display::fmt(h, f))
    }
}

macro_rules! impl_from_histogram {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<Histogram<$ty>> for ColumnHistogram {
                fn from(histogram: Histogram<$ty>) -> Self {
                    Self::$variant(histogram)
                }
            }
        )*
    };
}

impl_from_histogram!(
    Double => OrderedFloat<f64>,
    Int => i64,
    Uint => u64,
    Decimal => Decimal,
    Date => NaiveDate,
    Time => NaiveTime,
    Datetime => NaiveDateTime,
    String => CollatedString,
);

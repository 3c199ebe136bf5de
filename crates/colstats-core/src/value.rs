//! Value kinds that a column histogram can be built over
//!
//! Every supported column type implements [`HistogramValue`], which gives the
//! histogram code three capabilities:
//!
//! - a total order (`Ord`), collation-aware for strings
//! - a normalized position of a value between two bucket endpoints
//! - encoding to, and decoding from, a JSON document value
//!
//! The builder, the selectivity estimator and the codec are written once
//! against this trait and monomorphized per kind.

use crate::{Collation, Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use num_traits::ToPrimitive;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt::{self, Debug};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S%.6f";
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const TIME_PARSE_FORMAT: &str = "%H:%M:%S%.f";
const DATETIME_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Tag identifying the value kind of a histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Double,
    Int,
    Uint,
    Decimal,
    Date,
    Time,
    Datetime,
    String,
}

impl ValueKind {
    /// All value kinds
    pub const ALL: [ValueKind; 8] = [
        ValueKind::Double,
        ValueKind::Int,
        ValueKind::Uint,
        ValueKind::Decimal,
        ValueKind::Date,
        ValueKind::Time,
        ValueKind::Datetime,
        ValueKind::String,
    ];

    /// Tag used in persisted documents
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::Time => "time",
            Self::Datetime => "datetime",
            Self::String => "string",
        }
    }

    /// Look up a kind by its persisted tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A column value that histograms can be built over
pub trait HistogramValue: Ord + Clone + Debug + Send + Sync + 'static {
    /// Tag written to and checked against persisted documents
    const KIND: ValueKind;

    /// Position of `value` inside `[lower, upper]`, normalized to `[0, 1]`
    ///
    /// 0 means `value` sits on `lower`, 1 means it sits on `upper`. Values
    /// outside the range are clamped. A zero-width range yields 0.
    fn normalized_position(lower: &Self, upper: &Self, value: &Self) -> f64;

    /// Encode this value as a document value
    fn to_json(&self) -> JsonValue;

    /// Decode a value previously produced by [`HistogramValue::to_json`]
    ///
    /// `collation` is only consulted by string values.
    fn from_json(json: &JsonValue, collation: Collation) -> Result<Self>;

    /// Collation this value compares under, for kinds ordered by one
    fn value_collation(&self) -> Option<Collation> {
        None
    }
}

/// Linear ratio `(value - lower) / (upper - lower)` clamped to `[0, 1]`
pub fn linear_position(lower: f64, upper: f64, value: f64) -> f64 {
    let width = upper - lower;
    if !(width > 0.0) {
        return 0.0;
    }
    let ratio = (value - lower) / width;
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

pub(crate) fn kind_mismatch(kind: ValueKind, json: &JsonValue) -> Error {
    Error::malformed(format_args!("expected a {kind} value, got {json}"))
}

fn span_position(offset: f64, span: f64) -> f64 {
    linear_position(0.0, span, offset)
}

fn delta_micros(delta: TimeDelta) -> f64 {
    delta
        .num_microseconds()
        .and_then(|m| m.to_f64())
        .unwrap_or_else(|| delta.num_seconds() as f64 * 1e6)
}

impl HistogramValue for OrderedFloat<f64> {
    const KIND: ValueKind = ValueKind::Double;

    fn normalized_position(lower: &Self, upper: &Self, value: &Self) -> f64 {
        linear_position(lower.0, upper.0, value.0)
    }

    fn to_json(&self) -> JsonValue {
        let v = self.0;
        if v.is_finite() {
            JsonValue::from(v)
        } else if v.is_nan() {
            JsonValue::from("NaN")
        } else if v > 0.0 {
            JsonValue::from("Infinity")
        } else {
            JsonValue::from("-Infinity")
        }
    }

    fn from_json(json: &JsonValue, _collation: Collation) -> Result<Self> {
        match json {
            JsonValue::Number(n) => n.as_f64().map(OrderedFloat),
            JsonValue::String(s) => match s.as_str() {
                "NaN" => Some(OrderedFloat(f64::NAN)),
                "Infinity" => Some(OrderedFloat(f64::INFINITY)),
                "-Infinity" => Some(OrderedFloat(f64::NEG_INFINITY)),
                _ => None,
            },
            _ => None,
        }
        .ok_or_else(|| kind_mismatch(Self::KIND, json))
    }
}

impl HistogramValue for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn normalized_position(lower: &Self, upper: &Self, value: &Self) -> f64 {
        let span = (*upper as i128 - *lower as i128).to_f64().unwrap_or(0.0);
        let offset = (*value as i128 - *lower as i128).to_f64().unwrap_or(0.0);
        span_position(offset, span)
    }

    fn to_json(&self) -> JsonValue {
        JsonValue::from(*self)
    }

    fn from_json(json: &JsonValue, _collation: Collation) -> Result<Self> {
        json.as_i64().ok_or_else(|| kind_mismatch(Self::KIND, json))
    }
}

impl HistogramValue for u64 {
    const KIND: ValueKind = ValueKind::Uint;

    fn normalized_position(lower: &Self, upper: &Self, value: &Self) -> f64 {
        let span = (*upper as i128 - *lower as i128).to_f64().unwrap_or(0.0);
        let offset = (*value as i128 - *lower as i128).to_f64().unwrap_or(0.0);
        span_position(offset, span)
    }

    fn to_json(&self) -> JsonValue {
        JsonValue::from(*self)
    }

    fn from_json(json: &JsonValue, _collation: Collation) -> Result<Self> {
        json.as_u64().ok_or_else(|| kind_mismatch(Self::KIND, json))
    }
}

impl HistogramValue for NaiveDate {
    const KIND: ValueKind = ValueKind::Date;

    fn normalized_position(lower: &Self, upper: &Self, value: &Self) -> f64 {
        let span = upper.signed_duration_since(*lower).num_days() as f64;
        let offset = value.signed_duration_since(*lower).num_days() as f64;
        span_position(offset, span)
    }

    fn to_json(&self) -> JsonValue {
        JsonValue::from(self.format(DATE_FORMAT).to_string())
    }

    fn from_json(json: &JsonValue, _collation: Collation) -> Result<Self> {
        json.as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            .ok_or_else(|| kind_mismatch(Self::KIND, json))
    }
}

impl HistogramValue for NaiveTime {
    const KIND: ValueKind = ValueKind::Time;

    fn normalized_position(lower: &Self, upper: &Self, value: &Self) -> f64 {
        let span = delta_micros(upper.signed_duration_since(*lower));
        let offset = delta_micros(value.signed_duration_since(*lower));
        span_position(offset, span)
    }

    fn to_json(&self) -> JsonValue {
        JsonValue::from(self.format(TIME_FORMAT).to_string())
    }

    fn from_json(json: &JsonValue, _collation: Collation) -> Result<Self> {
        json.as_str()
            .and_then(|s| NaiveTime::parse_from_str(s, TIME_PARSE_FORMAT).ok())
            .ok_or_else(|| kind_mismatch(Self::KIND, json))
    }
}

impl HistogramValue for NaiveDateTime {
    const KIND: ValueKind = ValueKind::Datetime;

    fn normalized_position(lower: &Self, upper: &Self, value: &Self) -> f64 {
        let span = delta_micros(upper.signed_duration_since(*lower));
        let offset = delta_micros(value.signed_duration_since(*lower));
        span_position(offset, span)
    }

    fn to_json(&self) -> JsonValue {
        JsonValue::from(self.format(DATETIME_FORMAT).to_string())
    }

    fn from_json(json: &JsonValue, _collation: Collation) -> Result<Self> {
        json.as_str()
            .and_then(|s| NaiveDateTime::parse_from_str(s, DATETIME_PARSE_FORMAT).ok())
            .ok_or_else(|| kind_mismatch(Self::KIND, json))
    }
}

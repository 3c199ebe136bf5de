//! Persisted document form of a histogram
//!
//! A histogram is stored as a JSON object:
//!
//! ```json
//! {
//!   "histogram_type": "equi-height",
//!   "data_type": "int",
//!   "last_updated": "2024-01-31 12:00:00.000000",
//!   "sampling_rate": 1.0,
//!   "null_values_fraction": 0.0,
//!   "number_of_buckets_specified": 2,
//!   "buckets": [[1, 1, 0.5, 1], [2, 3, 1.0, 2]]
//! }
//! ```
//!
//! String histograms also carry `character_set`, the collation name of their
//! endpoints. Documents are untrusted input, so decoding checks every field and
//! reports problems as [`Error::MalformedDocument`].

use crate::bucket::Bucket;
use crate::histogram::{Histogram, EQUI_HEIGHT};
use chrono::{DateTime, NaiveDateTime, Utc};
use colstats_core::{Collation, Error, HistogramValue, Result, ValueKind};
use serde_json::{json, Map, Value};
use tracing::{instrument, warn};

/// Timestamp layout of `last_updated`
pub const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub const HISTOGRAM_TYPE_KEY: &str = "histogram_type";
pub const DATA_TYPE_KEY: &str = "data_type";
pub const LAST_UPDATED_KEY: &str = "last_updated";
pub const SAMPLING_RATE_KEY: &str = "sampling_rate";
pub const NULL_VALUES_FRACTION_KEY: &str = "null_values_fraction";
pub const NUM_BUCKETS_SPECIFIED_KEY: &str = "number_of_buckets_specified";
pub const CHARACTER_SET_KEY: &str = "character_set";
pub const BUCKETS_KEY: &str = "buckets";

/// Slack allowed when comparing stored frequencies with the non-null fraction
const CUMULATIVE_FREQUENCY_TOLERANCE: f64 = 1e-9;

/// Read the `data_type` tag of a document without decoding the rest
pub fn data_type_of(document: &Value) -> Result<ValueKind> {
    let tag = document
        .get(DATA_TYPE_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::field_kind(DATA_TYPE_KEY, "a string"))?;
    ValueKind::from_tag(tag).ok_or_else(|| Error::malformed(format_args!("unknown data_type '{tag}'")))
}

impl<T: HistogramValue> Histogram<T> {
    /// Encode the histogram as a document
    pub fn to_document(&self) -> Value {
        let buckets: Vec<Value> = self
            .buckets()
            .iter()
            .map(|b| {
                json!([
                    b.lower_inclusive().to_json(),
                    b.upper_inclusive().to_json(),
                    b.cumulative_frequency(),
                    b.num_distinct()
                ])
            })
            .collect();

        let mut document = Map::new();
        document.insert(HISTOGRAM_TYPE_KEY.to_string(), json!(EQUI_HEIGHT));
        document.insert(DATA_TYPE_KEY.to_string(), json!(T::KIND.tag()));
        document.insert(
            LAST_UPDATED_KEY.to_string(),
            json!(self.last_updated().format(LAST_UPDATED_FORMAT).to_string()),
        );
        document.insert(SAMPLING_RATE_KEY.to_string(), json!(self.sampling_rate()));
        document.insert(
            NULL_VALUES_FRACTION_KEY.to_string(),
            json!(self.null_values_fraction()),
        );
        document.insert(
            NUM_BUCKETS_SPECIFIED_KEY.to_string(),
            json!(self.num_buckets_specified()),
        );
        if T::KIND == ValueKind::String {
            document.insert(CHARACTER_SET_KEY.to_string(), json!(self.collation().name()));
        }
        document.insert(BUCKETS_KEY.to_string(), Value::Array(buckets));
        Value::Object(document)
    }

    /// Decode a histogram from a document
    ///
    /// Fails with [`Error::MalformedDocument`] on any missing or mistyped
    /// field, on a `data_type` other than `T`'s, on undecodable endpoints,
    /// and on buckets that are out of order or overlap.
    #[instrument(skip(document), fields(kind = %T::KIND))]
    pub fn from_document(document: &Value) -> Result<Self> {
        decode(document).inspect_err(|e| warn!(error = %e, "rejected histogram document"))
    }

    /// Encode the histogram as JSON text
    pub fn to_json_string(&self) -> String {
        self.to_document().to_string()
    }

    /// Decode a histogram from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(json)?;
        Self::from_document(&document)
    }
}

fn decode<T: HistogramValue>(document: &Value) -> Result<Histogram<T>> {
    let object = document
        .as_object()
        .ok_or_else(|| Error::malformed("document must be an object"))?;

    let histogram_type = string_field(object, HISTOGRAM_TYPE_KEY)?;
    if histogram_type != EQUI_HEIGHT {
        return Err(Error::malformed(format_args!(
            "unsupported histogram_type '{histogram_type}'"
        )));
    }

    let kind = data_type_of(document)?;
    if kind != T::KIND {
        return Err(Error::malformed(format_args!(
            "data_type '{kind}' does not match histogram kind '{}'",
            T::KIND
        )));
    }

    let last_updated = string_field(object, LAST_UPDATED_KEY)?;
    let last_updated = NaiveDateTime::parse_from_str(last_updated, "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|e| Error::malformed(format_args!("last_updated '{last_updated}': {e}")))?;
    let last_updated = DateTime::<Utc>::from_naive_utc_and_offset(last_updated, Utc);

    let sampling_rate = float_field(object, SAMPLING_RATE_KEY)?;
    if !(sampling_rate > 0.0 && sampling_rate <= 1.0) {
        return Err(Error::malformed(format_args!(
            "sampling_rate {sampling_rate} outside (0, 1]"
        )));
    }

    let null_values_fraction = float_field(object, NULL_VALUES_FRACTION_KEY)?;
    if !(0.0..=1.0).contains(&null_values_fraction) {
        return Err(Error::malformed(format_args!(
            "null_values_fraction {null_values_fraction} outside [0, 1]"
        )));
    }

    let num_buckets_specified = object
        .get(NUM_BUCKETS_SPECIFIED_KEY)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| Error::field_kind(NUM_BUCKETS_SPECIFIED_KEY, "an unsigned integer"))?;
    if num_buckets_specified == 0 {
        return Err(Error::malformed(format!(
            "{NUM_BUCKETS_SPECIFIED_KEY} must be at least 1"
        )));
    }

    let collation = if T::KIND == ValueKind::String {
        string_field(object, CHARACTER_SET_KEY)?.parse::<Collation>()?
    } else {
        Collation::default()
    };

    let raw_buckets = object
        .get(BUCKETS_KEY)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::field_kind(BUCKETS_KEY, "an array"))?;
    if raw_buckets.len() > num_buckets_specified {
        return Err(Error::malformed(format_args!(
            "{} buckets exceed the {num_buckets_specified} requested",
            raw_buckets.len()
        )));
    }

    let mut buckets: Vec<Bucket<T>> = Vec::new();
    buckets
        .try_reserve_exact(raw_buckets.len())
        .map_err(|e| Error::allocation(raw_buckets.len(), e))?;
    for (idx, raw) in raw_buckets.iter().enumerate() {
        let bucket = decode_bucket::<T>(idx, raw, collation)?;
        if let Some(prev) = buckets.last() {
            if prev.upper_inclusive() >= bucket.lower_inclusive() {
                return Err(Error::malformed(format_args!(
                    "bucket {idx} overlaps or precedes bucket {}",
                    idx - 1
                )));
            }
            if prev.cumulative_frequency() > bucket.cumulative_frequency() {
                return Err(Error::malformed(format_args!(
                    "bucket {idx} has a decreasing cumulative_frequency"
                )));
            }
        }
        buckets.push(bucket);
    }

    // Frequencies count non-null rows only and the last bucket holds all of them
    let non_null_fraction = 1.0 - null_values_fraction;
    if let Some(last) = buckets.last() {
        let cumulative_frequency = last.cumulative_frequency();
        if (cumulative_frequency - non_null_fraction).abs() > CUMULATIVE_FREQUENCY_TOLERANCE {
            return Err(Error::malformed(format_args!(
                "last cumulative_frequency {cumulative_frequency} does not match \
                 non-null fraction {non_null_fraction}"
            )));
        }
    }

    Ok(Histogram::from_parts(
        buckets,
        null_values_fraction,
        sampling_rate,
        num_buckets_specified,
        collation,
        last_updated,
    ))
}

fn decode_bucket<T: HistogramValue>(idx: usize, raw: &Value, collation: Collation) -> Result<Bucket<T>> {
    let fields = raw
        .as_array()
        .ok_or_else(|| Error::malformed(format_args!("bucket {idx} must be an array")))?;
    let [lower, upper, cumulative_frequency, num_distinct] = fields.as_slice() else {
        return Err(Error::malformed(format_args!(
            "bucket {idx} has {} fields, expected 4",
            fields.len()
        )));
    };

    let lower = T::from_json(lower, collation)?;
    let upper = T::from_json(upper, collation)?;
    if lower > upper {
        return Err(Error::malformed(format_args!(
            "bucket {idx} has lower endpoint above upper endpoint"
        )));
    }

    // Integers are not accepted where a float is stored
    let cumulative_frequency = cumulative_frequency
        .as_f64()
        .filter(|_| cumulative_frequency.is_f64())
        .ok_or_else(|| {
            Error::malformed(format_args!(
                "bucket {idx} cumulative_frequency must be a floating-point number"
            ))
        })?;
    if !(0.0..=1.0).contains(&cumulative_frequency) {
        return Err(Error::malformed(format_args!(
            "bucket {idx} cumulative_frequency {cumulative_frequency} outside [0, 1]"
        )));
    }

    let num_distinct = num_distinct.as_u64().filter(|&n| n > 0).ok_or_else(|| {
        Error::malformed(format_args!(
            "bucket {idx} num_distinct must be a positive integer"
        ))
    })?;

    Ok(Bucket::new(lower, upper, cumulative_frequency, num_distinct))
}

fn string_field<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::field_kind(key, "a string"))
}

fn float_field(object: &Map<String, Value>, key: &str) -> Result<f64> {
    object
        .get(key)
        .filter(|v| v.is_f64())
        .and_then(Value::as_f64)
        .ok_or_else(|| Error::field_kind(key, "a floating-point number"))
}

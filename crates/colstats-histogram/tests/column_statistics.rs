//! End-to-end tests: build, persist, reload and query column histograms
//! across value kinds.

use approx::assert_relative_eq;
use colstats_core::{
    CollatedString, Collation, Decimal, Error, NaiveDate, NaiveDateTime, NaiveTime, OrderedFloat, ValueKind, ValueMap,
};
use colstats_histogram::{
    equi_height, ColumnHistogram, EquiHeightBuilder, Histogram, HistogramBuilder, HistogramConfig,
    PublishedHistogram, SelectivityEstimator,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

#[test]
fn test_skewed_integer_column() {
    init_tracing();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut values = ValueMap::<i64>::new();
    for _ in 0..10_000 {
        // Small values are far more common than large ones
        let v: f64 = rng.gen();
        values.add_values((v * v * 1000.0) as i64, 1);
    }
    values.add_null_values(500);

    let hist = equi_height(&values, 32).unwrap();
    assert!(hist.len() <= 32);
    assert!(hist.is_well_formed());
    assert_relative_eq!(hist.null_values_fraction(), 500.0 / 10_500.0);

    // Skew shows up as narrower buckets at the low end
    let first = &hist.buckets()[0];
    let last = hist.buckets().last().unwrap();
    let first_width = first.upper_inclusive() - first.lower_inclusive();
    let last_width = last.upper_inclusive() - last.lower_inclusive();
    assert!(first_width < last_width);

    // Range estimates track the true fraction
    let below_250 = (0..250).filter_map(|v| values.get(&v)).sum::<u64>() as f64 / 10_500.0;
    assert!((hist.less_than(&250) - below_250).abs() < 0.05);
}

#[test]
fn test_temporal_columns() {
    init_tracing();
    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let values: ValueMap<NaiveDateTime> = (0..48)
        .map(|hour| (day.and_hms_opt(0, 0, 0).unwrap() + chrono::TimeDelta::hours(hour), 10))
        .collect();
    let hist = EquiHeightBuilder::new(4).build(&values).unwrap();
    assert_eq!(hist.len(), 4);

    let noon = day.and_hms_opt(12, 0, 0).unwrap();
    assert_relative_eq!(hist.less_than(&noon), 0.25, epsilon = 1e-9);

    let decoded = ColumnHistogram::from_document(&hist.to_document()).unwrap();
    assert_eq!(decoded.value_kind(), ValueKind::Datetime);
    assert_eq!(decoded.downcast_ref::<NaiveDateTime>(), Some(&hist));

    let times: ValueMap<NaiveTime> = [
        (NaiveTime::from_hms_micro_opt(9, 30, 0, 250).unwrap(), 3),
        (NaiveTime::from_hms_opt(17, 0, 0).unwrap(), 1),
    ]
    .into_iter()
    .collect();
    let hist = EquiHeightBuilder::new(2).build(&times).unwrap();
    let document = hist.to_document();
    assert_eq!(document["buckets"][0][0], "09:30:00.000250");
    assert_eq!(Histogram::<NaiveTime>::from_document(&document).unwrap(), hist);
}

#[test]
fn test_double_column_with_special_values() {
    let values: ValueMap<OrderedFloat<f64>> = [
        (f64::NEG_INFINITY, 1),
        (-1.5, 4),
        (0.0, 4),
        (2.5, 4),
        (f64::INFINITY, 1),
        (f64::NAN, 1),
    ]
    .into_iter()
    .map(|(v, c)| (OrderedFloat(v), c))
    .collect();
    let hist = EquiHeightBuilder::new(10).build(&values).unwrap();
    assert_eq!(hist.len(), 6);

    let document = hist.to_document();
    assert_eq!(document["buckets"][0][0], "-Infinity");
    assert_eq!(document["buckets"][5][0], "NaN");

    let decoded = Histogram::<OrderedFloat<f64>>::from_json_str(&hist.to_json_string()).unwrap();
    assert_eq!(decoded, hist);
    assert_relative_eq!(decoded.equal_to(&OrderedFloat(0.0)), 4.0 / 15.0);
}

#[test]
fn test_decimal_column() {
    let values: ValueMap<Decimal> = ["0.10", "0.25", "1.00", "9.99", "10.5"]
        .into_iter()
        .map(|s| (s.parse::<Decimal>().unwrap(), 2))
        .collect();
    let hist = EquiHeightBuilder::new(2).build(&values).unwrap();

    // Buckets [0.10, 0.25] and [1.00, 10.5]; "1.0" equals the second lower bound
    let probe: Decimal = "1.0".parse().unwrap();
    assert_relative_eq!(hist.less_than(&probe), 0.4);
    assert_relative_eq!(hist.equal_to(&probe), 0.2);
    assert_relative_eq!(hist.greater_than(&probe), 0.6);

    let column = ColumnHistogram::from_json_str(&hist.to_json_string()).unwrap();
    assert_eq!(column.to_document(), hist.to_document());
}

#[test]
fn test_case_insensitive_strings() {
    init_tracing();
    let collation = Collation::AsciiGeneralCi;
    let mut values = ValueMap::<CollatedString>::new().with_collation(collation);
    for (word, count) in [("Apple", 3), ("apple", 2), ("Berry", 4), ("cherry", 1)] {
        values.add_values(CollatedString::new(word, collation), count);
    }
    // "Apple" and "apple" are one value under this collation
    assert_eq!(values.len(), 3);

    let hist = EquiHeightBuilder::new(8).build(&values).unwrap();
    let probe = CollatedString::new("APPLE", collation);
    assert_relative_eq!(hist.equal_to(&probe), 0.5);

    let text = hist.to_json_string();
    let decoded = Histogram::<CollatedString>::from_json_str(&text).unwrap();
    assert_eq!(decoded.collation(), collation);
    assert_relative_eq!(decoded.equal_to(&probe), 0.5);
}

#[test]
fn test_binary_strings_are_hex_encoded() {
    let values: ValueMap<CollatedString> = [vec![0xffu8, 0x00], b"plain".to_vec()]
        .into_iter()
        .map(|bytes| (CollatedString::binary(bytes), 1))
        .collect();
    let hist = EquiHeightBuilder::new(2).build(&values).unwrap();
    let document = hist.to_document();
    assert_eq!(document["character_set"], "binary");
    assert_eq!(document["buckets"][0][0], "plain");
    assert_eq!(document["buckets"][1][0], "base16:ff00");
    assert_eq!(Histogram::<CollatedString>::from_document(&document).unwrap(), hist);
}

#[test]
fn test_malformed_documents() {
    init_tracing();
    let hist = equi_height(&[(1i64, 2), (5, 2)].into_iter().collect::<ValueMap<i64>>(), 2).unwrap();

    let mut document = hist.to_document();
    document["buckets"][1] = json!([5, 5, 1.0]);
    assert!(matches!(
        Histogram::<i64>::from_document(&document),
        Err(Error::MalformedDocument(_))
    ));

    let mut document = hist.to_document();
    document["data_type"] = json!("string");
    assert!(matches!(
        Histogram::<i64>::from_document(&document),
        Err(Error::MalformedDocument(_))
    ));
    // The type-erased decoder follows the tag and fails on the missing character_set
    assert!(matches!(
        ColumnHistogram::from_document(&document),
        Err(Error::MalformedDocument(_))
    ));

    let mut document = hist.to_document();
    document["last_updated"] = json!("yesterday");
    assert!(Histogram::<i64>::from_document(&document).is_err());
}

#[test]
fn test_config_driven_build_and_publication() {
    init_tracing();
    let config = HistogramConfig::from_json_str(r#"{"num_buckets": 3, "distinct_estimator_threshold": 0.5}"#).unwrap();
    let builder = EquiHeightBuilder::from_config(&config);

    let first: ValueMap<u64> = (0..30u64).map(|v| (v, 1)).collect();
    let published = PublishedHistogram::new(builder.build(&first).unwrap());
    let reader = published.clone();
    let snapshot = reader.load();
    assert_eq!(snapshot.num_buckets_specified(), 3);

    let second: ValueMap<u64> = (100..130u64).map(|v| (v, 1)).collect();
    published.publish(builder.build(&second).unwrap());

    // The old snapshot is still intact for the reader holding it
    assert_relative_eq!(snapshot.less_than(&30), 1.0);
    assert_eq!(reader.load().less_than(&30), 0.0);
}

//! A statistics catalog that stores histogram documents per column,
//! reloads them without knowing their kinds and refreshes them in place.

use approx::assert_relative_eq;
use colstats_core::{NaiveDate, OrderedFloat, Result, ValueKind, ValueMap};
use colstats_histogram::{
    ColumnHistogram, EquiHeightBuilder, HistogramBuilder, HistogramConfig, PublishedHistogram,
    SelectivityEstimator,
};
use serde_json::{Map, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn save(catalog: &mut Map<String, Value>, column: &str, document: Value) {
    catalog.insert(column.to_string(), document);
}

#[test]
fn test_catalog_round_trip() -> Result<()> {
    init_tracing();
    let mut catalog = Map::new();

    let ids: ValueMap<u64> = (1..=1000u64).map(|id| (id, 1)).collect();
    save(&mut catalog, "orders.id", EquiHeightBuilder::new(16).build(&ids)?.to_document());

    let mut prices: ValueMap<OrderedFloat<f64>> =
        [(9.99, 40), (19.99, 25), (4.5, 30)].into_iter().map(|(p, c)| (OrderedFloat(p), c)).collect();
    prices.add_null_values(5);
    save(&mut catalog, "orders.price", EquiHeightBuilder::new(16).build(&prices)?.to_document());

    let days: ValueMap<NaiveDate> = (1..=28)
        .filter_map(|d| NaiveDate::from_ymd_opt(2024, 2, d))
        .map(|d| (d, 3))
        .collect();
    save(&mut catalog, "orders.placed_on", EquiHeightBuilder::new(4).build(&days)?.to_document());

    // Persist the whole catalog as text and load it back
    let text = Value::Object(catalog).to_string();
    let loaded: Map<String, Value> = serde_json::from_str(&text)?;

    let mut kinds = Vec::new();
    for (column, document) in &loaded {
        let histogram = ColumnHistogram::from_document(document)?;
        kinds.push((column.as_str(), histogram.value_kind()));
    }
    assert_eq!(
        kinds,
        vec![
            ("orders.id", ValueKind::Uint),
            ("orders.placed_on", ValueKind::Date),
            ("orders.price", ValueKind::Double),
        ]
    );

    let price = ColumnHistogram::from_document(&loaded["orders.price"])?;
    assert_relative_eq!(price.null_values_fraction(), 0.05);
    let price = price.downcast_ref::<OrderedFloat<f64>>().unwrap();
    assert_relative_eq!(price.equal_to(&OrderedFloat(9.99)), 0.4);
    assert_relative_eq!(price.less_than(&OrderedFloat(10.0)), 0.7);
    Ok(())
}

#[test]
fn test_refresh_keeps_old_snapshot_readable() -> Result<()> {
    init_tracing();
    let config = HistogramConfig::from_json_str(r#"{"num_buckets": 8}"#)?;
    let builder = EquiHeightBuilder::from_config(&config);

    let before: ValueMap<i64> = (0..100).map(|v| (v, 1)).collect();
    let published = PublishedHistogram::new(builder.build(&before)?);
    let old = published.load();

    let after: ValueMap<i64> = (0..200).map(|v| (v, 1)).collect();
    let replaced = published.publish(builder.build(&after)?);

    assert!(std::sync::Arc::ptr_eq(&old, &replaced));
    assert_relative_eq!(old.less_than(&100), 1.0);
    assert_relative_eq!(published.load().less_than(&100), 0.5, epsilon = 0.01);
    Ok(())
}

mod common;

use chrono::TimeZone;
use datacn::data::{bin_by_time, calculate_operation, group_by};
use datacn::{
    aggregate, normalize_data, AggregationConfig, ChartData, ColumnType, Error, Granularity,
    Operation, TimeSeriesPoint, Value,
};
use serde_json::json;

fn timestamps(data: &ChartData) -> Vec<chrono::DateTime<chrono_tz::Tz>> {
    data.data.iter().map(|row| row.timestamp().unwrap()).collect()
}

#[test]
fn test_global_sum() {
    let data = normalize_data(&json!([{ "x": 1 }, { "x": 2 }, { "x": 3 }]), None).unwrap();
    let result = aggregate(&data, &AggregationConfig::new("x", Operation::Sum)).unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.data[0].number("x"), Some(6.0));
    assert_eq!(result.data[0].len(), 1);
    assert_eq!(result.metadata.columns, vec!["x"]);
    assert_eq!(result.column_type("x"), Some(ColumnType::Number));
}

#[test]
fn test_calculate_operation() {
    assert_eq!(calculate_operation(&[], Operation::Median), 0.0);
    assert_eq!(calculate_operation(&[1.0, 2.0, 3.0, 4.0], Operation::Median), 2.5);
    assert_eq!(calculate_operation(&[5.0, 1.0, 3.0], Operation::Median), 3.0);

    // 空の入力はすべて0
    for op in [Operation::Sum, Operation::Avg, Operation::Count, Operation::Min, Operation::Max] {
        assert_eq!(calculate_operation(&[], op), 0.0);
    }

    let values = [4.0, -2.0, 10.0];
    assert_eq!(calculate_operation(&values, Operation::Sum), 12.0);
    assert_eq!(calculate_operation(&values, Operation::Avg), 4.0);
    assert_eq!(calculate_operation(&values, Operation::Count), 3.0);
    assert_eq!(calculate_operation(&values, Operation::Min), -2.0);
    assert_eq!(calculate_operation(&values, Operation::Max), 10.0);
}

#[test]
fn test_non_numeric_values_are_excluded() {
    let data = normalize_data(&json!([{ "x": 1 }, { "x": "n/a" }, { "x": 3 }]), None).unwrap();

    let avg = aggregate(&data, &AggregationConfig::new("x", Operation::Avg)).unwrap();
    assert_eq!(avg.data[0].number("x"), Some(2.0));

    let count = aggregate(&data, &AggregationConfig::new("x", Operation::Count)).unwrap();
    assert_eq!(count.data[0].number("x"), Some(2.0));
}

#[test]
fn test_unknown_field_fails() {
    let data = common::sales_data();
    let err = aggregate(&data, &AggregationConfig::new("profit", Operation::Sum)).unwrap_err();
    assert!(matches!(err, Error::ColumnNotFound { ref column, .. } if column == "profit"));

    assert!(matches!("mode".parse::<Operation>(), Err(Error::UnknownOperation(_))));
}

#[test]
fn test_empty_table_is_returned_unchanged() {
    let empty = ChartData::empty();
    let result = aggregate(&empty, &AggregationConfig::new("x", Operation::Sum)).unwrap();
    assert_eq!(result, empty);
}

#[test]
fn test_group_aggregation() {
    let data = common::sales_data();
    let config = AggregationConfig::new("sales", Operation::Sum).group_by(["region"]);
    let result = aggregate(&data, &config).unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.metadata.columns, vec!["region", "sales"]);
    assert_eq!(result.column_type("region"), Some(ColumnType::String));
    assert_eq!(result.column_type("sales"), Some(ColumnType::Number));

    // グループは出現順
    assert_eq!(result.data[0].get("region"), Some(&Value::from("north")));
    assert_eq!(result.data[0].number("sales"), Some(200.0));
    assert_eq!(result.data[1].get("region"), Some(&Value::from("south")));
    assert_eq!(result.data[1].number("sales"), Some(150.0));
}

#[test]
fn test_group_aggregation_with_missing_values() {
    let data = normalize_data(
        &json!([{ "g": "a", "v": 1 }, { "v": 2 }, { "g": "a", "v": 3 }]),
        None,
    )
    .unwrap();
    let config = AggregationConfig::new("v", Operation::Max).group_by(["g"]);
    let result = aggregate(&data, &config).unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.data[0].number("v"), Some(3.0));
    assert_eq!(result.data[1].get("g"), Some(&Value::Null));
    assert_eq!(result.data[1].number("v"), Some(2.0));
}

#[test]
fn test_monthly_buckets() {
    let data = common::sales_data();
    let config = AggregationConfig::new("sales", Operation::Sum).time_granularity(Granularity::Month);
    let result = aggregate(&data, &config).unwrap();

    assert_eq!(result.metadata.columns, vec!["timestamp", "sales"]);
    assert_eq!(result.column_type("timestamp"), Some(ColumnType::Date));
    assert_eq!(
        timestamps(&result),
        vec![
            common::utc_day(2024, 1, 1),
            common::utc_day(2024, 2, 1),
            common::utc_day(2024, 3, 1)
        ]
    );
    let sums: Vec<f64> = result.data.iter().map(|r| r.number("sales").unwrap()).collect();
    assert_eq!(sums, vec![150.0, 100.0, 100.0]);
}

#[test]
fn test_time_and_group_buckets() {
    let data = common::sales_data();
    let config = AggregationConfig::new("sales", Operation::Sum)
        .group_by(["region"])
        .time_granularity(Granularity::Month);
    let result = aggregate(&data, &config).unwrap();

    assert_eq!(result.metadata.columns, vec!["timestamp", "region", "sales"]);
    assert_eq!(result.len(), 4);

    let rows: Vec<(String, f64)> = result
        .data
        .iter()
        .map(|r| (r.get("region").unwrap().to_string(), r.number("sales").unwrap()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("north".to_string(), 100.0),
            ("south".to_string(), 50.0),
            ("north".to_string(), 100.0),
            ("south".to_string(), 100.0),
        ]
    );
}

#[test]
fn test_bucket_ordering_is_non_decreasing() {
    let data = common::series_data(&[
        ("2024-03-02T10:00:00Z", 1.0),
        ("2024-01-15T10:00:00Z", 2.0),
        ("2024-03-01T10:00:00Z", 3.0),
        ("2024-02-10T10:00:00Z", 4.0),
        ("2024-01-15T18:00:00Z", 5.0),
    ]);

    for granularity in [Granularity::Hour, Granularity::Day, Granularity::Week, Granularity::Month] {
        let config = AggregationConfig::new("value", Operation::Sum).time_granularity(granularity);
        let result = aggregate(&data, &config).unwrap();
        let times = timestamps(&result);
        assert!(times.windows(2).all(|w| w[0] <= w[1]), "{:?} out of order", granularity);
    }
}

#[test]
fn test_calendar_truncation() {
    let data = common::series_data(&[("2024-06-12T15:30:00Z", 1.0), ("2024-05-15T00:00:00Z", 2.0)]);

    let weekly = aggregate(
        &data,
        &AggregationConfig::new("value", Operation::Sum).time_granularity(Granularity::Week),
    )
    .unwrap();
    // 週は日曜始まり
    assert_eq!(timestamps(&weekly)[1], common::utc_day(2024, 6, 9));

    let quarterly = aggregate(
        &data,
        &AggregationConfig::new("value", Operation::Sum).time_granularity(Granularity::Quarter),
    )
    .unwrap();
    assert_eq!(timestamps(&quarterly), vec![common::utc_day(2024, 4, 1)]);
    assert_eq!(quarterly.data[0].number("value"), Some(3.0));
}

#[test]
fn test_buckets_follow_row_timezone() {
    let raw = json!([
        { "timestamp": "2024-01-31T20:00:00-05:00", "timezone": "America/New_York", "v": 1 }
    ]);
    let data = normalize_data(&raw, None).unwrap();
    let config = AggregationConfig::new("v", Operation::Sum).time_granularity(Granularity::Month);
    let result = aggregate(&data, &config).unwrap();

    let expected = chrono_tz::America::New_York
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .unwrap();
    assert_eq!(timestamps(&result), vec![expected]);
}

#[test]
fn test_date_column_fallback_and_untimed_rows() {
    let raw = json!([
        { "date": "2024-01-02", "v": 1 },
        { "date": "2024-01-03", "v": 2 },
        { "v": 100 }
    ]);
    let data = normalize_data(&raw, None).unwrap();
    let config = AggregationConfig::new("v", Operation::Sum).time_granularity(Granularity::Month);
    let result = aggregate(&data, &config).unwrap();

    // 時刻を持たない行はバケットに入らない
    assert_eq!(result.len(), 1);
    assert_eq!(result.data[0].number("v"), Some(3.0));
}

#[test]
fn test_group_by_partitions() {
    let data = common::sales_data();
    let groups = group_by(&data, &["region".to_string(), "product".to_string()]);

    let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["north|a", "south|b", "north|b", "south|a"]);
    assert_eq!(groups["north|a"].len(), 2);
    assert_eq!(groups["north|a"].metadata, data.metadata);
}

#[test]
fn test_bin_by_time_averages_numeric_fields() {
    let day = |d: u32, h: u32| chrono_tz::UTC.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap();
    let series = vec![
        TimeSeriesPoint::new(day(1, 10), "UTC").with("v", 1.0).with("w", 4.0),
        TimeSeriesPoint::new(day(1, 12), "UTC").with("v", 3.0).with("w", "n/a"),
        TimeSeriesPoint::new(day(2, 9), "UTC").with("v", 5.0),
    ];

    let binned = bin_by_time(&series, Granularity::Day);
    assert_eq!(binned.len(), 2);
    assert_eq!(binned.metadata.columns, vec!["timestamp", "v", "w"]);
    assert_eq!(binned.column_type("w"), Some(ColumnType::Number));
    assert_eq!(binned.metadata.timezone.as_deref(), Some("UTC"));

    assert_eq!(binned.data[0].timestamp(), Some(common::utc_day(2024, 1, 1)));
    assert_eq!(binned.data[0].number("v"), Some(2.0));
    // 数値でない値は平均から除外される
    assert_eq!(binned.data[0].number("w"), Some(4.0));
    assert_eq!(binned.data[1].number("v"), Some(5.0));
    assert!(!binned.data[1].contains_key("w"));

    assert!(bin_by_time(&[], Granularity::Day).is_empty());
}

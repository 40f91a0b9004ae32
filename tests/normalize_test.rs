mod common;

use datacn::core::{DataPoint, FieldKind, FieldRule, RecordSchema, TimeSeriesSchema};
use datacn::data::{
    detect_column_types, detect_value_type, merge_data_sources, normalize_data,
    normalize_data_with, normalize_points, validate_chart_data, ColumnStrategy,
};
use datacn::{ChartData, ChartType, ColumnType, Error, Value};
use serde_json::json;

#[test]
fn test_month_revenue_round_trip() {
    let raw = json!([
        { "month": "Jan", "revenue": 4000 },
        { "month": "Feb", "revenue": 3000 }
    ]);
    let data = normalize_data(&raw, None).unwrap();

    assert_eq!(data.metadata.columns, vec!["month", "revenue"]);
    assert_eq!(data.column_type("month"), Some(ColumnType::String));
    assert_eq!(data.column_type("revenue"), Some(ColumnType::Number));
    assert_eq!(data.metadata.types.len(), 2);

    // 行の順序と値がそのまま残る
    assert_eq!(data.len(), 2);
    assert_eq!(data.data[0].get("month"), Some(&Value::from("Jan")));
    assert_eq!(data.data[0].number("revenue"), Some(4000.0));
    assert_eq!(data.data[1].get("month"), Some(&Value::from("Feb")));
    assert_eq!(data.data[1].number("revenue"), Some(3000.0));
    assert_eq!(data.metadata.timezone, None);
}

#[test]
fn test_temporal_keys_are_parsed_opportunistically() {
    let raw = json!([
        { "timestamp": "2024-01-05T10:00:00Z", "updated_time": "not a date", "label": "2024-01-01" }
    ]);
    let data = normalize_data(&raw, None).unwrap();
    let row = &data.data[0];

    assert!(matches!(row.get("timestamp"), Some(Value::Timestamp(_))));
    // 解析できない値は文字列のまま
    assert_eq!(row.get("updated_time"), Some(&Value::from("not a date")));
    // 日付らしく見えてもキー名が時間を示さなければ変換しない
    assert_eq!(row.get("label"), Some(&Value::from("2024-01-01")));
    assert_eq!(data.column_type("label"), Some(ColumnType::Date));
    assert_eq!(data.column_type("timestamp"), Some(ColumnType::Date));
}

#[test]
fn test_null_fields_are_dropped() {
    let raw = json!([{ "a": 1, "b": null }, { "a": 2, "b": 3 }]);
    let data = normalize_data(&raw, None).unwrap();

    assert!(!data.data[0].contains_key("b"));
    // 列は先頭行のキーのみ
    assert_eq!(data.metadata.columns, vec!["a"]);
    assert_eq!(data.column_type("b"), Some(ColumnType::Number));
}

#[test]
fn test_union_column_strategy() {
    let raw = json!([{ "a": 1 }, { "a": 2, "b": "x" }]);

    let first_row = normalize_data_with(&raw, None, ColumnStrategy::FirstRow).unwrap();
    assert_eq!(first_row.metadata.columns, vec!["a"]);

    let union = normalize_data_with(&raw, None, ColumnStrategy::Union).unwrap();
    assert_eq!(union.metadata.columns, vec!["a", "b"]);
    assert_eq!(union.column_type("b"), Some(ColumnType::String));
}

#[test]
fn test_non_array_input_is_empty() {
    for raw in [json!({}), json!([]), json!(null), json!("rows")] {
        let data = normalize_data(&raw, None).unwrap();
        assert!(data.is_empty());
        assert!(data.metadata.columns.is_empty());
        assert!(data.metadata.types.is_empty());
    }
}

#[test]
fn test_first_row_timezone_becomes_metadata() {
    let raw = json!([
        { "timestamp": "2024-01-01 09:00", "timezone": "Asia/Tokyo", "v": 1 },
        { "timestamp": "2024-01-02 09:00", "timezone": "Europe/Paris", "v": 2 }
    ]);
    let data = normalize_data(&raw, None).unwrap();

    assert_eq!(data.metadata.timezone.as_deref(), Some("Asia/Tokyo"));
    // 時差のない文字列は行のタイムゾーンで解釈される
    assert_eq!(data.data[0].timestamp(), Some(common::utc_day(2024, 1, 1)));
    assert_eq!(data.column_type("timezone"), Some(ColumnType::String));
}

#[test]
fn test_normalization_is_idempotent() {
    let data = common::sales_data();
    let again = normalize_points(data.data.clone(), ColumnStrategy::FirstRow);

    assert_eq!(again.data, data.data);
    assert_eq!(again.metadata, data.metadata);
}

#[test]
fn test_type_inference_reads_first_ten_rows() {
    let rows: Vec<DataPoint> = (0..12)
        .map(|i| {
            let mut point = DataPoint::new().with("label", "a");
            if i == 0 {
                point.insert("score", Value::Null);
            } else {
                point.insert("score", i as f64);
            }
            if i >= 10 {
                point.insert("late", true);
            }
            point
        })
        .collect();

    let types = detect_column_types(&rows);
    assert_eq!(types.get("label"), Some(&ColumnType::String));
    // 最初の非 null 値で型が決まる
    assert_eq!(types.get("score"), Some(&ColumnType::Number));
    assert_eq!(types.get("late"), None);

    // 決定的で、先頭10行にのみ依存する
    assert_eq!(detect_column_types(&rows), types);
    assert_eq!(detect_column_types(&rows[..10]), types);
}

#[test]
fn test_type_inference_edge_cases() {
    let all_null = vec![DataPoint::new().with("n", Value::Null)];
    assert_eq!(detect_column_types(&all_null).get("n"), Some(&ColumnType::String));

    // 予約キーは推論対象外
    let reserved = vec![DataPoint::new().with("timestamp", "2024-01-01").with("timezone", "UTC")];
    assert!(detect_column_types(&reserved).is_empty());

    assert_eq!(detect_value_type(&Value::from("2024-13-45 junk")), Some(ColumnType::Date));
    assert_eq!(detect_value_type(&Value::from("March 5, 2024")), Some(ColumnType::Date));
    assert_eq!(detect_value_type(&Value::from("hello")), Some(ColumnType::String));
    assert_eq!(detect_value_type(&Value::from(false)), Some(ColumnType::Boolean));
    assert_eq!(detect_value_type(&Value::Null), None);
}

#[test]
fn test_schema_rejection_fails_the_call() {
    let schema = RecordSchema::new().field(FieldRule::new("revenue", FieldKind::Number).required());
    let raw = json!([{ "revenue": 1 }, { "month": "Feb" }]);

    let err = normalize_data(&raw, Some(&schema)).unwrap_err();
    assert!(matches!(err, Error::Validation { row: 1, .. }));
}

#[test]
fn test_schema_coercion_applies_before_typing() {
    let schema = RecordSchema::new().field(FieldRule::new("revenue", FieldKind::Number).coerce());
    let raw = json!([{ "revenue": "12.5" }]);

    let data = normalize_data(&raw, Some(&schema)).unwrap();
    assert_eq!(data.data[0].number("revenue"), Some(12.5));
    assert_eq!(data.column_type("revenue"), Some(ColumnType::Number));

    let missing_zone = json!([{ "timestamp": "2024-01-01", "v": 1 }]);
    assert!(normalize_data(&missing_zone, Some(&TimeSeriesSchema)).is_err());
}

#[test]
fn test_validate_chart_data() {
    let sales = common::sales_data();
    assert!(validate_chart_data(&sales, ChartType::Bar));
    assert!(validate_chart_data(&sales, ChartType::TimeSeries));

    let one_column = normalize_data(&json!([{ "v": 1 }]), None).unwrap();
    assert!(!validate_chart_data(&one_column, ChartType::Pie));
    assert!(!validate_chart_data(&one_column, ChartType::TimeSeries));

    assert!(!validate_chart_data(&ChartData::empty(), ChartType::Line));
}

#[test]
fn test_merge_data_sources() {
    let mut a = normalize_data(&json!([{ "k": "x", "v": 1 }]), None).unwrap();
    a.metadata.timezone = Some("UTC".to_string());
    a.metadata.source = Some("crm".to_string());
    let mut b = normalize_data(&json!([{ "k": "y", "w": true }]), None).unwrap();
    b.metadata.timezone = Some("UTC".to_string());
    b.metadata.source = Some("erp".to_string());

    let merged = merge_data_sources(&[a.clone(), b.clone()]);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged.metadata.columns, vec!["k", "v", "w"]);
    assert_eq!(merged.metadata.timezone.as_deref(), Some("UTC"));
    assert_eq!(merged.metadata.source.as_deref(), Some("crm, erp"));

    // タイムゾーンが一致しない場合は保持しない
    b.metadata.timezone = Some("Asia/Tokyo".to_string());
    let merged = merge_data_sources(&[a, b]);
    assert_eq!(merged.metadata.timezone, None);

    assert!(merge_data_sources(&[]).is_empty());
}

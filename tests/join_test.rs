mod common;

use chrono::TimeZone;
use datacn::data::merge_time_series;
use datacn::{join_data, normalize_data, ChartData, Error, JoinConfig, JoinKind, TimeSeriesPoint, Value};
use serde_json::json;

fn left() -> ChartData {
    normalize_data(
        &json!([
            { "id": 1, "name": "a", "v": 1 },
            { "id": 2, "name": "b", "v": 2 },
            { "name": "no key", "v": 9 }
        ]),
        None,
    )
    .unwrap()
}

fn right() -> ChartData {
    normalize_data(
        &json!([
            { "key": 1, "score": 10 },
            { "key": 1, "score": 11 },
            { "key": 3, "score": 30 }
        ]),
        None,
    )
    .unwrap()
}

fn join(kind: JoinKind) -> ChartData {
    join_data(&left(), &right(), &JoinConfig::new(kind, "id", "key")).unwrap()
}

#[test]
fn test_inner_join() {
    let result = join(JoinKind::Inner);

    assert_eq!(result.len(), 2);
    let row = &result.data[0];
    assert_eq!(row.number("id"), Some(1.0));
    assert_eq!(row.get("name"), Some(&Value::from("a")));
    assert_eq!(row.number("score"), Some(10.0));
    // 右側のキー列は結合行に含まれない
    assert!(!row.contains_key("key"));
    assert_eq!(result.data[1].number("score"), Some(11.0));
}

#[test]
fn test_left_join_keeps_unmatched_left_rows_once() {
    let result = join(JoinKind::Left);

    assert_eq!(result.len(), 4);
    let unmatched: Vec<_> = result.data.iter().filter(|r| !r.contains_key("score")).collect();
    assert_eq!(unmatched.len(), 2);
    assert_eq!(unmatched[0].number("id"), Some(2.0));
    assert_eq!(unmatched[1].get("name"), Some(&Value::from("no key")));
}

#[test]
fn test_right_join_appends_unmatched_right_rows() {
    let result = join(JoinKind::Right);

    assert_eq!(result.len(), 3);
    let last = &result.data[2];
    assert_eq!(last.number("key"), Some(3.0));
    assert_eq!(last.number("score"), Some(30.0));
    assert_eq!(last.len(), 2);
}

#[test]
fn test_full_join() {
    let result = join(JoinKind::Full);
    assert_eq!(result.len(), 5);

    // 右側のみの行はちょうど1回だけ現れる
    let right_only = result
        .data
        .iter()
        .filter(|r| r.number("key") == Some(3.0))
        .count();
    assert_eq!(right_only, 1);
}

#[test]
fn test_right_fields_overwrite_left() {
    let left = normalize_data(&json!([{ "id": "x", "v": 1 }]), None).unwrap();
    let right = normalize_data(&json!([{ "id": "x", "v": 2, "w": true }]), None).unwrap();

    let result = join_data(&left, &right, &JoinConfig::new(JoinKind::Inner, "id", "id")).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.data[0].number("v"), Some(2.0));
    assert_eq!(result.data[0].get("w"), Some(&Value::Bool(true)));
    // 同名の右キーが落とされても左キーは残る
    assert_eq!(result.data[0].get("id"), Some(&Value::from("x")));
}

#[test]
fn test_join_metadata() {
    let mut l = left();
    l.metadata.source = Some("crm".to_string());
    let mut r = right();
    r.metadata.timezone = Some("Europe/Paris".to_string());
    r.metadata.source = Some("".to_string());

    let result = join_data(&l, &r, &JoinConfig::new(JoinKind::Inner, "id", "key")).unwrap();
    assert_eq!(result.metadata.columns, vec!["id", "name", "v", "key", "score"]);
    assert_eq!(result.metadata.timezone.as_deref(), Some("Europe/Paris"));
    assert_eq!(result.metadata.source.as_deref(), Some("crm"));

    r.metadata.source = None;
    l.metadata.source = None;
    let result = join_data(&l, &r, &JoinConfig::new(JoinKind::Inner, "id", "key")).unwrap();
    assert_eq!(result.metadata.source, None);
}

#[test]
fn test_missing_join_keys_fail() {
    let err = join_data(&left(), &right(), &JoinConfig::new(JoinKind::Inner, "uid", "key")).unwrap_err();
    assert!(matches!(err, Error::ColumnNotFound { ref column, .. } if column == "uid"));

    let err = join_data(&left(), &right(), &JoinConfig::new(JoinKind::Inner, "id", "uid")).unwrap_err();
    assert!(matches!(err, Error::ColumnNotFound { .. }));

    assert!(matches!("cross".parse::<JoinKind>(), Err(Error::UnknownJoinKind(_))));
    assert_eq!("outer".parse::<JoinKind>().unwrap(), JoinKind::Full);
}

#[test]
fn test_merge_time_series() {
    let t = |d: u32| chrono_tz::UTC.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
    let first = vec![
        TimeSeriesPoint::new(t(3), "UTC").with("a", 3.0),
        TimeSeriesPoint::new(t(1), "UTC").with("a", 1.0),
    ];
    let second = vec![
        TimeSeriesPoint::new(t(1), "Asia/Tokyo").with("a", 10.0).with("b", 2.0),
        TimeSeriesPoint::new(t(2), "UTC").with("b", 5.0),
    ];

    let merged = merge_time_series(&[first.clone(), second]);
    let times: Vec<_> = merged.iter().map(|p| p.timestamp).collect();
    assert_eq!(times, vec![t(1), t(2), t(3)]);

    // 後から来た値が上書きし、タイムゾーンは最初の点のもの
    assert_eq!(merged[0].get("a"), Some(&Value::Number(10.0)));
    assert_eq!(merged[0].get("b"), Some(&Value::Number(2.0)));
    assert_eq!(merged[0].timezone, "UTC");

    // 1系列だけならそのまま返す
    assert_eq!(merge_time_series(&[first.clone()]), first);
    assert!(merge_time_series(&[]).is_empty());
}

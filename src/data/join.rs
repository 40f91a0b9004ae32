use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};

use crate::core::constants::{TIMESTAMP_KEY, TIMEZONE_KEY};
use crate::core::{ChartData, DataPoint, JoinConfig, JoinKind, Metadata, TimeSeriesPoint, Value};
use crate::error::Result;

/// Hashable form of a join key value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum JoinKey {
    Text(String),
    /// Bit pattern of the number, with -0 folded into 0
    Number(u64),
    Bool(bool),
    /// Seconds and nanoseconds since the epoch
    Instant(i64, u32),
}

impl JoinKey {
    /// `None` for null; a null key never matches anything
    fn of(value: &Value) -> Option<JoinKey> {
        match value {
            Value::Null => None,
            Value::Text(s) => Some(JoinKey::Text(s.clone())),
            Value::Number(n) => {
                let n = if *n == 0.0 { 0.0 } else { *n };
                Some(JoinKey::Number(n.to_bits()))
            }
            Value::Bool(b) => Some(JoinKey::Bool(*b)),
            Value::Timestamp(ts) => Some(JoinKey::Instant(ts.timestamp(), ts.timestamp_subsec_nanos())),
        }
    }
}

fn key_of(point: &DataPoint, column: &str) -> Option<JoinKey> {
    point.get(column).and_then(JoinKey::of)
}

/// Right rows grouped by key, keys in first-seen order
fn build_right_index<'a>(right: &'a ChartData, right_key: &str) -> IndexMap<JoinKey, Vec<&'a DataPoint>> {
    let mut index: IndexMap<JoinKey, Vec<&DataPoint>> = IndexMap::new();
    for point in &right.data {
        if let Some(key) = key_of(point, right_key) {
            index.entry(key).or_default().push(point);
        }
    }
    index
}

/// Left row overlaid with every right field except the right key
fn merge_rows(left: &DataPoint, right: &DataPoint, right_key: &str) -> DataPoint {
    let mut joined = left.clone();
    for (key, value) in right.iter() {
        if key != right_key {
            joined.insert(key.clone(), value.clone());
        }
    }
    joined
}

fn joined_metadata(left: &Metadata, right: &Metadata) -> Metadata {
    let columns: IndexSet<String> = left.columns.iter().chain(&right.columns).cloned().collect();

    let mut types = left.types.clone();
    types.extend(right.types.iter().map(|(k, v)| (k.clone(), *v)));

    let non_empty = |s: &Option<String>| s.clone().filter(|s| !s.is_empty());
    let sources: Vec<String> = [&left.source, &right.source]
        .into_iter()
        .filter_map(non_empty)
        .collect();

    Metadata {
        columns: columns.into_iter().collect(),
        types,
        timezone: non_empty(&left.timezone).or_else(|| non_empty(&right.timezone)),
        source: (!sources.is_empty()).then(|| sources.join(", ")),
    }
}

/// Joins two tables on `config.left_key == config.right_key`.
///
/// Each left row with matches produces one merged row per matching right row;
/// the merged row drops the right key and lets right fields overwrite left
/// fields of the same name. Left rows with a null key, or without matches, are
/// kept only when the join kind keeps unmatched left rows. Unmatched right rows
/// are appended afterwards, in the order their keys first appeared, when the
/// kind keeps unmatched right rows.
///
/// # Errors
///
/// [`Error::ColumnNotFound`](crate::error::Error::ColumnNotFound) when either key is
/// not a declared column of its table.
pub fn join_data(left: &ChartData, right: &ChartData, config: &JoinConfig) -> Result<ChartData> {
    left.require_column(&config.left_key, "left join key")?;
    right.require_column(&config.right_key, "right join key")?;

    let kind: JoinKind = config.join_type;
    let right_index = build_right_index(right, &config.right_key);
    let mut matched_keys = HashSet::new();
    let mut rows = Vec::new();

    for left_point in &left.data {
        let Some(key) = key_of(left_point, &config.left_key) else {
            if kind.emit_unmatched_left() {
                rows.push(left_point.clone());
            }
            continue;
        };

        match right_index.get(&key) {
            Some(matches) => {
                rows.extend(
                    matches
                        .iter()
                        .map(|right_point| merge_rows(left_point, right_point, &config.right_key)),
                );
            }
            None if kind.emit_unmatched_left() => rows.push(left_point.clone()),
            None => {}
        }
        matched_keys.insert(key);
    }

    if kind.emit_unmatched_right() {
        for (key, right_points) in &right_index {
            if !matched_keys.contains(key) {
                rows.extend(right_points.iter().map(|point| (*point).clone()));
            }
        }
    }

    log::debug!(
        "{:?} join on {}={} produced {} rows",
        kind,
        config.left_key,
        config.right_key,
        rows.len()
    );
    Ok(ChartData::new(rows, joined_metadata(&left.metadata, &right.metadata)))
}

/// Merges several series into one point per distinct instant.
///
/// When several points share an instant, fields of later points overwrite
/// those of earlier ones; the first point's timestamp and zone are kept. The
/// result is sorted by time. A single series is returned as is.
pub fn merge_time_series(series: &[Vec<TimeSeriesPoint>]) -> Vec<TimeSeriesPoint> {
    match series {
        [] => return Vec::new(),
        [only] => return only.clone(),
        _ => {}
    }

    let mut by_instant: IndexMap<(i64, u32), TimeSeriesPoint> = IndexMap::new();
    for point in series.iter().flatten() {
        let instant = (point.timestamp.timestamp(), point.timestamp.timestamp_subsec_nanos());
        match by_instant.get_mut(&instant) {
            Some(existing) => {
                for (key, value) in point.fields.iter() {
                    if key != TIMESTAMP_KEY && key != TIMEZONE_KEY {
                        existing.fields.insert(key.clone(), value.clone());
                    }
                }
            }
            None => {
                by_instant.insert(instant, point.clone());
            }
        }
    }

    let mut merged: Vec<TimeSeriesPoint> = by_instant.into_values().collect();
    merged.sort_by_key(|point| point.timestamp);
    merged
}

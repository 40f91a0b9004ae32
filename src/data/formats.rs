//! Type inference, normalization of raw records, structural validation and merging

use chrono_tz::Tz;
use indexmap::{IndexMap, IndexSet};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::core::constants::{TIMESTAMP_KEY, TIMEZONE_KEY, TYPE_SAMPLE_SIZE};
use crate::core::{ChartData, ChartType, ColumnType, DataPoint, Metadata, RowSchema, Value};
use crate::error::{Error, Result, Warning, WarningKind};
use crate::time::date_utils::{parse_date_in, parse_date_str};

lazy_static! {
    static ref DATE_PREFIX: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap();
}

/// Which rows contribute to `metadata.columns` during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnStrategy {
    /// Keys of the first row only
    #[default]
    FirstRow,
    /// Keys of every row, in first-seen order
    Union,
}

/// Semantic type of a single value; `None` for null
pub fn detect_value_type(value: &Value) -> Option<ColumnType> {
    match value {
        Value::Null => None,
        Value::Bool(_) => Some(ColumnType::Boolean),
        Value::Number(_) => Some(ColumnType::Number),
        Value::Timestamp(_) => Some(ColumnType::Date),
        Value::Text(s) => {
            if DATE_PREFIX.is_match(s) || parse_date_str(s).is_some() {
                Some(ColumnType::Date)
            } else {
                Some(ColumnType::String)
            }
        }
    }
}

/// Infers one type per column from the first rows.
///
/// Only the first [`TYPE_SAMPLE_SIZE`] rows are read and the reserved keys are
/// skipped. A column's type is fixed by its first non-null value; columns that
/// were null throughout the sample default to `string`.
pub fn detect_column_types(rows: &[DataPoint]) -> IndexMap<String, ColumnType> {
    let mut detected: IndexMap<String, Option<ColumnType>> = IndexMap::new();

    for point in rows.iter().take(TYPE_SAMPLE_SIZE) {
        for (key, value) in point.iter() {
            if key == TIMESTAMP_KEY || key == TIMEZONE_KEY {
                continue;
            }
            let slot = detected.entry(key.clone()).or_insert(None);
            if slot.is_none() {
                *slot = detect_value_type(value);
            }
        }
    }

    detected
        .into_iter()
        .map(|(key, ty)| (key, ty.unwrap_or(ColumnType::String)))
        .collect()
}

fn is_temporal_key(key: &str) -> bool {
    key == TIMESTAMP_KEY || key.contains("date") || key.contains("time")
}

fn row_zone(timezone: Option<&str>) -> Tz {
    timezone
        .and_then(|tz| tz.parse::<Tz>().ok())
        .unwrap_or(chrono_tz::UTC)
}

/// Typed cell for a raw field; date-like keys holding parseable text become timestamps
fn normalize_value(key: &str, value: Value, zone: Tz) -> Value {
    match value {
        Value::Text(s) if is_temporal_key(key) => match parse_date_in(&s, zone) {
            Some(ts) => Value::Timestamp(ts),
            None => Value::Text(s),
        },
        other => other,
    }
}

fn normalize_json_row(item: &JsonValue) -> DataPoint {
    let Some(object) = item.as_object() else {
        return DataPoint::new();
    };
    let zone = row_zone(object.get(TIMEZONE_KEY).and_then(JsonValue::as_str));

    object
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let typed = normalize_value(key, Value::from_json(value), zone);
            (key.clone(), typed)
        })
        .collect()
}

fn normalize_point(point: DataPoint) -> DataPoint {
    let zone = row_zone(point.timezone());
    point
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let typed = normalize_value(&key, value, zone);
            (key, typed)
        })
        .collect()
}

fn build_chart_data(rows: Vec<DataPoint>, strategy: ColumnStrategy) -> ChartData {
    if rows.is_empty() {
        return ChartData::empty();
    }

    let columns: Vec<String> = match strategy {
        ColumnStrategy::FirstRow => rows[0].keys().cloned().collect(),
        ColumnStrategy::Union => {
            let mut seen = IndexSet::new();
            for row in &rows {
                seen.extend(row.keys().cloned());
            }
            seen.into_iter().collect()
        }
    };

    let mut types = detect_column_types(&rows);
    for column in &columns {
        if !types.contains_key(column) {
            let ty = if column == TIMESTAMP_KEY {
                ColumnType::Date
            } else {
                ColumnType::String
            };
            types.insert(column.clone(), ty);
        }
    }

    let mut metadata = Metadata::new(columns, types);
    metadata.timezone = rows[0].timezone().map(str::to_string);

    ChartData::new(rows, metadata)
}

/// Converts raw records into a [`ChartData`] using first-row columns.
///
/// See [`normalize_data_with`].
pub fn normalize_data(raw: &JsonValue, schema: Option<&dyn RowSchema>) -> Result<ChartData> {
    normalize_data_with(raw, schema, ColumnStrategy::FirstRow)
}

/// Converts raw records into a [`ChartData`].
///
/// Anything other than a non-empty array yields an empty table. Each row is
/// first passed through `schema` when given; a rejected row fails the whole
/// call. Null fields are dropped, and text in fields whose key is `timestamp`
/// or contains `date`/`time` is parsed into a timestamp when possible.
/// The first row's `timezone` becomes `metadata.timezone`.
pub fn normalize_data_with(
    raw: &JsonValue,
    schema: Option<&dyn RowSchema>,
    strategy: ColumnStrategy,
) -> Result<ChartData> {
    let items = match raw.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => return Ok(ChartData::empty()),
    };

    let rows = match schema {
        Some(schema) => items
            .iter()
            .enumerate()
            .map(|(row, item)| {
                schema
                    .parse(item)
                    .map(|parsed| normalize_json_row(&parsed))
                    .map_err(|message| Error::Validation { row, message })
            })
            .collect::<Result<Vec<_>>>()?,
        None => items.iter().map(normalize_json_row).collect(),
    };

    log::debug!("normalized {} rows", rows.len());
    Ok(build_chart_data(rows, strategy))
}

/// Normalizes rows that are already typed. Timestamps pass through unchanged.
pub fn normalize_points(points: Vec<DataPoint>, strategy: ColumnStrategy) -> ChartData {
    let rows = points.into_iter().map(normalize_point).collect();
    build_chart_data(rows, strategy)
}

/// Structural check of `data` for `chart_type`, without logging
pub fn check_chart_data(data: &ChartData, chart_type: ChartType) -> std::result::Result<(), Warning> {
    let invalid = |message: String| -> std::result::Result<(), Warning> {
        Err(Warning::new(WarningKind::InvalidChartData, message))
    };

    if data.is_empty() {
        return invalid(format!("No data points for {} chart", chart_type));
    }

    let column_count = data.metadata.columns.len();
    match chart_type {
        ChartType::Bar | ChartType::Line | ChartType::Area | ChartType::Pie => {
            if column_count < 2 {
                return invalid(format!(
                    "{} chart requires at least 2 columns, got {}",
                    chart_type, column_count
                ));
            }
        }
        ChartType::TimeSeries => {
            let has_time = data.metadata.columns.iter().any(|column| {
                column == TIMESTAMP_KEY || data.column_type(column) == Some(ColumnType::Date)
            });
            if !has_time {
                return invalid("time-series chart requires a timestamp or date column".to_string());
            }
        }
    }

    Ok(())
}

/// Whether `data` can be drawn as `chart_type`. Failures are logged.
pub fn validate_chart_data(data: &ChartData, chart_type: ChartType) -> bool {
    match check_chart_data(data, chart_type) {
        Ok(()) => true,
        Err(warning) => {
            log::warn!("[validate_chart_data] {}", warning.message);
            false
        }
    }
}

/// Concatenates tables.
///
/// Columns are unioned in first-seen order and later types win. The zone is
/// kept only when every source that has one agrees; source labels are joined
/// when the first table has one.
pub fn merge_data_sources(sources: &[ChartData]) -> ChartData {
    match sources {
        [] => return ChartData::empty(),
        [only] => return only.clone(),
        _ => {}
    }

    let mut data = Vec::with_capacity(sources.iter().map(ChartData::len).sum());
    let mut columns = IndexSet::new();
    let mut types = IndexMap::new();
    let mut timezones = IndexSet::new();

    for source in sources {
        data.extend(source.data.iter().cloned());
        columns.extend(source.metadata.columns.iter().cloned());
        types.extend(source.metadata.types.iter().map(|(k, v)| (k.clone(), *v)));
        if let Some(tz) = source.metadata.timezone.as_deref().filter(|tz| !tz.is_empty()) {
            timezones.insert(tz.to_string());
        }
    }

    let mut metadata = Metadata::new(columns.into_iter().collect(), types);
    if timezones.len() == 1 {
        metadata.timezone = timezones.into_iter().next();
    }

    let first_has_source = sources[0]
        .metadata
        .source
        .as_deref()
        .is_some_and(|s| !s.is_empty());
    if first_has_source {
        let labels: Vec<&str> = sources
            .iter()
            .filter_map(|s| s.metadata.source.as_deref())
            .filter(|s| !s.is_empty())
            .collect();
        metadata.source = Some(labels.join(", "));
    }

    ChartData::new(data, metadata)
}

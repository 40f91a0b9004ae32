//! Reductions over partitions of a table: global, grouped, time-bucketed, or both

use chrono::DateTime;
use chrono_tz::Tz;
use indexmap::{IndexMap, IndexSet};

use crate::core::constants::TIMESTAMP_KEY;
use crate::core::{
    AggregationConfig, ChartData, ColumnType, DataPoint, Metadata, Operation, TimeSeriesPoint,
    Value,
};
use crate::error::Result;
use crate::time::Granularity;

/// Columns consulted, in order, for a row's bucket time
const ROW_TIME_KEYS: [&str; 3] = [TIMESTAMP_KEY, "date", "time"];

/// Applies `operation` to `values`.
///
/// Every operation yields 0 for an empty slice except `count`, which yields
/// the length.
pub fn calculate_operation(values: &[f64], operation: Operation) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    match operation {
        Operation::Sum => values.iter().sum(),
        Operation::Avg => values.iter().sum::<f64>() / values.len() as f64,
        Operation::Count => values.len() as f64,
        Operation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        Operation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Operation::Median => {
            let mut sorted = values.to_vec();
            sorted.sort_by(f64::total_cmp);
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                (sorted[mid - 1] + sorted[mid]) / 2.0
            } else {
                sorted[mid]
            }
        }
    }
}

/// Numeric values of `field`; anything that is not a number is skipped
fn numeric_values<'a, I>(points: I, field: &str) -> Vec<f64>
where
    I: IntoIterator<Item = &'a DataPoint>,
{
    points
        .into_iter()
        .filter_map(|point| point.number(field))
        .collect()
}

fn group_key(point: &DataPoint, fields: &[String]) -> Vec<String> {
    fields
        .iter()
        .map(|field| point.get(field).map(Value::to_key_string).unwrap_or_default())
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::Text(s) => !s.is_empty(),
        Value::Timestamp(_) => true,
    }
}

/// Instant of the first set column among `timestamp`, `date` and `time`
fn row_time(point: &DataPoint) -> Option<DateTime<Tz>> {
    let key = ROW_TIME_KEYS
        .into_iter()
        .find(|key| point.get(key).is_some_and(is_truthy))?;
    point.resolve_time(key)
}

fn group_types(data: &ChartData, group_by: &[String]) -> IndexMap<String, ColumnType> {
    group_by
        .iter()
        .map(|g| (g.clone(), data.column_type(g).unwrap_or(ColumnType::String)))
        .collect()
}

/// Reduces `config.field` over the partitions described by `config`.
///
/// Time-bucketed results are sorted ascending by bucket start. Rows without
/// a resolvable time are left out of time buckets.
///
/// # Errors
///
/// [`Error::ColumnNotFound`](crate::error::Error::ColumnNotFound) when the field
/// is not a declared column of a non-empty table.
pub fn aggregate(data: &ChartData, config: &AggregationConfig) -> Result<ChartData> {
    if data.is_empty() {
        return Ok(data.clone());
    }

    let field = config.field.as_str();
    data.require_column(field, "aggregation field")?;

    let result = match (config.time_granularity, config.group_by.as_deref()) {
        (Some(granularity), Some(group_by)) => {
            aggregate_by_time_and_group(data, field, config.operation, group_by, granularity)
        }
        (Some(granularity), None) => aggregate_by_time(data, field, config.operation, granularity),
        (None, Some(group_by)) => aggregate_by_group(data, field, config.operation, group_by),
        (None, None) => aggregate_all(data, field, config.operation),
    };

    log::debug!(
        "aggregated {} rows into {} ({} of '{}')",
        data.len(),
        result.len(),
        config.operation,
        field
    );
    Ok(result)
}

fn aggregate_all(data: &ChartData, field: &str, operation: Operation) -> ChartData {
    let result = calculate_operation(&numeric_values(&data.data, field), operation);

    let mut types = IndexMap::new();
    types.insert(field.to_string(), ColumnType::Number);

    ChartData::new(
        vec![DataPoint::new().with(field, result)],
        Metadata::new(vec![field.to_string()], types),
    )
}

fn aggregate_by_group(data: &ChartData, field: &str, operation: Operation, group_by: &[String]) -> ChartData {
    let mut groups: IndexMap<Vec<String>, Vec<&DataPoint>> = IndexMap::new();
    for point in &data.data {
        groups.entry(group_key(point, group_by)).or_default().push(point);
    }

    let rows = groups
        .values()
        .map(|members| {
            let mut row = DataPoint::new();
            for g in group_by {
                let value = members[0].present(g).cloned().unwrap_or(Value::Null);
                row.insert(g.clone(), value);
            }
            row.insert(field, calculate_operation(&numeric_values(members.iter().copied(), field), operation));
            row
        })
        .collect();

    let mut columns: IndexSet<String> = group_by.iter().cloned().collect();
    columns.insert(field.to_string());

    let mut types = group_types(data, group_by);
    types.insert(field.to_string(), ColumnType::Number);

    ChartData::new(rows, Metadata::new(columns.into_iter().collect(), types))
}

fn aggregate_by_time(data: &ChartData, field: &str, operation: Operation, granularity: Granularity) -> ChartData {
    let mut buckets: IndexMap<i64, (DateTime<Tz>, Vec<&DataPoint>)> = IndexMap::new();
    for point in &data.data {
        let Some(time) = row_time(point) else {
            continue;
        };
        let start = granularity.floor(&time);
        buckets
            .entry(start.timestamp_millis())
            .or_insert_with(|| (start, Vec::new()))
            .1
            .push(point);
    }

    let mut rows: Vec<(DateTime<Tz>, DataPoint)> = buckets
        .into_values()
        .map(|(start, members)| {
            let value = calculate_operation(&numeric_values(members, field), operation);
            let row = DataPoint::new().with(TIMESTAMP_KEY, start).with(field, value);
            (start, row)
        })
        .collect();
    rows.sort_by_key(|(start, _)| *start);

    let mut types = IndexMap::new();
    types.insert(TIMESTAMP_KEY.to_string(), ColumnType::Date);
    types.insert(field.to_string(), ColumnType::Number);

    ChartData::new(
        rows.into_iter().map(|(_, row)| row).collect(),
        Metadata::new(vec![TIMESTAMP_KEY.to_string(), field.to_string()], types),
    )
}

fn aggregate_by_time_and_group(
    data: &ChartData,
    field: &str,
    operation: Operation,
    group_by: &[String],
    granularity: Granularity,
) -> ChartData {
    let mut buckets: IndexMap<(i64, Vec<String>), (DateTime<Tz>, Vec<&DataPoint>)> = IndexMap::new();
    for point in &data.data {
        let Some(time) = row_time(point) else {
            continue;
        };
        let start = granularity.floor(&time);
        buckets
            .entry((start.timestamp_millis(), group_key(point, group_by)))
            .or_insert_with(|| (start, Vec::new()))
            .1
            .push(point);
    }

    let mut rows: Vec<(DateTime<Tz>, DataPoint)> = buckets
        .into_values()
        .map(|(start, members)| {
            let value = calculate_operation(&numeric_values(members.iter().copied(), field), operation);
            let mut row = DataPoint::new().with(TIMESTAMP_KEY, start).with(field, value);
            for g in group_by {
                let group_value = members[0].present(g).cloned().unwrap_or(Value::Null);
                row.insert(g.clone(), group_value);
            }
            (start, row)
        })
        .collect();
    rows.sort_by_key(|(start, _)| *start);

    let mut columns = vec![TIMESTAMP_KEY.to_string()];
    columns.extend(group_by.iter().cloned());
    columns.push(field.to_string());

    let mut types = IndexMap::new();
    types.insert(TIMESTAMP_KEY.to_string(), ColumnType::Date);
    types.insert(field.to_string(), ColumnType::Number);
    types.extend(group_types(data, group_by));

    ChartData::new(
        rows.into_iter().map(|(_, row)| row).collect(),
        Metadata::new(columns, types),
    )
}

/// Partitions rows by the `|`-joined values of `fields` without reducing.
///
/// Each partition shares the source metadata. Partitions keep first-seen order.
pub fn group_by(data: &ChartData, fields: &[String]) -> IndexMap<String, ChartData> {
    let mut groups: IndexMap<String, Vec<DataPoint>> = IndexMap::new();
    for point in &data.data {
        let key = group_key(point, fields).join("|");
        groups.entry(key).or_default().push(point.clone());
    }

    groups
        .into_iter()
        .map(|(key, rows)| (key, data.with_rows(rows)))
        .collect()
}

/// Buckets a series by `granularity` and averages every numeric field.
///
/// A field is averaged over the bucket members where it is a number; members
/// where it is not are skipped rather than counted as zero. Buckets are sorted
/// ascending and columns come from the first bucket.
pub fn bin_by_time(series: &[TimeSeriesPoint], granularity: Granularity) -> ChartData {
    if series.is_empty() {
        return ChartData::empty();
    }

    let mut bins: IndexMap<i64, (DateTime<Tz>, Vec<&TimeSeriesPoint>)> = IndexMap::new();
    for point in series {
        let start = granularity.floor(&point.timestamp);
        bins.entry(start.timestamp_millis())
            .or_insert_with(|| (start, Vec::new()))
            .1
            .push(point);
    }

    let mut rows: Vec<(DateTime<Tz>, DataPoint)> = bins
        .into_values()
        .map(|(start, members)| {
            let numeric_fields: IndexSet<&String> = members
                .iter()
                .flat_map(|member| member.fields.iter())
                .filter(|(_, value)| value.is_number())
                .map(|(key, _)| key)
                .collect();

            let mut row = DataPoint::new().with(TIMESTAMP_KEY, start);
            for key in numeric_fields {
                let values = numeric_values(members.iter().map(|m| &m.fields), key);
                row.insert(key.clone(), calculate_operation(&values, Operation::Avg));
            }
            (start, row)
        })
        .collect();
    rows.sort_by_key(|(start, _)| *start);

    let rows: Vec<DataPoint> = rows.into_iter().map(|(_, row)| row).collect();
    let columns: Vec<String> = rows[0].keys().cloned().collect();
    let types = columns
        .iter()
        .map(|column| {
            let ty = if column == TIMESTAMP_KEY {
                ColumnType::Date
            } else {
                ColumnType::Number
            };
            (column.clone(), ty)
        })
        .collect();

    let mut metadata = Metadata::new(columns, types);
    metadata.timezone = Some(series[0].timezone.clone()).filter(|tz| !tz.is_empty());
    ChartData::new(rows, metadata)
}

//! Row and column transforms over [`ChartData`]

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::formats::detect_value_type;
use crate::core::{ChartData, ColumnType, DataPoint, Metadata, Value};
use crate::error::{Error, Result};

/// Sort order for [`sort_data`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(Error::InvalidInput(format!("unknown sort direction: {}", s))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// Rows satisfying `predicate`; metadata is kept as is
pub fn filter_data<F>(data: &ChartData, predicate: F) -> ChartData
where
    F: Fn(&DataPoint) -> bool,
{
    data.with_rows(data.data.iter().filter(|point| predicate(point)).cloned().collect())
}

/// Case-insensitive first; on a tie lowercase sorts before uppercase
fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn compare_present(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        _ => locale_cmp(&a.to_key_string(), &b.to_key_string()),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>, direction: SortDirection) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    // Missing values lead in ascending order and trail in descending order
    let missing_first = match direction {
        SortDirection::Asc => Ordering::Less,
        SortDirection::Desc => Ordering::Greater,
    };

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => missing_first,
        (Some(_), None) => missing_first.reverse(),
        (Some(a), Some(b)) => match direction {
            SortDirection::Asc => compare_present(a, b),
            SortDirection::Desc => compare_present(b, a),
        },
    }
}

/// Stable sort of rows by `key`.
///
/// Two numbers compare numerically and two timestamps by instant. Any other
/// pair compares by its text form, case-insensitively, so `"10"` sorts
/// before `5`.
pub fn sort_data(data: &ChartData, key: &str, direction: SortDirection) -> ChartData {
    let mut sorted = data.data.clone();
    sorted.sort_by(|a, b| compare_values(a.get(key), b.get(key), direction));
    data.with_rows(sorted)
}

/// Projects every row onto `columns`.
///
/// Requested columns that the table does not declare are left out of
/// `metadata.columns`, but a row that happens to carry such a key keeps it.
pub fn select_columns(data: &ChartData, columns: &[String]) -> ChartData {
    let rows = data
        .data
        .iter()
        .map(|point| {
            columns
                .iter()
                .filter_map(|col| point.get(col).map(|v| (col.clone(), v.clone())))
                .collect::<DataPoint>()
        })
        .collect();

    let types = columns
        .iter()
        .filter_map(|col| data.column_type(col).map(|ty| (col.clone(), ty)))
        .collect();

    let mut metadata = Metadata::new(
        columns.iter().filter(|col| data.has_column(col)).cloned().collect(),
        types,
    );
    metadata.timezone = data.metadata.timezone.clone();
    metadata.source = data.metadata.source.clone();
    ChartData::new(rows, metadata)
}

/// Renames a column in the rows and the metadata.
///
/// In each row the renamed key moves to the end. The column keeps its place in
/// `metadata.columns` and its type.
pub fn rename_column(data: &ChartData, old_name: &str, new_name: &str) -> ChartData {
    let rows = data
        .data
        .iter()
        .map(|point| {
            let mut renamed = point.clone();
            if let Some(value) = renamed.remove(old_name) {
                renamed.insert(new_name, value);
            }
            renamed
        })
        .collect();

    let columns: Vec<String> = data
        .metadata
        .columns
        .iter()
        .map(|col| if col == old_name { new_name.to_string() } else { col.clone() })
        .collect();

    let types = columns
        .iter()
        .filter_map(|col| {
            let ty = match data.column_type(old_name) {
                Some(ty) if col == new_name => Some(ty),
                _ => data.column_type(col),
            };
            ty.map(|ty| (col.clone(), ty))
        })
        .collect();

    let mut metadata = Metadata::new(columns, types);
    metadata.timezone = data.metadata.timezone.clone();
    metadata.source = data.metadata.source.clone();
    ChartData::new(rows, metadata)
}

/// Sets `new_column` on every row to `calculate(row)`.
///
/// The column's type is inferred from the first row's computed value; a null
/// first value or an empty table records it as `string`.
pub fn add_calculated_column<F>(data: &ChartData, new_column: &str, calculate: F) -> ChartData
where
    F: Fn(&DataPoint) -> Value,
{
    let rows: Vec<DataPoint> = data
        .data
        .iter()
        .map(|point| point.clone().with(new_column, calculate(point)))
        .collect();

    let mut metadata = data.metadata.clone();
    if !metadata.has_column(new_column) {
        metadata.columns.push(new_column.to_string());
    }

    let column_type = rows
        .first()
        .and_then(|row| row.get(new_column))
        .and_then(|sample| match sample {
            // Computed text is taken literally, not sniffed for dates
            Value::Text(_) => Some(ColumnType::String),
            other => detect_value_type(other),
        })
        .unwrap_or(ColumnType::String);
    metadata.types.insert(new_column.to_string(), column_type);

    ChartData::new(rows, metadata)
}

/// At most the first `limit` rows
pub fn limit_data(data: &ChartData, limit: usize) -> ChartData {
    data.with_rows(data.data.iter().take(limit).cloned().collect())
}

/// Every row after the first `offset`
pub fn offset_data(data: &ChartData, offset: usize) -> ChartData {
    data.with_rows(data.data.iter().skip(offset).cloned().collect())
}

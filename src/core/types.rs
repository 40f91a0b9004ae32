use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono_tz::Tz;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::constants::{TIMESTAMP_KEY, TIMEZONE_KEY};
use super::value::Value;
use crate::error::{Error, Result};
use crate::time::date_utils::parse_date_in;

/// Semantic type recorded for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
    Date,
    Boolean,
}

impl ColumnType {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "string" | "text" => Ok(ColumnType::String),
            "number" | "numeric" => Ok(ColumnType::Number),
            "date" | "datetime" | "timestamp" => Ok(ColumnType::Date),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            _ => Err(Error::InvalidInput(format!("unknown column type: {}", s))),
        }
    }
}

/// One row: column name to value, in insertion order.
///
/// The keys `timestamp` and `timezone` are reserved for temporal identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DataPoint(IndexMap<String, Value>);

impl DataPoint {
    pub fn new() -> Self {
        DataPoint(IndexMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The value under `key` unless it is absent or null
    pub fn present(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts or overwrites in place. New keys go to the end.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes `key`, keeping the order of the remaining columns
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `timezone` label, when it is text
    pub fn timezone(&self) -> Option<&str> {
        self.0
            .get(TIMEZONE_KEY)
            .and_then(Value::as_str)
            .filter(|tz| !tz.is_empty())
    }

    /// Resolves the reserved `timestamp` key.
    ///
    /// Textual timestamps without an offset are read in the row's own zone.
    pub fn timestamp(&self) -> Option<DateTime<Tz>> {
        self.resolve_time(TIMESTAMP_KEY)
    }

    /// Resolves `key` as a timestamp, see [`DataPoint::timestamp`]
    pub fn resolve_time(&self, key: &str) -> Option<DateTime<Tz>> {
        match self.0.get(key)? {
            Value::Timestamp(ts) => Some(*ts),
            Value::Text(s) => {
                let zone = self
                    .timezone()
                    .and_then(|tz| tz.parse::<Tz>().ok())
                    .unwrap_or(chrono_tz::UTC);
                parse_date_in(s, zone)
            }
            _ => None,
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DataPoint {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        DataPoint(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for DataPoint {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DataPoint {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Column-level description of a [`ChartData`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub columns: Vec<String>,
    pub types: IndexMap<String, ColumnType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Metadata {
    pub fn new(columns: Vec<String>, types: IndexMap<String, ColumnType>) -> Self {
        Metadata {
            columns,
            types,
            timezone: None,
            source: None,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// The table every transform consumes and produces
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub data: Vec<DataPoint>,
    pub metadata: Metadata,
}

impl ChartData {
    pub fn new(data: Vec<DataPoint>, metadata: Metadata) -> Self {
        ChartData { data, metadata }
    }

    /// Zero rows, no columns
    pub fn empty() -> Self {
        ChartData::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.metadata.columns
    }

    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.metadata.types.get(column).copied()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.metadata.has_column(column)
    }

    /// Fails with [`Error::ColumnNotFound`] unless `column` is declared
    pub fn require_column(&self, column: &str, context: &str) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(Error::column_not_found(column, context))
        }
    }

    /// New table with `rows` and a copy of this table's metadata
    pub fn with_rows(&self, rows: Vec<DataPoint>) -> ChartData {
        ChartData {
            data: rows,
            metadata: self.metadata.clone(),
        }
    }
}

/// A row whose temporal identity is mandatory
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    pub timestamp: DateTime<Tz>,
    pub timezone: String,
    /// Every column except `timestamp` and `timezone`
    pub fields: DataPoint,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: DateTime<Tz>, timezone: impl Into<String>) -> Self {
        TimeSeriesPoint {
            timestamp,
            timezone: timezone.into(),
            fields: DataPoint::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != TIMESTAMP_KEY && key != TIMEZONE_KEY {
            self.fields.insert(key, value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Flattens back into a plain row, reserved keys first
    pub fn to_data_point(&self) -> DataPoint {
        let mut point = DataPoint::new()
            .with(TIMESTAMP_KEY, self.timestamp)
            .with(TIMEZONE_KEY, self.timezone.as_str());
        for (key, value) in self.fields.iter() {
            point.insert(key.clone(), value.clone());
        }
        point
    }
}

impl TryFrom<&DataPoint> for TimeSeriesPoint {
    type Error = Error;

    fn try_from(point: &DataPoint) -> Result<Self> {
        let timestamp = point.timestamp().ok_or_else(|| {
            Error::InvalidInput("time-series point requires a parseable timestamp".to_string())
        })?;
        let timezone = point
            .timezone()
            .ok_or_else(|| Error::InvalidInput("time-series point requires a timezone".to_string()))?
            .to_string();

        let fields = point
            .iter()
            .filter(|(key, _)| key.as_str() != TIMESTAMP_KEY && key.as_str() != TIMEZONE_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(TimeSeriesPoint {
            timestamp,
            timezone,
            fields,
        })
    }
}

impl From<&TimeSeriesPoint> for DataPoint {
    fn from(point: &TimeSeriesPoint) -> Self {
        point.to_data_point()
    }
}

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde_json::{Map, Value as JsonValue};

use crate::core::{ChartData, RowSchema};
use crate::data::formats::normalize_data;
use crate::error::{Error, Result};

/// JSON layout of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonOrient {
    /// `[{col1: val1, col2: val2}, ...]`
    #[default]
    Records,
    /// `{col1: [val1, val2, ...], col2: [...]}`
    Columns,
}

/// Reads a JSON file into a [`ChartData`], see [`read_json_value`]
pub fn read_json<P: AsRef<Path>>(path: P, schema: Option<&dyn RowSchema>) -> Result<ChartData> {
    let file = File::open(path.as_ref())?;
    let raw: JsonValue = serde_json::from_reader(BufReader::new(file))?;
    read_json_value(raw, schema)
}

/// Parses JSON text into a [`ChartData`], see [`read_json_value`]
pub fn read_json_str(text: &str, schema: Option<&dyn RowSchema>) -> Result<ChartData> {
    read_json_value(serde_json::from_str(text)?, schema)
}

/// Normalizes either JSON layout.
///
/// Column-oriented objects are turned into records first; shorter columns
/// leave their missing cells absent.
///
/// # Errors
///
/// [`Error::InvalidInput`] for scalars and for column objects whose values are
/// not arrays, plus anything [`normalize_data`] rejects.
pub fn read_json_value(raw: JsonValue, schema: Option<&dyn RowSchema>) -> Result<ChartData> {
    match raw {
        JsonValue::Array(_) => normalize_data(&raw, schema),
        JsonValue::Object(map) => normalize_data(&columns_to_records(map)?, schema),
        other => Err(Error::InvalidInput(format!(
            "expected an array of records or an object of columns, got {}",
            other
        ))),
    }
}

fn columns_to_records(map: Map<String, JsonValue>) -> Result<JsonValue> {
    let mut records: Vec<Map<String, JsonValue>> = Vec::new();

    for (key, value) in map {
        let JsonValue::Array(cells) = value else {
            return Err(Error::InvalidInput(format!("column '{}' must be an array", key)));
        };
        if records.len() < cells.len() {
            records.resize_with(cells.len(), Map::new);
        }
        for (record, cell) in records.iter_mut().zip(cells) {
            record.insert(key.clone(), cell);
        }
    }

    Ok(JsonValue::Array(records.into_iter().map(JsonValue::Object).collect()))
}

/// Rows as an array of objects; timestamps become RFC 3339 text
pub fn to_records_json(data: &ChartData) -> JsonValue {
    let records = data
        .data
        .iter()
        .map(|point| {
            let record: Map<String, JsonValue> = point
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect();
            JsonValue::Object(record)
        })
        .collect();
    JsonValue::Array(records)
}

/// One array per declared column; rows lacking a column contribute null
pub fn to_column_json(data: &ChartData) -> JsonValue {
    let columns = data
        .columns()
        .iter()
        .map(|column| {
            let values = data
                .data
                .iter()
                .map(|point| point.get(column).map(|v| v.to_json()).unwrap_or(JsonValue::Null))
                .collect();
            (column.clone(), JsonValue::Array(values))
        })
        .collect();
    JsonValue::Object(columns)
}

/// The whole table, metadata included, as pretty-printed JSON
pub fn to_json_string(data: &ChartData) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Writes the rows to `path` in the given layout
pub fn write_json<P: AsRef<Path>>(data: &ChartData, path: P, orient: JsonOrient) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);

    let json_value = match orient {
        JsonOrient::Records => to_records_json(data),
        JsonOrient::Columns => to_column_json(data),
    };
    serde_json::to_writer_pretty(writer, &json_value)?;
    Ok(())
}

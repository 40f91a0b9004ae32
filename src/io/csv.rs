use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, Writer};
use indexmap::IndexSet;

use crate::core::{ChartData, DataPoint, Value};
use crate::data::formats::{normalize_points, ColumnStrategy};
use crate::error::Result;

/// Reads a CSV file into a [`ChartData`], see [`read_csv_from`]
pub fn read_csv<P: AsRef<Path>>(path: P, has_header: bool) -> Result<ChartData> {
    let file = File::open(path.as_ref())?;
    read_csv_from(file, has_header)
}

/// Parses CSV text with a header row
pub fn read_csv_str(text: &str) -> Result<ChartData> {
    read_csv_from(text.as_bytes(), true)
}

/// Typed cell: numbers, `true`/`false`, empty as null, otherwise text
fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(n) = cell.parse::<f64>() {
        if n.is_finite() {
            return Value::Number(n);
        }
    }
    match cell {
        "true" | "TRUE" | "True" => Value::Bool(true),
        "false" | "FALSE" | "False" => Value::Bool(false),
        _ => Value::Text(cell.to_string()),
    }
}

/// Reads CSV records and normalizes them.
///
/// Without a header the columns are named `column_0`, `column_1`, ... Short
/// records leave their trailing cells absent. Columns keep header order.
pub fn read_csv_from<R: Read>(reader: R, has_header: bool) -> Result<ChartData> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for record in rdr.records() {
        records.push(record?);
    }

    let headers: Vec<String> = if has_header {
        rdr.headers()?.iter().map(str::to_string).collect()
    } else {
        let width = records.iter().map(|r| r.len()).max().unwrap_or(0);
        (0..width).map(|i| format!("column_{}", i)).collect()
    };

    let rows: Vec<DataPoint> = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .zip(record.iter())
                .map(|(header, cell)| (header.clone(), parse_cell(cell)))
                .collect()
        })
        .collect();

    let mut data = normalize_points(rows, ColumnStrategy::Union);
    let present: IndexSet<String> = data.metadata.columns.drain(..).collect();
    data.metadata.columns = headers.into_iter().filter(|h| present.contains(h)).collect();

    log::debug!("read {} CSV rows", data.len());
    Ok(data)
}

fn cell_text(value: Option<&Value>) -> String {
    value.map(Value::to_key_string).unwrap_or_default()
}

/// Writes the declared columns of every row; missing cells are empty
pub fn write_csv_to<W: Write>(data: &ChartData, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(data.columns())?;

    for point in &data.data {
        let row: Vec<String> = data.columns().iter().map(|col| cell_text(point.get(col))).collect();
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// CSV text for `data`, see [`write_csv_to`]
pub fn write_csv_string(data: &ChartData) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv_to(data, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| crate::error::Error::InvalidInput(e.to_string()))
}

pub fn write_csv<P: AsRef<Path>>(data: &ChartData, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_csv_to(data, file)
}

//! Long-to-wide reshaping

use indexmap::{IndexMap, IndexSet};

use crate::core::constants::PIVOT_VALUE_COLUMN;
use crate::core::{ChartData, ColumnType, DataPoint, Metadata, Value};

/// Builder for a pivot of one table.
///
/// One output row is produced per distinct value of the index column, in
/// first-seen order. Index values are matched by their text form, and each
/// output row carries the first-seen original index value. Each source row
/// contributes one cell, named after its value in the first pivot column (or
/// `value` when no pivot columns are given). A later row with the same index
/// and cell name overwrites the earlier one.
#[derive(Debug)]
pub struct PivotTable<'a> {
    data: &'a ChartData,
    index: String,
    values: String,
    columns: Option<Vec<String>>,
}

impl<'a> PivotTable<'a> {
    pub fn new(data: &'a ChartData, index: impl Into<String>, values: impl Into<String>) -> Self {
        PivotTable {
            data,
            index: index.into(),
            values: values.into(),
            columns: None,
        }
    }

    /// Names the output cells after these columns' values; only the first is read
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    fn cell_name(&self, point: &DataPoint) -> String {
        match &self.columns {
            Some(columns) => columns
                .first()
                .and_then(|column| point.get(column))
                .map(Value::to_key_string)
                .unwrap_or_default(),
            None => PIVOT_VALUE_COLUMN.to_string(),
        }
    }

    pub fn build(&self) -> ChartData {
        let mut pivot: IndexMap<String, (Option<Value>, IndexMap<String, Value>)> = IndexMap::new();

        for point in &self.data.data {
            let index_value = point.get(&self.index);
            let key = index_value.map(Value::to_key_string).unwrap_or_default();
            let cell = point.get(&self.values).cloned().unwrap_or(Value::Null);
            pivot
                .entry(key)
                .or_insert_with(|| (index_value.cloned(), IndexMap::new()))
                .1
                .insert(self.cell_name(point), cell);
        }

        let mut result_columns: IndexSet<String> = IndexSet::new();
        result_columns.insert(self.index.clone());

        let rows: Vec<DataPoint> = pivot
            .into_iter()
            .map(|(_, (index_value, cells))| {
                let mut row = DataPoint::new();
                if let Some(value) = index_value {
                    row.insert(self.index.clone(), value);
                }
                for (name, value) in cells {
                    result_columns.insert(name.clone());
                    row.insert(name, value);
                }
                row
            })
            .collect();

        let value_type = self.data.column_type(&self.values).unwrap_or(ColumnType::String);
        let types = result_columns
            .iter()
            .map(|column| {
                let ty = if *column == self.index {
                    self.data.column_type(&self.index).unwrap_or(ColumnType::String)
                } else {
                    value_type
                };
                (column.clone(), ty)
            })
            .collect();

        let mut metadata = Metadata::new(result_columns.into_iter().collect(), types);
        metadata.timezone = self.data.metadata.timezone.clone();
        metadata.source = self.data.metadata.source.clone();
        ChartData::new(rows, metadata)
    }
}

/// Pivots `data` on `index_column`, see [`PivotTable`]
pub fn pivot_data(data: &ChartData, index_column: &str, value_column: &str, columns: Option<&[String]>) -> ChartData {
    let table = PivotTable::new(data, index_column, value_column);
    match columns {
        Some(columns) => table.columns(columns.iter().cloned()).build(),
        None => table.build(),
    }
}

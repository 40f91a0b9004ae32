//! Reading and writing [`ChartData`](crate::core::ChartData) as JSON and CSV

pub mod csv;
pub mod json;

// Re-export commonly used functions
pub use csv::{read_csv, read_csv_from, read_csv_str, write_csv, write_csv_string, write_csv_to};
pub use json::{
    read_json, read_json_str, read_json_value, to_column_json, to_json_string, to_records_json,
    write_json, JsonOrient,
};

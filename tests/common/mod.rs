//! Common test utilities module
//!
//! Provides shared utilities for tests including:
//! - Temporary file management
//! - Sample datasets

#![allow(dead_code)]

pub mod test_utils;

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use datacn::{normalize_data, ChartData};
use serde_json::{json, Value as JsonValue};

pub use test_utils::{get_temp_dir, test_temp_path, TempTestFile};

/// Midnight UTC on the given day
pub fn utc_day(year: i32, month: u32, day: u32) -> DateTime<Tz> {
    chrono_tz::UTC
        .with_ymd_and_hms(year, month, day, 0, 0, 0)
        .unwrap()
}

/// Six sales records over two regions and three months of 2024
pub fn sales_records() -> JsonValue {
    json!([
        { "timestamp": "2024-01-05T10:00:00Z", "region": "north", "product": "a", "sales": 100 },
        { "timestamp": "2024-01-20T12:00:00Z", "region": "south", "product": "b", "sales": 50 },
        { "timestamp": "2024-02-03T08:30:00Z", "region": "north", "product": "a", "sales": 80 },
        { "timestamp": "2024-02-14T18:00:00Z", "region": "north", "product": "b", "sales": 20 },
        { "timestamp": "2024-03-01T00:00:00Z", "region": "south", "product": "a", "sales": 70 },
        { "timestamp": "2024-03-31T23:59:59Z", "region": "south", "product": "b", "sales": 30 }
    ])
}

pub fn sales_data() -> ChartData {
    normalize_data(&sales_records(), None).unwrap()
}

/// `(timestamp, value)` rows normalized under the `value` column
pub fn series_data(points: &[(&str, f64)]) -> ChartData {
    let rows: Vec<JsonValue> = points
        .iter()
        .map(|(ts, value)| json!({ "timestamp": ts, "value": value }))
        .collect();
    normalize_data(&JsonValue::Array(rows), None).unwrap()
}

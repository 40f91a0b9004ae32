//! Date parsing, calendar granularities, timezone handling and time-series helpers

pub mod date_utils;
pub mod granularity;
pub mod series;
pub mod timezone;

pub use date_utils::{
    extract_timestamp, format_date_string, is_date_value, parse_date, parse_date_in,
    parse_date_str,
};
pub use granularity::Granularity;
pub use series::{
    align_time_series, extract_time_range, fill_time_series_gaps, filter_time_range,
    resample_time_series, TimeRange,
};
pub use timezone::{
    detect_timezone, format_with_timezone, get_timezone_offset, normalize_timezone,
    parse_timezone,
};

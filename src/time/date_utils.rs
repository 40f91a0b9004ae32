use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use chrono_tz::Tz;

use crate::core::constants::TIMESTAMP_KEY;
use crate::core::{DataPoint, Value};

/// Formats that carry their own UTC offset
const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

/// Wall-clock formats, read in the caller's zone
const NAIVE_DATE_TIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const NAIVE_DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Resolves a value into a timestamp.
///
/// Timestamps pass through, text is parsed (see [`parse_date_str`]), anything
/// else (including empty text) yields `None`.
pub fn parse_date(value: &Value) -> Option<DateTime<Tz>> {
    match value {
        Value::Timestamp(ts) => Some(*ts),
        Value::Text(s) => parse_date_str(s),
        _ => None,
    }
}

/// Parses a date string, reading offset-less wall-clock times as UTC
pub fn parse_date_str(s: &str) -> Option<DateTime<Tz>> {
    parse_date_in(s, chrono_tz::UTC)
}

/// Parses a date string.
///
/// Strings with an explicit offset are exact instants; strings without one
/// are wall-clock times in `zone`. The result is expressed in `zone`.
pub fn parse_date_in(s: &str, zone: Tz) -> Option<DateTime<Tz>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&zone));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&zone));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&zone));
        }
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return localize(zone, naive);
        }
    }

    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return localize(zone, date.and_hms_opt(0, 0, 0)?);
        }
    }

    // "2024-03" is the first of the month
    if s.len() == 7 && s.as_bytes()[4] == b'-' {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d") {
            return localize(zone, date.and_hms_opt(0, 0, 0)?);
        }
    }

    None
}

/// Maps a wall-clock time in `zone` to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// DST gap move forward by the gap.
pub fn localize(zone: Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    if let Some(dt) = zone.from_local_datetime(&naive).earliest() {
        return Some(dt);
    }
    // Gaps are at most an hour in practice
    zone.from_local_datetime(&(naive + Duration::hours(1)))
        .earliest()
}

/// Whether `value` is a timestamp or text that parses as one
pub fn is_date_value(value: &Value) -> bool {
    match value {
        Value::Timestamp(_) => true,
        Value::Text(s) => parse_date_str(s).is_some(),
        _ => false,
    }
}

/// Finds a row's instant: the reserved key first, then the first column whose
/// name mentions a timestamp, date or time and holds a date value.
pub fn extract_timestamp(point: &DataPoint) -> Option<DateTime<Tz>> {
    if point.present(TIMESTAMP_KEY).is_some() {
        return point.timestamp();
    }

    for (key, value) in point.iter() {
        let lower = key.to_lowercase();
        let temporal =
            lower.contains("timestamp") || lower.contains("date") || lower.contains("time");
        if temporal && is_date_value(value) {
            return point.resolve_time(key);
        }
    }

    None
}

/// Renders `date` with the tokens `YYYY`, `MM`, `DD`, `HH`, `mm` and `ss`.
///
/// Each token is replaced once, in its zone's wall-clock time.
pub fn format_date_string(date: &DateTime<Tz>, pattern: &str) -> String {
    pattern
        .replacen("YYYY", &date.year().to_string(), 1)
        .replacen("MM", &format!("{:02}", date.month()), 1)
        .replacen("DD", &format!("{:02}", date.day()), 1)
        .replacen("HH", &format!("{:02}", date.hour()), 1)
        .replacen("mm", &format!("{:02}", date.minute()), 1)
        .replacen("ss", &format!("{:02}", date.second()), 1)
}

use chrono::{DateTime, Utc};

use crate::core::constants::{DEFAULT_DATE_FORMAT, DEFAULT_DATE_TIME_FORMAT, DEFAULT_TIME_FORMAT};
use crate::core::Value;
use crate::time::{format_with_timezone, parse_date};

/// Formats a date-like value with a strftime `pattern`.
///
/// With `timezone` the wall clock of that zone is used, otherwise the zone the
/// timestamp carries. Values that are not dates give `""`; formatting problems
/// fall back as described for [`format_with_timezone`].
pub fn format_date(value: &Value, pattern: &str, timezone: Option<&str>) -> String {
    let Some(date) = parse_date(value) else {
        return String::new();
    };
    let zone = timezone.unwrap_or_else(|| date.timezone().name());
    format_with_timezone(&date, zone, pattern).into_value()
}

pub fn format_date_time(value: &Value, timezone: Option<&str>) -> String {
    format_date(value, DEFAULT_DATE_TIME_FORMAT, timezone)
}

pub fn format_time(value: &Value, timezone: Option<&str>) -> String {
    format_date(value, DEFAULT_TIME_FORMAT, timezone)
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{} {} ago", n, unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Describes how long before `now` the value lies.
///
/// Under a minute is "just now", then whole minutes, hours and days up to a
/// week; anything older is written as a plain date. Future values are
/// "just now".
pub fn format_relative_time(value: &Value, now: DateTime<Utc>) -> String {
    let Some(date) = parse_date(value) else {
        return String::new();
    };

    let seconds = (now.timestamp_millis() - date.timestamp_millis()).div_euclid(1000);
    let minutes = seconds.div_euclid(60);
    let hours = minutes.div_euclid(60);
    let days = hours.div_euclid(24);

    if seconds < 60 {
        "just now".to_string()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days < 7 {
        plural(days, "day")
    } else {
        format_date(&Value::Timestamp(date), DEFAULT_DATE_FORMAT, None)
    }
}

/// [`format_relative_time`] against the system clock
pub fn format_relative_time_now(value: &Value) -> String {
    format_relative_time(value, Utc::now())
}

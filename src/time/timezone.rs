//! Zone conversion and zone-aware formatting.
//!
//! Every conversion goes through `chrono_tz`, so UTC and GMT are ordinary
//! zones here. Conversion and formatting problems never fail the call: the
//! caller gets the best available value plus a [`Warning`].

use std::fmt::Write as _;

use chrono::{DateTime, Offset, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

use super::date_utils::localize;
use crate::core::DataPoint;
use crate::error::{Error, Outcome, Result, Warning, WarningKind};

/// Resolves an IANA zone name
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| Error::UnknownTimezone(name.to_string()))
}

/// Re-expresses `date`'s wall-clock time, read in `from_tz`, in `to_tz`.
///
/// Returns `date` unchanged when the zones are equal. Unknown zones and
/// wall-clock times that do not exist in `from_tz` leave `date` unconverted
/// and produce a warning.
pub fn normalize_timezone(date: &DateTime<Tz>, from_tz: &str, to_tz: &str) -> Outcome<DateTime<Tz>> {
    if from_tz == to_tz {
        return Outcome::clean(*date);
    }

    let zones = parse_timezone(from_tz).and_then(|from| Ok((from, parse_timezone(to_tz)?)));
    let (from, to) = match zones {
        Ok(zones) => zones,
        Err(e) => {
            return Outcome::degraded(
                *date,
                Warning::new(
                    WarningKind::TimezoneConversion,
                    format!("timezone conversion failed: {}; returning original date", e),
                ),
            )
        }
    };

    match localize(from, date.naive_local()) {
        Some(local) => Outcome::clean(local.with_timezone(&to)),
        None => Outcome::degraded(
            *date,
            Warning::new(
                WarningKind::TimezoneConversion,
                format!(
                    "timezone conversion failed: {} does not exist in {}; returning original date",
                    date.naive_local(),
                    from_tz
                ),
            ),
        ),
    }
}

/// First `timezone` label found scanning rows in order
pub fn detect_timezone(points: &[DataPoint]) -> Option<String> {
    points
        .iter()
        .find_map(|point| point.timezone())
        .map(str::to_string)
}

fn try_format(date: &DateTime<Tz>, pattern: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(pattern)).ok()?;
    Some(out)
}

/// Formats `date` in `tz` using a strftime `pattern`.
///
/// Falls back to formatting in the date's own zone when `tz` is unknown, and
/// to an RFC 3339 UTC string when the pattern itself is invalid.
pub fn format_with_timezone(date: &DateTime<Tz>, tz: &str, pattern: &str) -> Outcome<String> {
    let mut warnings = Vec::new();

    match parse_timezone(tz) {
        Ok(zone) => {
            if let Some(formatted) = try_format(&date.with_timezone(&zone), pattern) {
                return Outcome::clean(formatted);
            }
            warnings.push(
                Warning::new(
                    WarningKind::DateFormat,
                    format!("invalid format pattern '{}' for zone {}", pattern, tz),
                )
                .logged(),
            );
        }
        Err(e) => warnings.push(Warning::new(WarningKind::UnknownTimezone, e.to_string()).logged()),
    }

    if let Some(formatted) = try_format(date, pattern) {
        return Outcome {
            value: formatted,
            warnings,
        };
    }

    warnings.push(
        Warning::new(
            WarningKind::DateFormat,
            format!("cannot format with '{}'; using ISO 8601", pattern),
        )
        .logged(),
    );
    Outcome {
        value: date
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        warnings,
    }
}

/// Milliseconds between `tz`'s local time and UTC at the instant `date`
pub fn get_timezone_offset(date: &DateTime<Tz>, tz: &str) -> Outcome<i64> {
    match parse_timezone(tz) {
        Ok(zone) => {
            let offset = zone.offset_from_utc_datetime(&date.naive_utc()).fix();
            Outcome::clean(offset.local_minus_utc() as i64 * 1000)
        }
        Err(e) => Outcome::degraded(0, Warning::new(WarningKind::UnknownTimezone, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn same_zone_is_identity() {
        let date = chrono_tz::UTC.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let out = normalize_timezone(&date, "Europe/Paris", "Europe/Paris");
        assert!(out.is_clean());
        assert_eq!(out.value, date);
        assert_eq!(out.value.timezone(), chrono_tz::UTC);
    }

    #[test]
    fn converts_wall_clock_between_zones() {
        let ny = chrono_tz::America::New_York;
        let date = ny.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap();
        let out = normalize_timezone(&date, "America/New_York", "UTC");
        assert!(out.is_clean());
        assert_eq!(out.value.hour(), 13);
        assert_eq!(out.value, date);
    }

    #[test]
    fn unknown_zone_fails_soft() {
        let date = chrono_tz::UTC.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let out = normalize_timezone(&date, "UTC", "Mars/Olympus");
        assert_eq!(out.value, date);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].kind, WarningKind::TimezoneConversion);
    }
}

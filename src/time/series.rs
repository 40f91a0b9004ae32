use chrono::DateTime;
use chrono_tz::Tz;

use super::granularity::Granularity;
use super::timezone::normalize_timezone;
use crate::core::constants::DEFAULT_TIMEZONE;
use crate::core::{ChartData, DataPoint, TimeSeriesPoint, Value};
use crate::data::aggregate::bin_by_time;
use crate::error::Outcome;

/// Earliest and latest instants of a series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: Option<DateTime<Tz>>,
    pub end: Option<DateTime<Tz>>,
}

fn zone_label(point: &TimeSeriesPoint) -> &str {
    if point.timezone.is_empty() {
        DEFAULT_TIMEZONE
    } else {
        &point.timezone
    }
}

/// Re-expresses every point in `target_timezone`, keeping all other fields.
///
/// Points whose conversion fails keep their timestamp but are still labelled
/// with the target zone; the returned warnings say which.
pub fn align_time_series(series: &[TimeSeriesPoint], target_timezone: &str) -> Outcome<Vec<TimeSeriesPoint>> {
    let mut warnings = Vec::new();
    let aligned = series
        .iter()
        .map(|point| {
            let timestamp = normalize_timezone(&point.timestamp, zone_label(point), target_timezone)
                .drain_into(&mut warnings);
            TimeSeriesPoint {
                timestamp,
                timezone: target_timezone.to_string(),
                fields: point.fields.clone(),
            }
        })
        .collect();

    Outcome {
        value: aligned,
        warnings,
    }
}

fn sorted_by_time(series: &[TimeSeriesPoint]) -> Vec<TimeSeriesPoint> {
    let mut sorted = series.to_vec();
    sorted.sort_by_key(|point| point.timestamp);
    sorted
}

fn gap_point(current: &TimeSeriesPoint, timestamp: DateTime<Tz>, timezone: &str, fill_value: Option<f64>) -> TimeSeriesPoint {
    let fields: DataPoint = current
        .fields
        .iter()
        .map(|(key, value)| {
            let filled = if value.is_number() {
                Value::from(fill_value)
            } else {
                value.clone()
            };
            (key.clone(), filled)
        })
        .collect();

    TimeSeriesPoint {
        timestamp,
        timezone: timezone.to_string(),
        fields,
    }
}

/// Inserts synthetic points wherever consecutive points are more than one
/// `granularity` step apart.
///
/// Synthetic points carry `fill_value` (null when `None`) in every numeric
/// field and copy the other fields from the preceding real point.
pub fn fill_time_series_gaps(
    series: &[TimeSeriesPoint],
    granularity: Granularity,
    fill_value: Option<f64>,
) -> Vec<TimeSeriesPoint> {
    if series.is_empty() {
        return Vec::new();
    }

    let sorted = sorted_by_time(series);
    let timezone = zone_label(&sorted[0]).to_string();
    let mut filled = Vec::with_capacity(sorted.len());

    for pair in sorted.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        filled.push(current.clone());

        let gap = granularity.count(&current.timestamp, &next.timestamp);
        for step in 1..gap {
            let timestamp = granularity.offset(&current.timestamp, step);
            filled.push(gap_point(current, timestamp, &timezone, fill_value));
        }
    }

    if let Some(last) = sorted.last() {
        filled.push(last.clone());
    }
    filled
}

pub fn extract_time_range(series: &[TimeSeriesPoint]) -> TimeRange {
    TimeRange {
        start: series.iter().map(|p| p.timestamp).min(),
        end: series.iter().map(|p| p.timestamp).max(),
    }
}

/// Points with `start <= timestamp <= end`
pub fn filter_time_range(series: &[TimeSeriesPoint], start: &DateTime<Tz>, end: &DateTime<Tz>) -> Vec<TimeSeriesPoint> {
    series
        .iter()
        .filter(|point| point.timestamp >= *start && point.timestamp <= *end)
        .cloned()
        .collect()
}

/// Averages numeric fields per `granularity` bucket, see [`bin_by_time`]
pub fn resample_time_series(series: &[TimeSeriesPoint], granularity: Granularity) -> ChartData {
    bin_by_time(series, granularity)
}

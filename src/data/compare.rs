//! Period comparisons: year-over-year, month-over-month and index-lagged
//! period-over-period, plus a scalar growth rate.
//!
//! Every comparison sorts rows by their `timestamp` and appends three numeric
//! columns to each row it keeps: `{field}_previous`, `{field}_change` and
//! `{field}_changePercent`. Non-numeric field values count as 0.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike};
use chrono_tz::Tz;

use crate::core::{ChartData, ColumnType, ComparisonConfig, ComparisonType, DataPoint, Metadata};
use crate::error::Result;
use crate::time::Granularity;

/// Rows ordered by timestamp; rows without a readable timestamp go first
fn sorted_by_timestamp(data: &ChartData) -> Vec<(Option<DateTime<Tz>>, &DataPoint)> {
    let mut sorted: Vec<_> = data.data.iter().map(|point| (point.timestamp(), point)).collect();
    sorted.sort_by_key(|(time, _)| *time);
    sorted
}

fn field_value(point: &DataPoint, field: &str) -> f64 {
    point.number(field).unwrap_or(0.0)
}

fn derived_columns(field: &str) -> [String; 3] {
    [
        format!("{}_previous", field),
        format!("{}_change", field),
        format!("{}_changePercent", field),
    ]
}

/// `current` with the three derived columns appended
fn compared_row(current: &DataPoint, field: &str, previous_value: f64) -> DataPoint {
    let current_value = field_value(current, field);
    let change = current_value - previous_value;
    let change_percent = if previous_value != 0.0 {
        change / previous_value * 100.0
    } else {
        0.0
    };

    let [previous_col, change_col, percent_col] = derived_columns(field);
    current
        .clone()
        .with(previous_col, previous_value)
        .with(change_col, change)
        .with(percent_col, change_percent)
}

fn compared_metadata(metadata: &Metadata, field: &str) -> Metadata {
    let mut out = metadata.clone();
    for column in derived_columns(field) {
        if !out.has_column(&column) {
            out.columns.push(column.clone());
        }
        out.types.insert(column, ColumnType::Number);
    }
    out
}

/// Runs the comparison named by `config.comparison_type` on `config.base_field`.
///
/// # Errors
///
/// [`Error::ColumnNotFound`](crate::error::Error::ColumnNotFound) when the base
/// field is not a declared column. This is checked before anything else, so an
/// empty table without columns fails too.
pub fn compare_periods(data: &ChartData, config: &ComparisonConfig) -> Result<ChartData> {
    let field = config.base_field.as_str();
    data.require_column(field, "comparison base field")?;

    let result = match config.comparison_type {
        ComparisonType::YearOverYear => year_over_year(data, field),
        ComparisonType::MonthOverMonth => month_over_month(data, field),
        ComparisonType::PeriodOverPeriod => period_over_period(data, field, config.period),
    };
    log::debug!(
        "{} comparison of '{}' kept {} of {} rows",
        config.comparison_type,
        field,
        result.len(),
        data.len()
    );
    Ok(result)
}

/// Matches each row with the previous calendar year's row on the same month and day.
///
/// Rows are grouped by year and each year is compared with the nearest earlier
/// year present. The match date is one year before the row's date, so Feb 29
/// looks for Feb 28. Rows without a match are dropped. Tables spanning fewer
/// than two years are returned unchanged.
pub fn year_over_year(data: &ChartData, field: &str) -> ChartData {
    if data.is_empty() {
        return data.clone();
    }

    let mut years: BTreeMap<i32, Vec<(DateTime<Tz>, &DataPoint)>> = BTreeMap::new();
    for (time, point) in sorted_by_timestamp(data) {
        if let Some(time) = time {
            years.entry(time.year()).or_default().push((time, point));
        }
    }
    if years.len() < 2 {
        return data.clone();
    }

    let buckets: Vec<_> = years.values().collect();
    let mut rows = Vec::new();
    for pair in buckets.windows(2) {
        let (previous_year, current_year) = (pair[0], pair[1]);
        for (time, current) in current_year {
            let target = Granularity::Year.offset(time, -1);
            let matched = previous_year
                .iter()
                .find(|(t, _)| t.month() == target.month() && t.day() == target.day());
            if let Some((_, previous)) = matched {
                rows.push(compared_row(current, field, field_value(previous, field)));
            }
        }
    }

    ChartData::new(rows, compared_metadata(&data.metadata, field))
}

/// Compares consecutive rows that are exactly one calendar month apart.
///
/// Pairs further apart, or closer, are skipped.
pub fn month_over_month(data: &ChartData, field: &str) -> ChartData {
    if data.is_empty() {
        return data.clone();
    }

    let sorted = sorted_by_timestamp(data);
    let rows = sorted
        .windows(2)
        .filter_map(|pair| {
            let (previous_time, previous) = pair[0];
            let (current_time, current) = pair[1];
            let (previous_time, current_time) = (previous_time?, current_time?);

            let month_diff = (current_time.year() - previous_time.year()) * 12
                + current_time.month() as i32
                - previous_time.month() as i32;
            (month_diff == 1).then(|| compared_row(current, field, field_value(previous, field)))
        })
        .collect();

    ChartData::new(rows, compared_metadata(&data.metadata, field))
}

/// Compares row `i` with row `i - period` of the sorted table (index lag).
pub fn period_over_period(data: &ChartData, field: &str, period: usize) -> ChartData {
    if data.is_empty() {
        return data.clone();
    }

    let sorted = sorted_by_timestamp(data);
    let rows = (period..sorted.len())
        .map(|i| {
            let previous = sorted[i - period].1;
            compared_row(sorted[i].1, field, field_value(previous, field))
        })
        .collect();

    ChartData::new(rows, compared_metadata(&data.metadata, field))
}

/// Percent change between the latest row and the row `period` positions before it.
///
/// The earlier index is clamped to the first row. Returns 0 for fewer than two
/// rows. A zero baseline yields 100 when the latest value is positive, else 0.
pub fn calculate_growth_rate(data: &ChartData, field: &str, period: usize) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }

    let sorted = sorted_by_timestamp(data);
    let last = sorted.len() - 1;
    let current = field_value(sorted[last].1, field);
    let previous = field_value(sorted[last.saturating_sub(period)].1, field);

    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    (current - previous) / previous * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly(points: &[(&str, f64)]) -> ChartData {
        let rows: Vec<DataPoint> = points
            .iter()
            .map(|(ts, v)| DataPoint::new().with("timestamp", *ts).with("sales", *v))
            .collect();
        crate::data::formats::normalize_points(rows, Default::default())
    }

    #[test]
    fn month_diff_must_be_exactly_one() {
        let data = monthly(&[("2024-01-15", 10.0), ("2024-02-15", 20.0), ("2024-04-15", 5.0)]);
        let out = month_over_month(&data, "sales");
        assert_eq!(out.len(), 1);
        assert_eq!(out.data[0].number("sales_previous"), Some(10.0));
        assert_eq!(out.data[0].number("sales_changePercent"), Some(100.0));
    }

    #[test]
    fn derived_columns_are_not_duplicated() {
        let data = monthly(&[("2024-01-01", 1.0), ("2024-02-01", 2.0)]);
        let once = period_over_period(&data, "sales", 1);
        let twice = period_over_period(&once, "sales", 1);
        assert_eq!(once.columns().len(), twice.columns().len());
    }
}

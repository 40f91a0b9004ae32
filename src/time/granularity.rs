use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::date_utils::localize;
use crate::error::{Error, Result};

/// Calendar unit used for time bucketing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    Day,
    /// Weeks start on Sunday
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub fn name(&self) -> &'static str {
        match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
        }
    }

    /// Approximate length in seconds; months and years are nominal
    pub fn to_seconds(&self) -> i64 {
        match self {
            Granularity::Hour => 3600,
            Granularity::Day => 86400,
            Granularity::Week => 604800,
            Granularity::Month => 2592000,   // 30 days
            Granularity::Quarter => 7776000, // 90 days
            Granularity::Year => 31536000,   // 365 days
        }
    }

    /// Start of the bucket containing `date`, in `date`'s own zone
    pub fn floor(&self, date: &DateTime<Tz>) -> DateTime<Tz> {
        let day = date.date_naive();
        let start = match self {
            Granularity::Hour => {
                return *date
                    - Duration::minutes(date.minute() as i64)
                    - Duration::seconds(date.second() as i64)
                    - Duration::nanoseconds(date.nanosecond() as i64);
            }
            Granularity::Day => Some(day),
            Granularity::Week => {
                Some(day - Duration::days(day.weekday().num_days_from_sunday() as i64))
            }
            Granularity::Month => NaiveDate::from_ymd_opt(day.year(), day.month(), 1),
            Granularity::Quarter => {
                NaiveDate::from_ymd_opt(day.year(), ((day.month() - 1) / 3) * 3 + 1, 1)
            }
            Granularity::Year => NaiveDate::from_ymd_opt(day.year(), 1, 1),
        };

        start
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .and_then(|naive| localize(date.timezone(), naive))
            .unwrap_or(*date)
    }

    /// Moves `date` by `steps` units, keeping its wall-clock time.
    ///
    /// Month arithmetic clamps to the last day of shorter months.
    pub fn offset(&self, date: &DateTime<Tz>, steps: i64) -> DateTime<Tz> {
        let naive = date.naive_local();
        let shifted = match self {
            Granularity::Hour => return *date + Duration::hours(steps),
            Granularity::Day => Some(naive + Duration::days(steps)),
            Granularity::Week => Some(naive + Duration::weeks(steps)),
            Granularity::Month => shift_months(naive, steps),
            Granularity::Quarter => shift_months(naive, steps * 3),
            Granularity::Year => shift_months(naive, steps * 12),
        };

        shifted
            .and_then(|naive| localize(date.timezone(), naive))
            .unwrap_or_else(|| *date + Duration::seconds(self.to_seconds() * steps))
    }

    /// Number of whole units from `start` to `end`.
    ///
    /// Hours, days and weeks count elapsed time; months, quarters and years
    /// count calendar boundaries in `start`'s zone.
    pub fn count(&self, start: &DateTime<Tz>, end: &DateTime<Tz>) -> i64 {
        let elapsed_ms = (*end - *start).num_milliseconds();
        let end = end.with_timezone(&start.timezone());
        let years = end.year() as i64 - start.year() as i64;

        match self {
            Granularity::Hour => elapsed_ms.div_euclid(3_600_000),
            Granularity::Day => elapsed_ms.div_euclid(86_400_000),
            Granularity::Week => elapsed_ms.div_euclid(604_800_000),
            Granularity::Month => years * 12 + (end.month() as i64 - start.month() as i64),
            Granularity::Quarter => {
                let start_quarter = (start.month0() / 3) as i64;
                let end_quarter = (end.month0() / 3) as i64;
                years * 4 + (end_quarter - start_quarter)
            }
            Granularity::Year => years,
        }
    }
}

fn shift_months(naive: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let amount = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        naive.checked_add_months(amount)
    } else {
        naive.checked_sub_months(amount)
    }
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "H" | "HOUR" | "HOURS" | "HOURLY" => Ok(Granularity::Hour),
            "D" | "DAY" | "DAYS" | "DAILY" => Ok(Granularity::Day),
            "W" | "WEEK" | "WEEKS" | "WEEKLY" => Ok(Granularity::Week),
            "M" | "MONTH" | "MONTHS" | "MONTHLY" => Ok(Granularity::Month),
            "Q" | "QUARTER" | "QUARTERS" | "QUARTERLY" => Ok(Granularity::Quarter),
            "Y" | "YEAR" | "YEARS" | "A" | "ANNUAL" | "ANNUALLY" | "YEARLY" => {
                Ok(Granularity::Year)
            }
            _ => Err(Error::UnknownGranularity(s.to_string())),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

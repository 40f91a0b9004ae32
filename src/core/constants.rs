/// Reserved key holding a row's instant
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Reserved key holding a row's IANA zone label
pub const TIMEZONE_KEY: &str = "timezone";

pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Number of leading rows examined by column type inference
pub const TYPE_SAMPLE_SIZE: usize = 10;

/// Column used by pivots without explicit pivot columns
pub const PIVOT_VALUE_COLUMN: &str = "value";

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

pub const TIME_GRANULARITIES: [&str; 6] = ["hour", "day", "week", "month", "quarter", "year"];

pub const AGGREGATION_OPERATIONS: [&str; 6] = ["sum", "avg", "count", "min", "max", "median"];

pub const CHART_TYPES: [&str; 5] = ["bar", "line", "area", "pie", "time-series"];

//! Chart data preparation.
//!
//! Raw records are normalized into a typed [`ChartData`] table, then reshaped
//! for charts: aggregated over groups and calendar buckets, compared across
//! periods, joined, pivoted, resampled and re-expressed in other time zones.
//!
//! ```
//! use datacn::{aggregate, normalize_data, AggregationConfig, Operation};
//! use serde_json::json;
//!
//! let raw = json!([{ "x": 1 }, { "x": 2 }, { "x": 3 }]);
//! let data = normalize_data(&raw, None).unwrap();
//! let total = aggregate(&data, &AggregationConfig::new("x", Operation::Sum)).unwrap();
//! assert_eq!(total.data[0].number("x"), Some(6.0));
//! ```

pub mod core;
pub mod data;
pub mod error;
pub mod format;
pub mod io;
pub mod pipeline;
pub mod time;

// Re-export commonly used types
pub use crate::core::{
    AggregationConfig, ChartData, ChartType, ColumnType, ComparisonConfig, ComparisonType,
    DataPoint, JoinConfig, JoinKind, Metadata, Operation, RowSchema, TimeSeriesPoint, Value,
};
pub use data::{
    aggregate, compare_periods, join_data, normalize_data, pivot_data, sort_data,
    validate_chart_data, SortDirection,
};
pub use error::{Error, Outcome, Result, Warning, WarningKind};
pub use pipeline::{prepare_chart_data, try_prepare_chart_data, ChartDataOptions, PreparedChartData};
pub use time::Granularity;

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

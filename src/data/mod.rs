//! Table operations: normalization, aggregation, comparison, joins and transforms

pub mod aggregate;
pub mod compare;
pub mod formats;
pub mod join;
pub mod pivot;
pub mod transform;

pub use aggregate::{aggregate, bin_by_time, calculate_operation, group_by};
pub use compare::{
    calculate_growth_rate, compare_periods, month_over_month, period_over_period, year_over_year,
};
pub use formats::{
    check_chart_data, detect_column_types, detect_value_type, merge_data_sources, normalize_data,
    normalize_data_with, normalize_points, validate_chart_data, ColumnStrategy,
};
pub use join::{join_data, merge_time_series};
pub use pivot::{pivot_data, PivotTable};
pub use transform::{
    add_calculated_column, filter_data, limit_data, offset_data, rename_column, select_columns,
    sort_data, SortDirection,
};

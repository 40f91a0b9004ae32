//! Core data model: cell values, rows, tables and operation configs

pub mod config;
pub mod constants;
pub mod schema;
pub mod types;
pub mod value;

pub use config::{
    AggregationConfig, ChartType, ComparisonConfig, ComparisonType, JoinConfig, JoinKind,
    Operation,
};
pub use schema::{DataPointSchema, FieldKind, FieldRule, RecordSchema, RowSchema, TimeSeriesSchema};
pub use types::{ChartData, ColumnType, DataPoint, Metadata, TimeSeriesPoint};
pub use value::Value;

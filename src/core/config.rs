use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::time::Granularity;

/// Reducer applied to a numeric column within a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Sum,
    Avg,
    Count,
    Min,
    Max,
    Median,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Sum => "sum",
            Operation::Avg => "avg",
            Operation::Count => "count",
            Operation::Min => "min",
            Operation::Max => "max",
            Operation::Median => "median",
        }
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(Operation::Sum),
            "avg" | "mean" | "average" => Ok(Operation::Avg),
            "count" => Ok(Operation::Count),
            "min" | "minimum" => Ok(Operation::Min),
            "max" | "maximum" => Ok(Operation::Max),
            "median" => Ok(Operation::Median),
            _ => Err(Error::UnknownOperation(s.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What to reduce and how to partition it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationConfig {
    pub field: String,
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_granularity: Option<Granularity>,
}

impl AggregationConfig {
    pub fn new(field: impl Into<String>, operation: Operation) -> Self {
        AggregationConfig {
            field: field.into(),
            operation,
            group_by: None,
            time_granularity: None,
        }
    }

    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn time_granularity(mut self, granularity: Granularity) -> Self {
        self.time_granularity = Some(granularity);
        self
    }
}

/// Kind of period comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonType {
    PeriodOverPeriod,
    YearOverYear,
    MonthOverMonth,
}

impl ComparisonType {
    pub fn name(&self) -> &'static str {
        match self {
            ComparisonType::PeriodOverPeriod => "period-over-period",
            ComparisonType::YearOverYear => "year-over-year",
            ComparisonType::MonthOverMonth => "month-over-month",
        }
    }
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComparisonType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "period-over-period" | "pop" => Ok(ComparisonType::PeriodOverPeriod),
            "year-over-year" | "yoy" => Ok(ComparisonType::YearOverYear),
            "month-over-month" | "mom" => Ok(ComparisonType::MonthOverMonth),
            _ => Err(Error::UnknownComparison(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonConfig {
    #[serde(rename = "type")]
    pub comparison_type: ComparisonType,
    pub base_field: String,
    /// Carried for callers; no comparison reads it
    #[serde(default)]
    pub comparison_field: String,
    /// Row lag used by period-over-period
    #[serde(default = "default_period")]
    pub period: usize,
}

fn default_period() -> usize {
    1
}

impl ComparisonConfig {
    pub fn new(comparison_type: ComparisonType, base_field: impl Into<String>) -> Self {
        ComparisonConfig {
            comparison_type,
            base_field: base_field.into(),
            comparison_field: String::new(),
            period: default_period(),
        }
    }

    pub fn period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }
}

/// Join kind.
///
/// Every kind runs the same matching pass; the kind only decides whether
/// unmatched rows from either side are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    /// Matched rows only
    Inner,
    /// Matched rows plus unmatched left rows
    Left,
    /// Matched rows plus unmatched right rows
    Right,
    /// Matched rows plus unmatched rows of both sides
    Full,
}

impl JoinKind {
    pub fn emit_unmatched_left(&self) -> bool {
        matches!(self, JoinKind::Left | JoinKind::Full)
    }

    pub fn emit_unmatched_right(&self) -> bool {
        matches!(self, JoinKind::Right | JoinKind::Full)
    }
}

impl FromStr for JoinKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "inner" => Ok(JoinKind::Inner),
            "left" => Ok(JoinKind::Left),
            "right" => Ok(JoinKind::Right),
            "full" | "outer" => Ok(JoinKind::Full),
            _ => Err(Error::UnknownJoinKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinConfig {
    #[serde(rename = "type")]
    pub join_type: JoinKind,
    pub left_key: String,
    pub right_key: String,
}

impl JoinConfig {
    pub fn new(join_type: JoinKind, left_key: impl Into<String>, right_key: impl Into<String>) -> Self {
        JoinConfig {
            join_type,
            left_key: left_key.into(),
            right_key: right_key.into(),
        }
    }
}

/// Chart families the rendering layer checks data against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartType {
    Bar,
    Line,
    Area,
    Pie,
    TimeSeries,
}

impl ChartType {
    pub fn name(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Pie => "pie",
            ChartType::TimeSeries => "time-series",
        }
    }
}

impl FromStr for ChartType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bar" => Ok(ChartType::Bar),
            "line" => Ok(ChartType::Line),
            "area" => Ok(ChartType::Area),
            "pie" => Ok(ChartType::Pie),
            "time-series" | "timeseries" => Ok(ChartType::TimeSeries),
            _ => Err(Error::UnknownChartType(s.to_string())),
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_parsing_accepts_aliases() {
        assert_eq!("avg".parse::<Operation>().unwrap(), Operation::Avg);
        assert_eq!("MEAN".parse::<Operation>().unwrap(), Operation::Avg);
        assert!(matches!(
            "mode".parse::<Operation>(),
            Err(Error::UnknownOperation(_))
        ));
    }

    #[test]
    fn listed_names_parse_and_round_trip() {
        use crate::core::constants::{AGGREGATION_OPERATIONS, CHART_TYPES, TIME_GRANULARITIES};

        for name in AGGREGATION_OPERATIONS {
            assert_eq!(name.parse::<Operation>().unwrap().name(), name);
        }
        for name in TIME_GRANULARITIES {
            assert_eq!(name.parse::<Granularity>().unwrap().name(), name);
        }
        for name in CHART_TYPES {
            assert_eq!(name.parse::<ChartType>().unwrap().name(), name);
        }
    }

    #[test]
    fn join_kind_policy_flags() {
        assert!(!JoinKind::Inner.emit_unmatched_left());
        assert!(!JoinKind::Inner.emit_unmatched_right());
        assert!(JoinKind::Left.emit_unmatched_left());
        assert!(!JoinKind::Left.emit_unmatched_right());
        assert!(!JoinKind::Right.emit_unmatched_left());
        assert!(JoinKind::Right.emit_unmatched_right());
        assert!(JoinKind::Full.emit_unmatched_left());
        assert!(JoinKind::Full.emit_unmatched_right());
    }

    #[test]
    fn configs_use_camel_case_wire_names() {
        let config: ComparisonConfig = serde_json::from_str(
            r#"{"type": "year-over-year", "baseField": "revenue", "comparisonField": "", "period": 1}"#,
        )
        .unwrap();
        assert_eq!(config.comparison_type, ComparisonType::YearOverYear);
        assert_eq!(config.base_field, "revenue");

        let aggregation: AggregationConfig = serde_json::from_str(
            r#"{"field": "sales", "operation": "median", "groupBy": ["region"], "timeGranularity": "month"}"#,
        )
        .unwrap();
        assert_eq!(aggregation.operation, Operation::Median);
        assert_eq!(aggregation.group_by, Some(vec!["region".to_string()]));
        assert_eq!(aggregation.time_granularity, Some(Granularity::Month));
    }
}

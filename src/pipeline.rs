//! The chart-data pipeline: normalize, align the zone, aggregate, compare.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::core::constants::TIMEZONE_KEY;
use crate::core::constants::TIMESTAMP_KEY;
use crate::core::{AggregationConfig, ChartData, ComparisonConfig};
use crate::data::{aggregate, compare_periods, normalize_data};
use crate::error::{Error, Outcome, Result, Warning};
use crate::time::normalize_timezone;

/// What [`prepare_chart_data`] does after normalizing.
///
/// Every step is optional. The options deserialize from JSON, TOML or YAML
/// with camelCase keys, e.g.
///
/// ```toml
/// timezone = "Asia/Tokyo"
///
/// [aggregation]
/// field = "sales"
/// operation = "sum"
/// timeGranularity = "month"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartDataOptions {
    pub aggregation: Option<AggregationConfig>,
    pub comparison: Option<ComparisonConfig>,
    /// Zone to re-express timestamps in
    pub timezone: Option<String>,
}

impl ChartDataOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aggregation(mut self, config: AggregationConfig) -> Self {
        self.aggregation = Some(config);
        self
    }

    pub fn comparison(mut self, config: ComparisonConfig) -> Self {
        self.comparison = Some(config);
        self
    }

    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Loads options from a `.json`, `.toml`, `.yaml` or `.yml` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Self::from_json_str(&text),
            "toml" => Self::from_toml_str(&text),
            "yaml" | "yml" => Self::from_yaml_str(&text),
            _ => Err(Error::Config(format!(
                "unsupported options file: {}",
                path.display()
            ))),
        }
    }
}

/// Re-expresses every row's `timestamp` from the data's zone into `target`
fn align_zone(data: ChartData, target: &str, warnings: &mut Vec<Warning>) -> ChartData {
    let Some(current) = data.metadata.timezone.clone().filter(|tz| tz != target) else {
        return data;
    };

    let ChartData { data: rows, mut metadata } = data;
    let rows = rows
        .into_iter()
        .map(|point| match point.timestamp() {
            Some(timestamp) => {
                let converted = normalize_timezone(&timestamp, &current, target).drain_into(warnings);
                point.with(TIMESTAMP_KEY, converted).with(TIMEZONE_KEY, target)
            }
            None => point,
        })
        .collect();

    log::debug!("re-expressed timestamps from {} in {}", current, target);
    metadata.timezone = Some(target.to_string());
    ChartData::new(rows, metadata)
}

/// Runs the pipeline on raw records.
///
/// Anything other than a non-empty array yields an empty table. The zone step
/// only applies when the data declares a zone different from the requested
/// one; conversion problems surface as warnings.
///
/// # Errors
///
/// Whatever [`aggregate`] or [`compare_periods`] reject, typically a field
/// that is not a column.
pub fn try_prepare_chart_data(raw: &JsonValue, options: &ChartDataOptions) -> Result<Outcome<ChartData>> {
    if raw.as_array().map_or(true, |rows| rows.is_empty()) {
        return Ok(Outcome::clean(ChartData::empty()));
    }

    let mut warnings = Vec::new();
    let mut data = normalize_data(raw, None)?;

    if let Some(target) = options.timezone.as_deref() {
        data = align_zone(data, target, &mut warnings);
    }
    if let Some(config) = &options.aggregation {
        data = aggregate(&data, config)?;
    }
    if let Some(config) = &options.comparison {
        data = compare_periods(&data, config)?;
    }

    Ok(Outcome {
        value: data,
        warnings,
    })
}

/// Result of [`prepare_chart_data`]
#[derive(Debug)]
pub struct PreparedChartData {
    pub data: ChartData,
    /// Set when a step failed; `data` is then empty
    pub error: Option<Error>,
    pub warnings: Vec<Warning>,
}

impl PreparedChartData {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// [`try_prepare_chart_data`] with the error captured next to an empty table
pub fn prepare_chart_data(raw: &JsonValue, options: &ChartDataOptions) -> PreparedChartData {
    match try_prepare_chart_data(raw, options) {
        Ok(outcome) => PreparedChartData {
            data: outcome.value,
            error: None,
            warnings: outcome.warnings,
        },
        Err(e) => {
            log::error!("preparing chart data failed: {}", e);
            PreparedChartData {
                data: ChartData::empty(),
                error: Some(e),
                warnings: Vec::new(),
            }
        }
    }
}

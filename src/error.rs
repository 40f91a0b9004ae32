use std::fmt;

use thiserror::Error;

/// Errors the caller must handle.
///
/// These cover configuration mistakes (a field or key that is not a declared
/// column, an enumeration value that is not recognized) and rejected input.
/// Conditions that only degrade output are reported as [`Warning`]s instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("column not found: {column} ({context})")]
    ColumnNotFound { column: String, context: String },

    #[error("unknown aggregation operation: {0}")]
    UnknownOperation(String),

    #[error("unknown time granularity: {0}")]
    UnknownGranularity(String),

    #[error("unknown comparison type: {0}")]
    UnknownComparison(String),

    #[error("unknown join type: {0}")]
    UnknownJoinKind(String),

    #[error("unknown chart type: {0}")]
    UnknownChartType(String),

    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("row {row} failed validation: {message}")]
    Validation { row: usize, message: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("CSV error")]
    Csv(#[from] csv::Error),

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn column_not_found(column: &str, context: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            column: column.to_string(),
            context: context.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Category of a soft failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// A timezone conversion fell back to the unconverted value
    TimezoneConversion,
    /// A date could not be formatted as requested and a fallback was used
    DateFormat,
    /// A timezone label could not be resolved
    UnknownTimezone,
    /// A table failed the structural checks for a chart type
    InvalidChartData,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WarningKind::TimezoneConversion => "timezone-conversion",
            WarningKind::DateFormat => "date-format",
            WarningKind::UnknownTimezone => "unknown-timezone",
            WarningKind::InvalidChartData => "invalid-chart-data",
        };
        f.write_str(name)
    }
}

/// A degradation that did not stop the operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Warning {
            kind,
            message: message.into(),
        }
    }

    /// Emits the warning through the `log` facade and hands it back
    pub(crate) fn logged(self) -> Self {
        log::warn!("[{}] {}", self.kind, self.message);
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// A value together with the warnings raised while producing it
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Outcome<T> {
    pub fn clean(value: T) -> Self {
        Outcome {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn degraded(value: T, warning: Warning) -> Self {
        Outcome {
            value,
            warnings: vec![warning.logged()],
        }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        Outcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    /// Moves this outcome's warnings into `sink` and returns the value
    pub fn drain_into(self, sink: &mut Vec<Warning>) -> T {
        sink.extend(self.warnings);
        self.value
    }
}

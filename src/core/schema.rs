//! Row validation and coercion applied before normalization

use chrono::{SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Value as JsonValue};

use super::constants::{TIMESTAMP_KEY, TIMEZONE_KEY};
use crate::time::date_utils::parse_date_str;

/// Validates (and possibly rewrites) one raw row.
///
/// An `Err` carries a human readable reason; normalization attaches the row
/// index and propagates it as [`Error::Validation`](crate::error::Error::Validation).
pub trait RowSchema {
    fn parse(&self, row: &JsonValue) -> std::result::Result<JsonValue, String>;
}

impl<F> RowSchema for F
where
    F: Fn(&JsonValue) -> std::result::Result<JsonValue, String>,
{
    fn parse(&self, row: &JsonValue) -> std::result::Result<JsonValue, String> {
        self(row)
    }
}

fn as_object(row: &JsonValue) -> std::result::Result<&Map<String, JsonValue>, String> {
    row.as_object()
        .ok_or_else(|| format!("expected an object, got {}", json_kind(row)))
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn optional_string(row: &Map<String, JsonValue>, key: &str) -> std::result::Result<(), String> {
    match row.get(key) {
        None | Some(JsonValue::Null) | Some(JsonValue::String(_)) => Ok(()),
        Some(other) => Err(format!("'{}' must be a string, got {}", key, json_kind(other))),
    }
}

fn required_string(row: &Map<String, JsonValue>, key: &str) -> std::result::Result<(), String> {
    match row.get(key) {
        Some(JsonValue::String(_)) => Ok(()),
        None | Some(JsonValue::Null) => Err(format!("'{}' is required", key)),
        Some(other) => Err(format!("'{}' must be a string, got {}", key, json_kind(other))),
    }
}

/// Any object; `timestamp` and `timezone` must be strings when present
#[derive(Debug, Clone, Copy, Default)]
pub struct DataPointSchema;

impl RowSchema for DataPointSchema {
    fn parse(&self, row: &JsonValue) -> std::result::Result<JsonValue, String> {
        let object = as_object(row)?;
        optional_string(object, TIMESTAMP_KEY)?;
        optional_string(object, TIMEZONE_KEY)?;
        Ok(row.clone())
    }
}

/// Any object carrying string `timestamp` and `timezone`
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeSeriesSchema;

impl RowSchema for TimeSeriesSchema {
    fn parse(&self, row: &JsonValue) -> std::result::Result<JsonValue, String> {
        let object = as_object(row)?;
        required_string(object, TIMESTAMP_KEY)?;
        required_string(object, TIMEZONE_KEY)?;
        Ok(row.clone())
    }
}

/// Expected kind of a field in a [`RecordSchema`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    /// A date string, or epoch milliseconds when coercing
    Date,
    Any,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Convert compatible values instead of rejecting them
    pub coerce: bool,
}

impl FieldRule {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        FieldRule {
            name: name.into(),
            kind,
            required: false,
            coerce: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    fn check(&self, value: &JsonValue) -> std::result::Result<JsonValue, String> {
        let mismatch = || {
            format!(
                "'{}' expected {:?}, got {}",
                self.name,
                self.kind,
                json_kind(value)
            )
        };

        match (self.kind, value) {
            (FieldKind::Any, _) => Ok(value.clone()),
            (FieldKind::String, JsonValue::String(_))
            | (FieldKind::Number, JsonValue::Number(_))
            | (FieldKind::Boolean, JsonValue::Bool(_)) => Ok(value.clone()),
            (FieldKind::Date, JsonValue::String(s)) => {
                if parse_date_str(s).is_some() {
                    Ok(value.clone())
                } else {
                    Err(format!("'{}' is not a valid date: {}", self.name, s))
                }
            }
            _ if !self.coerce => Err(mismatch()),
            (FieldKind::String, JsonValue::Number(n)) => Ok(JsonValue::String(n.to_string())),
            (FieldKind::String, JsonValue::Bool(b)) => Ok(JsonValue::String(b.to_string())),
            (FieldKind::Number, JsonValue::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(JsonValue::Number)
                .ok_or_else(mismatch),
            (FieldKind::Number, JsonValue::Bool(b)) => Ok(JsonValue::from(if *b { 1 } else { 0 })),
            (FieldKind::Boolean, JsonValue::String(s)) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(JsonValue::Bool(true)),
                "false" | "0" | "no" => Ok(JsonValue::Bool(false)),
                _ => Err(mismatch()),
            },
            (FieldKind::Boolean, JsonValue::Number(n)) => {
                Ok(JsonValue::Bool(n.as_f64().map(|v| v != 0.0).unwrap_or(false)))
            }
            (FieldKind::Date, JsonValue::Number(n)) => n
                .as_i64()
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                .map(|dt| JsonValue::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)))
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        }
    }
}

/// Field-by-field validation with optional coercion.
///
/// Unknown keys pass through unless the schema is strict.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSchema {
    pub fields: Vec<FieldRule>,
    pub strict: bool,
}

impl RecordSchema {
    pub fn new() -> Self {
        RecordSchema::default()
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

impl RowSchema for RecordSchema {
    fn parse(&self, row: &JsonValue) -> std::result::Result<JsonValue, String> {
        let object = as_object(row)?;
        let mut out = object.clone();

        for rule in &self.fields {
            match object.get(&rule.name) {
                None | Some(JsonValue::Null) => {
                    if rule.required {
                        return Err(format!("'{}' is required", rule.name));
                    }
                }
                Some(value) => {
                    let checked = rule.check(value)?;
                    out.insert(rule.name.clone(), checked);
                }
            }
        }

        if self.strict {
            if let Some(unknown) = object
                .keys()
                .find(|key| !self.fields.iter().any(|rule| &rule.name == *key))
            {
                return Err(format!("unexpected field '{}'", unknown));
            }
        }

        Ok(JsonValue::Object(out))
    }
}

//! Data types for the store module.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::KvError;

/// One stored entry: the caller-chosen ID and its JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "ID")]
    pub id: String,
    pub data: Value,
}

impl Entry {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// Dynamic type tag of a stored value.
///
/// The tags follow JavaScript `typeof`: `null`, arrays and objects all report
/// [`ValueType::Object`], and a missing entry reports [`ValueType::Undefined`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Undefined,
    Boolean,
    Number,
    String,
    Object,
}

impl ValueType {
    pub fn of(value: Option<&Value>) -> Self {
        match value {
            None => ValueType::Undefined,
            Some(Value::Bool(_)) => ValueType::Boolean,
            Some(Value::Number(_)) => ValueType::Number,
            Some(Value::String(_)) => ValueType::String,
            Some(Value::Null | Value::Array(_) | Value::Object(_)) => ValueType::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Undefined => "undefined",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Object => "object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator accepted by [`Store::math`](super::Store::math).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl MathOperator {
    pub const ALL: [MathOperator; 5] = [
        MathOperator::Add,
        MathOperator::Subtract,
        MathOperator::Multiply,
        MathOperator::Divide,
        MathOperator::Remainder,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            MathOperator::Add => "+",
            MathOperator::Subtract => "-",
            MathOperator::Multiply => "*",
            MathOperator::Divide => "/",
            MathOperator::Remainder => "%",
        }
    }

    /// Apply with IEEE-754 semantics. Division or remainder by zero yields
    /// infinity or NaN rather than an error.
    pub fn apply(&self, current: f64, amount: f64) -> f64 {
        match self {
            MathOperator::Add => current + amount,
            MathOperator::Subtract => current - amount,
            MathOperator::Multiply => current * amount,
            MathOperator::Divide => current / amount,
            MathOperator::Remainder => current % amount,
        }
    }
}

impl FromStr for MathOperator {
    type Err = KvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MathOperator::ALL
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| KvError::InvalidOperator(s.to_string()))
    }
}

impl fmt::Display for MathOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Result record of [`Store::backup`](super::Store::backup).
///
/// Serializes as `{"success": true, "filename", "timestamp", "size"}` or
/// `{"success": false, "error"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
    /// Unix time in milliseconds at which the backup finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// Number of top-level keys written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BackupOutcome {
    pub fn succeeded(filename: PathBuf, timestamp: u64, size: usize) -> Self {
        Self {
            success: true,
            filename: Some(filename),
            timestamp: Some(timestamp),
            size: Some(size),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            filename: None,
            timestamp: None,
            size: None,
            error: Some(error.into()),
        }
    }
}

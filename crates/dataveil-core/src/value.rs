use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single scalar assigned to a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ScalarValue {
    /// Converts a generator output, returning `None` for null, arrays and objects.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(value) => Some(ScalarValue::Bool(*value)),
            Value::Number(number) => number
                .as_i64()
                .map(ScalarValue::Int)
                .or_else(|| number.as_f64().map(ScalarValue::Float)),
            Value::String(value) => Some(ScalarValue::Text(value.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// String form used for length checks and literal rendering.
    pub fn render(&self) -> String {
        match self {
            ScalarValue::Bool(true) => "1".to_string(),
            ScalarValue::Bool(false) => "0".to_string(),
            ScalarValue::Int(value) => value.to_string(),
            ScalarValue::Float(value) => value.to_string(),
            ScalarValue::Text(value) => value.clone(),
        }
    }

    /// Length of the rendered value in characters.
    pub fn char_len(&self) -> usize {
        match self {
            ScalarValue::Text(value) => value.chars().count(),
            other => other.render().chars().count(),
        }
    }

    /// Cuts the rendered value to `max_len` characters. Values already within
    /// the limit are returned unchanged; cut values become text.
    pub fn truncated(self, max_len: usize) -> Self {
        if self.char_len() <= max_len {
            return self;
        }
        let text: String = self.render().chars().take(max_len).collect();
        ScalarValue::Text(text)
    }

    /// Single-quoted SQL literal, doubling embedded quotes.
    pub fn to_sql_literal(&self) -> String {
        format!("'{}'", self.render().replace('\'', "''"))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Text(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Text(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

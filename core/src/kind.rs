//! JSON value kinds.
//!
//! [`JsonKind`] names the shape of a JSON value for type checks and for the
//! `expected`/`actual` fields of a type mismatch.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of a JSON value, as named by the JSON Schema `type` keyword.
///
/// Integers and numbers are told apart by value: a JSON number with no
/// fractional part is an [`Integer`](JsonKind::Integer) however it is
/// written (`1` and `1.0` alike), anything else is a
/// [`Number`](JsonKind::Number).
///
/// # Examples
///
/// ```
/// use schema_builder_core::JsonKind;
/// use serde_json::json;
///
/// assert_eq!(JsonKind::of(&json!(1)), JsonKind::Integer);
/// assert_eq!(JsonKind::of(&json!(1.5)), JsonKind::Number);
/// assert_eq!(JsonKind::of(&json!({"a": 1})).to_string(), "object");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonKind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    /// Returns the kind of `value`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(n) if n.as_f64().is_some_and(|f| f.fract() == 0.0) => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Returns the JSON Schema `type` name for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

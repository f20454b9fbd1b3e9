use serde_json::Value;

use crate::error::{ParseError, ParseErrors};
use crate::options::ParseOptions;
use crate::{Encode, JsonKind, SchemaComponent};

use super::typed;

/// `{"type": "boolean"}`, parsing to `bool`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolSchema;

/// Creates a [`BoolSchema`].
pub fn boolean() -> BoolSchema {
    BoolSchema
}

impl SchemaComponent for BoolSchema {
    type Output = bool;

    fn schema(&self) -> Value {
        Value::Object(typed("boolean"))
    }

    fn parse_with(&self, value: &Value, _options: &ParseOptions) -> Result<bool, ParseErrors> {
        value
            .as_bool()
            .ok_or_else(|| ParseError::type_mismatch(JsonKind::Boolean, value).into())
    }
}

impl Encode for BoolSchema {
    fn encode(&self, output: &bool) -> Value {
        Value::Bool(*output)
    }
}

/// `{"type": "null"}`, parsing to `()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullSchema;

/// Creates a [`NullSchema`].
pub fn null() -> NullSchema {
    NullSchema
}

impl SchemaComponent for NullSchema {
    type Output = ();

    fn schema(&self) -> Value {
        Value::Object(typed("null"))
    }

    fn parse_with(&self, value: &Value, _options: &ParseOptions) -> Result<(), ParseErrors> {
        match value {
            Value::Null => Ok(()),
            other => Err(ParseError::type_mismatch(JsonKind::Null, other).into()),
        }
    }
}

impl Encode for NullSchema {
    fn encode(&self, _output: &()) -> Value {
        Value::Null
    }
}

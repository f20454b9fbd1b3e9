use serde_json::{Map, Value, json};

use crate::error::{ParseError, ParseErrors};
use crate::options::ParseOptions;
use crate::{Encode, SchemaComponent};

use super::same_value;

/// `{"enum": [...]}`: the input must equal one of the listed values.
///
/// Values of any kind may be mixed and numbers match by value, so `1.0`
/// is a member of `[1]`. Output is the matched input value.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// let level = enumeration(["debug", "info", "warn"]);
/// assert_eq!(level.schema(), json!({"enum": ["debug", "info", "warn"]}));
/// assert_eq!(level.parse(&json!("info")), Ok(json!("info")));
/// assert!(level.parse(&json!("trace")).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    values: Vec<Value>,
}

/// Creates an [`EnumSchema`] over `values`.
pub fn enumeration<I, V>(values: I) -> EnumSchema
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    EnumSchema {
        values: values.into_iter().map(Into::into).collect(),
    }
}

impl EnumSchema {
    /// The permitted values, in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl SchemaComponent for EnumSchema {
    type Output = Value;

    fn schema(&self) -> Value {
        json!({ "enum": self.values })
    }

    fn parse_with(&self, value: &Value, _options: &ParseOptions) -> Result<Value, ParseErrors> {
        if self.values.iter().any(|allowed| same_value(allowed, value)) {
            return Ok(value.clone());
        }
        Err(ParseError::violation(
            "enum",
            format!("{value} is not one of {}", Value::Array(self.values.clone())),
        )
        .into())
    }
}

impl Encode for EnumSchema {
    fn encode(&self, output: &Value) -> Value {
        output.clone()
    }
}

/// `{"const": value}`: the input must equal exactly one value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstSchema {
    value: Value,
}

/// Creates a [`ConstSchema`].
pub fn constant(value: impl Into<Value>) -> ConstSchema {
    ConstSchema {
        value: value.into(),
    }
}

impl SchemaComponent for ConstSchema {
    type Output = Value;

    fn schema(&self) -> Value {
        json!({ "const": self.value })
    }

    fn parse_with(&self, value: &Value, _options: &ParseOptions) -> Result<Value, ParseErrors> {
        if same_value(value, &self.value) {
            return Ok(value.clone());
        }
        Err(ParseError::violation("const", format!("{value} is not {}", self.value)).into())
    }
}

impl Encode for ConstSchema {
    fn encode(&self, output: &Value) -> Value {
        output.clone()
    }
}

/// The boolean schemas `true` (accept anything) and `false` (reject
/// everything).
///
/// Output is the input value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrivialSchema {
    accepts: bool,
}

/// The `true` schema.
pub fn accept_all() -> TrivialSchema {
    TrivialSchema { accepts: true }
}

/// The `false` schema.
pub fn reject_all() -> TrivialSchema {
    TrivialSchema { accepts: false }
}

impl From<bool> for TrivialSchema {
    fn from(accepts: bool) -> Self {
        Self { accepts }
    }
}

impl SchemaComponent for TrivialSchema {
    type Output = Value;

    fn schema(&self) -> Value {
        Value::Bool(self.accepts)
    }

    fn parse_with(&self, value: &Value, _options: &ParseOptions) -> Result<Value, ParseErrors> {
        if self.accepts {
            Ok(value.clone())
        } else {
            Err(ParseError::violation("false", "the false schema rejects every value").into())
        }
    }
}

impl Encode for TrivialSchema {
    fn encode(&self, output: &Value) -> Value {
        output.clone()
    }
}

/// Converts a rendered schema into an object so keywords can be added.
///
/// `true` becomes `{}` and `false` becomes `{"not": {}}`, which are
/// equivalent schemas.
pub(crate) fn schema_object(schema: Value) -> Map<String, Value> {
    match schema {
        Value::Object(map) => map,
        Value::Bool(false) => {
            let mut map = Map::new();
            map.insert("not".into(), Value::Object(Map::new()));
            map
        }
        _ => Map::new(),
    }
}

//! Leaf components.
//!
//! Every primitive checks the JSON kind of its input first and only then
//! applies its refinements, each reported under the JSON Schema keyword it
//! implements.

mod literal;
mod numeric;
mod scalar;
mod string;

pub use literal::{
    ConstSchema, EnumSchema, TrivialSchema, accept_all, constant, enumeration, reject_all,
};
pub use numeric::{IntegerSchema, NumberSchema, integer, number};
pub use scalar::{BoolSchema, NullSchema, boolean, null};
pub use string::{StringSchema, string};

pub(crate) use literal::schema_object;

use serde_json::{Map, Number, Value};

/// Starts a schema object with the given `type`.
pub(crate) fn typed(kind: &str) -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("type".to_string(), Value::from(kind));
    schema
}

/// JSON Schema equality: numbers compare by value, so `1` equals `1.0`, and
/// object key order is irrelevant.
pub(crate) fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => same_number(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same_value(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, a)| b.get(key).is_some_and(|b| same_value(a, b)))
        }
        _ => a == b,
    }
}

fn same_number(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_same_value_compares_numbers_by_value() {
        assert!(same_value(&json!(1), &json!(1.0)));
        assert!(same_value(&json!([1, {"a": 2.0}]), &json!([1.0, {"a": 2}])));
        assert!(!same_value(&json!(1), &json!(1.5)));
        assert!(!same_value(&json!(1), &json!("1")));
        assert!(same_value(&json!(u64::MAX), &json!(u64::MAX)));
    }

    #[test]
    fn test_same_value_ignores_key_order() {
        assert!(same_value(&json!({"a": 1, "b": 2}), &json!({"b": 2, "a": 1})));
        assert!(!same_value(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
    }
}

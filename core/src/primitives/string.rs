use regex::Regex;
use serde_json::Value;

use crate::error::{BuilderError, Collector, ParseError, ParseErrors};
use crate::options::ParseOptions;
use crate::{Encode, JsonKind, SchemaComponent};

use super::typed;

/// `{"type": "string"}` with optional length, pattern and format refinements.
///
/// Lengths count Unicode scalar values. `pattern` is an unanchored regular
/// expression search, as in JSON Schema. `format` is rendered but not
/// checked.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// let sku = string().min_length(3).pattern("^[A-Z]+-[0-9]+$").unwrap();
/// assert_eq!(sku.parse(&json!("AB-12")), Ok("AB-12".to_string()));
///
/// let error = sku.parse(&json!("ab")).unwrap_err();
/// assert!(matches!(error.kind, ErrorKind::ConstraintViolation { ref rule, .. } if rule == "minLength"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<Regex>,
    format: Option<String>,
}

/// Creates an unrestricted [`StringSchema`].
pub fn string() -> StringSchema {
    StringSchema::default()
}

impl StringSchema {
    /// Sets `minLength`.
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Sets `maxLength`.
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Sets `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::InvalidPattern`] if `pattern` does not compile.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, BuilderError> {
        let regex = Regex::new(pattern).map_err(|e| BuilderError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.pattern = Some(regex);
        Ok(self)
    }

    /// Sets the `format` annotation (e.g. `"email"`, `"date-time"`).
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

impl SchemaComponent for StringSchema {
    type Output = String;

    fn schema(&self) -> Value {
        let mut schema = typed("string");
        if let Some(min) = self.min_length {
            schema.insert("minLength".into(), min.into());
        }
        if let Some(max) = self.max_length {
            schema.insert("maxLength".into(), max.into());
        }
        if let Some(pattern) = &self.pattern {
            schema.insert("pattern".into(), pattern.as_str().into());
        }
        if let Some(format) = &self.format {
            schema.insert("format".into(), format.as_str().into());
        }
        Value::Object(schema)
    }

    fn parse_with(&self, value: &Value, options: &ParseOptions) -> Result<String, ParseErrors> {
        let Value::String(text) = value else {
            return Err(ParseError::type_mismatch(JsonKind::String, value).into());
        };

        let mut collector = Collector::new(options);
        let length = text.chars().count();

        if let Some(min) = self.min_length.filter(|&min| length < min) {
            collector.record(ParseError::violation(
                "minLength",
                format!("length {length} is less than {min}"),
            ))?;
        }
        if let Some(max) = self.max_length.filter(|&max| length > max) {
            collector.record(ParseError::violation(
                "maxLength",
                format!("length {length} is greater than {max}"),
            ))?;
        }
        if let Some(pattern) = self.pattern.as_ref().filter(|p| !p.is_match(text)) {
            collector.record(ParseError::violation(
                "pattern",
                format!("{text:?} does not match `{}`", pattern.as_str()),
            ))?;
        }

        collector.finish()?;
        Ok(text.clone())
    }
}

impl Encode for StringSchema {
    fn encode(&self, output: &String) -> Value {
        Value::String(output.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_schema_lists_refinements_in_order() {
        let schema = string()
            .min_length(1)
            .max_length(8)
            .format("hostname")
            .schema();
        assert_eq!(
            schema,
            json!({"type": "string", "minLength": 1, "maxLength": 8, "format": "hostname"})
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let short = string().max_length(2);
        assert_eq!(short.parse(&json!("éé")), Ok("éé".to_string()));
    }

    #[test]
    fn test_rejects_non_string_with_type_mismatch() {
        let error = string().parse(&json!(5)).unwrap_err();
        assert_eq!(
            error.kind,
            ErrorKind::TypeMismatch {
                expected: JsonKind::String,
                actual: JsonKind::Integer,
            }
        );
    }

    #[test]
    fn test_collect_all_reports_every_refinement() {
        let code = string().min_length(4).pattern("^[0-9]+$").unwrap();

        let errors = code.parse_all(&json!("ab")).unwrap_err();
        let rules: Vec<_> = errors
            .iter()
            .map(|e| match &e.kind {
                ErrorKind::ConstraintViolation { rule, .. } => rule.as_str(),
                _ => "other",
            })
            .collect();
        assert_eq!(rules, vec!["minLength", "pattern"]);
    }

    #[test]
    fn test_invalid_pattern_is_a_builder_error() {
        let result = string().pattern("([a-z");
        assert!(matches!(result, Err(BuilderError::InvalidPattern { .. })));
    }
}

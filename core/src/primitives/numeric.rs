use std::fmt::Display;

use serde_json::{Map, Value};

use crate::error::{BuilderError, Collector, ParseError, ParseErrors};
use crate::options::ParseOptions;
use crate::{Encode, JsonKind, SchemaComponent};

use super::typed;

/// Numeric types usable as bounds.
trait Bound: Copy + PartialOrd + Display + Into<Value> {
    fn is_finite(self) -> bool;
    fn is_positive(self) -> bool;
    fn is_multiple(self, divisor: Self) -> bool;
}

impl Bound for i64 {
    fn is_finite(self) -> bool {
        true
    }

    fn is_positive(self) -> bool {
        self > 0
    }

    fn is_multiple(self, divisor: Self) -> bool {
        self.checked_rem(divisor) == Some(0)
    }
}

impl Bound for f64 {
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }

    fn is_positive(self) -> bool {
        self.is_finite() && self > 0.0
    }

    fn is_multiple(self, divisor: Self) -> bool {
        let quotient = self / divisor;
        (quotient - quotient.round()).abs() <= f64::EPSILON * quotient.abs().max(1.0)
    }
}

/// `minimum`, `maximum`, their exclusive forms and `multipleOf`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Bounds<N> {
    minimum: Option<N>,
    maximum: Option<N>,
    exclusive_minimum: Option<N>,
    exclusive_maximum: Option<N>,
    multiple_of: Option<N>,
}

impl<N: Bound> Bounds<N> {
    fn render(&self, schema: &mut Map<String, Value>) {
        let keywords = [
            ("minimum", self.minimum),
            ("maximum", self.maximum),
            ("exclusiveMinimum", self.exclusive_minimum),
            ("exclusiveMaximum", self.exclusive_maximum),
            ("multipleOf", self.multiple_of),
        ];
        for (keyword, bound) in keywords {
            if let Some(bound) = bound {
                schema.insert(keyword.to_string(), bound.into());
            }
        }
    }

    fn check(&self, n: N, collector: &mut Collector) -> Result<(), ParseErrors> {
        if let Some(min) = self.minimum.filter(|&min| n < min) {
            collector.record(ParseError::violation(
                "minimum",
                format!("{n} is less than {min}"),
            ))?;
        }
        if let Some(max) = self.maximum.filter(|&max| n > max) {
            collector.record(ParseError::violation(
                "maximum",
                format!("{n} is greater than {max}"),
            ))?;
        }
        if let Some(min) = self.exclusive_minimum.filter(|&min| n <= min) {
            collector.record(ParseError::violation(
                "exclusiveMinimum",
                format!("{n} is not greater than {min}"),
            ))?;
        }
        if let Some(max) = self.exclusive_maximum.filter(|&max| n >= max) {
            collector.record(ParseError::violation(
                "exclusiveMaximum",
                format!("{n} is not less than {max}"),
            ))?;
        }
        if let Some(divisor) = self.multiple_of.filter(|&d| !n.is_multiple(d)) {
            collector.record(ParseError::violation(
                "multipleOf",
                format!("{n} is not a multiple of {divisor}"),
            ))?;
        }
        Ok(())
    }

    fn finite(keyword: &str, bound: N) -> Result<N, BuilderError> {
        if !bound.is_finite() {
            return Err(BuilderError::InvalidConstraint {
                keyword: keyword.into(),
                reason: format!("{bound} is not a finite number"),
            });
        }
        Ok(bound)
    }

    fn set_multiple_of(&mut self, divisor: N) -> Result<(), BuilderError> {
        if !divisor.is_positive() {
            return Err(BuilderError::InvalidConstraint {
                keyword: "multipleOf".into(),
                reason: format!("{divisor} is not strictly positive"),
            });
        }
        self.multiple_of = Some(divisor);
        Ok(())
    }
}

macro_rules! bound_setters {
    (infallible $n:ty) => {
        /// Sets `minimum` (inclusive).
        pub fn minimum(mut self, minimum: $n) -> Self {
            self.bounds.minimum = Some(minimum);
            self
        }

        /// Sets `maximum` (inclusive).
        pub fn maximum(mut self, maximum: $n) -> Self {
            self.bounds.maximum = Some(maximum);
            self
        }

        /// Sets `exclusiveMinimum`.
        pub fn exclusive_minimum(mut self, minimum: $n) -> Self {
            self.bounds.exclusive_minimum = Some(minimum);
            self
        }

        /// Sets `exclusiveMaximum`.
        pub fn exclusive_maximum(mut self, maximum: $n) -> Self {
            self.bounds.exclusive_maximum = Some(maximum);
            self
        }

        bound_setters!(@multiple_of $n);
    };
    (finite $n:ty) => {
        /// Sets `minimum` (inclusive).
        ///
        /// # Errors
        ///
        /// Returns [`BuilderError::InvalidConstraint`] for NaN or infinity.
        pub fn minimum(mut self, minimum: $n) -> Result<Self, BuilderError> {
            self.bounds.minimum = Some(Bounds::finite("minimum", minimum)?);
            Ok(self)
        }

        /// Sets `maximum` (inclusive).
        ///
        /// # Errors
        ///
        /// Returns [`BuilderError::InvalidConstraint`] for NaN or infinity.
        pub fn maximum(mut self, maximum: $n) -> Result<Self, BuilderError> {
            self.bounds.maximum = Some(Bounds::finite("maximum", maximum)?);
            Ok(self)
        }

        /// Sets `exclusiveMinimum`.
        ///
        /// # Errors
        ///
        /// Returns [`BuilderError::InvalidConstraint`] for NaN or infinity.
        pub fn exclusive_minimum(mut self, minimum: $n) -> Result<Self, BuilderError> {
            self.bounds.exclusive_minimum = Some(Bounds::finite("exclusiveMinimum", minimum)?);
            Ok(self)
        }

        /// Sets `exclusiveMaximum`.
        ///
        /// # Errors
        ///
        /// Returns [`BuilderError::InvalidConstraint`] for NaN or infinity.
        pub fn exclusive_maximum(mut self, maximum: $n) -> Result<Self, BuilderError> {
            self.bounds.exclusive_maximum = Some(Bounds::finite("exclusiveMaximum", maximum)?);
            Ok(self)
        }

        bound_setters!(@multiple_of $n);
    };
    (@multiple_of $n:ty) => {
        /// Sets `multipleOf`.
        ///
        /// # Errors
        ///
        /// Returns [`BuilderError::InvalidConstraint`] unless `divisor` is
        /// strictly positive.
        pub fn multiple_of(mut self, divisor: $n) -> Result<Self, BuilderError> {
            self.bounds.set_multiple_of(divisor)?;
            Ok(self)
        }
    };
}

/// `-2^63` and `2^63` as floats: the half-open range of integral `f64`
/// values that convert to `i64` exactly.
const I64_LOWEST: f64 = -9_223_372_036_854_775_808.0;
const I64_END: f64 = 9_223_372_036_854_775_808.0;

/// `{"type": "integer"}`, parsing to `i64`.
///
/// Integers are recognized by value, so `3.0` parses as `3`. Numbers with a
/// fractional part are a type mismatch (`number` where `integer` was
/// expected); integers outside the `i64` range violate the `type` rule.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// let percent = integer().minimum(0).maximum(100);
/// assert_eq!(percent.parse(&json!(42)), Ok(42));
/// assert!(percent.parse(&json!(101)).is_err());
/// assert!(percent.parse(&json!(4.5)).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntegerSchema {
    bounds: Bounds<i64>,
}

/// Creates an unrestricted [`IntegerSchema`].
pub fn integer() -> IntegerSchema {
    IntegerSchema::default()
}

impl IntegerSchema {
    bound_setters!(infallible i64);
}

impl SchemaComponent for IntegerSchema {
    type Output = i64;

    fn schema(&self) -> Value {
        let mut schema = typed("integer");
        self.bounds.render(&mut schema);
        Value::Object(schema)
    }

    fn parse_with(&self, value: &Value, options: &ParseOptions) -> Result<i64, ParseErrors> {
        let Value::Number(raw) = value else {
            return Err(ParseError::type_mismatch(JsonKind::Integer, value).into());
        };
        let n = match raw.as_i64() {
            Some(n) => n,
            None if JsonKind::of(value) != JsonKind::Integer => {
                return Err(ParseError::type_mismatch(JsonKind::Integer, value).into());
            }
            None => match raw.as_f64().filter(|f| (I64_LOWEST..I64_END).contains(f)) {
                Some(f) => f as i64,
                None => {
                    return Err(ParseError::violation(
                        "type",
                        format!("{raw} does not fit in a 64-bit signed integer"),
                    )
                    .into());
                }
            },
        };

        let mut collector = Collector::new(options);
        self.bounds.check(n, &mut collector)?;
        collector.finish()?;
        Ok(n)
    }
}

impl Encode for IntegerSchema {
    fn encode(&self, output: &i64) -> Value {
        Value::from(*output)
    }
}

/// `{"type": "number"}`, parsing to `f64`. Accepts integers too.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumberSchema {
    bounds: Bounds<f64>,
}

/// Creates an unrestricted [`NumberSchema`].
pub fn number() -> NumberSchema {
    NumberSchema::default()
}

impl NumberSchema {
    bound_setters!(finite f64);
}

impl SchemaComponent for NumberSchema {
    type Output = f64;

    fn schema(&self) -> Value {
        let mut schema = typed("number");
        self.bounds.render(&mut schema);
        Value::Object(schema)
    }

    fn parse_with(&self, value: &Value, options: &ParseOptions) -> Result<f64, ParseErrors> {
        let Some(n) = value.as_f64() else {
            return Err(ParseError::type_mismatch(JsonKind::Number, value).into());
        };

        let mut collector = Collector::new(options);
        self.bounds.check(n, &mut collector)?;
        collector.finish()?;
        Ok(n)
    }
}

impl Encode for NumberSchema {
    fn encode(&self, output: &f64) -> Value {
        Value::from(*output)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;

    fn rule(errors: &ParseErrors) -> Vec<String> {
        errors
            .iter()
            .filter_map(|e| match &e.kind {
                ErrorKind::ConstraintViolation { rule, .. } => Some(rule.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_integer_schema_renders_bounds() {
        let schema = integer()
            .minimum(1)
            .exclusive_maximum(10)
            .multiple_of(3)
            .unwrap()
            .schema();
        assert_eq!(
            schema,
            json!({"type": "integer", "minimum": 1, "exclusiveMaximum": 10, "multipleOf": 3})
        );
    }

    #[test]
    fn test_integer_rejects_fractions_as_number() {
        let error = integer().parse(&json!(1.5)).unwrap_err();
        assert_eq!(
            error.kind,
            ErrorKind::TypeMismatch {
                expected: JsonKind::Integer,
                actual: JsonKind::Number,
            }
        );
    }

    #[test]
    fn test_integer_accepts_integral_floats() {
        assert_eq!(integer().parse(&json!(1.0)), Ok(1));
        assert_eq!(integer().parse(&json!(-4.0)), Ok(-4));
        assert!(integer().maximum(0).parse(&json!(2.0)).is_err());
    }

    #[test]
    fn test_integer_rejects_out_of_range_values() {
        let error = integer().parse(&json!(u64::MAX)).unwrap_err();
        assert!(matches!(error.kind, ErrorKind::ConstraintViolation { ref rule, .. } if rule == "type"));

        let error = integer().parse(&json!(1e19)).unwrap_err();
        assert!(matches!(error.kind, ErrorKind::ConstraintViolation { ref rule, .. } if rule == "type"));
    }

    #[test]
    fn test_integer_collects_bound_violations() {
        let even_small = integer().maximum(5).multiple_of(2).unwrap();
        let errors = even_small.parse_all(&json!(7)).unwrap_err();
        assert_eq!(rule(&errors), vec!["maximum", "multipleOf"]);
    }

    #[test]
    fn test_number_accepts_integers_and_checks_exclusive_bounds() {
        let positive = number().exclusive_minimum(0.0).unwrap();
        assert_eq!(positive.parse(&json!(2)), Ok(2.0));
        assert_eq!(positive.parse(&json!(0.5)), Ok(0.5));
        assert!(positive.parse(&json!(0)).is_err());
    }

    #[test]
    fn test_number_multiple_of_tolerates_float_error() {
        let cents = number().multiple_of(0.01).unwrap();
        assert!(cents.parse(&json!(19.99)).is_ok());
        assert!(cents.parse(&json!(19.995)).is_err());
    }

    #[test]
    fn test_multiple_of_must_be_positive() {
        assert!(matches!(
            integer().multiple_of(0),
            Err(BuilderError::InvalidConstraint { .. })
        ));
        assert!(number().multiple_of(-1.5).is_err());
    }

    #[test]
    fn test_number_bounds_must_be_finite() {
        assert!(matches!(
            number().minimum(f64::NAN),
            Err(BuilderError::InvalidConstraint { ref keyword, .. }) if keyword == "minimum"
        ));
        assert!(number().maximum(f64::INFINITY).is_err());
        assert!(number().exclusive_maximum(f64::NEG_INFINITY).is_err());
        assert_eq!(
            number().minimum(-1.5).unwrap().schema(),
            json!({"type": "number", "minimum": -1.5})
        );
    }
}

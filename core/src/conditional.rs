//! Unions of alternative components.
//!
//! [`Conditional`] is the two-way `anyOf` union whose output records which
//! alternative matched. [`Branch`] is the builder-time counterpart: the
//! alternative is chosen while building, and only its schema is rendered.
//! [`AnyOf`] generalizes the union to any number of alternatives sharing one
//! output type.

use serde_json::{Value, json};
use tracing::trace;

use crate::erased::ComponentList;
use crate::error::{ErrorKind, ParseError, ParseErrors};
use crate::options::ParseOptions;
use crate::SchemaComponent;

/// Output of a two-way union: which alternative produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Either<L, R> {
    /// The first alternative matched.
    First(L),
    /// The second alternative matched.
    Second(R),
}

impl<L, R> Either<L, R> {
    /// Returns `true` for [`Either::First`].
    pub fn is_first(&self) -> bool {
        matches!(self, Self::First(_))
    }

    /// Returns `true` for [`Either::Second`].
    pub fn is_second(&self) -> bool {
        matches!(self, Self::Second(_))
    }

    /// The first-alternative value, if that is what matched.
    pub fn first(self) -> Option<L> {
        match self {
            Self::First(value) => Some(value),
            Self::Second(_) => None,
        }
    }

    /// The second-alternative value, if that is what matched.
    pub fn second(self) -> Option<R> {
        match self {
            Self::First(_) => None,
            Self::Second(value) => Some(value),
        }
    }
}

impl<T> Either<T, T> {
    /// Collapses a union of two same-typed alternatives.
    pub fn into_inner(self) -> T {
        match self {
            Self::First(value) | Self::Second(value) => value,
        }
    }
}

/// `{"anyOf": [first, second]}`.
///
/// Parsing tries `first`, then `second`. When both reject the input the
/// error is [`ErrorKind::UnionExhausted`] carrying both branches' errors, in
/// order, with paths relative to the union.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// let id = either(integer(), string());
/// assert_eq!(id.parse(&json!(7)), Ok(Either::First(7)));
/// assert_eq!(id.parse(&json!("x7")), Ok(Either::Second("x7".to_string())));
///
/// let error = id.parse(&json!(true)).unwrap_err();
/// let ErrorKind::UnionExhausted { branches } = error.kind else { unreachable!() };
/// assert_eq!(branches.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional<A, B> {
    first: A,
    second: B,
}

/// Creates a [`Conditional`] union.
pub fn either<A: SchemaComponent, B: SchemaComponent>(first: A, second: B) -> Conditional<A, B> {
    Conditional::new(first, second)
}

impl<A, B> Conditional<A, B> {
    /// Same as [`either`], without the trait bounds.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: SchemaComponent, B: SchemaComponent> SchemaComponent for Conditional<A, B> {
    type Output = Either<A::Output, B::Output>;

    fn schema(&self) -> Value {
        json!({ "anyOf": [self.first.schema(), self.second.schema()] })
    }

    fn parse_with(&self, value: &Value, options: &ParseOptions) -> Result<Self::Output, ParseErrors> {
        let first_errors = match self.first.parse_with(value, options) {
            Ok(output) => return Ok(Either::First(output)),
            Err(errors) => errors,
        };
        trace!(error = %first_errors.first(), "first alternative rejected, trying second");

        match self.second.parse_with(value, options) {
            Ok(output) => Ok(Either::Second(output)),
            Err(second_errors) => Err(exhausted(vec![first_errors, second_errors])),
        }
    }

    fn parse_missing(&self) -> Option<Self::Output> {
        self.first
            .parse_missing()
            .map(Either::First)
            .or_else(|| self.second.parse_missing().map(Either::Second))
    }
}

fn exhausted(branches: Vec<ParseErrors>) -> ParseErrors {
    ParseError::new(ErrorKind::UnionExhausted { branches }).into()
}

/// A union resolved while building: exactly one alternative is present.
///
/// Schema and parsing are the chosen alternative's; the output is tagged
/// with the side that was chosen.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// fn id_schema(numeric: bool) -> Branch<IntegerSchema, StringSchema> {
///     if numeric {
///         Branch::First(integer())
///     } else {
///         Branch::Second(string())
///     }
/// }
///
/// assert_eq!(id_schema(true).schema(), json!({"type": "integer"}));
/// assert_eq!(id_schema(false).parse(&json!("a")), Ok(Either::Second("a".into())));
/// assert!(id_schema(false).parse(&json!(1)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Branch<A, B> {
    First(A),
    Second(B),
}

impl<A: SchemaComponent, B: SchemaComponent> SchemaComponent for Branch<A, B> {
    type Output = Either<A::Output, B::Output>;

    fn schema(&self) -> Value {
        match self {
            Self::First(component) => component.schema(),
            Self::Second(component) => component.schema(),
        }
    }

    fn parse_with(&self, value: &Value, options: &ParseOptions) -> Result<Self::Output, ParseErrors> {
        match self {
            Self::First(component) => component.parse_with(value, options).map(Either::First),
            Self::Second(component) => component.parse_with(value, options).map(Either::Second),
        }
    }

    fn parse_missing(&self) -> Option<Self::Output> {
        match self {
            Self::First(component) => component.parse_missing().map(Either::First),
            Self::Second(component) => component.parse_missing().map(Either::Second),
        }
    }
}

/// `{"anyOf": [...]}` over any number of alternatives with one output type.
///
/// The first accepting alternative wins. An empty list accepts nothing and
/// renders as `{"not": {}}`, since `anyOf` must not be empty.
#[derive(Debug, Clone)]
pub struct AnyOf<T> {
    alternatives: ComponentList<T>,
}

/// Creates an [`AnyOf`] union.
pub fn any_of<T>(alternatives: ComponentList<T>) -> AnyOf<T> {
    AnyOf { alternatives }
}

impl<T> SchemaComponent for AnyOf<T> {
    type Output = T;

    fn schema(&self) -> Value {
        if self.alternatives.is_empty() {
            return json!({ "not": {} });
        }
        let alternatives: Vec<Value> = self.alternatives.iter().map(SchemaComponent::schema).collect();
        json!({ "anyOf": alternatives })
    }

    fn parse_with(&self, value: &Value, options: &ParseOptions) -> Result<T, ParseErrors> {
        let mut branches = Vec::with_capacity(self.alternatives.len());
        for (index, alternative) in self.alternatives.iter().enumerate() {
            match alternative.parse_with(value, options) {
                Ok(output) => return Ok(output),
                Err(errors) => {
                    trace!(index, error = %errors.first(), "alternative rejected");
                    branches.push(errors);
                }
            }
        }
        Err(exhausted(branches))
    }

    fn parse_missing(&self) -> Option<T> {
        self.alternatives.iter().find_map(SchemaComponent::parse_missing)
    }
}

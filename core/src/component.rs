//! The component contract.
//!
//! Every schema node implements [`SchemaComponent`]: it renders a JSON Schema
//! value and parses input values into its `Output` type. The trait is object
//! safe so that components can be erased behind [`AnyComponent`]; chaining
//! sugar lives on [`SchemaComponentExt`], implemented for every component.

use serde_json::Value;

use crate::conditional::Conditional;
use crate::decorate::{Decorated, Mapped, Metadata, Optional, Passthrough, TryMapped};
use crate::erased::AnyComponent;
use crate::error::{ParseError, ParseErrors};
use crate::options::ParseOptions;

/// A composable JSON Schema node.
///
/// Implementations must be pure: `schema` returns the same value on every
/// call and `parse_with` depends only on its arguments. Neither may panic on
/// any input value.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// let age = integer().minimum(0).description("Age in years");
/// assert_eq!(
///     age.schema(),
///     json!({"type": "integer", "minimum": 0, "description": "Age in years"})
/// );
/// assert_eq!(age.parse(&json!(42)), Ok(42));
/// assert!(age.parse(&json!(-1)).is_err());
/// ```
pub trait SchemaComponent {
    /// The value produced by a successful parse.
    type Output;

    /// Renders this component as a JSON Schema value.
    fn schema(&self) -> Value;

    /// Parses `value`, reporting failures according to `options`.
    fn parse_with(
        &self,
        value: &Value,
        options: &ParseOptions,
    ) -> Result<Self::Output, ParseErrors>;

    /// Output to use when the value is absent from its container.
    ///
    /// `None` (the default) means absence is an error.
    fn parse_missing(&self) -> Option<Self::Output> {
        None
    }

    /// Parses `value`, stopping at the first error.
    fn parse(&self, value: &Value) -> Result<Self::Output, ParseError> {
        self.parse_with(value, &ParseOptions::first_error())
            .map_err(ParseErrors::into_first)
    }

    /// Parses `value`, reporting every error found.
    fn parse_all(&self, value: &Value) -> Result<Self::Output, ParseErrors> {
        self.parse_with(value, &ParseOptions::collect_all())
    }
}

/// Components that can turn their own output back into a JSON value.
///
/// For any value `v` the component accepts,
/// `parse(encode(parse(v)?))` equals `parse(v)`.
pub trait Encode: SchemaComponent {
    /// Encodes `output` as a JSON value this component accepts.
    fn encode(&self, output: &Self::Output) -> Value;
}

/// Chaining sugar available on every [`SchemaComponent`].
pub trait SchemaComponentExt: SchemaComponent + Sized {
    /// Attaches a `title`.
    fn title(self, title: impl Into<String>) -> Decorated<Self> {
        Decorated::new(self).title(title)
    }

    /// Attaches a `description`.
    fn description(self, description: impl Into<String>) -> Decorated<Self> {
        Decorated::new(self).description(description)
    }

    /// Attaches a `default` value.
    fn default_value(self, value: impl Into<Value>) -> Decorated<Self> {
        Decorated::new(self).default_value(value)
    }

    /// Appends an entry to `examples`.
    fn example(self, value: impl Into<Value>) -> Decorated<Self> {
        Decorated::new(self).example(value)
    }

    /// Sets the `deprecated` annotation.
    fn deprecated(self, deprecated: bool) -> Decorated<Self> {
        Decorated::new(self).deprecated(deprecated)
    }

    /// Attaches a full [`Metadata`] set.
    fn with_metadata(self, metadata: Metadata) -> Decorated<Self> {
        Decorated::with_metadata(self, metadata)
    }

    /// Transforms the parsed output with `f`.
    fn map<U, F>(self, f: F) -> Mapped<Self, F>
    where
        F: Fn(Self::Output) -> U,
    {
        Mapped::new(self, f)
    }

    /// Transforms the parsed output with a fallible `f`.
    fn try_map<U, F>(self, f: F) -> TryMapped<Self, F>
    where
        F: Fn(Self::Output) -> Result<U, String>,
    {
        TryMapped::new(self, f)
    }

    /// Makes the component tolerate absence.
    fn optional(self) -> Optional<Self> {
        Optional::some(self)
    }

    /// Yields the input value unchanged once this component accepts it.
    fn passthrough(self) -> Passthrough<Self> {
        Passthrough::new(self)
    }

    /// Builds an `anyOf` union trying `self` first.
    fn or<B: SchemaComponent>(self, other: B) -> Conditional<Self, B> {
        Conditional::new(self, other)
    }

    /// Hides the concrete type behind [`AnyComponent`].
    fn erase(self) -> AnyComponent<Self::Output>
    where
        Self: Send + Sync + 'static,
    {
        AnyComponent::new(self)
    }
}

impl<C: SchemaComponent> SchemaComponentExt for C {}

//! Wrappers that decorate or transform another component.
//!
//! Decoration only touches the rendered schema; transformation only touches
//! the parse output. Neither changes what the wrapped component accepts.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ParseError, ParseErrors};
use crate::options::ParseOptions;
use crate::primitives::schema_object;
use crate::{Encode, SchemaComponent};

/// Annotation keywords attached by [`Decorated`].
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// let metadata = Metadata {
///     title: Some("Port".into()),
///     default: Some(json!(8080)),
///     ..Metadata::default()
/// };
/// let port = decorated(integer(), metadata);
/// assert_eq!(
///     port.schema(),
///     json!({"type": "integer", "title": "Port", "default": 8080})
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,
    #[serde(default, rename = "$comment", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Metadata {
    /// Returns `true` if no annotation is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Adds every set annotation to `schema`, keeping keys already present.
    ///
    /// `examples` is the exception: outer examples are appended after the
    /// inner ones.
    fn apply(&self, schema: &mut Map<String, Value>) {
        if !self.examples.is_empty() {
            match schema.get_mut("examples") {
                Some(Value::Array(existing)) => existing.extend(self.examples.iter().cloned()),
                Some(_) => {}
                None => {
                    schema.insert("examples".into(), Value::Array(self.examples.clone()));
                }
            }
        }

        let entries = [
            ("title", self.title.clone().map(Value::from)),
            ("description", self.description.clone().map(Value::from)),
            ("default", self.default.clone()),
            ("deprecated", self.deprecated.map(Value::from)),
            ("readOnly", self.read_only.map(Value::from)),
            ("writeOnly", self.write_only.map(Value::from)),
            ("$comment", self.comment.clone().map(Value::from)),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                schema.entry(key).or_insert(value);
            }
        }
    }
}

/// A component with annotations.
///
/// The schema is the inner schema plus every annotation the inner schema
/// does not already carry; an inner `description` is never replaced by an
/// outer one. Parsing is the inner component's, untouched.
///
/// Chained annotation calls on a `Decorated` extend the same metadata set
/// under the same rule: an annotation that is already set keeps its first
/// value, and examples accumulate. Wrapping in between (say with
/// [`map`](crate::SchemaComponentExt::map)) renders the same schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Decorated<C> {
    inner: C,
    metadata: Metadata,
}

/// Attaches `metadata` to `inner`.
pub fn decorated<C: SchemaComponent>(inner: C, metadata: Metadata) -> Decorated<C> {
    Decorated::with_metadata(inner, metadata)
}

impl<C> Decorated<C> {
    /// Wraps `inner` with empty metadata.
    pub fn new(inner: C) -> Self {
        Self::with_metadata(inner, Metadata::default())
    }

    /// Wraps `inner` with `metadata`.
    pub fn with_metadata(inner: C, metadata: Metadata) -> Self {
        Self { inner, metadata }
    }

    /// Sets `title` unless already set.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title.get_or_insert(title.into());
        self
    }

    /// Sets `description` unless already set.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description.get_or_insert(description.into());
        self
    }

    /// Sets `default` unless already set.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.metadata.default.get_or_insert(value.into());
        self
    }

    /// Appends to `examples`.
    pub fn example(mut self, value: impl Into<Value>) -> Self {
        self.metadata.examples.push(value.into());
        self
    }

    /// Sets `deprecated` unless already set.
    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.metadata.deprecated.get_or_insert(deprecated);
        self
    }

    /// Sets `readOnly` unless already set.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.metadata.read_only.get_or_insert(read_only);
        self
    }

    /// Sets `writeOnly` unless already set.
    pub fn write_only(mut self, write_only: bool) -> Self {
        self.metadata.write_only.get_or_insert(write_only);
        self
    }

    /// Sets `$comment` unless already set.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.metadata.comment.get_or_insert(comment.into());
        self
    }

    /// The attached annotations.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The wrapped component.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: SchemaComponent> SchemaComponent for Decorated<C> {
    type Output = C::Output;

    fn schema(&self) -> Value {
        let inner = self.inner.schema();
        if self.metadata.is_empty() {
            return inner;
        }
        let mut schema = schema_object(inner);
        self.metadata.apply(&mut schema);
        Value::Object(schema)
    }

    fn parse_with(&self, value: &Value, options: &ParseOptions) -> Result<C::Output, ParseErrors> {
        self.inner.parse_with(value, options)
    }

    fn parse_missing(&self) -> Option<C::Output> {
        self.inner.parse_missing()
    }
}

impl<C: Encode> Encode for Decorated<C> {
    fn encode(&self, output: &C::Output) -> Value {
        self.inner.encode(output)
    }
}

/// A component whose output is passed through a pure function.
pub struct Mapped<C, F> {
    inner: C,
    transform: F,
}

/// Maps the output of `inner` with `transform`.
pub fn mapped<C, F, U>(inner: C, transform: F) -> Mapped<C, F>
where
    C: SchemaComponent,
    F: Fn(C::Output) -> U,
{
    Mapped::new(inner, transform)
}

impl<C, F> Mapped<C, F> {
    pub(crate) fn new(inner: C, transform: F) -> Self {
        Self { inner, transform }
    }
}

impl<C: fmt::Debug, F> fmt::Debug for Mapped<C, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapped").field("inner", &self.inner).finish_non_exhaustive()
    }
}

impl<C, F, U> SchemaComponent for Mapped<C, F>
where
    C: SchemaComponent,
    F: Fn(C::Output) -> U,
{
    type Output = U;

    fn schema(&self) -> Value {
        self.inner.schema()
    }

    fn parse_with(&self, value: &Value, options: &ParseOptions) -> Result<U, ParseErrors> {
        self.inner.parse_with(value, options).map(&self.transform)
    }

    fn parse_missing(&self) -> Option<U> {
        self.inner.parse_missing().map(&self.transform)
    }
}

/// A component whose output goes through a function that may reject it.
///
/// Rejections are reported as a `transform` constraint violation carrying the
/// function's message.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// let port = integer().try_map(|n| u16::try_from(n).map_err(|e| e.to_string()));
/// assert_eq!(port.parse(&json!(443)), Ok(443u16));
/// assert!(port.parse(&json!(70000)).is_err());
/// ```
pub struct TryMapped<C, F> {
    inner: C,
    transform: F,
}

/// Maps the output of `inner` with a `transform` that may reject it.
pub fn try_mapped<C, F, U>(inner: C, transform: F) -> TryMapped<C, F>
where
    C: SchemaComponent,
    F: Fn(C::Output) -> Result<U, String>,
{
    TryMapped::new(inner, transform)
}

impl<C, F> TryMapped<C, F> {
    pub(crate) fn new(inner: C, transform: F) -> Self {
        Self { inner, transform }
    }
}

impl<C: fmt::Debug, F> fmt::Debug for TryMapped<C, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryMapped").field("inner", &self.inner).finish_non_exhaustive()
    }
}

impl<C, F, U> SchemaComponent for TryMapped<C, F>
where
    C: SchemaComponent,
    F: Fn(C::Output) -> Result<U, String>,
{
    type Output = U;

    fn schema(&self) -> Value {
        self.inner.schema()
    }

    fn parse_with(&self, value: &Value, options: &ParseOptions) -> Result<U, ParseErrors> {
        let output = self.inner.parse_with(value, options)?;
        (self.transform)(output).map_err(|detail| ParseError::violation("transform", detail).into())
    }

    fn parse_missing(&self) -> Option<U> {
        self.inner
            .parse_missing()
            .and_then(|output| (self.transform)(output).ok())
    }
}

/// A component that may be absent.
///
/// Output is `Option<C::Output>`: `None` when the value is missing from its
/// container, or when no component is wrapped at all (a branch that
/// contributes nothing, rendered as the empty schema `{}`). The rendered
/// schema of a present component is unchanged; containers record optionality
/// themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct Optional<C> {
    wrapped: Option<C>,
}

/// Wraps an optional component.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// let nickname = optional(Some(string()));
/// assert_eq!(nickname.schema(), json!({"type": "string"}));
/// assert_eq!(nickname.parse_missing(), Some(None));
/// assert_eq!(nickname.parse(&json!("bo")), Ok(Some("bo".to_string())));
///
/// let nothing = optional::<StringSchema>(None);
/// assert_eq!(nothing.schema(), json!({}));
/// assert_eq!(nothing.parse(&json!(42)), Ok(None));
/// ```
pub fn optional<C: SchemaComponent>(component: Option<C>) -> Optional<C> {
    Optional { wrapped: component }
}

impl<C> Optional<C> {
    /// Wraps a present component.
    pub fn some(component: C) -> Self {
        Self {
            wrapped: Some(component),
        }
    }

    /// The empty wrapper.
    pub fn none() -> Self {
        Self { wrapped: None }
    }

    /// The wrapped component, if any.
    pub fn wrapped(&self) -> Option<&C> {
        self.wrapped.as_ref()
    }
}

impl<C: SchemaComponent> SchemaComponent for Optional<C> {
    type Output = Option<C::Output>;

    fn schema(&self) -> Value {
        match &self.wrapped {
            Some(component) => component.schema(),
            None => Value::Object(Map::new()),
        }
    }

    fn parse_with(
        &self,
        value: &Value,
        options: &ParseOptions,
    ) -> Result<Option<C::Output>, ParseErrors> {
        match &self.wrapped {
            Some(component) => component.parse_with(value, options).map(Some),
            None => Ok(None),
        }
    }

    fn parse_missing(&self) -> Option<Option<C::Output>> {
        Some(None)
    }
}

/// Validates with the inner component and yields the input value itself.
///
/// Lets components with different outputs share a `Value`-typed collection.
/// An inner component that tolerates absence yields `null` when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Passthrough<C> {
    inner: C,
}

impl<C> Passthrough<C> {
    /// Wraps `inner`; prefer [`passthrough`](crate::SchemaComponentExt::passthrough)
    /// when chaining.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: SchemaComponent> SchemaComponent for Passthrough<C> {
    type Output = Value;

    fn schema(&self) -> Value {
        self.inner.schema()
    }

    fn parse_with(&self, value: &Value, options: &ParseOptions) -> Result<Value, ParseErrors> {
        self.inner.parse_with(value, options)?;
        Ok(value.clone())
    }

    fn parse_missing(&self) -> Option<Value> {
        self.inner.parse_missing().map(|_| Value::Null)
    }
}

impl<C: SchemaComponent> Encode for Passthrough<C> {
    fn encode(&self, output: &Value) -> Value {
        output.clone()
    }
}

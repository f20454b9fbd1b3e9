//! Type erasure and incremental accumulation of components.
//!
//! [`AnyComponent<T>`] hides a component's concrete type and keeps only its
//! output type, so components of different shapes can live in one
//! [`ComponentList<T>`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::decorate::Passthrough;
use crate::error::ParseErrors;
use crate::options::ParseOptions;
use crate::SchemaComponent;

/// A type-erased component with output `T`.
///
/// Cheap to clone (shared through an [`Arc`]) and `Send + Sync`. Erasure
/// changes nothing observable: schema, parse results and absence handling
/// are those of the original component.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// let shapes: Vec<AnyComponent<i64>> = vec![
///     integer().erase(),
///     integer().minimum(0).description("non-negative").erase(),
///     string().map(|s| s.len() as i64).erase(),
/// ];
/// let parsed: Vec<_> = shapes.iter().map(|c| c.parse(&json!(3))).collect();
/// assert_eq!(parsed[0], Ok(3));
/// assert!(parsed[2].is_err());
/// ```
pub struct AnyComponent<T> {
    inner: Arc<dyn SchemaComponent<Output = T> + Send + Sync>,
}

/// Erases `component`.
pub fn erase<C>(component: C) -> AnyComponent<C::Output>
where
    C: SchemaComponent + Send + Sync + 'static,
{
    AnyComponent::new(component)
}

impl<T> AnyComponent<T> {
    /// Erases `component`; see [`erase`].
    pub fn new<C>(component: C) -> Self
    where
        C: SchemaComponent<Output = T> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(component),
        }
    }
}

impl<T> Clone for AnyComponent<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for AnyComponent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyComponent")
            .field("schema", &self.inner.schema())
            .finish()
    }
}

impl<T> SchemaComponent for AnyComponent<T> {
    type Output = T;

    fn schema(&self) -> Value {
        self.inner.schema()
    }

    fn parse_with(&self, value: &Value, options: &ParseOptions) -> Result<T, ParseErrors> {
        self.inner.parse_with(value, options)
    }

    fn parse_missing(&self) -> Option<T> {
        self.inner.parse_missing()
    }
}

/// An ordered list of erased components sharing one output type.
///
/// Built one component at a time, each erased on the way in. Serves as the
/// item list of a fixed-arity [`tuple`](crate::tuple) and the alternatives of
/// [`any_of`](crate::any_of).
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// // Heterogeneous components, unified through passthrough.
/// let items = ComponentList::new()
///     .with_passthrough(string())
///     .with_passthrough(integer())
///     .with_passthrough(boolean());
/// assert_eq!(items.len(), 3);
///
/// let row = tuple(items);
/// assert_eq!(
///     row.parse(&json!(["a", 1, true])),
///     Ok(vec![json!("a"), json!(1), json!(true)])
/// );
/// ```
pub struct ComponentList<T> {
    components: Vec<AnyComponent<T>>,
}

impl<T> ComponentList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Appends `component`.
    pub fn with<C>(mut self, component: C) -> Self
    where
        C: SchemaComponent<Output = T> + Send + Sync + 'static,
    {
        self.push(component);
        self
    }

    /// Appends `component` in place.
    pub fn push<C>(&mut self, component: C)
    where
        C: SchemaComponent<Output = T> + Send + Sync + 'static,
    {
        self.components.push(AnyComponent::new(component));
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterates components in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, AnyComponent<T>> {
        self.components.iter()
    }
}

impl ComponentList<Value> {
    /// Appends any component, keeping the input value as its output.
    pub fn with_passthrough<C>(mut self, component: C) -> Self
    where
        C: SchemaComponent + Send + Sync + 'static,
    {
        self.push_passthrough(component);
        self
    }

    /// Appends any component in place, keeping the input value as its output.
    pub fn push_passthrough<C>(&mut self, component: C)
    where
        C: SchemaComponent + Send + Sync + 'static,
    {
        self.push(Passthrough::new(component));
    }
}

impl<T> Default for ComponentList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ComponentList<T> {
    fn clone(&self) -> Self {
        Self {
            components: self.components.clone(),
        }
    }
}

impl<T> fmt::Debug for ComponentList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.components.iter()).finish()
    }
}

impl<T> FromIterator<AnyComponent<T>> for ComponentList<T> {
    fn from_iter<I: IntoIterator<Item = AnyComponent<T>>>(iter: I) -> Self {
        Self {
            components: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a ComponentList<T> {
    type Item = &'a AnyComponent<T>;
    type IntoIter = std::slice::Iter<'a, AnyComponent<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{SchemaComponentExt, either, integer, optional, string};

    #[test]
    fn test_erasure_is_transparent() {
        let original = integer().maximum(9).description("digit");
        let erased = integer().maximum(9).description("digit").erase();

        assert_eq!(erased.schema(), original.schema());
        for input in [json!(3), json!(10), json!("3"), json!(null)] {
            assert_eq!(erased.parse(&input), original.parse(&input));
            assert_eq!(erased.parse_all(&input), original.parse_all(&input));
        }
    }

    #[test]
    fn test_erasure_forwards_absence_handling() {
        let erased = optional(Some(string())).erase();
        assert_eq!(erased.parse_missing(), Some(None));
    }

    #[test]
    fn test_passthrough_items_keep_absence_handling() {
        let list = ComponentList::new()
            .with_passthrough(optional(Some(string())))
            .with_passthrough(integer());
        let missing: Vec<_> = list.iter().map(|item| item.parse_missing()).collect();
        assert_eq!(missing, vec![Some(Value::Null), None]);
    }

    #[test]
    fn test_erased_unions_keep_their_output() {
        let erased = either(integer(), string()).erase();
        assert!(erased.parse(&json!("x")).unwrap().is_second());
    }

    #[test]
    fn test_erased_components_are_shareable_across_threads() {
        let shared = integer().minimum(0).erase();
        std::thread::scope(|scope| {
            for n in 0..4 {
                let component = shared.clone();
                scope.spawn(move || assert_eq!(component.parse(&json!(n)), Ok(n)));
            }
        });
    }
}

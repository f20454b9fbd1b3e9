//! Array combination.
//!
//! [`ArraySchema`] repeats one item component over every element;
//! [`TupleSchema`] assigns one component per position and requires an exact
//! length. Element failures are reported as [`ErrorKind::Indexed`] with the
//! index prepended to the path.

use serde_json::{Map, Value};

use crate::erased::ComponentList;
use crate::error::{Collector, ErrorKind, ParseError, ParseErrors};
use crate::options::ParseOptions;
use crate::primitives::same_value;
use crate::{Encode, JsonKind, SchemaComponent};

/// `{"type": "array", "items": ...}`: a homogeneous list.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// let tags = array(string().min_length(1)).min_items(1).unique_items(true);
/// assert_eq!(tags.parse(&json!(["a", "b"])), Ok(vec!["a".to_string(), "b".to_string()]));
/// assert!(tags.parse(&json!([])).is_err());
/// assert!(tags.parse(&json!(["a", "a"])).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema<C> {
    item: C,
    min_items: Option<usize>,
    max_items: Option<usize>,
    unique_items: bool,
}

/// Creates an [`ArraySchema`] whose elements all match `item`.
pub fn array<C: SchemaComponent>(item: C) -> ArraySchema<C> {
    ArraySchema {
        item,
        min_items: None,
        max_items: None,
        unique_items: false,
    }
}

impl<C> ArraySchema<C> {
    /// Sets `minItems`.
    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    /// Sets `maxItems`.
    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    /// Sets `uniqueItems`. Numbers are compared by value, so `[1, 1.0]`
    /// holds a duplicate.
    pub fn unique_items(mut self, unique: bool) -> Self {
        self.unique_items = unique;
        self
    }

    /// The item component.
    pub fn item(&self) -> &C {
        &self.item
    }
}

impl<C: SchemaComponent> SchemaComponent for ArraySchema<C> {
    type Output = Vec<C::Output>;

    fn schema(&self) -> Value {
        let mut schema = array_schema();
        schema.insert("items".into(), self.item.schema());
        if let Some(min) = self.min_items {
            schema.insert("minItems".into(), min.into());
        }
        if let Some(max) = self.max_items {
            schema.insert("maxItems".into(), max.into());
        }
        if self.unique_items {
            schema.insert("uniqueItems".into(), true.into());
        }
        Value::Object(schema)
    }

    fn parse_with(
        &self,
        value: &Value,
        options: &ParseOptions,
    ) -> Result<Vec<C::Output>, ParseErrors> {
        let Value::Array(elements) = value else {
            return Err(ParseError::type_mismatch(JsonKind::Array, value).into());
        };

        let mut collector = Collector::new(options);
        let count = elements.len();
        if let Some(min) = self.min_items.filter(|&min| count < min) {
            collector.record(ParseError::violation(
                "minItems",
                format!("{count} items, expected at least {min}"),
            ))?;
        }
        if let Some(max) = self.max_items.filter(|&max| count > max) {
            collector.record(ParseError::violation(
                "maxItems",
                format!("{count} items, expected at most {max}"),
            ))?;
        }

        let mut items = Vec::with_capacity(count);
        for (index, element) in elements.iter().enumerate() {
            let parsed = self
                .item
                .parse_with(element, options)
                .map_err(|errors| errors.indexed(index));
            if let Some(item) = collector.capture(parsed)? {
                items.push(item);
            }
        }

        if self.unique_items {
            for (index, element) in elements.iter().enumerate() {
                if let Some(first) = elements[..index].iter().position(|e| same_value(e, element)) {
                    collector.record(
                        ParseError::violation(
                            "uniqueItems",
                            format!("duplicate of item {first}"),
                        )
                        .indexed(index),
                    )?;
                }
            }
        }

        collector.finish()?;
        Ok(items)
    }
}

impl<C: Encode> Encode for ArraySchema<C> {
    fn encode(&self, output: &Vec<C::Output>) -> Value {
        Value::Array(output.iter().map(|item| self.item.encode(item)).collect())
    }
}

/// Position-wise item components of a [`TupleSchema`].
///
/// Implemented for tuples of up to twelve components (typed tuple output)
/// and for [`ComponentList<T>`] (`Vec<T>` output).
pub trait ItemList {
    /// Parsed tuple type.
    type Output;

    /// Number of positions.
    fn arity(&self) -> usize;

    /// Item schemas in position order.
    fn item_schemas(&self) -> Vec<Value>;

    /// Parses `elements` position by position.
    ///
    /// Fails with [`ErrorKind::ArityMismatch`] unless there is exactly one
    /// element per position.
    fn parse_items(
        &self,
        elements: &[Value],
        options: &ParseOptions,
    ) -> Result<Self::Output, ParseErrors>;
}

fn check_arity(expected: usize, elements: &[Value]) -> Result<(), ParseErrors> {
    if elements.len() == expected {
        return Ok(());
    }
    Err(ParseError::new(ErrorKind::ArityMismatch {
        expected,
        actual: elements.len(),
    })
    .into())
}

macro_rules! impl_item_list {
    ($count:expr; $($item:ident : $idx:tt),+) => {
        impl<$($item: SchemaComponent),+> ItemList for ($($item,)+) {
            type Output = ($($item::Output,)+);

            fn arity(&self) -> usize {
                $count
            }

            fn item_schemas(&self) -> Vec<Value> {
                vec![$(self.$idx.schema()),+]
            }

            #[allow(non_snake_case)]
            fn parse_items(
                &self,
                elements: &[Value],
                options: &ParseOptions,
            ) -> Result<Self::Output, ParseErrors> {
                check_arity($count, elements)?;
                let mut collector = Collector::new(options);
                $(
                    let $item = collector.capture(
                        self.$idx
                            .parse_with(&elements[$idx], options)
                            .map_err(|errors| errors.indexed($idx)),
                    )?;
                )+
                let items = match ($($item,)+) {
                    ($(Some($item),)+) => Some(($($item,)+)),
                    _ => None,
                };
                collector.finish_with(items)
            }
        }
    };
}

impl_item_list!(1; A: 0);
impl_item_list!(2; A: 0, B: 1);
impl_item_list!(3; A: 0, B: 1, C: 2);
impl_item_list!(4; A: 0, B: 1, C: 2, D: 3);
impl_item_list!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_item_list!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_item_list!(7; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_item_list!(8; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
impl_item_list!(9; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8);
impl_item_list!(10; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9);
impl_item_list!(11; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9, K: 10);
impl_item_list!(12; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9, K: 10, L: 11);

impl<T> ItemList for ComponentList<T> {
    type Output = Vec<T>;

    fn arity(&self) -> usize {
        self.len()
    }

    fn item_schemas(&self) -> Vec<Value> {
        self.iter().map(SchemaComponent::schema).collect()
    }

    fn parse_items(&self, elements: &[Value], options: &ParseOptions) -> Result<Vec<T>, ParseErrors> {
        check_arity(self.len(), elements)?;
        let mut collector = Collector::new(options);
        let mut items = Vec::with_capacity(elements.len());
        for (index, (component, element)) in self.iter().zip(elements).enumerate() {
            let parsed = component
                .parse_with(element, options)
                .map_err(|errors| errors.indexed(index));
            if let Some(item) = collector.capture(parsed)? {
                items.push(item);
            }
        }
        collector.finish()?;
        Ok(items)
    }
}

/// A fixed-arity array: `prefixItems`, with `items: false` and `minItems`
/// pinning the length.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// let point = tuple((number(), number()));
/// assert_eq!(point.parse(&json!([1.5, 2])), Ok((1.5, 2.0)));
///
/// let error = point.parse(&json!([1.5])).unwrap_err();
/// assert_eq!(error.kind, ErrorKind::ArityMismatch { expected: 2, actual: 1 });
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TupleSchema<L> {
    items: L,
}

/// Creates a [`TupleSchema`] over `items`.
pub fn tuple<L: ItemList>(items: L) -> TupleSchema<L> {
    TupleSchema { items }
}

impl<L> TupleSchema<L> {
    /// The item list.
    pub fn items(&self) -> &L {
        &self.items
    }
}

impl<L: ItemList> SchemaComponent for TupleSchema<L> {
    type Output = L::Output;

    fn schema(&self) -> Value {
        let mut schema = array_schema();
        schema.insert("prefixItems".into(), Value::Array(self.items.item_schemas()));
        schema.insert("items".into(), false.into());
        schema.insert("minItems".into(), self.items.arity().into());
        Value::Object(schema)
    }

    fn parse_with(&self, value: &Value, options: &ParseOptions) -> Result<L::Output, ParseErrors> {
        let Value::Array(elements) = value else {
            return Err(ParseError::type_mismatch(JsonKind::Array, value).into());
        };
        self.items.parse_items(elements, options)
    }
}

fn array_schema() -> Map<String, Value> {
    crate::primitives::typed("array")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{ComponentList, Encode, integer, number, string};

    #[test]
    fn test_tuple_requires_exact_arity() {
        let pair = tuple((integer(), string()));

        assert_eq!(
            pair.parse(&json!([1])).unwrap_err().kind,
            ErrorKind::ArityMismatch {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(pair.parse(&json!([1, "x"])), Ok((1, "x".to_string())));
        assert!(pair.parse(&json!([1, "x", 2])).is_err());
    }

    #[test]
    fn test_tuple_schema_uses_prefix_items() {
        let pair = tuple((integer(), string()));
        assert_eq!(
            pair.schema(),
            json!({
                "type": "array",
                "prefixItems": [{"type": "integer"}, {"type": "string"}],
                "items": false,
                "minItems": 2
            })
        );
    }

    #[test]
    fn test_tuple_element_error_is_indexed() {
        let pair = tuple((integer(), string()));
        let error = pair.parse(&json!([1, 2])).unwrap_err();

        assert_eq!(error.path.to_string(), "$[1]");
        assert!(matches!(error.kind, ErrorKind::Indexed { index: 1, .. }));
    }

    #[test]
    fn test_homogeneous_array_reports_first_bad_element() {
        let numbers = array(integer());
        let error = numbers.parse(&json!([1, 2, "3", "4"])).unwrap_err();
        assert_eq!(error.path.to_string(), "$[2]");

        let errors = numbers.parse_all(&json!([1, 2, "3", "4"])).unwrap_err();
        let paths: Vec<_> = errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["$[2]", "$[3]"]);
    }

    #[test]
    fn test_unique_items_compares_numbers_by_value() {
        let distinct = array(number()).unique_items(true);
        assert!(distinct.parse(&json!([1, 2.5, 3])).is_ok());

        let error = distinct.parse(&json!([1, 1.0])).unwrap_err();
        assert_eq!(error.path.to_string(), "$[1]");
        assert!(matches!(error.kind, ErrorKind::Indexed { index: 1, .. }));
    }

    #[test]
    fn test_array_rejects_non_arrays() {
        let error = array(integer()).parse(&json!({"0": 1})).unwrap_err();
        assert_eq!(
            error.kind,
            ErrorKind::TypeMismatch {
                expected: JsonKind::Array,
                actual: JsonKind::Object
            }
        );
    }

    #[test]
    fn test_component_list_tuple_parses_positionally() {
        let bounds = tuple(
            ComponentList::new()
                .with(integer().minimum(0))
                .with(integer().maximum(100)),
        );
        assert_eq!(bounds.parse(&json!([0, 100])), Ok(vec![0, 100]));
        assert_eq!(
            bounds.parse(&json!([0, 101])).unwrap_err().path.to_string(),
            "$[1]"
        );
    }

    #[test]
    fn test_array_encode_round_trips() {
        let names = array(string());
        let parsed = names.parse(&json!(["x", "y"])).unwrap();
        let encoded = names.encode(&parsed);
        assert_eq!(names.parse(&encoded), Ok(parsed));
    }
}

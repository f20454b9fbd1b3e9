//! Object combination.
//!
//! An [`ObjectSchema`] is built from a [`PropertyList`]: either a tuple of
//! [`Property`] values, parsing into a tuple of their outputs, or a dynamic
//! [`Properties<T>`] list, parsing into a [`Record<T>`]. Property order is
//! declaration order in both the rendered `properties` map and the output.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::decorate::Optional;
use crate::erased::AnyComponent;
use crate::error::{BuilderError, Collector, ErrorKind, ParseError, ParseErrors};
use crate::options::ParseOptions;
use crate::{JsonKind, PathSegment, SchemaComponent};

/// A named member of an object.
///
/// Required properties fail with [`ErrorKind::MissingKey`] when absent.
/// Optional properties wrap their component in [`Optional`] and parse to
/// `None` when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Property<C> {
    key: String,
    component: C,
    required: bool,
}

/// A required property.
pub fn property<C: SchemaComponent>(key: impl Into<String>, component: C) -> Property<C> {
    Property::new(key, component)
}

/// An optional property, parsing to `Option<C::Output>`.
pub fn optional_property<C: SchemaComponent>(
    key: impl Into<String>,
    component: C,
) -> Property<Optional<C>> {
    Property::optional(key, component)
}

impl<C> Property<C> {
    /// Creates a required property.
    pub fn new(key: impl Into<String>, component: C) -> Self {
        Self {
            key: key.into(),
            component,
            required: true,
        }
    }

    /// The member name.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the key must be present.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The value component.
    pub fn component(&self) -> &C {
        &self.component
    }
}

impl<C> Property<Optional<C>> {
    /// Creates an optional property.
    pub fn optional(key: impl Into<String>, component: C) -> Self {
        Self {
            key: key.into(),
            component: Optional::some(component),
            required: false,
        }
    }
}

/// A single object member as seen by an [`ObjectSchema`].
pub trait PropertyComponent {
    /// Output of the member when parsed.
    type Output;

    /// The member name.
    fn key(&self) -> &str;

    /// Whether the member appears in `required`.
    fn is_required(&self) -> bool;

    /// Schema of the member value.
    fn value_schema(&self) -> Value;

    /// Parses the member out of `object`, prefixing error paths with the key.
    fn parse_member(
        &self,
        object: &Map<String, Value>,
        options: &ParseOptions,
    ) -> Result<Self::Output, ParseErrors>;
}

impl<C: SchemaComponent> PropertyComponent for Property<C> {
    type Output = C::Output;

    fn key(&self) -> &str {
        &self.key
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn value_schema(&self) -> Value {
        self.component.schema()
    }

    fn parse_member(
        &self,
        object: &Map<String, Value>,
        options: &ParseOptions,
    ) -> Result<C::Output, ParseErrors> {
        if let Some(value) = object.get(&self.key) {
            return self
                .component
                .parse_with(value, options)
                .map_err(|errors| errors.within(PathSegment::Key(self.key.clone())));
        }

        match self.component.parse_missing() {
            Some(output) if !self.required => Ok(output),
            _ => Err(ParseError::new(ErrorKind::MissingKey {
                key: self.key.clone(),
            })
            .into()),
        }
    }
}

/// The ordered members of an [`ObjectSchema`].
///
/// Implemented for tuples of up to twelve [`PropertyComponent`]s, for the
/// empty tuple and for [`Properties<T>`].
pub trait PropertyList {
    /// Parsed record type.
    type Output;

    /// Member names in declaration order.
    fn keys(&self) -> Vec<&str>;

    /// Adds every member to `properties`, and required names to `required`.
    fn render(&self, properties: &mut Map<String, Value>, required: &mut Vec<Value>);

    /// Parses every member of `object` in declaration order.
    fn parse_members(
        &self,
        object: &Map<String, Value>,
        options: &ParseOptions,
    ) -> Result<Self::Output, ParseErrors>;
}

fn render_member<P: PropertyComponent>(
    member: &P,
    properties: &mut Map<String, Value>,
    required: &mut Vec<Value>,
) {
    properties.insert(member.key().to_string(), member.value_schema());
    if member.is_required() {
        required.push(Value::from(member.key()));
    }
}

impl PropertyList for () {
    type Output = ();

    fn keys(&self) -> Vec<&str> {
        Vec::new()
    }

    fn render(&self, _properties: &mut Map<String, Value>, _required: &mut Vec<Value>) {}

    fn parse_members(
        &self,
        _object: &Map<String, Value>,
        _options: &ParseOptions,
    ) -> Result<(), ParseErrors> {
        Ok(())
    }
}

macro_rules! impl_property_list {
    ($($member:ident : $idx:tt),+) => {
        impl<$($member: PropertyComponent),+> PropertyList for ($($member,)+) {
            type Output = ($($member::Output,)+);

            fn keys(&self) -> Vec<&str> {
                vec![$(self.$idx.key()),+]
            }

            fn render(&self, properties: &mut Map<String, Value>, required: &mut Vec<Value>) {
                $(render_member(&self.$idx, properties, required);)+
            }

            #[allow(non_snake_case)]
            fn parse_members(
                &self,
                object: &Map<String, Value>,
                options: &ParseOptions,
            ) -> Result<Self::Output, ParseErrors> {
                let mut collector = Collector::new(options);
                $(let $member = collector.capture(self.$idx.parse_member(object, options))?;)+
                let record = match ($($member,)+) {
                    ($(Some($member),)+) => Some(($($member,)+)),
                    _ => None,
                };
                collector.finish_with(record)
            }
        }
    };
}

impl_property_list!(A: 0);
impl_property_list!(A: 0, B: 1);
impl_property_list!(A: 0, B: 1, C: 2);
impl_property_list!(A: 0, B: 1, C: 2, D: 3);
impl_property_list!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_property_list!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_property_list!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_property_list!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
impl_property_list!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8);
impl_property_list!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9);
impl_property_list!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9, K: 10);
impl_property_list!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9, K: 10, L: 11);

/// A dynamically accumulated property list with a shared output type.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// let labels = Properties::new()
///     .required("env", string())
///     .required("team", string().min_length(1))
///     .optional("owner", string());
/// let labels = object(labels).unwrap();
///
/// let record = labels.parse(&json!({"env": "prod", "team": "infra"})).unwrap();
/// assert_eq!(record.get("team"), Some(&"infra".to_string()));
/// assert_eq!(record.get("owner"), None);
/// ```
pub struct Properties<T> {
    members: Vec<Property<AnyComponent<T>>>,
}

impl<T> Properties<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Appends a required member.
    pub fn required<C>(mut self, key: impl Into<String>, component: C) -> Self
    where
        C: SchemaComponent<Output = T> + Send + Sync + 'static,
    {
        self.members.push(Property::new(key, AnyComponent::new(component)));
        self
    }

    /// Appends an optional member.
    pub fn optional<C>(mut self, key: impl Into<String>, component: C) -> Self
    where
        C: SchemaComponent<Output = T> + Send + Sync + 'static,
    {
        self.members.push(Property {
            key: key.into(),
            component: AnyComponent::new(component),
            required: false,
        });
        self
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if there are no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<T> Default for Properties<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PropertyList for Properties<T> {
    type Output = Record<T>;

    fn keys(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.key.as_str()).collect()
    }

    fn render(&self, properties: &mut Map<String, Value>, required: &mut Vec<Value>) {
        for member in &self.members {
            render_member(member, properties, required);
        }
    }

    fn parse_members(
        &self,
        object: &Map<String, Value>,
        options: &ParseOptions,
    ) -> Result<Record<T>, ParseErrors> {
        let mut collector = Collector::new(options);
        let mut entries = Vec::with_capacity(self.members.len());

        for member in &self.members {
            let parsed = if member.required || object.contains_key(&member.key) {
                collector
                    .capture(member.parse_member(object, options))?
                    .map(Some)
            } else {
                Some(member.component.parse_missing())
            };
            if let Some(value) = parsed {
                entries.push((member.key.clone(), value));
            }
        }

        collector.finish()?;
        Ok(Record { entries })
    }
}

/// Output of an object built from [`Properties<T>`].
///
/// Entries keep declaration order. Absent optional members are kept with a
/// `None` value.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    entries: Vec<(String, Option<T>)>,
}

impl<T> Record<T> {
    /// Value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Returns `true` if `key` was present in the input.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates `(key, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&T>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Number of declared members.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the object declares no members.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> IntoIterator for Record<T> {
    type Item = (String, Option<T>);
    type IntoIter = std::vec::IntoIter<(String, Option<T>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// `{"type": "object", "properties": {...}, "required": [...]}`.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// let product = object((
///     property("productId", integer().description("The unique identifier for a product")),
///     property("productName", string().description("Name of the product")),
///     optional_property("price", number().exclusive_minimum(0.0).unwrap()),
/// ))
/// .unwrap()
/// .description("A product from Acme's catalog");
///
/// let (id, name, price) = product
///     .parse(&json!({"productId": 1, "productName": "Anvil"}))
///     .unwrap();
/// assert_eq!((id, name.as_str(), price), (1, "Anvil", None));
/// assert_eq!(product.schema()["required"], json!(["productId", "productName"]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema<P> {
    properties: P,
    additional_properties: Option<bool>,
    min_properties: Option<usize>,
    max_properties: Option<usize>,
}

/// Builds an object from `properties`.
///
/// # Errors
///
/// Returns [`BuilderError::DuplicateKey`] if two members share a key.
pub fn object<P: PropertyList>(properties: P) -> Result<ObjectSchema<P>, BuilderError> {
    let mut seen = HashSet::new();
    for key in properties.keys() {
        if !seen.insert(key) {
            return Err(BuilderError::DuplicateKey(key.to_string()));
        }
    }
    Ok(ObjectSchema {
        properties,
        additional_properties: None,
        min_properties: None,
        max_properties: None,
    })
}

impl<P> ObjectSchema<P> {
    /// Sets `additionalProperties`. With `false`, undeclared keys are
    /// rejected.
    pub fn additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = Some(allowed);
        self
    }

    /// Sets `minProperties`.
    pub fn min_properties(mut self, min: usize) -> Self {
        self.min_properties = Some(min);
        self
    }

    /// Sets `maxProperties`.
    pub fn max_properties(mut self, max: usize) -> Self {
        self.max_properties = Some(max);
        self
    }

    /// The member list.
    pub fn properties(&self) -> &P {
        &self.properties
    }
}

impl<P: PropertyList> SchemaComponent for ObjectSchema<P> {
    type Output = P::Output;

    fn schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        self.properties.render(&mut properties, &mut required);

        let mut schema = Map::new();
        schema.insert("type".into(), "object".into());
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), Value::Array(required));
        }
        if let Some(allowed) = self.additional_properties {
            schema.insert("additionalProperties".into(), allowed.into());
        }
        if let Some(min) = self.min_properties {
            schema.insert("minProperties".into(), min.into());
        }
        if let Some(max) = self.max_properties {
            schema.insert("maxProperties".into(), max.into());
        }
        Value::Object(schema)
    }

    fn parse_with(&self, value: &Value, options: &ParseOptions) -> Result<P::Output, ParseErrors> {
        let Value::Object(object) = value else {
            return Err(ParseError::type_mismatch(JsonKind::Object, value).into());
        };

        let mut collector = Collector::new(options);
        let count = object.len();
        if let Some(min) = self.min_properties.filter(|&min| count < min) {
            collector.record(ParseError::violation(
                "minProperties",
                format!("{count} properties, expected at least {min}"),
            ))?;
        }
        if let Some(max) = self.max_properties.filter(|&max| count > max) {
            collector.record(ParseError::violation(
                "maxProperties",
                format!("{count} properties, expected at most {max}"),
            ))?;
        }

        let record = collector.capture(self.properties.parse_members(object, options))?;

        if self.additional_properties == Some(false) {
            let declared: HashSet<&str> = self.properties.keys().into_iter().collect();
            for key in object.keys().filter(|k| !declared.contains(k.as_str())) {
                collector.record(
                    ParseError::violation("additionalProperties", format!("unexpected key `{key}`"))
                        .within(PathSegment::Key(key.clone())),
                )?;
            }
        }

        collector.finish_with(record)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{SchemaComponentExt, array, boolean, integer, string};

    #[test]
    fn test_required_list_follows_flags() {
        let pair = object((property("a", integer()), optional_property("b", string()))).unwrap();

        assert_eq!(
            pair.schema(),
            json!({
                "type": "object",
                "properties": {"a": {"type": "integer"}, "b": {"type": "string"}},
                "required": ["a"]
            })
        );
        assert_eq!(pair.parse(&json!({"a": 1})), Ok((1, None)));
        assert_eq!(
            pair.parse(&json!({})).unwrap_err(),
            ParseError::new(ErrorKind::MissingKey { key: "a".into() })
        );
    }

    #[test]
    fn test_properties_render_in_declaration_order() {
        let ordered = object((
            property("zeta", integer()),
            property("alpha", integer()),
            property("mid", integer()),
        ))
        .unwrap();

        let schema = ordered.schema();
        let keys: Vec<_> = schema["properties"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let result = object((property("id", integer()), property("id", string())));
        assert_eq!(result.unwrap_err(), BuilderError::DuplicateKey("id".into()));

        let dynamic = Properties::new().required("x", integer()).optional("x", integer());
        assert!(object(dynamic).is_err());
    }

    #[test]
    fn test_nested_errors_carry_the_key() {
        let outer = object((property("inner", object((property("flag", boolean()),)).unwrap()),))
            .unwrap();

        let error = outer.parse(&json!({"inner": {"flag": "yes"}})).unwrap_err();
        assert_eq!(error.path.to_string(), "$.inner.flag");
    }

    #[test]
    fn test_collect_all_reports_every_member() {
        let pair = object((property("a", integer()), property("b", string()))).unwrap();

        let errors = pair.parse_all(&json!({"b": 3})).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first(), &pair.parse(&json!({"b": 3})).unwrap_err());
        assert_eq!(errors.iter().nth(1).unwrap().path.to_string(), "$.b");
    }

    #[test]
    fn test_additional_properties_false_rejects_unknown_keys() {
        let strict = object((property("id", integer()),))
            .unwrap()
            .additional_properties(false);

        assert_eq!(strict.schema()["additionalProperties"], json!(false));
        let error = strict.parse(&json!({"id": 1, "extra": true})).unwrap_err();
        assert_eq!(error.path.to_string(), "$.extra");
        assert!(matches!(error.kind, ErrorKind::ConstraintViolation { ref rule, .. } if rule == "additionalProperties"));
    }

    #[test]
    fn test_property_count_bounds() {
        let bag = object(()).unwrap().min_properties(1).max_properties(2);
        assert!(bag.parse(&json!({})).is_err());
        assert!(bag.parse(&json!({"a": 1})).is_ok());
        assert!(bag.parse(&json!({"a": 1, "b": 2, "c": 3})).is_err());
    }

    #[test]
    fn test_dynamic_record_keeps_absent_optionals() {
        let tags = object(
            Properties::new()
                .required("name", string())
                .optional("color", string()),
        )
        .unwrap();

        let record = tags.parse(&json!({"name": "bug"})).unwrap();
        let entries: Vec<_> = record.iter().collect();
        assert_eq!(
            entries,
            vec![("name", Some(&"bug".to_string())), ("color", None)]
        );
    }

    #[test]
    fn test_array_member_error_path() {
        let holder = object((property("arrayProp", array(integer())),)).unwrap();
        let error = holder.parse(&json!({"arrayProp": [1, "two"]})).unwrap_err();

        let expected: crate::JsonPath = [PathSegment::from("arrayProp"), PathSegment::from(1)]
            .into_iter()
            .collect();
        assert_eq!(error.path, expected);
    }

    #[test]
    fn test_mapped_record_into_struct() {
        #[derive(Debug, PartialEq)]
        struct User {
            name: String,
            admin: bool,
        }

        let user = object((
            property("name", string()),
            optional_property("admin", boolean()),
        ))
        .unwrap()
        .map(|(name, admin)| User {
            name,
            admin: admin.unwrap_or(false),
        });

        assert_eq!(
            user.parse(&json!({"name": "ada"})),
            Ok(User {
                name: "ada".into(),
                admin: false
            })
        );
    }
}

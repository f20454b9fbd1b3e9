//! Composable JSON Schema components.
//!
//! A schema is built by combining small components. Each component renders
//! its JSON Schema (draft 2020-12 keywords) with [`SchemaComponent::schema`]
//! and parses JSON values into a typed output with
//! [`SchemaComponent::parse`], so the schema a consumer publishes and the
//! validation it runs cannot drift apart.
//!
//! - Primitives: [`string`], [`integer`], [`number`], [`boolean`], [`null`],
//!   [`enumeration`], [`constant`], [`accept_all`], [`reject_all`].
//! - Decoration: metadata through [`SchemaComponentExt`] or [`decorated`],
//!   output transforms with [`SchemaComponentExt::map`].
//! - Composition: [`object`] over [`property`] lists, [`array`], [`tuple`],
//!   [`optional`], [`either`] and [`any_of`].
//! - Definitions: [`RefTable`] registers named components that render under
//!   `$defs` and are referenced with `$ref`.
//!
//! Parse failures carry a [`JsonPath`] to the offending value. Parsing stops
//! at the first failure unless [`ParseOptions::collect_all`] is used with
//! [`SchemaComponent::parse_with`].
//!
//! # Example
//!
//! ```
//! use schema_builder_core::*;
//! use serde_json::json;
//!
//! let user = object((
//!     property("name", string().min_length(1)),
//!     optional_property("age", integer().minimum(0)),
//!     property("tags", array(string()).unique_items(true)),
//! ))
//! .unwrap()
//! .title("User");
//!
//! assert_eq!(
//!     user.schema(),
//!     json!({
//!         "type": "object",
//!         "properties": {
//!             "name": {"type": "string", "minLength": 1},
//!             "age": {"type": "integer", "minimum": 0},
//!             "tags": {"type": "array", "items": {"type": "string"}, "uniqueItems": true}
//!         },
//!         "required": ["name", "tags"],
//!         "title": "User"
//!     })
//! );
//!
//! let (name, age, tags) = user
//!     .parse(&json!({"name": "ada", "tags": ["admin"]}))
//!     .unwrap();
//! assert_eq!((name.as_str(), age, tags.len()), ("ada", None, 1));
//!
//! let error = user.parse(&json!({"name": "ada", "tags": ["a", 1]})).unwrap_err();
//! assert_eq!(error.path.to_string(), "$.tags[1]");
//! ```

mod array;
mod component;
mod conditional;
mod decorate;
mod erased;
mod error;
mod kind;
mod object;
mod options;
mod path;
mod primitives;
mod reference;

pub use array::{ArraySchema, ItemList, TupleSchema, array, tuple};
pub use component::{Encode, SchemaComponent, SchemaComponentExt};
pub use conditional::{AnyOf, Branch, Conditional, Either, any_of, either};
pub use decorate::{
    Decorated, Mapped, Metadata, Optional, Passthrough, TryMapped, decorated, mapped, optional,
    try_mapped,
};
pub use erased::{AnyComponent, ComponentList, erase};
pub use error::{BuilderError, ErrorKind, ParseError, ParseErrors, RefTableError};
pub use kind::JsonKind;
pub use object::{
    ObjectSchema, Properties, Property, PropertyComponent, PropertyList, Record, object,
    optional_property, property,
};
pub use options::{ErrorMode, ParseOptions};
pub use path::{JsonPath, PathSegment};
pub use primitives::{
    BoolSchema, ConstSchema, EnumSchema, IntegerSchema, NullSchema, NumberSchema, StringSchema,
    TrivialSchema, accept_all, boolean, constant, enumeration, integer, null, number, reject_all,
    string,
};
pub use reference::{DEFS_POINTER, RefTable, Reference};

//! Named definitions and `$ref` components.
//!
//! A [`RefTable`] follows a construct-then-freeze discipline: definitions
//! are registered while the table is being built, [`RefTable::freeze`]
//! publishes them as an immutable snapshot, and from then on lookups take no
//! lock and further registration fails with [`RefTableError::Locked`].
//!
//! [`Reference`] components render as `{"$ref": "#/$defs/<id>"}` and parse
//! by delegating to the registered definition.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::decorate::Passthrough;
use crate::erased::AnyComponent;
use crate::error::{ErrorKind, ParseError, ParseErrors, RefTableError};
use crate::options::ParseOptions;
use crate::SchemaComponent;

/// Where `$ref` pointers look for definitions.
pub const DEFS_POINTER: &str = "#/$defs/";

type Definition = (String, AnyComponent<Value>);

/// Frozen definitions, in registration order.
struct Snapshot {
    definitions: Vec<Definition>,
    index: HashMap<String, usize>,
}

impl Snapshot {
    fn new(definitions: Vec<Definition>) -> Self {
        let index = definitions
            .iter()
            .enumerate()
            .map(|(i, (id, _))| (id.clone(), i))
            .collect();
        Self { definitions, index }
    }

    fn get(&self, id: &str) -> Option<&AnyComponent<Value>> {
        self.index.get(id).map(|&i| &self.definitions[i].1)
    }
}

#[derive(Default)]
struct Inner {
    pending: Mutex<Vec<Definition>>,
    frozen: OnceLock<Snapshot>,
}

impl Inner {
    fn pending(&self) -> MutexGuard<'_, Vec<Definition>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared table of named schema definitions.
///
/// Cloning yields another handle to the same table.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
/// use serde_json::json;
///
/// let table = RefTable::new();
/// table.register("positive", integer().minimum(1)).unwrap();
/// table.freeze();
///
/// let count = table.reference("positive").unwrap();
/// assert_eq!(count.schema(), json!({"$ref": "#/$defs/positive"}));
/// assert_eq!(count.parse(&json!(3)), Ok(json!(3)));
/// assert!(count.parse(&json!(0)).is_err());
///
/// assert_eq!(
///     table.register("late", string()),
///     Err(RefTableError::Locked("late".into()))
/// );
/// ```
#[derive(Clone, Default)]
pub struct RefTable {
    inner: Arc<Inner>,
}

impl RefTable {
    /// Creates an empty, unfrozen table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `component` under `id`.
    ///
    /// The definition's parse output is the validated input value.
    ///
    /// # Errors
    ///
    /// [`RefTableError::Locked`] once the table is frozen, and
    /// [`RefTableError::Duplicate`] if `id` is already registered.
    pub fn register<C>(&self, id: impl Into<String>, component: C) -> Result<(), RefTableError>
    where
        C: SchemaComponent + Send + Sync + 'static,
    {
        let id = id.into();
        let mut pending = self.inner.pending();
        if self.inner.frozen.get().is_some() {
            warn!(id = %id, "rejected registration on a frozen reference table");
            return Err(RefTableError::Locked(id));
        }
        if pending.iter().any(|(existing, _)| *existing == id) {
            return Err(RefTableError::Duplicate(id));
        }
        debug!(id = %id, "registered schema definition");
        pending.push((id, AnyComponent::new(Passthrough::new(component))));
        Ok(())
    }

    /// Publishes the registered definitions and locks the table.
    ///
    /// Freezing an already frozen table does nothing.
    pub fn freeze(&self) {
        let mut pending = self.inner.pending();
        if self.inner.frozen.get().is_some() {
            return;
        }
        let definitions = std::mem::take(&mut *pending);
        debug!(count = definitions.len(), "froze reference table");
        let _ = self.inner.frozen.set(Snapshot::new(definitions));
    }

    /// Returns `true` once [`freeze`](Self::freeze) has run.
    pub fn is_frozen(&self) -> bool {
        self.inner.frozen.get().is_some()
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        match self.inner.frozen.get() {
            Some(snapshot) => snapshot.index.contains_key(id),
            None => self.inner.pending().iter().any(|(existing, _)| existing == id),
        }
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<String> {
        match self.inner.frozen.get() {
            Some(snapshot) => snapshot.definitions.iter().map(|(id, _)| id.clone()).collect(),
            None => self.inner.pending().iter().map(|(id, _)| id.clone()).collect(),
        }
    }

    /// Creates a reference to a registered definition.
    ///
    /// # Errors
    ///
    /// [`RefTableError::Unresolved`] if `id` is not registered yet; use
    /// [`forward_reference`](Self::forward_reference) for recursive
    /// definitions.
    pub fn reference(&self, id: impl Into<String>) -> Result<Reference, RefTableError> {
        let id = id.into();
        if !self.contains(&id) {
            return Err(RefTableError::Unresolved(id));
        }
        Ok(self.forward_reference(id))
    }

    /// Creates a reference without checking that `id` exists.
    ///
    /// Resolution happens at parse time, so a definition may refer to itself.
    pub fn forward_reference(&self, id: impl Into<String>) -> Reference {
        Reference {
            id: id.into(),
            table: Arc::downgrade(&self.inner),
        }
    }

    /// Renders the `$defs` map, in registration order.
    pub fn definitions(&self) -> Map<String, Value> {
        match self.inner.frozen.get() {
            Some(snapshot) => render_definitions(&snapshot.definitions),
            None => render_definitions(&self.inner.pending()),
        }
    }
}

fn render_definitions(definitions: &[Definition]) -> Map<String, Value> {
    definitions
        .iter()
        .map(|(id, component)| (id.clone(), component.schema()))
        .collect()
}

impl std::fmt::Debug for RefTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefTable")
            .field("ids", &self.ids())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

thread_local! {
    /// Definitions being parsed on this thread, keyed by definition and
    /// input value address.
    static RESOLVING: RefCell<Vec<(usize, usize)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a definition as in progress on one input value until dropped.
struct Resolving {
    key: (usize, usize),
}

impl Resolving {
    /// Returns `None` if the definition is already being parsed on `value`,
    /// which means the references loop without descending into the input.
    fn enter(definition: &AnyComponent<Value>, value: &Value) -> Option<Self> {
        let key = (
            definition as *const AnyComponent<Value> as usize,
            value as *const Value as usize,
        );
        RESOLVING.with(|resolving| {
            let mut resolving = resolving.borrow_mut();
            if resolving.contains(&key) {
                return None;
            }
            resolving.push(key);
            Some(Self { key })
        })
    }
}

impl Drop for Resolving {
    fn drop(&mut self) {
        RESOLVING.with(|resolving| {
            let mut resolving = resolving.borrow_mut();
            if let Some(position) = resolving.iter().rposition(|key| *key == self.key) {
                resolving.remove(position);
            }
        });
    }
}

/// `{"$ref": "#/$defs/<id>"}`, parsing through the referenced definition.
///
/// Holds a weak handle to its table so that self-referential definitions do
/// not keep the table alive. Parsing fails with
/// [`ErrorKind::UnresolvedReference`] while the table is unfrozen, after it
/// is dropped, or if `id` was never registered. It also fails that way when
/// a definition comes back to itself on the same value without looking
/// inside it, as `a = $ref a` or `a = $ref b, b = $ref a` do; recursion
/// through properties or items is unaffected.
#[derive(Debug, Clone)]
pub struct Reference {
    id: String,
    table: Weak<Inner>,
}

impl Reference {
    /// The referenced definition id.
    pub fn id(&self) -> &str {
        &self.id
    }

    fn unresolved(&self) -> ParseErrors {
        warn!(id = %self.id, "unresolved schema reference");
        self.unresolved_error()
    }

    fn unresolved_error(&self) -> ParseErrors {
        ParseError::new(ErrorKind::UnresolvedReference {
            id: self.id.clone(),
        })
        .into()
    }
}

impl SchemaComponent for Reference {
    type Output = Value;

    fn schema(&self) -> Value {
        json!({ "$ref": format!("{DEFS_POINTER}{}", self.id) })
    }

    fn parse_with(&self, value: &Value, options: &ParseOptions) -> Result<Value, ParseErrors> {
        let Some(table) = self.table.upgrade() else {
            return Err(self.unresolved());
        };
        let Some(definition) = table.frozen.get().and_then(|snapshot| snapshot.get(&self.id)) else {
            return Err(self.unresolved());
        };
        let Some(_resolving) = Resolving::enter(definition, value) else {
            warn!(id = %self.id, "schema reference loops back to itself");
            return Err(self.unresolved_error());
        };
        definition.parse_with(value, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ComponentList, SchemaComponentExt, any_of, array, integer, null, object, optional_property,
        property, string,
    };

    #[test]
    fn test_duplicate_registration_fails() {
        let table = RefTable::new();
        table.register("id", integer()).unwrap();
        assert_eq!(
            table.register("id", string()),
            Err(RefTableError::Duplicate("id".into()))
        );
    }

    #[test]
    fn test_reference_requires_registration() {
        let table = RefTable::new();
        assert_eq!(
            table.reference("missing").unwrap_err(),
            RefTableError::Unresolved("missing".into())
        );
    }

    #[test]
    fn test_parse_before_freeze_is_unresolved() {
        let table = RefTable::new();
        table.register("n", integer()).unwrap();
        let n = table.reference("n").unwrap();

        let error = n.parse(&json!(1)).unwrap_err();
        assert_eq!(error.kind, ErrorKind::UnresolvedReference { id: "n".into() });

        table.freeze();
        assert_eq!(n.parse(&json!(1)), Ok(json!(1)));
    }

    #[test]
    fn test_forward_reference_to_missing_id_fails_at_parse() {
        let table = RefTable::new();
        let dangling = table.forward_reference("ghost");
        table.freeze();

        assert_eq!(dangling.schema(), json!({"$ref": "#/$defs/ghost"}));
        assert!(matches!(
            dangling.parse(&json!(1)).unwrap_err().kind,
            ErrorKind::UnresolvedReference { .. }
        ));
    }

    #[test]
    fn test_recursive_definition() {
        let table = RefTable::new();
        let node = object((
            property("value", integer()),
            optional_property("children", array(table.forward_reference("node"))),
        ))
        .unwrap();
        table.register("node", node).unwrap();
        table.freeze();

        let tree = table.reference("node").unwrap();
        let input = json!({"value": 1, "children": [{"value": 2}, {"value": 3, "children": []}]});
        assert_eq!(tree.parse(&input), Ok(input.clone()));

        let bad = json!({"value": 1, "children": [{"value": 2, "children": [{"value": "x"}]}]});
        let error = tree.parse(&bad).unwrap_err();
        assert_eq!(error.path.to_string(), "$.children[0].children[0].value");
    }

    #[test]
    fn test_self_alias_is_unresolved() {
        let table = RefTable::new();
        table.register("a", table.forward_reference("a")).unwrap();
        table.freeze();

        let error = table.reference("a").unwrap().parse(&json!(1)).unwrap_err();
        assert_eq!(error.kind, ErrorKind::UnresolvedReference { id: "a".into() });
    }

    #[test]
    fn test_alias_chain_is_unresolved() {
        let table = RefTable::new();
        table.register("a", table.forward_reference("b")).unwrap();
        table
            .register("b", table.forward_reference("a").description("loops"))
            .unwrap();
        table.freeze();

        for id in ["a", "b"] {
            let errors = table.reference(id).unwrap().parse_all(&json!({})).unwrap_err();
            assert!(matches!(errors.first().kind, ErrorKind::UnresolvedReference { .. }));
        }
    }

    #[test]
    fn test_looping_union_branch_falls_through() {
        let table = RefTable::new();
        let looping = any_of(
            ComponentList::new()
                .with(table.forward_reference("text"))
                .with_passthrough(string()),
        );
        table.register("text", looping).unwrap();
        table.freeze();

        let text = table.reference("text").unwrap();
        assert_eq!(text.parse(&json!("ok")), Ok(json!("ok")));
        assert!(text.parse(&json!(1)).is_err());
        // The guard is released once parsing returns.
        assert_eq!(text.parse(&json!("again")), Ok(json!("again")));
    }

    #[test]
    fn test_definitions_render_in_registration_order() {
        let table = RefTable::new();
        table.register("b", string()).unwrap();
        table.register("a", integer().description("count")).unwrap();
        table.freeze();

        let definitions = table.definitions();
        let ids: Vec<_> = definitions.keys().cloned().collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(
            definitions["a"],
            json!({"type": "integer", "description": "count"})
        );
    }

    #[test]
    fn test_reference_outliving_table_is_unresolved() {
        let reference = {
            let table = RefTable::new();
            table.register("n", null()).unwrap();
            table.freeze();
            table.reference("n").unwrap()
        };
        assert!(reference.parse(&json!(null)).is_err());
    }

    #[test]
    fn test_concurrent_parsing_through_references() {
        let table = RefTable::new();
        table.register("small", integer().maximum(10)).unwrap();
        table.freeze();
        let choice = any_of(
            ComponentList::new()
                .with(table.reference("small").unwrap())
                .with(string().passthrough()),
        );

        std::thread::scope(|scope| {
            for n in 0..8 {
                let choice = &choice;
                scope.spawn(move || {
                    assert_eq!(choice.parse(&json!(n)), Ok(json!(n)));
                    assert!(choice.parse(&json!(n + 100)).is_err());
                });
            }
        });
    }
}

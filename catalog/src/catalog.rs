//! Named root components rendered as complete JSON Schema documents.
//!
//! A [`SchemaCatalog`] owns a set of documents, each a root component, and
//! the [`RefTable`] of shared definitions they refer to. Building the
//! catalog freezes the table, so documents and definitions are immutable
//! from then on.
//!
//! # Examples
//!
//! ```
//! use schema_builder_catalog::{CatalogConfig, SchemaCatalog};
//! use schema_builder_core::*;
//! use serde_json::json;
//!
//! let definitions = RefTable::new();
//! definitions.register("email", string().format("email")).unwrap();
//!
//! let user = object((
//!     property("name", string()),
//!     property("email", definitions.reference("email").unwrap()),
//! ))
//! .unwrap();
//!
//! let catalog = SchemaCatalog::builder(CatalogConfig::default())
//!     .definitions(definitions)
//!     .document("user", user)
//!     .build()
//!     .unwrap();
//!
//! let document = catalog.render("user").unwrap();
//! assert_eq!(document["$defs"]["email"], json!({"type": "string", "format": "email"}));
//! assert!(catalog.validate("user", &json!({"name": "ada", "email": "a@b.c"})).is_ok());
//! ```

use std::collections::HashSet;
use std::io::{BufWriter, Write};
use std::path::Path;

use schema_builder_core::{AnyComponent, Passthrough, RefTable, SchemaComponent};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::manifest::{DocumentEntry, Manifest};

type Document = (String, AnyComponent<Value>);

/// A frozen set of schema documents sharing one definition table.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    config: CatalogConfig,
    definitions: RefTable,
    documents: Vec<Document>,
}

impl SchemaCatalog {
    /// Returns a new [`CatalogBuilder`].
    pub fn builder(config: CatalogConfig) -> CatalogBuilder {
        CatalogBuilder::new(config)
    }

    /// The configuration the catalog was built with.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// The shared definitions.
    pub fn definitions(&self) -> &RefTable {
        &self.definitions
    }

    /// Document names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|(name, _)| name.as_str())
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if the catalog holds no document.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns `true` if a document is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.component(name).is_some()
    }

    fn component(&self, name: &str) -> Option<&AnyComponent<Value>> {
        self.documents
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, component)| component)
    }

    /// Renders the document `name`.
    ///
    /// The document starts with `$schema` and, when a base id is configured,
    /// `$id`, followed by the root component's keys and a `$defs` map when
    /// the catalog has definitions. Root keys never override the catalog
    /// keys. A root rendered as the boolean `false` becomes `{"not": {}}`.
    pub fn render(&self, name: &str) -> Option<Value> {
        let component = self.component(name)?;

        let mut document = Map::new();
        document.insert("$schema".into(), self.config.dialect.clone().into());
        if let Some(id) = self.config.document_id(name) {
            document.insert("$id".into(), id.into());
        }

        match component.schema() {
            Value::Object(root) => {
                for (key, value) in root {
                    document.entry(key).or_insert(value);
                }
            }
            Value::Bool(false) => {
                document.insert("not".into(), Value::Object(Map::new()));
            }
            _ => {}
        }

        let definitions = self.definitions.definitions();
        if !definitions.is_empty() {
            document
                .entry("$defs")
                .or_insert(Value::Object(definitions));
        }

        Some(Value::Object(document))
    }

    /// Renders every document, in registration order.
    pub fn render_all(&self) -> Vec<(String, Value)> {
        self.names()
            .filter_map(|name| Some((name.to_string(), self.render(name)?)))
            .collect()
    }

    /// Validates `value` against the document `name` with the configured
    /// parse options, returning the accepted value.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownDocument`] if no such document exists,
    /// or [`CatalogError::Invalid`] with every reported parse error.
    pub fn validate(&self, name: &str, value: &Value) -> Result<Value> {
        let component = self
            .component(name)
            .ok_or_else(|| CatalogError::UnknownDocument(name.to_string()))?;
        component
            .parse_with(value, &self.config.parse)
            .map_err(|errors| {
                debug!(document = %name, errors = errors.len(), "value rejected");
                CatalogError::Invalid {
                    document: name.to_string(),
                    errors,
                }
            })
    }

    /// Writes every document to `dir` as `<name><extension>`, creating the
    /// directory if needed, and returns the manifest of what was written.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](CatalogError::Io) if the directory or a file cannot
    /// be written, or [`Json`](CatalogError::Json) if serialization fails.
    pub fn write_dir(&self, dir: impl AsRef<Path>) -> Result<Manifest> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let mut manifest = Manifest::new(self.config.dialect.clone());
        for (name, document) in self.render_all() {
            let file_name = self.config.file_name(&name);
            let file = std::fs::File::create(dir.join(&file_name))?;
            let mut writer = BufWriter::new(file);
            if self.config.output.pretty {
                serde_json::to_writer_pretty(&mut writer, &document)?;
            } else {
                serde_json::to_writer(&mut writer, &document)?;
            }
            writer.write_all(b"\n")?;
            writer.flush()?;

            debug!(document = %name, file = %file_name, "wrote schema document");
            manifest.insert(
                name,
                DocumentEntry {
                    file: file_name,
                    checksum: Manifest::checksum(&document),
                },
            );
        }

        Ok(manifest)
    }
}

/// Collects definitions and documents for a [`SchemaCatalog`].
#[derive(Debug)]
pub struct CatalogBuilder {
    config: CatalogConfig,
    definitions: RefTable,
    documents: Vec<Document>,
}

impl CatalogBuilder {
    /// Creates a builder with an empty definition table.
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            config,
            definitions: RefTable::new(),
            documents: Vec::new(),
        }
    }

    /// Uses `table` as the catalog's definitions.
    pub fn definitions(mut self, table: RefTable) -> Self {
        self.definitions = table;
        self
    }

    /// Adds a document whose root is `component`.
    pub fn document<C>(mut self, name: impl Into<String>, component: C) -> Self
    where
        C: SchemaComponent + Send + Sync + 'static,
    {
        self.documents
            .push((name.into(), AnyComponent::new(Passthrough::new(component))));
        self
    }

    /// Freezes the definition table and builds the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidDocumentName`] for a name that is
    /// empty, `.`, `..` or contains a path separator, and
    /// [`CatalogError::DuplicateDocument`] if two documents share a name.
    pub fn build(self) -> Result<SchemaCatalog> {
        let mut seen = HashSet::new();
        for (name, _) in &self.documents {
            if !is_file_name(name) {
                return Err(CatalogError::InvalidDocumentName(name.clone()));
            }
            if !seen.insert(name.as_str()) {
                return Err(CatalogError::DuplicateDocument(name.clone()));
            }
        }

        self.definitions.freeze();
        debug!(
            documents = self.documents.len(),
            definitions = self.definitions.ids().len(),
            "built schema catalog"
        );

        Ok(SchemaCatalog {
            config: self.config,
            definitions: self.definitions,
            documents: self.documents,
        })
    }
}

/// Names become file names under the output directory, so they must stay
/// inside it.
fn is_file_name(name: &str) -> bool {
    !matches!(name, "" | "." | "..") && !name.contains(['/', '\\', '\0'])
}

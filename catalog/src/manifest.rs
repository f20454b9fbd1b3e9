//! Checksum manifests for written schema documents.
//!
//! [`SchemaCatalog::write_dir`](crate::SchemaCatalog::write_dir) returns a
//! [`Manifest`] recording, per document, the file it was written to and the
//! SHA-256 checksum of its rendered schema. Comparing the manifest of a fresh
//! build with the one committed alongside the documents tells whether the
//! published schemas drifted:
//!
//! - **Added / removed**: a document exists in only one of the manifests.
//! - **Changed**: its checksum differs, or the dialect changed (which
//!   changes every document).
//!
//! Checksums are taken over the compact JSON serialization, so they do not
//! depend on the `pretty` output setting.
//!
//! # Examples
//!
//! ```no_run
//! use schema_builder_catalog::Manifest;
//!
//! let committed = Manifest::load("schemas/manifest.json").unwrap();
//! let drifted = committed.verify("schemas/").unwrap();
//! assert!(drifted.is_empty(), "edited by hand: {drifted:?}");
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::Result;

/// Manifest entry of one written document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    /// File name relative to the output directory.
    pub file: String,
    /// SHA-256 hex digest of the rendered document.
    pub checksum: String,
}

/// Documents that differ between two manifests, each list sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDiff {
    /// Present only in the newer manifest.
    pub added: Vec<String>,
    /// Present only in the older manifest.
    pub removed: Vec<String>,
    /// Present in both with different content.
    pub changed: Vec<String>,
}

impl ManifestDiff {
    /// Returns `true` if the manifests describe the same documents.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Every affected document name.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.added
            .iter()
            .chain(&self.removed)
            .chain(&self.changed)
            .map(String::as_str)
    }
}

/// Written documents keyed by name.
///
/// Persisted as pretty-printed JSON; entries serialize in name order so
/// that the manifest itself is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest format version.
    pub version: String,
    /// Dialect the documents were rendered for.
    pub dialect: String,
    /// Per-document entries keyed by document name.
    pub documents: BTreeMap<String, DocumentEntry>,
}

impl Manifest {
    /// Creates an empty manifest for documents of `dialect`.
    pub fn new(dialect: impl Into<String>) -> Self {
        Self {
            version: "1.0".to_string(),
            dialect: dialect.into(),
            documents: BTreeMap::new(),
        }
    }

    /// Loads a manifest from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::CatalogError::Io) if the file cannot be read,
    /// or [`Json`](crate::CatalogError::Json) if the content is not valid
    /// manifest JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let manifest = serde_json::from_reader(reader)?;
        Ok(manifest)
    }

    /// Saves the manifest as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::CatalogError::Io) if the file cannot be
    /// written, or [`Json`](crate::CatalogError::Json) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Inserts or replaces the entry of `name`.
    pub fn insert(&mut self, name: impl Into<String>, entry: DocumentEntry) {
        self.documents.insert(name.into(), entry);
    }

    /// Looks up the entry of a document.
    pub fn get(&self, name: &str) -> Option<&DocumentEntry> {
        self.documents.get(name)
    }

    /// Returns `true` if the manifest has an entry for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if no document is recorded.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// SHA-256 hex digest of the compact serialization of `document`.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_builder_catalog::Manifest;
    /// use serde_json::json;
    ///
    /// let a = Manifest::checksum(&json!({"type": "string"}));
    /// assert_eq!(a.len(), 64);
    /// assert_eq!(a, Manifest::checksum(&json!({"type": "string"})));
    /// assert_ne!(a, Manifest::checksum(&json!({"type": "integer"})));
    /// ```
    pub fn checksum(document: &Value) -> String {
        let hash = Sha256::digest(document.to_string().as_bytes());
        format!("{:x}", hash)
    }

    /// Compares `self` (the older manifest) with `other` (the newer one).
    ///
    /// A dialect change marks every document present in both as changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_builder_catalog::{DocumentEntry, Manifest};
    ///
    /// let entry = |checksum: &str| DocumentEntry {
    ///     file: "user.schema.json".into(),
    ///     checksum: checksum.into(),
    /// };
    ///
    /// let mut old = Manifest::new("https://json-schema.org/draft/2020-12/schema");
    /// old.insert("user", entry("abc"));
    ///
    /// let mut new = old.clone();
    /// new.insert("user", entry("def"));
    /// new.insert("order", entry("123"));
    ///
    /// let diff = old.diff(&new);
    /// assert_eq!(diff.added, vec!["order"]);
    /// assert_eq!(diff.changed, vec!["user"]);
    /// assert!(diff.removed.is_empty());
    /// ```
    pub fn diff(&self, other: &Manifest) -> ManifestDiff {
        let dialect_changed = self.dialect != other.dialect;
        let mut diff = ManifestDiff::default();

        for (name, entry) in &self.documents {
            match other.documents.get(name) {
                None => diff.removed.push(name.clone()),
                Some(other_entry) => {
                    if dialect_changed || entry.checksum != other_entry.checksum {
                        diff.changed.push(name.clone());
                    }
                }
            }
        }

        for name in other.documents.keys() {
            if !self.documents.contains_key(name) {
                diff.added.push(name.clone());
            }
        }

        diff
    }

    /// Checks the files under `dir` against the recorded checksums.
    ///
    /// Returns the names of documents whose file is missing or whose content
    /// no longer matches, in name order.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::CatalogError::Io) if an existing file cannot be
    /// read, or [`Json`](crate::CatalogError::Json) if it is not valid JSON.
    pub fn verify(&self, dir: impl AsRef<Path>) -> Result<Vec<String>> {
        let dir = dir.as_ref();
        let mut drifted = Vec::new();

        for (name, entry) in &self.documents {
            let bytes = match std::fs::read(dir.join(&entry.file)) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    warn!(document = %name, file = %entry.file, "schema document is missing");
                    drifted.push(name.clone());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let document: Value = serde_json::from_slice(&bytes)?;
            if Self::checksum(&document) != entry.checksum {
                warn!(document = %name, file = %entry.file, "schema document drifted");
                drifted.push(name.clone());
            }
        }

        Ok(drifted)
    }
}

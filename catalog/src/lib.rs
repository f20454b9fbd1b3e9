//! Schema documents built from `schema-builder-core` components.
//!
//! A [`SchemaCatalog`] gathers named root components and the shared
//! definitions they reference, renders each as a complete JSON Schema
//! document (`$schema`, `$id`, `$defs`), validates values against them and
//! writes them to disk. The [`Manifest`] returned by a write records a
//! checksum per document so that later builds can detect drift.
//!
//! # Quick start
//!
//! ```no_run
//! use schema_builder_catalog::{CatalogConfig, Manifest, SchemaCatalog};
//! use schema_builder_core::*;
//!
//! let config = CatalogConfig::load("schemas/catalog.yml").unwrap();
//! let catalog = SchemaCatalog::builder(config)
//!     .document("tag", string().pattern("^[a-z-]+$").unwrap())
//!     .document("port", integer().minimum(1).maximum(65535))
//!     .build()
//!     .unwrap();
//!
//! // Regenerate and compare against the committed manifest
//! let committed = Manifest::load("schemas/manifest.json").unwrap();
//! let fresh = catalog.write_dir("schemas/").unwrap();
//! let diff = committed.diff(&fresh);
//! for name in diff.names() {
//!     println!("schema changed: {name}");
//! }
//! fresh.save("schemas/manifest.json").unwrap();
//! ```

mod catalog;
mod config;
mod error;
mod manifest;

pub use catalog::{CatalogBuilder, SchemaCatalog};
pub use config::{CatalogConfig, DRAFT_2020_12, OutputConfig};
pub use error::{CatalogError, Result};
pub use manifest::{DocumentEntry, Manifest, ManifestDiff};

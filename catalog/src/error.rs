//! Error types for catalog operations.
//!
//! One enum covers file I/O, serialization, catalog construction and
//! validation of input documents.

use schema_builder_core::{BuilderError, ParseErrors, RefTableError};
use thiserror::Error;

/// Errors that can occur while building, rendering or writing a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Definition table misuse.
    #[error("reference error: {0}")]
    Reference(#[from] RefTableError),

    /// A component could not be built.
    #[error("builder error: {0}")]
    Builder(#[from] BuilderError),

    /// Two documents were registered under one name.
    #[error("duplicate document: {0}")]
    DuplicateDocument(String),

    /// A document name that cannot be used as a file name.
    #[error("invalid document name: {0:?}")]
    InvalidDocumentName(String),

    /// No document is registered under the name.
    #[error("unknown document: {0}")]
    UnknownDocument(String),

    /// A value was rejected by a document's root component.
    #[error("document `{document}` rejected the value: {errors}")]
    Invalid {
        document: String,
        errors: ParseErrors,
    },
}

/// Convenience alias for results with [`CatalogError`].
pub type Result<T> = std::result::Result<T, CatalogError>;

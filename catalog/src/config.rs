//! Catalog configuration.
//!
//! Controls the dialect and `$id` of rendered documents, how input values
//! are validated and how documents are written to disk.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! dialect: https://json-schema.org/draft/2020-12/schema
//! base_id: https://schemas.example.com/v1/
//! parse:
//!   mode: collect_all
//!   max_errors: 20
//! output:
//!   pretty: true
//!   extension: .schema.json
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::io::{BufReader, BufWriter};
use std::path::Path;

use schema_builder_core::ParseOptions;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Meta-schema URI of JSON Schema draft 2020-12.
pub const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

/// How documents are serialized by [`write_dir`](crate::SchemaCatalog::write_dir).
///
/// # Examples
///
/// ```
/// # use schema_builder_catalog::OutputConfig;
/// let output = OutputConfig::default();
/// assert!(output.pretty);
/// assert_eq!(output.extension, ".schema.json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print with two-space indentation.
    pub pretty: bool,
    /// Appended to the document name to form the file name and `$id`.
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            extension: ".schema.json".to_string(),
        }
    }
}

/// Top-level catalog configuration.
///
/// Loaded from a YAML file, typically kept next to the code that builds the
/// catalog.
///
/// # Examples
///
/// ```
/// use schema_builder_catalog::CatalogConfig;
///
/// let config = CatalogConfig::from_yaml_str("base_id: https://example.com/schemas").unwrap();
/// assert_eq!(
///     config.document_id("user").as_deref(),
///     Some("https://example.com/schemas/user.schema.json")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Configuration format version.
    pub version: String,
    /// Meta-schema URI emitted as `$schema`.
    pub dialect: String,
    /// Prefix of every document `$id`; no `$id` is emitted when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_id: Option<String>,
    /// Options used by [`validate`](crate::SchemaCatalog::validate).
    pub parse: ParseOptions,
    /// File output settings.
    pub output: OutputConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            dialect: DRAFT_2020_12.to_string(),
            base_id: None,
            parse: ParseOptions::default(),
            output: OutputConfig::default(),
        }
    }
}

impl CatalogConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::CatalogError::Io) if the file cannot be read,
    /// or [`Yaml`](crate::CatalogError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`Yaml`](crate::CatalogError::Yaml) if parsing fails.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::CatalogError::Io) if the file cannot be
    /// written, or [`Yaml`](crate::CatalogError::Yaml) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// File name of the document `name`.
    pub fn file_name(&self, name: &str) -> String {
        format!("{name}{}", self.output.extension)
    }

    /// `$id` of the document `name`, if a base id is configured.
    ///
    /// A `/` is inserted between the base and the file name when the base
    /// does not already end with one.
    pub fn document_id(&self, name: &str) -> Option<String> {
        let base = self.base_id.as_deref()?;
        let separator = if base.ends_with('/') { "" } else { "/" };
        Some(format!("{base}{separator}{}", self.file_name(name)))
    }
}

#[cfg(test)]
mod tests {
    use schema_builder_core::ErrorMode;

    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "2.0"
dialect: https://json-schema.org/draft/2019-09/schema
base_id: https://schemas.example.com/v1/
parse:
  mode: collect_all
  max_errors: 20
output:
  pretty: false
  extension: .json
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config = CatalogConfig::from_yaml_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "2.0");
        assert_eq!(config.dialect, "https://json-schema.org/draft/2019-09/schema");
        assert_eq!(config.base_id.as_deref(), Some("https://schemas.example.com/v1/"));
        assert_eq!(config.parse.mode, ErrorMode::CollectAll);
        assert_eq!(config.parse.max_errors, Some(20));
        assert!(!config.output.pretty);
        assert_eq!(config.output.extension, ".json");
    }

    #[test]
    fn test_deserialize_minimal() {
        let config = CatalogConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.dialect, DRAFT_2020_12);
        assert_eq!(config.parse, ParseOptions::first_error());
    }

    #[test]
    fn test_partial_output_section() {
        let config = CatalogConfig::from_yaml_str("output:\n  pretty: false\n").unwrap();
        assert!(!config.output.pretty);
        assert_eq!(config.output.extension, ".schema.json");
    }

    #[test]
    fn test_document_id() {
        let mut config = CatalogConfig::default();
        assert_eq!(config.document_id("user"), None);

        config.base_id = Some("https://example.com/v1/".into());
        assert_eq!(
            config.document_id("user").as_deref(),
            Some("https://example.com/v1/user.schema.json")
        );

        config.base_id = Some("urn:schemas".into());
        config.output.extension = ".json".into();
        assert_eq!(config.document_id("user").as_deref(), Some("urn:schemas/user.json"));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yml");

        let config = CatalogConfig::from_yaml_str(sample_yaml()).unwrap();
        config.save(&path).unwrap();

        assert_eq!(CatalogConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(CatalogConfig::from_yaml_str("parse: {mode: sometimes}").is_err());
    }
}

//! Parse configuration.

use serde::{Deserialize, Serialize};

/// How a parse reacts to the first rejected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// Stop at the first error (the default).
    #[default]
    FirstError,
    /// Keep going and report every error found.
    CollectAll,
}

/// Options threaded through every [`parse_with`] call of a component tree.
///
/// Deserializable so that callers can keep them in a config file:
///
/// ```
/// use schema_builder_core::{ErrorMode, ParseOptions};
///
/// let options: ParseOptions =
///     serde_json::from_str(r#"{"mode": "collect_all", "max_errors": 10}"#).unwrap();
/// assert_eq!(options.mode, ErrorMode::CollectAll);
/// assert_eq!(options.max_errors, Some(10));
///
/// let defaults: ParseOptions = serde_json::from_str("{}").unwrap();
/// assert_eq!(defaults, ParseOptions::first_error());
/// ```
///
/// [`parse_with`]: crate::SchemaComponent::parse_with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Error reporting mode.
    pub mode: ErrorMode,
    /// Upper bound on collected errors in [`ErrorMode::CollectAll`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_errors: Option<usize>,
}

impl ParseOptions {
    /// Short-circuit on the first error.
    pub const fn first_error() -> Self {
        Self {
            mode: ErrorMode::FirstError,
            max_errors: None,
        }
    }

    /// Collect every error.
    pub const fn collect_all() -> Self {
        Self {
            mode: ErrorMode::CollectAll,
            max_errors: None,
        }
    }

    /// Caps the number of collected errors. Zero is treated as one.
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = Some(max_errors.max(1));
        self
    }
}

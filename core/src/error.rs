//! Error types.
//!
//! Parse failures are values, never panics: every rejection is a
//! [`ParseError`] carrying the [`JsonPath`] of the offending value and an
//! [`ErrorKind`]. Collect-all parsing returns [`ParseErrors`], a non-empty
//! list whose first entry is the error first-error parsing would report.
//!
//! Construction problems ([`BuilderError`]) and reference table misuse
//! ([`RefTableError`]) are separate types since they happen before any input
//! is seen.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::options::{ErrorMode, ParseOptions};
use crate::{JsonKind, JsonPath, PathSegment};

/// What went wrong while parsing a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    /// The value has the wrong JSON kind.
    #[error("expected {expected}, found {actual}")]
    TypeMismatch { expected: JsonKind, actual: JsonKind },
    /// A required object member is absent.
    #[error("missing required key `{key}`")]
    MissingKey { key: String },
    /// A fixed-arity array has the wrong length.
    #[error("expected {expected} items, found {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    /// An array element was rejected.
    #[error("item {index}: {inner}")]
    Indexed { index: usize, inner: Box<ErrorKind> },
    /// A refinement keyword (`minLength`, `enum`, ...) rejected the value.
    #[error("`{rule}` violated: {detail}")]
    ConstraintViolation { rule: String, detail: String },
    /// A `$ref` could not be resolved against its reference table.
    #[error("unresolved reference `{id}`")]
    UnresolvedReference { id: String },
    /// Every alternative of a union rejected the value.
    #[error("no alternative matched: {}", join_branches(.branches))]
    UnionExhausted { branches: Vec<ParseErrors> },
}

impl ErrorKind {
    /// Shorthand for [`ErrorKind::ConstraintViolation`].
    pub fn violation(rule: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            rule: rule.into(),
            detail: detail.into(),
        }
    }
}

fn join_branches(branches: &[ParseErrors]) -> String {
    branches
        .iter()
        .enumerate()
        .map(|(i, errors)| format!("[{i}] {errors}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A single parse failure and where it happened.
///
/// # Examples
///
/// ```
/// use schema_builder_core::{ErrorKind, ParseError, PathSegment};
///
/// let error = ParseError::new(ErrorKind::MissingKey { key: "id".into() })
///     .within(PathSegment::from("owner"));
/// assert_eq!(error.to_string(), "$.owner: missing required key `id`");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{path}: {kind}")]
pub struct ParseError {
    /// Location of the rejected value, relative to the parsed input.
    pub path: JsonPath,
    /// Failure description.
    pub kind: ErrorKind,
}

impl ParseError {
    /// Creates an error located at the root of the parsed value.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            path: JsonPath::root(),
            kind,
        }
    }

    /// Type mismatch between `expected` and the kind of `value`.
    pub fn type_mismatch(expected: JsonKind, value: &Value) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            expected,
            actual: JsonKind::of(value),
        })
    }

    /// Refinement failure for the keyword `rule`.
    pub fn violation(rule: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::violation(rule, detail))
    }

    /// Prepends `segment` to the path.
    pub fn within(mut self, segment: PathSegment) -> Self {
        self.path.prepend(segment);
        self
    }

    /// Marks this error as coming from array element `index`.
    ///
    /// The index is prepended to the path and the kind is wrapped in
    /// [`ErrorKind::Indexed`].
    pub fn indexed(self, index: usize) -> Self {
        let mut path = self.path;
        path.prepend(PathSegment::Index(index));
        Self {
            path,
            kind: ErrorKind::Indexed {
                index,
                inner: Box::new(self.kind),
            },
        }
    }
}

/// A non-empty list of parse failures.
///
/// The first entry is always the error a first-error parse reports for the
/// same input.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ParseErrors {
    first: ParseError,
    rest: Vec<ParseError>,
}

impl ParseErrors {
    /// The first error.
    pub fn first(&self) -> &ParseError {
        &self.first
    }

    /// Consumes the list, keeping only the first error.
    pub fn into_first(self) -> ParseError {
        self.first
    }

    /// Number of errors (at least one).
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    /// Iterates errors in the order they were found.
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    /// Converts into a plain vector.
    pub fn into_vec(self) -> Vec<ParseError> {
        let mut errors = Vec::with_capacity(self.len());
        errors.push(self.first);
        errors.extend(self.rest);
        errors
    }

    /// Prepends `segment` to every error path.
    pub fn within(self, segment: PathSegment) -> Self {
        self.map(|error| error.within(segment.clone()))
    }

    /// Marks every error as coming from array element `index`.
    pub fn indexed(self, index: usize) -> Self {
        self.map(|error| error.indexed(index))
    }

    fn map(self, f: impl Fn(ParseError) -> ParseError) -> Self {
        Self {
            first: f(self.first),
            rest: self.rest.into_iter().map(f).collect(),
        }
    }

    fn extend(&mut self, other: ParseErrors) {
        self.rest.push(other.first);
        self.rest.extend(other.rest);
    }

    fn truncate(&mut self, len: usize) {
        self.rest.truncate(len.saturating_sub(1));
    }
}

impl From<ParseError> for ParseErrors {
    fn from(first: ParseError) -> Self {
        Self {
            first,
            rest: Vec::new(),
        }
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

/// Accumulates errors according to [`ParseOptions`].
///
/// In first-error mode [`record`](Collector::record) hands the error straight
/// back so that `?` short-circuits; in collect-all mode it stores the error
/// and lets the caller continue until `max_errors` is reached.
pub(crate) struct Collector {
    options: ParseOptions,
    errors: Option<ParseErrors>,
}

impl Collector {
    pub(crate) fn new(options: &ParseOptions) -> Self {
        Self {
            options: *options,
            errors: None,
        }
    }

    pub(crate) fn record(&mut self, errors: impl Into<ParseErrors>) -> Result<(), ParseErrors> {
        let errors = errors.into();
        if self.options.mode == ErrorMode::FirstError {
            return Err(errors);
        }

        let mut collected = match self.errors.take() {
            Some(mut collected) => {
                collected.extend(errors);
                collected
            }
            None => errors,
        };

        if let Some(max) = self.options.max_errors {
            if collected.len() >= max {
                collected.truncate(max);
                return Err(collected);
            }
        }

        self.errors = Some(collected);
        Ok(())
    }

    /// Unwraps a successful result or records its errors, yielding `None`.
    pub(crate) fn capture<T>(
        &mut self,
        result: Result<T, ParseErrors>,
    ) -> Result<Option<T>, ParseErrors> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(errors) => self.record(errors).map(|()| None),
        }
    }

    pub(crate) fn finish(self) -> Result<(), ParseErrors> {
        match self.errors {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }

    /// Like [`finish`](Self::finish) but also yields a value assembled from
    /// captured slots.
    pub(crate) fn finish_with<T>(self, value: Option<T>) -> Result<T, ParseErrors> {
        match (self.errors, value) {
            (Some(errors), _) => Err(errors),
            (None, Some(value)) => Ok(value),
            (None, None) => unreachable!("an empty slot always has a recorded error"),
        }
    }
}

/// Problems detected while building a component tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// Two properties of one object share a key.
    #[error("duplicate property key: {0}")]
    DuplicateKey(String),
    /// A `pattern` refinement is not a valid regular expression.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    /// A refinement was given a value JSON Schema does not allow.
    #[error("invalid `{keyword}`: {reason}")]
    InvalidConstraint { keyword: String, reason: String },
}

/// Reference table misuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefTableError {
    /// The id is already registered.
    #[error("duplicate reference id: {0}")]
    Duplicate(String),
    /// Registration attempted after [`freeze`](crate::RefTable::freeze).
    #[error("reference table is frozen; cannot register `{0}`")]
    Locked(String),
    /// The id is not registered.
    #[error("unresolved reference id: {0}")]
    Unresolved(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing(key: &str) -> ParseError {
        ParseError::new(ErrorKind::MissingKey { key: key.into() })
    }

    #[test]
    fn test_indexed_wraps_kind_and_prepends_index() {
        let error = ParseError::type_mismatch(JsonKind::String, &Value::Bool(true)).indexed(3);

        assert_eq!(error.path.to_string(), "$[3]");
        assert_eq!(
            error.kind,
            ErrorKind::Indexed {
                index: 3,
                inner: Box::new(ErrorKind::TypeMismatch {
                    expected: JsonKind::String,
                    actual: JsonKind::Boolean,
                }),
            }
        );
    }

    #[test]
    fn test_first_error_mode_short_circuits() {
        let options = ParseOptions::first_error();
        let mut collector = Collector::new(&options);

        let result = collector.record(missing("a"));
        assert_eq!(result, Err(ParseErrors::from(missing("a"))));
    }

    #[test]
    fn test_collect_all_mode_accumulates_in_order() {
        let options = ParseOptions::collect_all();
        let mut collector = Collector::new(&options);

        collector.record(missing("a")).unwrap();
        collector.record(missing("b")).unwrap();

        let errors = collector.finish().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first(), &missing("a"));
    }

    #[test]
    fn test_collect_all_respects_max_errors() {
        let options = ParseOptions::collect_all().with_max_errors(2);
        let mut collector = Collector::new(&options);

        collector.record(missing("a")).unwrap();
        let errors = collector.record(missing("b")).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_errors_display_joins_entries() {
        let mut errors = ParseErrors::from(missing("a"));
        errors.extend(ParseErrors::from(missing("b")));
        assert_eq!(
            errors.to_string(),
            "$: missing required key `a`; $: missing required key `b`"
        );
    }
}

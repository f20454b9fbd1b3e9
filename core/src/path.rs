//! Locations inside an input value.
//!
//! A [`JsonPath`] is the sequence of object keys and array indices leading
//! from the value handed to `parse` down to the value that was rejected.
//! Combinators build it from the inside out: each one prepends its own key
//! or index as an error travels back up.

use std::collections::VecDeque;
use std::fmt;

/// One step of a [`JsonPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object member name.
    Key(String),
    /// Array position.
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Path from the root of an input value to a nested value.
///
/// Renders as `$` for the root, `.key` for plain keys, `["key"]` for keys
/// that need quoting and `[n]` for indices.
///
/// # Examples
///
/// ```
/// use schema_builder_core::{JsonPath, PathSegment};
///
/// let path: JsonPath = [PathSegment::from("tags"), PathSegment::from(1)]
///     .into_iter()
///     .collect();
/// assert_eq!(path.to_string(), "$.tags[1]");
/// assert_eq!(JsonPath::root().to_string(), "$");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath {
    segments: VecDeque<PathSegment>,
}

impl JsonPath {
    /// The empty path, pointing at the parsed value itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` for the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Inserts `segment` in front of the existing segments.
    pub fn prepend(&mut self, segment: PathSegment) {
        self.segments.push_front(segment);
    }

    /// Iterates segments from the outermost to the innermost.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for JsonPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Key(key) if is_plain_key(key) => write!(f, ".{key}")?,
                PathSegment::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

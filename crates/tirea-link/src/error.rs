//! Error types for tirea-link operations.

use crate::{Path, Seg};
use thiserror::Error;

/// Result type alias for tirea-link operations.
pub type LinkResult<T> = Result<T, LinkError>;

/// Errors that can occur while binding or writing through a link.
///
/// The first three are raised by `Linker::bind` before any link exists; they
/// mark a malformed call site, not a runtime condition.
#[derive(Debug, Error)]
pub enum LinkError {
    /// No key was supplied to bind.
    #[error("missing key")]
    MissingKey,

    /// An empty sequence was supplied as the key path.
    #[error("empty path passed as key")]
    EmptyPath,

    /// A nested path was requested on a root item that is not a persistent container.
    #[error("not a persistent container: state.{key}")]
    NotPersistentContainer {
        /// The top-level key holding the offending item.
        key: String,
    },

    /// A segment does not fit the node it is applied to.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Path up to and including the offending segment.
        path: Path,
        /// The node kind the segment requires.
        expected: &'static str,
        /// The node kind actually found.
        found: &'static str,
    },

    /// List index past the end of the list.
    #[error("index {index} out of bounds (len: {len}) at path {path}")]
    IndexOutOfBounds {
        /// Path up to and including the index segment.
        path: Path,
        /// The index that was accessed.
        index: usize,
        /// The actual length of the list.
        len: usize,
    },

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LinkError {
    /// Create a not-a-container error for a top-level key.
    #[inline]
    pub fn not_persistent_container(key: impl Into<String>) -> Self {
        LinkError::NotPersistentContainer { key: key.into() }
    }

    /// Create a type mismatch error.
    #[inline]
    pub fn type_mismatch(path: Path, expected: &'static str, found: &'static str) -> Self {
        LinkError::TypeMismatch {
            path,
            expected,
            found,
        }
    }

    /// Create an index out of bounds error.
    #[inline]
    pub fn index_out_of_bounds(path: Path, index: usize, len: usize) -> Self {
        LinkError::IndexOutOfBounds { path, index, len }
    }

    /// Prefix the path carried by a write error with `root`, so a failure
    /// inside a root item reports the full bound path.
    #[must_use]
    pub fn under(self, root: Seg) -> Self {
        let prefixed = |path: Path| std::iter::once(root).chain(path).collect::<Path>();
        match self {
            LinkError::TypeMismatch {
                path,
                expected,
                found,
            } => LinkError::TypeMismatch {
                path: prefixed(path),
                expected,
                found,
            },
            LinkError::IndexOutOfBounds { path, index, len } => LinkError::IndexOutOfBounds {
                path: prefixed(path),
                index,
                len,
            },
            other => other,
        }
    }

    /// Returns true for the errors `bind` raises on a malformed call.
    pub fn is_bind_error(&self) -> bool {
        matches!(
            self,
            LinkError::MissingKey | LinkError::EmptyPath | LinkError::NotPersistentContainer { .. }
        )
    }
}

/// Get the type name of a plain JSON value.
#[inline]
pub fn value_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

//! Path tracking for document traversal.
//!
//! [`ContentPath`] is the stack of object field names between the traversal
//! root and the current position. Arrays never add a segment, so every
//! element of an array lives at the path of the field holding the array.

use crate::error::{FlatObjectError, Result};

/// Separator placed between path segments in [`ContentPath::as_text`].
pub const PATH_SEPARATOR: char = '.';

/// Ordered stack of field-name segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentPath {
    segments: Vec<String>,
}

impl ContentPath {
    /// Create an empty path.
    pub fn new() -> Self {
        ContentPath {
            segments: Vec::new(),
        }
    }

    /// Enter a named object field.
    pub fn push<S: Into<String>>(&mut self, segment: S) {
        self.segments.push(segment.into());
    }

    /// Leave the most recently entered field.
    ///
    /// Popping an empty path means the traversal lost track of its own
    /// nesting and is reported as an internal error.
    pub fn pop(&mut self) -> Result<String> {
        self.segments
            .pop()
            .ok_or_else(|| FlatObjectError::internal("cannot pop an empty content path"))
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The segments joined with [`PATH_SEPARATOR`].
    pub fn as_text(&self) -> String {
        self.path_as_text(None)
    }

    /// The path extended with an optional leaf name, e.g. `user.id` for the
    /// path `user` and the leaf `id`.
    pub fn path_as_text(&self, leaf: Option<&str>) -> String {
        let mut text = String::new();
        for (i, segment) in self.segments.iter().map(String::as_str).chain(leaf).enumerate() {
            if i > 0 {
                text.push(PATH_SEPARATOR);
            }
            text.push_str(segment);
        }
        text
    }
}

//! Field mapping layer.
//!
//! A mapping declares which top-level fields of a document are flat-object
//! fields and how they are indexed. [`DocumentMapper`] walks a source
//! document and hands each mapped field to its [`FlatObjectFieldMapper`],
//! collecting the produced entries in a [`ParseContext`].
//!
//! # Examples
//!
//! ```
//! use flatobject::mapper::DocumentMapper;
//!
//! let mapper = DocumentMapper::from_json(r#"{
//!     "properties": {
//!         "attrs": { "type": "flat", "doc_values": false }
//!     }
//! }"#).unwrap();
//!
//! let entries = mapper.parse(r#"{"id": 1, "attrs": {"color": "red"}}"#).unwrap();
//! let terms: Vec<&str> = entries.iter().filter_map(|e| e.payload_str()).collect();
//! assert_eq!(terms, vec!["red", "color\u{7}red", "attrs"]);
//! ```

use crate::index::entry::IndexableEntry;

pub mod document;
pub mod flat_object;

pub use document::DocumentMapper;
pub use flat_object::{FLAT_TYPE, FlatFieldType, FlatObjectFieldMapper, FlatObjectMapping};

/// Field recording which fields a document has values for, written when a
/// field has no doc values to answer `exists` queries from.
pub const FIELD_NAMES_FIELD: &str = "_field_names";

/// Entries collected while parsing one document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParseContext {
    entries: Vec<IndexableEntry>,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: IndexableEntry) {
        self.entries.push(entry);
    }

    pub fn add_all(&mut self, entries: Vec<IndexableEntry>) {
        self.entries.extend(entries);
    }

    /// Record that the document has a value for `field_name`.
    pub fn add_field_name(&mut self, field_name: &str) {
        self.add(IndexableEntry::posting(FIELD_NAMES_FIELD, field_name));
    }

    pub fn entries(&self) -> &[IndexableEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<IndexableEntry> {
        self.entries
    }
}

//! Indexable entries produced by flattening.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where an entry is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A term in the inverted index.
    Posting,
    /// A value in the columnar doc-values store.
    Column,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Posting => f.write_str("posting"),
            EntryKind::Column => f.write_str("column"),
        }
    }
}

/// A single field/value pair ready to be handed to an index writer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexableEntry {
    pub field_name: String,
    pub payload: Vec<u8>,
    pub kind: EntryKind,
}

impl IndexableEntry {
    pub fn new<S: Into<String>, B: Into<Vec<u8>>>(field_name: S, payload: B, kind: EntryKind) -> Self {
        IndexableEntry {
            field_name: field_name.into(),
            payload: payload.into(),
            kind,
        }
    }

    /// A term for the inverted index.
    pub fn posting<S: Into<String>, B: Into<Vec<u8>>>(field_name: S, payload: B) -> Self {
        Self::new(field_name, payload, EntryKind::Posting)
    }

    /// A value for the doc-values store.
    pub fn column<S: Into<String>, B: Into<Vec<u8>>>(field_name: S, payload: B) -> Self {
        Self::new(field_name, payload, EntryKind::Column)
    }

    /// The payload as text, if it is valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

impl fmt::Display for IndexableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.kind,
            self.field_name,
            String::from_utf8_lossy(&self.payload).escape_debug()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_constructors() {
        let entry = IndexableEntry::posting("attrs", "123");
        assert_eq!(entry.kind, EntryKind::Posting);
        assert_eq!(entry.payload_str(), Some("123"));

        let entry = IndexableEntry::column("attrs-content", "user.id\u{7}123");
        assert_eq!(entry.kind, EntryKind::Column);
        assert_eq!(entry.to_string(), "column attrs-content user.id\\u{7}123");
    }
}

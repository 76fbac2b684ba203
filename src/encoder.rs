//! Flattening of one flat-object field value into indexable entries.
//!
//! For every leaf of the field value the encoder produces up to four entries:
//!
//! | field              | payload             | kind    | when                                      |
//! |--------------------|---------------------|---------|-------------------------------------------|
//! | `root`             | `value`             | Posting | `index_leaf_values_into_root && indexed`  |
//! | `root`             | `value`             | Column  | `index_leaf_values_into_root && doc_values` |
//! | `root` + `-content`| `path` BEL `value`  | Posting | `indexed`                                 |
//! | `root` + `-content`| `path` BEL `value`  | Column  | `doc_values`                              |
//!
//! # Examples
//!
//! ```
//! use flatobject::cursor::json::JsonTokenCursor;
//! use flatobject::encoder::FlatObjectEncoder;
//!
//! let encoder = FlatObjectEncoder::new("attrs");
//! let mut cursor = JsonTokenCursor::start(r#"{"user": {"id": "123"}}"#).unwrap();
//! let entries = encoder.flatten(&mut cursor).unwrap();
//!
//! let payloads: Vec<&str> = entries.iter().filter_map(|e| e.payload_str()).collect();
//! assert_eq!(payloads, vec!["123", "123", "user.id\u{7}123", "user.id\u{7}123"]);
//! ```

use log::{debug, trace};

use crate::content_path::ContentPath;
use crate::cursor::{Token, TokenCursor, describe};
use crate::error::{FlatObjectError, Result};
use crate::index::entry::IndexableEntry;
use crate::key_codec::{KEY_VALUE_SEPARATOR, encode_key_value, validate_key};
use crate::visitor::{DocumentVisitor, LeafHandler};

/// Suffix of the field holding the `path=value` content entries.
pub const CONTENT_FIELD_SUFFIX: &str = "-content";

/// Name of the content field derived from a root field name.
pub fn content_field_name(root_field_name: &str) -> String {
    format!("{root_field_name}{CONTENT_FIELD_SUFFIX}")
}

/// Turns the leaves of one field value into [`IndexableEntry`] values.
///
/// The encoder holds configuration only; every [`flatten`](Self::flatten)
/// call owns its own path and output, so one encoder can serve many threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatObjectEncoder {
    root_field_name: String,
    content_field_name: String,
    indexed: bool,
    has_doc_values: bool,
    index_leaf_values_into_root: bool,
    null_value: Option<String>,
}

impl FlatObjectEncoder {
    /// Create an encoder with the default flags: indexed, with doc values,
    /// leaf values copied into the root field, no null value.
    pub fn new<S: Into<String>>(root_field_name: S) -> Self {
        let root_field_name = root_field_name.into();
        FlatObjectEncoder {
            content_field_name: content_field_name(&root_field_name),
            root_field_name,
            indexed: true,
            has_doc_values: true,
            index_leaf_values_into_root: true,
            null_value: None,
        }
    }

    /// Set whether posting entries are produced.
    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    /// Set whether column entries are produced.
    pub fn doc_values(mut self, has_doc_values: bool) -> Self {
        self.has_doc_values = has_doc_values;
        self
    }

    /// Set whether bare leaf values are also written under the root field.
    pub fn index_leaf_values_into_root(mut self, enabled: bool) -> Self {
        self.index_leaf_values_into_root = enabled;
        self
    }

    /// Set the text substituted for null leaves.
    pub fn null_value(mut self, null_value: Option<String>) -> Self {
        self.null_value = null_value;
        self
    }

    pub fn root_field_name(&self) -> &str {
        &self.root_field_name
    }

    pub fn content_field_name(&self) -> &str {
        &self.content_field_name
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn has_doc_values(&self) -> bool {
        self.has_doc_values
    }

    /// Flatten the field value the cursor is positioned on.
    ///
    /// A null field value yields no entries. Otherwise the value must be an
    /// object or an array. On error nothing is returned: a field is either
    /// flattened completely or not at all.
    pub fn flatten<C: TokenCursor>(&self, cursor: &mut C) -> Result<Vec<IndexableEntry>> {
        if cursor.current_token() == Some(Token::ValueNull) {
            return Ok(Vec::new());
        }

        let mut collector = EntryCollector {
            encoder: self,
            entries: Vec::new(),
        };
        DocumentVisitor::new(cursor).visit_leaves(&mut collector)?;

        debug!(
            "flattened field [{}] into {} entries",
            self.root_field_name,
            collector.entries.len()
        );
        Ok(collector.entries)
    }

    fn add_leaf(&self, entries: &mut Vec<IndexableEntry>, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;

        if self.index_leaf_values_into_root {
            if self.indexed {
                entries.push(IndexableEntry::posting(self.root_field_name.as_str(), value));
            }
            if self.has_doc_values {
                entries.push(IndexableEntry::column(self.root_field_name.as_str(), value));
            }
        }

        let pair = encode_key_value(key, value);
        if self.indexed {
            entries.push(IndexableEntry::posting(self.content_field_name.as_str(), pair.as_str()));
        }
        if self.has_doc_values {
            entries.push(IndexableEntry::column(self.content_field_name.as_str(), pair));
        }
        Ok(())
    }
}

/// Leaf handler of a single flatten call.
struct EntryCollector<'e> {
    encoder: &'e FlatObjectEncoder,
    entries: Vec<IndexableEntry>,
}

impl<C: TokenCursor> LeafHandler<C> for EntryCollector<'_> {
    fn handle_leaf(&mut self, path: &ContentPath, cursor: &C) -> Result<()> {
        let key = path.path_as_text(cursor.current_name());

        let value = if cursor.current_token() == Some(Token::ValueNull) {
            match self.encoder.null_value.as_deref() {
                Some(null_value) => null_value,
                None => {
                    // Still reject the key, a null leaf does not make it usable.
                    validate_key(&key)?;
                    trace!("skipping null leaf [{key}] without null_value");
                    return Ok(());
                }
            }
        } else {
            cursor.text().ok_or_else(|| {
                FlatObjectError::structural(describe(cursor.current_token()), cursor.token_location())
            })?
        };

        self.encoder.add_leaf(&mut self.entries, &key, value)
    }

    fn on_field_name(&mut self, path: &ContentPath, name: &str) -> Result<()> {
        // Enclosing segments were checked when their own names were seen.
        if name.contains(KEY_VALUE_SEPARATOR) {
            return validate_key(&path.path_as_text(Some(name)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::json::JsonTokenCursor;
    use crate::index::entry::EntryKind;

    fn flatten(encoder: &FlatObjectEncoder, input: &str) -> Result<Vec<IndexableEntry>> {
        let mut cursor = JsonTokenCursor::start(input)?;
        encoder.flatten(&mut cursor)
    }

    fn payloads(entries: &[IndexableEntry], field: &str, kind: EntryKind) -> Vec<String> {
        entries
            .iter()
            .filter(|e| e.field_name == field && e.kind == kind)
            .map(|e| String::from_utf8(e.payload.clone()).unwrap())
            .collect()
    }

    #[test]
    fn test_entry_order_per_leaf() {
        let entries = flatten(&FlatObjectEncoder::new("f"), r#"{"a": "1"}"#).unwrap();
        assert_eq!(
            entries,
            vec![
                IndexableEntry::posting("f", "1"),
                IndexableEntry::column("f", "1"),
                IndexableEntry::posting("f-content", "a\u{7}1"),
                IndexableEntry::column("f-content", "a\u{7}1"),
            ]
        );
    }

    #[test]
    fn test_null_field_value() {
        let entries = flatten(&FlatObjectEncoder::new("f"), "null").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_null_leaf_with_null_value() {
        let encoder = FlatObjectEncoder::new("f").null_value(Some("NULL".to_string()));
        let entries = flatten(&encoder, r#"{"a": null}"#).unwrap();
        assert_eq!(payloads(&entries, "f", EntryKind::Posting), vec!["NULL"]);
        assert_eq!(
            payloads(&entries, "f-content", EntryKind::Posting),
            vec!["a\u{7}NULL"]
        );
    }

    #[test]
    fn test_null_leaf_without_null_value_is_skipped() {
        let entries = flatten(&FlatObjectEncoder::new("f"), r#"{"a": null, "b": "x"}"#).unwrap();
        assert_eq!(payloads(&entries, "f", EntryKind::Posting), vec!["x"]);
        assert_eq!(payloads(&entries, "f-content", EntryKind::Column), vec!["b\u{7}x"]);
    }

    #[test]
    fn test_scalar_text_forms() {
        let entries = flatten(
            &FlatObjectEncoder::new("f").doc_values(false),
            r#"{"n": 1.50, "b": true, "s": "té"}"#,
        )
        .unwrap();
        assert_eq!(
            payloads(&entries, "f", EntryKind::Posting),
            vec!["1.50", "true", "té"]
        );
    }

    #[test]
    fn test_reserved_key_in_empty_object() {
        let result = flatten(&FlatObjectEncoder::new("f"), r#"{"ok": 1, "\u0007": {}}"#);
        assert!(matches!(result, Err(FlatObjectError::InvalidKey(_))));
    }

    #[test]
    fn test_reserved_key_reports_full_path() {
        let result = flatten(
            &FlatObjectEncoder::new("f"),
            r#"{"n": {"deep": {"ok": 1, "bad\u0007": {"x": 1}}}}"#,
        );
        match result {
            Err(FlatObjectError::InvalidKey(message)) => {
                assert!(message.ends_with("found in key [n.deep.bad\\u{7}]"), "{message}");
            }
            other => panic!("expected invalid key error, got {other:?}"),
        }
    }

    #[test]
    fn test_scalar_field_value_is_structural_error() {
        let result = flatten(&FlatObjectEncoder::new("f"), "42");
        assert!(matches!(result, Err(FlatObjectError::Structural { .. })));
    }

    #[test]
    fn test_content_field_name() {
        assert_eq!(content_field_name("attrs"), "attrs-content");
        let encoder = FlatObjectEncoder::new("attrs");
        assert_eq!(encoder.content_field_name(), "attrs-content");
    }
}

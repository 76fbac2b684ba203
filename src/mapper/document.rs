//! Document-level mapping: routes the fields of a source document.

use std::collections::BTreeMap;

use ahash::AHashMap;
use log::debug;
use rayon::prelude::*;
use serde::Deserialize;

use crate::cursor::json::JsonTokenCursor;
use crate::cursor::{Token, TokenCursor, describe};
use crate::error::{FlatObjectError, Result};
use crate::index::MemoryIndex;
use crate::index::entry::IndexableEntry;
use crate::mapper::ParseContext;
use crate::mapper::flat_object::{FLAT_TYPE, FlatObjectFieldMapper, FlatObjectMapping};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MappingDocument {
    #[serde(default)]
    properties: BTreeMap<String, serde_json::Value>,
}

/// Maps the top-level fields of documents to flat-object field mappers.
///
/// Fields without a mapping are skipped. The mapper holds no per-document
/// state, so one instance can parse documents on many threads at once.
#[derive(Debug, Clone, Default)]
pub struct DocumentMapper {
    fields: AHashMap<String, FlatObjectFieldMapper>,
}

impl DocumentMapper {
    /// Create a mapper with no mapped fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mapper from a `{"properties": {...}}` mapping document.
    pub fn from_json(mapping: &str) -> Result<Self> {
        let mut mapper = Self::new();
        mapper.put_mapping(mapping)?;
        Ok(mapper)
    }

    /// Add or update fields from a `{"properties": {...}}` mapping document.
    ///
    /// Existing fields are merged with their new definition; the update is
    /// applied only if every field merges cleanly.
    pub fn put_mapping(&mut self, mapping: &str) -> Result<()> {
        let document: MappingDocument = serde_json::from_str(mapping)
            .map_err(|e| FlatObjectError::mapping(format!("Failed to parse mapping: {e}")))?;

        let mut updated = Vec::with_capacity(document.properties.len());
        for (name, definition) in document.properties {
            let params = parse_field_definition(&name, definition)?;
            let field = match self.fields.get(&name) {
                Some(existing) => existing.merge(&params)?,
                None => FlatObjectFieldMapper::new(name.as_str(), params)?,
            };
            updated.push((name, field));
        }

        for (name, field) in updated {
            debug!("mapped field [{name}] as [{FLAT_TYPE}]");
            self.fields.insert(name, field);
        }
        Ok(())
    }

    /// Add a single field mapper, merging with an existing one of the same name.
    pub fn add_field(&mut self, field: FlatObjectFieldMapper) -> Result<()> {
        let field = match self.fields.get(field.name()) {
            Some(existing) => existing.merge(field.mapping())?,
            None => field,
        };
        self.fields.insert(field.name().to_string(), field);
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FlatObjectFieldMapper> {
        self.fields.get(name)
    }

    /// Names of the mapped fields, sorted.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Declare the index options of every mapped field on `index`.
    pub fn register_fields(&self, index: &mut MemoryIndex) {
        for field in self.fields.values() {
            for (name, options) in field.indexed_fields() {
                index.register_field(name, options);
            }
        }
    }

    /// Parse one JSON source document into entries.
    ///
    /// The document must be a JSON object. A failure in any mapped field
    /// fails the whole document.
    pub fn parse(&self, source: &str) -> Result<Vec<IndexableEntry>> {
        let mut cursor = JsonTokenCursor::start(source)?;
        if cursor.current_token() != Some(Token::StartObject) {
            return Err(unexpected(&cursor));
        }

        let mut ctx = ParseContext::new();
        loop {
            match cursor.next_token()? {
                Some(Token::FieldName) => {
                    let name = cursor.text().map(str::to_string).unwrap_or_default();
                    cursor.next_token()?;
                    match self.fields.get(&name) {
                        Some(field) => field.parse(&mut cursor, &mut ctx)?,
                        None => cursor.skip_children()?,
                    }
                }
                Some(Token::EndObject) => break,
                _ => return Err(unexpected(&cursor)),
            }
        }

        // Rejects trailing content after the document.
        cursor.next_token()?;
        Ok(ctx.into_entries())
    }

    /// Parse many documents in parallel. Results keep the input order.
    pub fn parse_batch<S>(&self, sources: &[S]) -> Vec<Result<Vec<IndexableEntry>>>
    where
        S: AsRef<str> + Sync,
    {
        sources
            .par_iter()
            .map(|source| self.parse(source.as_ref()))
            .collect()
    }
}

/// Resolve a field definition by its `type` and parse its parameters.
fn parse_field_definition(name: &str, definition: serde_json::Value) -> Result<FlatObjectMapping> {
    let mut params = match definition {
        serde_json::Value::Object(params) => params,
        other => {
            return Err(FlatObjectError::mapping(format!(
                "Expected a map for field [{name}] but got [{other}]"
            )));
        }
    };

    let field_type = match params.remove("type") {
        Some(serde_json::Value::String(field_type)) => field_type,
        Some(other) => {
            return Err(FlatObjectError::mapping(format!(
                "Invalid type [{other}] declared on field [{name}]"
            )));
        }
        None => {
            return Err(FlatObjectError::mapping(format!(
                "No type specified for field [{name}]"
            )));
        }
    };

    if field_type != FLAT_TYPE {
        return Err(FlatObjectError::mapping(format!(
            "No handler for type [{field_type}] declared on field [{name}]"
        )));
    }
    FlatObjectMapping::from_value(name, serde_json::Value::Object(params))
}

fn unexpected<C: TokenCursor>(cursor: &C) -> FlatObjectError {
    FlatObjectError::structural(describe(cursor.current_token()), cursor.token_location())
}

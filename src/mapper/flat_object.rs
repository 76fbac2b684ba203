//! Flat-object field mapping and parsing.

use std::collections::BTreeMap;
use std::fmt::Display;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::cursor::{Token, TokenCursor};
use crate::encoder::{FlatObjectEncoder, content_field_name};
use crate::error::{FlatObjectError, Result};
use crate::index::IndexOptions;
use crate::mapper::ParseContext;

/// Type name of flat-object fields in mappings.
pub const FLAT_TYPE: &str = "flat";

const META_MAX_ENTRIES: usize = 5;
const META_MAX_KEY_LENGTH: usize = 20;
const META_MAX_VALUE_LENGTH: usize = 50;

/// Mapping parameters of a flat-object field.
///
/// Deserializes from the parameter object of a field mapping (without its
/// `type` key). Missing parameters take their defaults and unknown ones are
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlatObjectMapping {
    /// Whether posting entries are produced.
    pub index: bool,
    /// Whether column entries are produced.
    pub doc_values: bool,
    /// Text indexed in place of null leaves.
    pub null_value: Option<String>,
    pub index_options: IndexOptions,
    /// Whether bare leaf values are also indexed under the field itself.
    pub index_leaf_values_into_root: bool,
    pub meta: BTreeMap<String, String>,
}

impl Default for FlatObjectMapping {
    fn default() -> Self {
        FlatObjectMapping {
            index: true,
            doc_values: true,
            null_value: None,
            index_options: IndexOptions::Docs,
            index_leaf_values_into_root: true,
            meta: BTreeMap::new(),
        }
    }
}

impl FlatObjectMapping {
    /// Parse the parameters of field `name` from JSON.
    pub fn from_value(name: &str, value: serde_json::Value) -> Result<Self> {
        let mapping: FlatObjectMapping = serde_json::from_value(value).map_err(|e| {
            FlatObjectError::mapping(format!("Failed to parse mapping [{name}]: {e}"))
        })?;
        mapping.validate(name)?;
        Ok(mapping)
    }

    /// Check parameter values that the types alone do not constrain.
    pub fn validate(&self, name: &str) -> Result<()> {
        if self.meta.len() > META_MAX_ENTRIES {
            return Err(FlatObjectError::mapping(format!(
                "[meta] can't have more than {META_MAX_ENTRIES} entries, but got {} on field [{name}]",
                self.meta.len()
            )));
        }
        for (key, value) in &self.meta {
            if key.chars().count() > META_MAX_KEY_LENGTH {
                return Err(FlatObjectError::mapping(format!(
                    "[meta] keys can't be longer than {META_MAX_KEY_LENGTH} chars, but got [{key}] for field [{name}]"
                )));
            }
            if value.chars().count() > META_MAX_VALUE_LENGTH {
                return Err(FlatObjectError::mapping(format!(
                    "[meta] values can't be longer than {META_MAX_VALUE_LENGTH} chars, but got [{value}] for key [{key}] on field [{name}]"
                )));
            }
        }
        Ok(())
    }

    /// Merge an updated mapping of field `name` into this one.
    ///
    /// Only `meta` can change on an existing field; any other difference is
    /// a conflict. All conflicts are reported together.
    pub fn merge(&self, name: &str, incoming: &FlatObjectMapping) -> Result<FlatObjectMapping> {
        incoming.validate(name)?;

        let mut conflicts = Vec::new();
        check_update(&mut conflicts, "index", &self.index, &incoming.index);
        check_update(&mut conflicts, "doc_values", &self.doc_values, &incoming.doc_values);
        check_update(
            &mut conflicts,
            "null_value",
            &DisplayOption(&self.null_value),
            &DisplayOption(&incoming.null_value),
        );
        check_update(
            &mut conflicts,
            "index_options",
            &self.index_options,
            &incoming.index_options,
        );
        check_update(
            &mut conflicts,
            "index_leaf_values_into_root",
            &self.index_leaf_values_into_root,
            &incoming.index_leaf_values_into_root,
        );

        if !conflicts.is_empty() {
            return Err(FlatObjectError::mapping(format!(
                "Mapper for [{name}] conflicts with existing mapper:\n\t{}",
                conflicts.join("\n\t")
            )));
        }

        Ok(FlatObjectMapping {
            meta: incoming.meta.clone(),
            ..self.clone()
        })
    }
}

struct DisplayOption<'a>(&'a Option<String>);

impl PartialEq for DisplayOption<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Display for DisplayOption<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(value) => f.write_str(value),
            None => f.write_str("null"),
        }
    }
}

fn check_update<T: PartialEq + Display>(conflicts: &mut Vec<String>, param: &str, old: &T, new: &T) {
    if old != new {
        conflicts.push(format!("Cannot update parameter [{param}] from [{old}] to [{new}]"));
    }
}

/// Search-side description of a flat-object field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatFieldType {
    name: String,
    index_options: Option<IndexOptions>,
    has_doc_values: bool,
    meta: BTreeMap<String, String>,
}

impl FlatFieldType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &'static str {
        FLAT_TYPE
    }

    /// Whether the field has postings at all.
    pub fn is_searchable(&self) -> bool {
        self.index_options.is_some()
    }

    /// Index options of the postings, `None` when the field is not indexed.
    pub fn index_options(&self) -> Option<IndexOptions> {
        self.index_options
    }

    pub fn has_doc_values(&self) -> bool {
        self.has_doc_values
    }

    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }
}

/// Parses the value of one flat-object field into entries.
#[derive(Debug, Clone)]
pub struct FlatObjectFieldMapper {
    mapping: FlatObjectMapping,
    field_type: FlatFieldType,
    encoder: FlatObjectEncoder,
}

impl FlatObjectFieldMapper {
    /// Build the mapper of field `name`.
    pub fn new<S: Into<String>>(name: S, mapping: FlatObjectMapping) -> Result<Self> {
        let name = name.into();
        mapping.validate(&name)?;

        let field_type = FlatFieldType {
            name: name.clone(),
            index_options: mapping.index.then_some(mapping.index_options),
            has_doc_values: mapping.doc_values,
            meta: mapping.meta.clone(),
        };
        let encoder = FlatObjectEncoder::new(name)
            .indexed(mapping.index)
            .doc_values(mapping.doc_values)
            .index_leaf_values_into_root(mapping.index_leaf_values_into_root)
            .null_value(mapping.null_value.clone());

        Ok(FlatObjectFieldMapper {
            mapping,
            field_type,
            encoder,
        })
    }

    pub fn name(&self) -> &str {
        self.field_type.name()
    }

    pub fn mapping(&self) -> &FlatObjectMapping {
        &self.mapping
    }

    pub fn field_type(&self) -> &FlatFieldType {
        &self.field_type
    }

    pub fn content_field_name(&self) -> String {
        content_field_name(self.name())
    }

    /// Fields this mapper writes postings to, with their index options.
    pub fn indexed_fields(&self) -> Vec<(String, IndexOptions)> {
        match self.field_type.index_options() {
            Some(options) => vec![
                (self.name().to_string(), options),
                (self.content_field_name(), options),
            ],
            None => Vec::new(),
        }
    }

    /// Parse the field value the cursor is positioned on into `ctx`.
    ///
    /// A null value adds nothing. A field that is neither indexed nor has
    /// doc values is skipped without being flattened. Without doc values the
    /// field name is also recorded in [`FIELD_NAMES_FIELD`](crate::mapper::FIELD_NAMES_FIELD).
    pub fn parse<C: TokenCursor>(&self, cursor: &mut C, ctx: &mut ParseContext) -> Result<()> {
        if cursor.current_token() == Some(Token::ValueNull) {
            trace!("field [{}] is null", self.name());
            return Ok(());
        }

        if !self.field_type.is_searchable() && !self.field_type.has_doc_values() {
            trace!("field [{}] is neither indexed nor has doc values, skipping", self.name());
            return cursor.skip_children();
        }

        ctx.add_all(self.encoder.flatten(cursor)?);

        if !self.field_type.has_doc_values() {
            ctx.add_field_name(self.name());
        }
        Ok(())
    }

    /// Apply an updated mapping, see [`FlatObjectMapping::merge`].
    pub fn merge(&self, incoming: &FlatObjectMapping) -> Result<FlatObjectFieldMapper> {
        let merged = self.mapping.merge(self.name(), incoming)?;
        debug!("merged mapping of field [{}]", self.name());
        FlatObjectFieldMapper::new(self.name(), merged)
    }
}

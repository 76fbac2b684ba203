//! In-memory index writer.

use std::collections::BTreeMap;

use ahash::AHashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::doc_values::SortedSetDocValues;
use crate::index::entry::{EntryKind, IndexableEntry};
use crate::index::posting::PostingList;
use crate::index::{IndexOptions, IndexWriter};

/// Per-field statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldIndexStats {
    pub unique_terms: u64,
    pub total_postings: u64,
    pub docs_with_values: u64,
    pub unique_values: u64,
}

/// Index statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_documents: u64,
    pub fields: BTreeMap<String, FieldIndexStats>,
}

/// Keeps posting lists and doc values in memory.
///
/// Fields default to [`IndexOptions::Docs`]; use
/// [`register_field`](MemoryIndex::register_field) to record frequencies.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    field_options: AHashMap<String, IndexOptions>,
    postings: AHashMap<String, BTreeMap<Vec<u8>, PostingList>>,
    doc_values: AHashMap<String, SortedSetDocValues>,
    doc_count: u64,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the index options of a field.
    pub fn register_field<S: Into<String>>(&mut self, field_name: S, options: IndexOptions) {
        self.field_options.insert(field_name.into(), options);
    }

    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    /// The posting list of `term` in `field_name`.
    pub fn postings(&self, field_name: &str, term: &[u8]) -> Option<&PostingList> {
        self.postings.get(field_name).and_then(|terms| terms.get(term))
    }

    /// Ids of the documents containing `term` in `field_name`.
    pub fn term_docs(&self, field_name: &str, term: &[u8]) -> Vec<u64> {
        self.postings(field_name, term)
            .map(PostingList::doc_ids)
            .unwrap_or_default()
    }

    /// Sorted doc values of a document.
    pub fn doc_values(&self, field_name: &str, doc_id: u64) -> Option<Vec<&[u8]>> {
        self.doc_values.get(field_name).and_then(|dv| dv.get(doc_id))
    }

    pub fn stats(&self) -> IndexStats {
        let mut fields: BTreeMap<String, FieldIndexStats> = BTreeMap::new();
        for (field_name, terms) in &self.postings {
            let stats = fields.entry(field_name.clone()).or_default();
            stats.unique_terms = terms.len() as u64;
            stats.total_postings = terms.values().map(|list| list.len() as u64).sum();
        }
        for (field_name, dv) in &self.doc_values {
            let stats = fields.entry(field_name.clone()).or_default();
            stats.docs_with_values = dv.doc_count() as u64;
            stats.unique_values = dv.unique_values() as u64;
        }
        IndexStats {
            total_documents: self.doc_count,
            fields,
        }
    }
}

impl IndexWriter for MemoryIndex {
    fn add_document(&mut self, entries: Vec<IndexableEntry>) -> Result<u64> {
        let doc_id = self.doc_count;
        debug!("adding document {} with {} entries", doc_id, entries.len());

        for entry in entries {
            match entry.kind {
                EntryKind::Posting => {
                    let options = self
                        .field_options
                        .get(&entry.field_name)
                        .copied()
                        .unwrap_or_default();
                    self.postings
                        .entry(entry.field_name)
                        .or_default()
                        .entry(entry.payload)
                        .or_default()
                        .add_occurrence(doc_id, options.tracks_frequencies());
                }
                EntryKind::Column => {
                    self.doc_values
                        .entry(entry.field_name)
                        .or_default()
                        .add(doc_id, entry.payload);
                }
            }
        }

        self.doc_count += 1;
        Ok(doc_id)
    }
}

//! Sorted-set doc values for the in-memory index.
//!
//! DocValues are column-oriented storage for field values: for every document
//! a field keeps the sorted, deduplicated set of byte values written for it.
//! This is the layout sorting and aggregations read from, and it is why a
//! multi-valued flat field collapses repeated leaves into one value per
//! document here while its postings keep counting them.

use std::collections::BTreeSet;

/// DocValues for a single field.
/// Stores a mapping from document ID to its sorted value set.
#[derive(Debug, Clone, Default)]
pub struct SortedSetDocValues {
    /// Using Vec with sparse storage (None for documents without values)
    values: Vec<Option<BTreeSet<Vec<u8>>>>,
}

impl SortedSetDocValues {
    /// Create an empty column.
    pub fn new() -> Self {
        SortedSetDocValues { values: Vec::new() }
    }

    /// Add a value for a document.
    pub fn add(&mut self, doc_id: u64, value: Vec<u8>) {
        let doc_id = doc_id as usize;

        // Expand vector if needed
        if doc_id >= self.values.len() {
            self.values.resize(doc_id + 1, None);
        }

        self.values[doc_id]
            .get_or_insert_with(BTreeSet::new)
            .insert(value);
    }

    /// Sorted values of a document.
    pub fn get(&self, doc_id: u64) -> Option<Vec<&[u8]>> {
        self.values
            .get(doc_id as usize)
            .and_then(Option::as_ref)
            .map(|set| set.iter().map(Vec::as_slice).collect())
    }

    /// Number of documents that have at least one value.
    pub fn doc_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Number of distinct values across all documents.
    pub fn unique_values(&self) -> usize {
        self.values
            .iter()
            .flatten()
            .flatten()
            .collect::<BTreeSet<_>>()
            .len()
    }
}

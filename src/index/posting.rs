//! Posting lists for the in-memory index.
//!
//! Terms are raw bytes (flattened entries are not analyzed), postings are
//! kept sorted by document id.

use serde::{Deserialize, Serialize};

/// A single posting in a posting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Document ID.
    pub doc_id: u64,
    /// Term frequency in the document.
    pub frequency: u32,
}

impl Posting {
    /// Create a new posting.
    pub fn new(doc_id: u64) -> Self {
        Posting {
            doc_id,
            frequency: 1,
        }
    }

    /// Create a posting with frequency.
    pub fn with_frequency(doc_id: u64, frequency: u32) -> Self {
        Posting { doc_id, frequency }
    }
}

/// A posting list for a specific term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingList {
    /// The postings in this list, sorted by doc id.
    pub postings: Vec<Posting>,
    /// Total frequency across all documents.
    pub total_frequency: u64,
}

impl PostingList {
    /// Create a new empty posting list.
    pub fn new() -> Self {
        PostingList {
            postings: Vec::new(),
            total_frequency: 0,
        }
    }

    /// Record one occurrence of the term in `doc_id`.
    ///
    /// With `track_frequencies` a repeated occurrence in the same document
    /// raises the posting's frequency; without it the posting only records
    /// that the document contains the term.
    pub fn add_occurrence(&mut self, doc_id: u64, track_frequencies: bool) {
        match self.postings.binary_search_by_key(&doc_id, |p| p.doc_id) {
            Ok(pos) => {
                if track_frequencies {
                    self.postings[pos].frequency += 1;
                    self.total_frequency += 1;
                }
            }
            Err(pos) => {
                self.postings.insert(pos, Posting::new(doc_id));
                self.total_frequency += 1;
            }
        }
    }

    /// Document frequency (number of documents containing this term).
    pub fn doc_frequency(&self) -> u64 {
        self.postings.len() as u64
    }

    /// Get the length of the posting list.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Check if the posting list is empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Get an iterator over the postings.
    pub fn iter(&self) -> std::slice::Iter<'_, Posting> {
        self.postings.iter()
    }

    /// Document ids in ascending order.
    pub fn doc_ids(&self) -> Vec<u64> {
        self.postings.iter().map(|p| p.doc_id).collect()
    }
}

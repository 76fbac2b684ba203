//! Index-writing side of the crate.
//!
//! Flattening produces [`IndexableEntry`] values; an [`IndexWriter`] persists
//! them. Posting entries go to the inverted index, Column entries to the
//! doc-values store. [`MemoryIndex`] is the in-memory writer used by the CLI
//! and the tests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FlatObjectError, Result};

pub mod doc_values;
pub mod entry;
pub mod memory;
pub mod posting;

// Re-export commonly used types
pub use doc_values::SortedSetDocValues;
pub use entry::{EntryKind, IndexableEntry};
pub use memory::{FieldIndexStats, IndexStats, MemoryIndex};
pub use posting::{Posting, PostingList};

/// How much information posting entries record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexOptions {
    /// Only which documents contain a term.
    #[default]
    Docs,
    /// Documents and term frequencies.
    Freqs,
}

impl IndexOptions {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexOptions::Docs => "docs",
            IndexOptions::Freqs => "freqs",
        }
    }

    /// Whether repeated terms in one document raise the frequency.
    pub fn tracks_frequencies(&self) -> bool {
        matches!(self, IndexOptions::Freqs)
    }
}

impl fmt::Display for IndexOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexOptions {
    type Err = FlatObjectError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "docs" => Ok(IndexOptions::Docs),
            "freqs" => Ok(IndexOptions::Freqs),
            other => Err(FlatObjectError::mapping(format!(
                "Unknown value [{other}] for field [index_options] - accepted values are [docs, freqs]"
            ))),
        }
    }
}

/// Persists the entries of one document.
pub trait IndexWriter {
    /// Write the entries of a new document and return its id.
    fn add_document(&mut self, entries: Vec<IndexableEntry>) -> Result<u64>;
}

//! # flatobject
//!
//! Flattening of schema-less JSON objects into index entries, so that one
//! "flat object" field can be searched both by leaf value and by
//! `path=value` pair without declaring its structure up front.
//!
//! ## Features
//!
//! - Pull-style JSON token cursor with line/column error locations
//! - Stack-based leaf visitor that tracks the dotted path of every leaf
//! - Posting and doc-value entries for the root and `-content` fields
//! - Flat field mappings with validation and merge rules
//! - Parallel document parsing
//! - In-memory index writer for the produced entries
//!
//! ```
//! use flatobject::cursor::json::JsonTokenCursor;
//! use flatobject::encoder::FlatObjectEncoder;
//!
//! let encoder = FlatObjectEncoder::new("tags").doc_values(false);
//! let mut cursor = JsonTokenCursor::start(r#"{"tags": ["x", "y"]}"#).unwrap();
//! let entries = encoder.flatten(&mut cursor).unwrap();
//! assert_eq!(entries.len(), 4);
//! ```

pub mod cli;
pub mod content_path;
pub mod cursor;
pub mod encoder;
pub mod error;
pub mod index;
pub mod key_codec;
pub mod mapper;
pub mod visitor;

pub mod prelude {
    pub use crate::content_path::ContentPath;
    pub use crate::cursor::json::JsonTokenCursor;
    pub use crate::cursor::{Location, Token, TokenCursor};
    pub use crate::encoder::FlatObjectEncoder;
    pub use crate::error::{FlatObjectError, Result};
    pub use crate::index::{EntryKind, IndexOptions, IndexWriter, IndexableEntry, MemoryIndex};
    pub use crate::key_codec::{KEY_VALUE_SEPARATOR, encode_key_value, validate_key};
    pub use crate::mapper::{DocumentMapper, FlatObjectFieldMapper, FlatObjectMapping};
    pub use crate::visitor::{DocumentVisitor, LeafHandler};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

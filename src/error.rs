//! Error types for the flatobject library.
//!
//! All errors are represented by the [`FlatObjectError`] enum. None of them is
//! recovered inside the library: each one aborts the flatten call that raised
//! it and is surfaced to the caller, which decides whether to reject the
//! document or fail the request.
//!
//! # Examples
//!
//! ```
//! use flatobject::error::{FlatObjectError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(FlatObjectError::mapping("unknown parameter [foo]"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

use crate::cursor::Location;

/// The main error type for flatobject operations.
#[derive(Error, Debug)]
pub enum FlatObjectError {
    /// The cursor yielded a token that does not fit the expected grammar,
    /// e.g. a visit started on a scalar or a value appeared where a field
    /// name was required.
    #[error("Failed to parse object: unexpected token [{token}] at {location}")]
    Structural { token: String, location: Location },

    /// A flattened key contains the reserved key/value separator.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The token cursor could not read the source text.
    #[error("Parse error: {message} at {location}")]
    Parse { message: String, location: Location },

    /// I/O errors (reading documents or mapping files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Mapping-related errors (invalid parameters, merge conflicts, unknown types)
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Broken internal invariant
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for operations that may fail with FlatObjectError.
pub type Result<T> = std::result::Result<T, FlatObjectError>;

impl FlatObjectError {
    /// Create a new structural error for the given token and location.
    pub fn structural<S: Into<String>>(token: S, location: Location) -> Self {
        FlatObjectError::Structural {
            token: token.into(),
            location,
        }
    }

    /// Create a new invalid key error.
    pub fn invalid_key<S: Into<String>>(msg: S) -> Self {
        FlatObjectError::InvalidKey(msg.into())
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S, location: Location) -> Self {
        FlatObjectError::Parse {
            message: msg.into(),
            location,
        }
    }

    /// Create a new mapping error.
    pub fn mapping<S: Into<String>>(msg: S) -> Self {
        FlatObjectError::Mapping(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        FlatObjectError::Internal(msg.into())
    }
}

//! Token cursor abstraction over a semi-structured document.
//!
//! A [`TokenCursor`] is a pull-style view of a document's token sequence,
//! positioned on one token at a time. The traversal code in this crate only
//! talks to this trait; [`json::JsonTokenCursor`] is the JSON implementation.
//!
//! # Examples
//!
//! ```
//! use flatobject::cursor::{Token, TokenCursor};
//! use flatobject::cursor::json::JsonTokenCursor;
//!
//! let mut cursor = JsonTokenCursor::start(r#"{"id": 7}"#).unwrap();
//! assert_eq!(cursor.current_token(), Some(Token::StartObject));
//! assert_eq!(cursor.next_token().unwrap(), Some(Token::FieldName));
//! assert_eq!(cursor.current_name(), Some("id"));
//! assert_eq!(cursor.next_token().unwrap(), Some(Token::ValueNumber));
//! assert_eq!(cursor.text(), Some("7"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod json;

/// A single token of a document's token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    FieldName,
    ValueString,
    ValueNumber,
    ValueBoolean,
    ValueNull,
}

impl Token {
    /// True for tokens that open a container.
    pub fn is_start(self) -> bool {
        matches!(self, Token::StartObject | Token::StartArray)
    }

    /// True for scalar and null values.
    pub fn is_value(self) -> bool {
        matches!(
            self,
            Token::ValueString | Token::ValueNumber | Token::ValueBoolean | Token::ValueNull
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Token::StartObject => "START_OBJECT",
            Token::EndObject => "END_OBJECT",
            Token::StartArray => "START_ARRAY",
            Token::EndArray => "END_ARRAY",
            Token::FieldName => "FIELD_NAME",
            Token::ValueString => "VALUE_STRING",
            Token::ValueNumber => "VALUE_NUMBER",
            Token::ValueBoolean => "VALUE_BOOLEAN",
            Token::ValueNull => "VALUE_NULL",
        };
        f.write_str(name)
    }
}

/// Position of a token in the source text. Both fields are 1-based; the
/// column counts bytes from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Location { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Pull-style cursor over a document's tokens.
///
/// A fresh cursor is positioned before the first token; call
/// [`next_token`](TokenCursor::next_token) to move onto it.
pub trait TokenCursor {
    /// The token the cursor is positioned on, `None` before the first token
    /// and after the last one.
    fn current_token(&self) -> Option<Token>;

    /// Advance to the next token and return it.
    ///
    /// Read and syntax failures are reported as errors; `Ok(None)` means the
    /// document is exhausted.
    fn next_token(&mut self) -> Result<Option<Token>>;

    /// The field name associated with the current token.
    ///
    /// At a `FieldName` token this is the name itself. At a value or a
    /// container start it is the name of the field holding it; elements of an
    /// array report the name of the field holding the array. Root-level
    /// values have no name.
    fn current_name(&self) -> Option<&str>;

    /// Text of the current field name or non-null scalar. Strings are
    /// unescaped, numbers are returned as written, booleans as `true`/`false`.
    fn text(&self) -> Option<&str>;

    /// When positioned on a container start, advance to its matching end;
    /// otherwise do nothing.
    fn skip_children(&mut self) -> Result<()>;

    /// Location of the current token in the source.
    fn token_location(&self) -> Location;
}

/// Render an optional token the way error messages expect it.
pub(crate) fn describe(token: Option<Token>) -> String {
    match token {
        Some(token) => token.to_string(),
        None => "EOF".to_string(),
    }
}

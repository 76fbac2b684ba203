//! Leaf-visiting traversal over a [`TokenCursor`].
//!
//! [`DocumentVisitor`] walks the object or array the cursor is positioned on
//! and hands every scalar or null value to a [`LeafHandler`] together with the
//! [`ContentPath`] leading to it. The walk keeps its own stack of open
//! containers instead of recursing, so nesting depth is bounded by memory
//! rather than by the call stack.
//!
//! Path rules:
//!
//! - entering an object pushes the name of the field holding it (the
//!   traversal root is never pushed), leaving it pops that name;
//! - arrays push nothing, all elements share the path of the array's field.
//!
//! # Examples
//!
//! ```
//! use flatobject::content_path::ContentPath;
//! use flatobject::cursor::TokenCursor;
//! use flatobject::cursor::json::JsonTokenCursor;
//! use flatobject::error::Result;
//! use flatobject::visitor::DocumentVisitor;
//!
//! let mut cursor = JsonTokenCursor::start(r#"{"user": {"id": 1, "tags": ["a", "b"]}}"#).unwrap();
//! let mut leaves = Vec::new();
//! DocumentVisitor::new(&mut cursor)
//!     .visit_leaves(&mut |path: &ContentPath, cursor: &JsonTokenCursor| -> Result<()> {
//!         leaves.push(path.path_as_text(cursor.current_name()));
//!         Ok(())
//!     })
//!     .unwrap();
//! assert_eq!(leaves, vec!["user.id", "user.tags", "user.tags"]);
//! ```

use log::trace;

use crate::content_path::ContentPath;
use crate::cursor::{Token, TokenCursor, describe};
use crate::error::{FlatObjectError, Result};

/// Receives the leaves found by a [`DocumentVisitor`].
///
/// Any closure `FnMut(&ContentPath, &C) -> Result<()>` is a handler.
pub trait LeafHandler<C: TokenCursor> {
    /// Called for every scalar or null value. `path` does not include the
    /// leaf's own field name, which is available from
    /// [`TokenCursor::current_name`].
    fn handle_leaf(&mut self, path: &ContentPath, cursor: &C) -> Result<()>;

    /// Called for every field name before its value is visited.
    fn on_field_name(&mut self, _path: &ContentPath, _name: &str) -> Result<()> {
        Ok(())
    }
}

impl<C, F> LeafHandler<C> for F
where
    C: TokenCursor,
    F: FnMut(&ContentPath, &C) -> Result<()>,
{
    fn handle_leaf(&mut self, path: &ContentPath, cursor: &C) -> Result<()> {
        self(path, cursor)
    }
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    /// An open object; `pushed` records whether entering it added a segment.
    Object { pushed: bool },
    Array,
}

/// Walks a cursor positioned on a container start and visits its leaves.
pub struct DocumentVisitor<'c, C: TokenCursor> {
    cursor: &'c mut C,
    path: ContentPath,
}

impl<'c, C: TokenCursor> DocumentVisitor<'c, C> {
    /// Create a visitor over `cursor`, which must be positioned on the
    /// container to visit.
    pub fn new(cursor: &'c mut C) -> Self {
        DocumentVisitor {
            cursor,
            path: ContentPath::new(),
        }
    }

    /// The path at the current point of the traversal.
    pub fn path(&self) -> &ContentPath {
        &self.path
    }

    /// Visit every leaf of the current container.
    ///
    /// Fails with [`FlatObjectError::Structural`] if the cursor is not on a
    /// `StartObject` or `StartArray` token or yields tokens out of grammar.
    /// Cursor and handler errors are returned unchanged and end the visit.
    /// The path is unwound on every exit, so its depth is back to zero when
    /// this returns.
    pub fn visit_leaves<H: LeafHandler<C>>(&mut self, handler: &mut H) -> Result<()> {
        let mut frames = Vec::new();
        match self.cursor.current_token() {
            Some(Token::StartObject) => frames.push(Frame::Object { pushed: false }),
            Some(Token::StartArray) => frames.push(Frame::Array),
            other => return Err(self.unexpected(other)),
        }

        let walked = self.walk(&mut frames, handler);
        let unwound = self.unwind(&mut frames);
        walked.and(unwound)
    }

    fn walk<H: LeafHandler<C>>(&mut self, frames: &mut Vec<Frame>, handler: &mut H) -> Result<()> {
        while let Some(&frame) = frames.last() {
            let token = self.cursor.next_token()?;
            match (frame, token) {
                (Frame::Object { pushed }, Some(Token::EndObject)) => {
                    frames.pop();
                    if pushed {
                        self.path.pop()?;
                    }
                }
                (Frame::Object { .. }, Some(Token::FieldName)) => {
                    let name = self
                        .cursor
                        .text()
                        .ok_or_else(|| self.unexpected(token))?;
                    handler.on_field_name(&self.path, name)?;
                    let value = self.cursor.next_token()?;
                    self.dispatch(value, frames, handler)?;
                }
                (Frame::Array, Some(Token::EndArray)) => {
                    frames.pop();
                }
                (Frame::Array, Some(Token::FieldName)) | (_, None) => {
                    return Err(self.unexpected(token));
                }
                (Frame::Array, value) => self.dispatch(value, frames, handler)?,
                (Frame::Object { .. }, other) => return Err(self.unexpected(other)),
            }
        }
        Ok(())
    }

    fn dispatch<H: LeafHandler<C>>(
        &mut self,
        token: Option<Token>,
        frames: &mut Vec<Frame>,
        handler: &mut H,
    ) -> Result<()> {
        match token {
            Some(Token::StartObject) => {
                let pushed = match self.cursor.current_name() {
                    Some(name) => {
                        self.path.push(name);
                        true
                    }
                    None => false,
                };
                trace!("entering object at [{}]", self.path.as_text());
                frames.push(Frame::Object { pushed });
            }
            Some(Token::StartArray) => frames.push(Frame::Array),
            Some(value) if value.is_value() => handler.handle_leaf(&self.path, &*self.cursor)?,
            other => return Err(self.unexpected(other)),
        }
        Ok(())
    }

    fn unwind(&mut self, frames: &mut Vec<Frame>) -> Result<()> {
        while let Some(frame) = frames.pop() {
            if let Frame::Object { pushed: true } = frame {
                self.path.pop()?;
            }
        }
        Ok(())
    }

    fn unexpected(&self, token: Option<Token>) -> FlatObjectError {
        FlatObjectError::structural(describe(token), self.cursor.token_location())
    }
}

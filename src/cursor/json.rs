//! JSON implementation of [`TokenCursor`].
//!
//! The cursor lexes its input lazily: each call to `next_token` scans exactly
//! one token, so a caller that stops early never pays for the rest of the
//! document. Structure (commas, colons, bracket balance) is checked as the
//! tokens are produced.

use std::borrow::Cow;

use crate::cursor::{Location, Token, TokenCursor};
use crate::error::{FlatObjectError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerState {
    /// Just after the opening bracket.
    Start,
    /// Object only: a field name was read, its value comes next.
    AfterName,
    /// A value was read, a comma or the closing bracket comes next.
    AfterValue,
}

#[derive(Debug)]
struct Container {
    kind: ContainerKind,
    state: ContainerState,
    /// Name of the field holding this container.
    entry_name: Option<String>,
    /// Name reported for values inside: the last field name of an object,
    /// or the inherited name for an array.
    name: Option<String>,
}

/// A pull-style JSON token cursor over a string slice.
#[derive(Debug)]
pub struct JsonTokenCursor<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    line_start: usize,
    token: Option<Token>,
    location: Location,
    text: Option<Cow<'a, str>>,
    containers: Vec<Container>,
    closed_name: Option<String>,
    root_done: bool,
}

impl<'a> JsonTokenCursor<'a> {
    /// Create a cursor positioned before the first token.
    pub fn new(input: &'a str) -> Self {
        JsonTokenCursor {
            input,
            pos: 0,
            line: 1,
            line_start: 0,
            token: None,
            location: Location::new(1, 1),
            text: None,
            containers: Vec::new(),
            closed_name: None,
            root_done: false,
        }
    }

    /// Create a cursor and move it onto the first token.
    pub fn start(input: &'a str) -> Result<Self> {
        let mut cursor = Self::new(input);
        cursor.next_token()?;
        Ok(cursor)
    }

    /// Current nesting depth (number of open containers).
    pub fn depth(&self) -> usize {
        self.containers.len()
    }

    fn here(&self) -> Location {
        Location::new(self.line, self.pos - self.line_start + 1)
    }

    fn error<S: Into<String>>(&self, msg: S) -> FlatObjectError {
        FlatObjectError::parse(msg, self.here())
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                b'\n' => {
                    self.pos += 1;
                    self.line += 1;
                    self.line_start = self.pos;
                }
                b' ' | b'\t' | b'\r' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(ch) => Err(self.error(format!(
                "expected '{}' but found '{}'",
                expected as char, ch as char
            ))),
            None => Err(self.error(format!(
                "expected '{}' but reached end of input",
                expected as char
            ))),
        }
    }

    fn emit(&mut self, token: Token, location: Location, text: Option<Cow<'a, str>>) -> Token {
        self.token = Some(token);
        self.location = location;
        self.text = text;
        token
    }

    fn parent_name(&self) -> Option<String> {
        self.containers.last().and_then(|c| c.name.clone())
    }

    /// Scan a string literal starting at the opening quote.
    fn scan_string(&mut self) -> Result<Cow<'a, str>> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut index = start + 1;
        let mut escaped = false;

        loop {
            match bytes.get(index) {
                None => {
                    self.pos = index;
                    return Err(self.error("unterminated string"));
                }
                Some(b'"') => break,
                Some(b'\\') => {
                    escaped = true;
                    index += 2;
                }
                Some(&ch) if ch < 0x20 => {
                    self.pos = index;
                    return Err(self.error("control character in string"));
                }
                Some(_) => index += 1,
            }
        }

        let end = index;
        self.pos = end + 1;
        if !escaped {
            return Ok(Cow::Borrowed(&self.input[start + 1..end]));
        }
        serde_json::from_str::<String>(&self.input[start..=end])
            .map(Cow::Owned)
            .map_err(|e| {
                // serde_json reports positions relative to the string literal.
                let message = e.to_string();
                let message = message
                    .rsplit_once(" at line ")
                    .map_or(message.as_str(), |(message, _)| message);
                FlatObjectError::parse(format!("invalid string escape: {message}"), self.location)
            })
    }

    /// Scan a number following the JSON grammar and return it as written.
    fn scan_number(&mut self) -> Result<Cow<'a, str>> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut index = start;
        let digits = |index: &mut usize| {
            let from = *index;
            while bytes.get(*index).is_some_and(u8::is_ascii_digit) {
                *index += 1;
            }
            *index - from
        };

        if bytes.get(index) == Some(&b'-') {
            index += 1;
        }
        match bytes.get(index) {
            Some(b'0') => index += 1,
            Some(b'1'..=b'9') => {
                digits(&mut index);
            }
            _ => {
                self.pos = index;
                return Err(self.error("invalid number"));
            }
        }
        if bytes.get(index) == Some(&b'.') {
            index += 1;
            if digits(&mut index) == 0 {
                self.pos = index;
                return Err(self.error("invalid number: missing fraction digits"));
            }
        }
        if matches!(bytes.get(index), Some(b'e' | b'E')) {
            index += 1;
            if matches!(bytes.get(index), Some(b'+' | b'-')) {
                index += 1;
            }
            if digits(&mut index) == 0 {
                self.pos = index;
                return Err(self.error("invalid number: missing exponent digits"));
            }
        }

        self.pos = index;
        Ok(Cow::Borrowed(&self.input[start..index]))
    }

    fn scan_literal(&mut self, literal: &'static str) -> Result<()> {
        if self.input[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(self.error("unrecognized literal"))
        }
    }

    /// Read a value (scalar or container start) at the current position.
    fn read_value(&mut self) -> Result<Token> {
        self.skip_whitespace();
        let location = self.here();
        let name = self.parent_name();

        if let Some(container) = self.containers.last_mut() {
            container.state = ContainerState::AfterValue;
        }

        let token = match self.peek() {
            Some(b'{') => {
                self.pos += 1;
                self.containers.push(Container {
                    kind: ContainerKind::Object,
                    state: ContainerState::Start,
                    entry_name: name,
                    name: None,
                });
                self.emit(Token::StartObject, location, None)
            }
            Some(b'[') => {
                self.pos += 1;
                self.containers.push(Container {
                    kind: ContainerKind::Array,
                    state: ContainerState::Start,
                    entry_name: name.clone(),
                    name,
                });
                self.emit(Token::StartArray, location, None)
            }
            Some(b'"') => {
                self.location = location;
                let text = self.scan_string()?;
                self.emit(Token::ValueString, location, Some(text))
            }
            Some(b'-' | b'0'..=b'9') => {
                let text = self.scan_number()?;
                self.emit(Token::ValueNumber, location, Some(text))
            }
            Some(b't') => {
                self.scan_literal("true")?;
                self.emit(Token::ValueBoolean, location, Some(Cow::Borrowed("true")))
            }
            Some(b'f') => {
                self.scan_literal("false")?;
                self.emit(Token::ValueBoolean, location, Some(Cow::Borrowed("false")))
            }
            Some(b'n') => {
                self.scan_literal("null")?;
                self.emit(Token::ValueNull, location, None)
            }
            Some(ch) => return Err(self.error(format!("unexpected character '{}'", ch as char))),
            None => return Err(self.error("unexpected end of input")),
        };

        if self.containers.is_empty() {
            self.root_done = true;
        }
        Ok(token)
    }

    fn read_field_name(&mut self) -> Result<Token> {
        let location = self.here();
        if self.peek() != Some(b'"') {
            return Err(self.error("expected field name"));
        }
        self.location = location;
        let name = self.scan_string()?;
        if let Some(container) = self.containers.last_mut() {
            container.name = Some(name.to_string());
            container.state = ContainerState::AfterName;
        }
        Ok(self.emit(Token::FieldName, location, Some(name)))
    }

    fn close(&mut self, token: Token) -> Token {
        let location = self.here();
        self.pos += 1;
        let container = self.containers.pop();
        self.closed_name = container.and_then(|c| c.entry_name);
        if self.containers.is_empty() {
            self.root_done = true;
        }
        self.emit(token, location, None)
    }
}

impl TokenCursor for JsonTokenCursor<'_> {
    fn current_token(&self) -> Option<Token> {
        self.token
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();

        let Some(container) = self.containers.last() else {
            if !self.root_done {
                return self.read_value().map(Some);
            }
            if self.peek().is_some() {
                return Err(self.error("unexpected trailing content after root value"));
            }
            self.token = None;
            self.text = None;
            return Ok(None);
        };

        let (kind, state) = (container.kind, container.state);
        let token = match (kind, state, self.peek()) {
            (_, _, None) => return Err(self.error("unexpected end of input")),
            (ContainerKind::Object, ContainerState::Start, Some(b'}')) => {
                self.close(Token::EndObject)
            }
            (ContainerKind::Object, ContainerState::Start, Some(_)) => self.read_field_name()?,
            (ContainerKind::Object, ContainerState::AfterName, Some(_)) => {
                self.expect_byte(b':')?;
                self.read_value()?
            }
            (ContainerKind::Object, ContainerState::AfterValue, Some(b',')) => {
                self.pos += 1;
                self.skip_whitespace();
                self.read_field_name()?
            }
            (ContainerKind::Object, ContainerState::AfterValue, Some(b'}')) => {
                self.close(Token::EndObject)
            }
            (ContainerKind::Array, ContainerState::Start, Some(b']')) => {
                self.close(Token::EndArray)
            }
            (ContainerKind::Array, ContainerState::AfterValue, Some(b',')) => {
                self.pos += 1;
                self.read_value()?
            }
            (ContainerKind::Array, ContainerState::AfterValue, Some(b']')) => {
                self.close(Token::EndArray)
            }
            (ContainerKind::Array, ContainerState::Start, Some(_)) => self.read_value()?,
            (_, _, Some(ch)) => {
                return Err(self.error(format!("unexpected character '{}'", ch as char)));
            }
        };
        Ok(Some(token))
    }

    fn current_name(&self) -> Option<&str> {
        match self.token? {
            Token::StartObject | Token::StartArray => {
                self.containers.last().and_then(|c| c.entry_name.as_deref())
            }
            Token::EndObject | Token::EndArray => self.closed_name.as_deref(),
            _ => self.containers.last().and_then(|c| c.name.as_deref()),
        }
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn skip_children(&mut self) -> Result<()> {
        if !self.token.is_some_and(Token::is_start) {
            return Ok(());
        }
        let outer = self.containers.len() - 1;
        loop {
            match self.next_token()? {
                Some(Token::EndObject | Token::EndArray) if self.containers.len() == outer => {
                    return Ok(());
                }
                Some(_) => {}
                None => return Err(self.error("unexpected end of input")),
            }
        }
    }

    fn token_location(&self) -> Location {
        self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Result<Vec<Token>> {
        let mut cursor = JsonTokenCursor::new(input);
        let mut tokens = Vec::new();
        while let Some(token) = cursor.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    #[test]
    fn test_token_sequence() {
        let tokens = tokens(r#"{"a": [1, "x", true, null], "b": {}}"#).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::StartObject,
                Token::FieldName,
                Token::StartArray,
                Token::ValueNumber,
                Token::ValueString,
                Token::ValueBoolean,
                Token::ValueNull,
                Token::EndArray,
                Token::FieldName,
                Token::StartObject,
                Token::EndObject,
                Token::EndObject,
            ]
        );
    }

    #[test]
    fn test_scalar_text() {
        let mut cursor = JsonTokenCursor::start(r#"["plain", "esc\"apedA", -1.5e3, false]"#).unwrap();
        cursor.next_token().unwrap();
        assert_eq!(cursor.text(), Some("plain"));
        cursor.next_token().unwrap();
        assert_eq!(cursor.text(), Some("esc\"apedA"));
        cursor.next_token().unwrap();
        assert_eq!(cursor.text(), Some("-1.5e3"));
        cursor.next_token().unwrap();
        assert_eq!(cursor.text(), Some("false"));
    }

    #[test]
    fn test_current_name_through_arrays() {
        let mut cursor = JsonTokenCursor::start(r#"{"tags": ["x", ["y"]], "n": 1}"#).unwrap();
        assert_eq!(cursor.current_name(), None);

        cursor.next_token().unwrap(); // tags
        assert_eq!(cursor.current_name(), Some("tags"));
        cursor.next_token().unwrap(); // [
        assert_eq!(cursor.current_name(), Some("tags"));
        cursor.next_token().unwrap(); // "x"
        assert_eq!(cursor.current_name(), Some("tags"));
        cursor.next_token().unwrap(); // [
        cursor.next_token().unwrap(); // "y"
        assert_eq!(cursor.current_name(), Some("tags"));
        cursor.next_token().unwrap(); // ]
        cursor.next_token().unwrap(); // ]
        assert_eq!(cursor.current_name(), Some("tags"));
        cursor.next_token().unwrap(); // n
        cursor.next_token().unwrap(); // 1
        assert_eq!(cursor.current_name(), Some("n"));
    }

    #[test]
    fn test_skip_children() {
        let mut cursor = JsonTokenCursor::start(r#"{"a": {"b": [1, {"c": 2}]}, "d": 3}"#).unwrap();
        cursor.next_token().unwrap(); // a
        cursor.next_token().unwrap(); // {
        cursor.skip_children().unwrap();
        assert_eq!(cursor.current_token(), Some(Token::EndObject));
        assert_eq!(cursor.next_token().unwrap(), Some(Token::FieldName));
        assert_eq!(cursor.current_name(), Some("d"));
    }

    #[test]
    fn test_locations() {
        let mut cursor = JsonTokenCursor::start("{\n  \"a\": 1\n}").unwrap();
        assert_eq!(cursor.token_location(), Location::new(1, 1));
        cursor.next_token().unwrap();
        assert_eq!(cursor.token_location(), Location::new(2, 3));
        cursor.next_token().unwrap();
        assert_eq!(cursor.token_location(), Location::new(2, 8));
    }

    #[test]
    fn test_invalid_escape_location() {
        for input in [r#"["ok", "\ud800"]"#, r#"["ok", "\x"]"#] {
            match tokens(input) {
                Err(FlatObjectError::Parse { message, location }) => {
                    assert!(message.starts_with("invalid string escape: "), "{message}");
                    assert!(!message.contains("line"), "{message}");
                    assert_eq!(location, Location::new(1, 8));
                }
                other => panic!("expected parse error for {input}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_syntax_errors() {
        for input in [
            r#"{"a" 1}"#,
            r#"{"a": 1,}"#,
            r#"[1 2]"#,
            r#"{"a": 01}"#,
            r#"{"a": tru}"#,
            r#"{"a": "open"#,
            r#"{"a": 1} x"#,
            r#"{1: 2}"#,
        ] {
            let result = tokens(input);
            assert!(
                matches!(result, Err(FlatObjectError::Parse { .. })),
                "expected parse error for {input}"
            );
        }
    }
}

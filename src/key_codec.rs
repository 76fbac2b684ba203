//! Key/value encoding for content entries.
//!
//! A content entry joins the absolute path of a leaf and its value into one
//! term so that `path=value` lookups become exact term matches. The two parts
//! are joined with the ASCII bell character, which is about as rare as a
//! character gets in real keys. Keys that contain it anyway are rejected
//! rather than escaped. Encoded pairs are never decoded: retrieval goes back
//! to the source document.

use crate::error::{FlatObjectError, Result};

/// Reserved separator between key and value (ASCII BEL).
pub const KEY_VALUE_SEPARATOR: char = '\u{7}';

/// [`KEY_VALUE_SEPARATOR`] as a byte.
pub const KEY_VALUE_SEPARATOR_BYTE: u8 = 0x07;

/// Join a key and a value into a single content term.
pub fn encode_key_value(key: &str, value: &str) -> String {
    let mut pair = String::with_capacity(key.len() + value.len() + 1);
    pair.push_str(key);
    pair.push(KEY_VALUE_SEPARATOR);
    pair.push_str(value);
    pair
}

/// Reject keys containing the reserved separator.
pub fn validate_key(key: &str) -> Result<()> {
    if key.contains(KEY_VALUE_SEPARATOR) {
        return Err(FlatObjectError::invalid_key(format!(
            "[flat] field keys cannot contain reserved character \\u0007, found in key [{}]",
            key.escape_debug()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_key_value() {
        assert_eq!(encode_key_value("user.id", "123"), "user.id\u{7}123");
        assert_eq!(encode_key_value("", "x"), "\u{7}x");
        assert_eq!(encode_key_value("a", "").as_bytes().last(), Some(&KEY_VALUE_SEPARATOR_BYTE));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("user.name").is_ok());
        assert!(validate_key("").is_ok());

        let err = validate_key("user.\u{7}").unwrap_err();
        assert!(matches!(err, FlatObjectError::InvalidKey(_)));
        assert!(err.to_string().contains("reserved character"));
    }

    #[test]
    fn test_separator_in_value_is_allowed() {
        // Only keys are checked; the value is the last component of the pair.
        assert_eq!(encode_key_value("k", "a\u{7}b"), "k\u{7}a\u{7}b");
    }
}

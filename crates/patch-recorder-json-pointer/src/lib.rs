//! JSON Pointer (RFC 6901) text handling.
//!
//! Recorded patch paths are sequences of keys. When a session is configured
//! for pointer-string paths, every key is rendered to a token and the tokens
//! are joined here. Consumers reading those patches back use [`parse_pointer`]
//! to recover the tokens.
//!
//! # Example
//!
//! ```
//! use patch_recorder_json_pointer::{format_pointer, parse_pointer};
//!
//! let pointer = format_pointer(["items", "0", "a/b"]);
//! assert_eq!(pointer, "/items/0/a~1b");
//!
//! let tokens = parse_pointer(&pointer).unwrap();
//! assert_eq!(tokens, vec!["items", "0", "a/b"]);
//! ```

use std::borrow::Cow;

pub mod validate;
pub use validate::{validate_pointer, validate_tokens, ValidationError};

use thiserror::Error;

/// Errors produced while parsing a pointer string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonPointerError {
    /// A non-empty pointer must start with `/`.
    #[error("pointer {pointer:?} must be empty or start with '/'")]
    MissingLeadingSlash { pointer: String },
    /// `~` must be followed by `0` or `1`.
    #[error("invalid escape at byte {offset} in pointer {pointer:?}")]
    InvalidEscape { pointer: String, offset: usize },
}

/// Escapes a single reference token: `~` becomes `~0`, `/` becomes `~1`.
///
/// Borrows the input when nothing needs escaping.
///
/// ```
/// use patch_recorder_json_pointer::escape_token;
///
/// assert_eq!(escape_token("a~b"), "a~0b");
/// assert_eq!(escape_token("c/d"), "c~1d");
/// assert_eq!(escape_token("~/"), "~0~1");
/// ```
pub fn escape_token(token: &str) -> Cow<'_, str> {
    if !token.contains(['~', '/']) {
        return Cow::Borrowed(token);
    }
    let mut out = String::with_capacity(token.len() + 2);
    for ch in token.chars() {
        match ch {
            '~' => out.push_str("~0"),
            '/' => out.push_str("~1"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Reverses [`escape_token`].
///
/// Unknown escapes are kept verbatim; use [`parse_pointer`] for strict
/// handling.
///
/// ```
/// use patch_recorder_json_pointer::unescape_token;
///
/// assert_eq!(unescape_token("a~0b"), "a~b");
/// assert_eq!(unescape_token("c~1d"), "c/d");
/// assert_eq!(unescape_token("~01"), "~1");
/// ```
pub fn unescape_token(token: &str) -> Cow<'_, str> {
    if !token.contains('~') {
        return Cow::Borrowed(token);
    }
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('0') => {
                chars.next();
                out.push('~');
            }
            Some('1') => {
                chars.next();
                out.push('/');
            }
            _ => out.push('~'),
        }
    }
    Cow::Owned(out)
}

/// Joins tokens into a pointer string. The empty sequence is the root, `""`.
///
/// ```
/// use patch_recorder_json_pointer::format_pointer;
///
/// assert_eq!(format_pointer(Vec::<String>::new()), "");
/// assert_eq!(format_pointer([""]), "/");
/// assert_eq!(format_pointer(["a", "b"]), "/a/b");
/// ```
pub fn format_pointer<I, T>(tokens: I) -> String
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut out = String::new();
    for token in tokens {
        out.push('/');
        out.push_str(&escape_token(token.as_ref()));
    }
    out
}

/// Splits a pointer string into unescaped tokens.
///
/// # Errors
///
/// Fails when a non-empty pointer lacks the leading `/`, or when a `~` is not
/// followed by `0` or `1`.
///
/// ```
/// use patch_recorder_json_pointer::parse_pointer;
///
/// assert_eq!(parse_pointer("").unwrap(), Vec::<String>::new());
/// assert_eq!(parse_pointer("/").unwrap(), vec![""]);
/// assert_eq!(parse_pointer("/a~0b/c~1d").unwrap(), vec!["a~b", "c/d"]);
/// assert!(parse_pointer("a/b").is_err());
/// assert!(parse_pointer("/a~2").is_err());
/// ```
pub fn parse_pointer(pointer: &str) -> Result<Vec<String>, JsonPointerError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(body) = pointer.strip_prefix('/') else {
        return Err(JsonPointerError::MissingLeadingSlash {
            pointer: pointer.to_string(),
        });
    };
    let bytes = pointer.as_bytes();
    for (offset, byte) in bytes.iter().enumerate() {
        if *byte == b'~' && !matches!(bytes.get(offset + 1), Some(b'0' | b'1')) {
            return Err(JsonPointerError::InvalidEscape {
                pointer: pointer.to_string(),
                offset,
            });
        }
    }
    Ok(body
        .split('/')
        .map(|token| unescape_token(token).into_owned())
        .collect())
}

/// Like [`parse_pointer`] but tolerates a missing leading `/` and bad escapes.
///
/// ```
/// use patch_recorder_json_pointer::parse_pointer_relaxed;
///
/// assert_eq!(parse_pointer_relaxed("a/b"), vec!["a", "b"]);
/// assert_eq!(parse_pointer_relaxed("/a/b"), vec!["a", "b"]);
/// ```
pub fn parse_pointer_relaxed(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    let body = pointer.strip_prefix('/').unwrap_or(pointer);
    body.split('/')
        .map(|token| unescape_token(token).into_owned())
        .collect()
}

/// Parses a token as an array index: decimal digits without a leading zero.
///
/// ```
/// use patch_recorder_json_pointer::parse_index;
///
/// assert_eq!(parse_index("0"), Some(0));
/// assert_eq!(parse_index("42"), Some(42));
/// assert_eq!(parse_index("042"), None);
/// assert_eq!(parse_index("-1"), None);
/// assert_eq!(parse_index("length"), None);
/// ```
pub fn parse_index(token: &str) -> Option<usize> {
    let bytes = token.as_bytes();
    if bytes.is_empty() || (bytes.len() > 1 && bytes[0] == b'0') {
        return None;
    }
    if !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    token.parse().ok()
}

/// True when `prefix` is an ancestor of, or equal to, `path`.
pub fn starts_with<T: PartialEq>(path: &[T], prefix: &[T]) -> bool {
    path.len() >= prefix.len() && path[..prefix.len()] == *prefix
}

/// All tokens but the last; `None` for the root.
pub fn parent<T>(path: &[T]) -> Option<&[T]> {
    path.split_last().map(|(_, rest)| rest)
}

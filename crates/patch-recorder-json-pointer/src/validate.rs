//! Limits on pointer strings and token sequences.
//!
//! Parsing itself accepts anything well-formed; these checks are for
//! consumers that receive patches from untrusted peers.

use thiserror::Error;

/// Longest pointer string accepted by [`validate_pointer`].
pub const MAX_POINTER_LENGTH: usize = 1024;

/// Deepest token sequence accepted by [`validate_tokens`].
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("pointer must be empty or start with '/'")]
    PointerInvalid,
    #[error("pointer longer than {MAX_POINTER_LENGTH} bytes")]
    PointerTooLong,
    #[error("path deeper than {MAX_DEPTH} tokens")]
    PathTooDeep,
}

/// Checks the leading slash and the length limit.
///
/// ```
/// use patch_recorder_json_pointer::validate_pointer;
///
/// validate_pointer("").unwrap();
/// validate_pointer("/items/0").unwrap();
/// validate_pointer("items").unwrap_err();
/// ```
pub fn validate_pointer(pointer: &str) -> Result<(), ValidationError> {
    if pointer.is_empty() {
        return Ok(());
    }
    if !pointer.starts_with('/') {
        return Err(ValidationError::PointerInvalid);
    }
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(ValidationError::PointerTooLong);
    }
    Ok(())
}

/// Checks the depth limit of an already split path.
pub fn validate_tokens<T>(tokens: &[T]) -> Result<(), ValidationError> {
    if tokens.len() > MAX_DEPTH {
        return Err(ValidationError::PathTooDeep);
    }
    Ok(())
}

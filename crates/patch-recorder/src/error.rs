//! Errors raised while recording.

use thiserror::Error;

use crate::path::{Key, Path};

pub type RecordResult<T> = Result<T, RecordError>;

/// A mutation the host structure refused, or misuse of a session.
///
/// Any error returned from the mutation closure aborts the session: no
/// patches are produced, though writes applied before the failure stay
/// applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("cannot record on a {found} at {path}: not a container")]
    NotAContainer { path: Path, found: &'static str },

    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    WrongKind {
        path: Path,
        expected: &'static str,
        found: &'static str,
    },

    /// Property assignment on a map or set.
    #[error("cannot assign a property on a {kind} at {path}; use its own methods")]
    DirectWrite { path: Path, kind: &'static str },

    #[error("cannot delete a property on a {kind} at {path}; use its own methods")]
    DirectDelete { path: Path, kind: &'static str },

    #[error("cannot assign read-only property {key} at {path}")]
    ReadOnly { path: Path, key: Key },

    #[error("cannot delete non-configurable property {key} at {path}")]
    NotConfigurable { path: Path, key: Key },

    #[error("cannot add property {key} at {path}: not extensible")]
    NotExtensible { path: Path, key: Key },

    #[error("cannot modify frozen container at {path}")]
    Frozen { path: Path },

    #[error("invalid array index {key} at {path}")]
    InvalidIndex { path: Path, key: Key },

    /// The draft outlived its session.
    #[error("draft used after its session ended")]
    Revoked,

    /// Raised by the mutation closure itself.
    #[error("aborted: {0}")]
    Aborted(String),
}

impl RecordError {
    pub fn aborted(message: impl Into<String>) -> Self {
        RecordError::Aborted(message.into())
    }
}

//! Records RFC 6902 style patches while a callback mutates a
//! nested value tree in place.
//!
//! The callback receives a [`Draft`] of the root. Reads through a draft hand
//! out drafts of nested containers; writes change the live tree at once and
//! append `add` / `remove` / `replace` patches whose paths locate the change
//! from the root. Objects, arrays, maps and sets each have their own draft
//! type with the operations that make sense for them.
//!
//! By default the patch list is compressed before it is returned, so that
//! repeated writes to one location collapse into one patch.

pub mod codec;
pub mod compress;
pub mod draft;
pub mod error;
pub mod options;
pub mod patch;
pub mod path;
pub mod value;

mod emit;
mod session;

pub use compress::compress;
pub use draft::{ArrayDraft, Draft, Drafted, MapDraft, ObjectDraft, SetDraft};
pub use error::{RecordError, RecordResult};
pub use options::{Extractor, ItemIdConfig, PathMode, RecordOptions};
pub use patch::{ItemId, Op, Patch};
pub use path::{Key, PatchPath, Path};
pub use session::{record, record_with};
pub use value::{
    same_value, same_value_zero, strict_equals, ArrayRef, Integrity, MapRef, NodeId, ObjectRef,
    Property, PropertyKey, SetRef, Symbol, Value,
};

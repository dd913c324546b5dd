//! Drafts: recording views over the live tree.
//!
//! A draft is bound to one container node and the path it was reached by.
//! Reads hand out further drafts for nested containers and raw values for
//! everything else. Writes go straight to the node and record a patch.
//! Drafts stop working once their session ends.

mod array;
mod map;
mod object;
mod set;

pub use array::ArrayDraft;
pub use map::MapDraft;
pub use object::ObjectDraft;
pub use set::SetDraft;

use std::fmt;
use std::rc::Rc;

use crate::error::{RecordError, RecordResult};
use crate::path::{Key, Path};
use crate::session::Session;
use crate::value::Value;

/// Node, path and session shared by the clones of one draft.
pub(crate) struct Handle<N> {
    pub(crate) node: N,
    pub(crate) path: Path,
    pub(crate) session: Rc<Session>,
}

impl<N> Handle<N> {
    pub(crate) fn new(node: N, path: Path, session: Rc<Session>) -> Rc<Self> {
        Rc::new(Handle {
            node,
            path,
            session,
        })
    }

    pub(crate) fn live(&self) -> RecordResult<()> {
        self.session.ensure_live()
    }
}

// ── Draft ─────────────────────────────────────────────────────────────────

/// A draft of any container kind.
#[derive(Clone)]
pub enum Draft {
    Object(ObjectDraft),
    Array(ArrayDraft),
    Map(MapDraft),
    Set(SetDraft),
}

impl Draft {
    pub(crate) fn bind(value: &Value, path: Path, session: Rc<Session>) -> Option<Draft> {
        let draft = match value {
            Value::Object(o) => Draft::Object(ObjectDraft(Handle::new(o.clone(), path, session))),
            Value::Array(a) => Draft::Array(ArrayDraft(Handle::new(a.clone(), path, session))),
            Value::Map(m) => Draft::Map(MapDraft(Handle::new(m.clone(), path, session))),
            Value::Set(s) => Draft::Set(SetDraft(Handle::new(s.clone(), path, session))),
            _ => return None,
        };
        Some(draft)
    }

    pub fn path(&self) -> &Path {
        match self {
            Draft::Object(d) => d.path(),
            Draft::Array(d) => d.path(),
            Draft::Map(d) => d.path(),
            Draft::Set(d) => d.path(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Draft::Object(_) => "object",
            Draft::Array(_) => "array",
            Draft::Map(_) => "map",
            Draft::Set(_) => "set",
        }
    }

    /// The underlying node, unwrapped.
    pub fn value(&self) -> Value {
        match self {
            Draft::Object(d) => d.value(),
            Draft::Array(d) => d.value(),
            Draft::Map(d) => d.value(),
            Draft::Set(d) => d.value(),
        }
    }

    /// Whether both are the same draft instance.
    pub fn ptr_eq(&self, other: &Draft) -> bool {
        match (self, other) {
            (Draft::Object(a), Draft::Object(b)) => a.ptr_eq(b),
            (Draft::Array(a), Draft::Array(b)) => a.ptr_eq(b),
            (Draft::Map(a), Draft::Map(b)) => a.ptr_eq(b),
            (Draft::Set(a), Draft::Set(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    fn session(&self) -> &Session {
        match self {
            Draft::Object(d) => &d.0.session,
            Draft::Array(d) => &d.0.session,
            Draft::Map(d) => &d.0.session,
            Draft::Set(d) => &d.0.session,
        }
    }

    /// Reads a property, element, or map entry. Sets have no keyed reads.
    pub fn get(&self, key: impl Into<Key>) -> RecordResult<Drafted> {
        let key = key.into();
        match self {
            Draft::Object(d) => d.get(key),
            Draft::Array(d) => d.get_key(key),
            Draft::Map(d) => d.get(key.to_value()),
            Draft::Set(d) => {
                d.0.live()?;
                Ok(Drafted::Primitive {
                    value: Value::Undefined,
                    path: d.path().append(key),
                })
            }
        }
    }

    /// Property assignment. Maps and sets only change through their own
    /// methods and reject this.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> RecordResult<()> {
        match self {
            Draft::Object(d) => d.set(key, value),
            Draft::Array(d) => d.set_key(key.into(), value.into()),
            Draft::Map(_) | Draft::Set(_) => {
                self.session().ensure_live()?;
                Err(RecordError::DirectWrite {
                    path: self.path().clone(),
                    kind: self.kind(),
                })
            }
        }
    }

    /// Property deletion. On arrays this writes `undefined` in place.
    pub fn delete(&self, key: impl Into<Key>) -> RecordResult<()> {
        match self {
            Draft::Object(d) => d.delete(key),
            Draft::Array(d) => d.delete_key(key.into()),
            Draft::Map(_) | Draft::Set(_) => {
                self.session().ensure_live()?;
                Err(RecordError::DirectDelete {
                    path: self.path().clone(),
                    kind: self.kind(),
                })
            }
        }
    }

    pub fn as_object(&self) -> RecordResult<&ObjectDraft> {
        match self {
            Draft::Object(d) => Ok(d),
            _ => Err(self.wrong_kind("object")),
        }
    }

    pub fn as_array(&self) -> RecordResult<&ArrayDraft> {
        match self {
            Draft::Array(d) => Ok(d),
            _ => Err(self.wrong_kind("array")),
        }
    }

    pub fn as_map(&self) -> RecordResult<&MapDraft> {
        match self {
            Draft::Map(d) => Ok(d),
            _ => Err(self.wrong_kind("map")),
        }
    }

    pub fn as_set(&self) -> RecordResult<&SetDraft> {
        match self {
            Draft::Set(d) => Ok(d),
            _ => Err(self.wrong_kind("set")),
        }
    }

    fn wrong_kind(&self, expected: &'static str) -> RecordError {
        RecordError::WrongKind {
            path: self.path().clone(),
            expected,
            found: self.kind(),
        }
    }
}

impl fmt::Debug for Draft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Draft::Object(d) => fmt::Debug::fmt(d, f),
            Draft::Array(d) => fmt::Debug::fmt(d, f),
            Draft::Map(d) => fmt::Debug::fmt(d, f),
            Draft::Set(d) => fmt::Debug::fmt(d, f),
        }
    }
}

// ── Drafted ───────────────────────────────────────────────────────────────

/// Result of a read through a draft.
#[derive(Clone, Debug)]
pub enum Drafted {
    Draft(Draft),
    /// Anything that is not a container, including `undefined` for
    /// missing keys.
    Primitive { value: Value, path: Path },
}

impl Drafted {
    /// The value read; containers come back unwrapped.
    pub fn value(&self) -> Value {
        match self {
            Drafted::Draft(d) => d.value(),
            Drafted::Primitive { value, .. } => value.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Drafted::Draft(d) => d.path(),
            Drafted::Primitive { path, .. } => path,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Drafted::Primitive { value: Value::Undefined, .. })
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            Drafted::Draft(d) => Some(d),
            Drafted::Primitive { .. } => None,
        }
    }

    pub fn into_draft(self) -> Option<Draft> {
        match self {
            Drafted::Draft(d) => Some(d),
            Drafted::Primitive { .. } => None,
        }
    }

    fn container(&self) -> RecordResult<&Draft> {
        match self {
            Drafted::Draft(d) => Ok(d),
            Drafted::Primitive { value, path } => Err(RecordError::NotAContainer {
                path: path.clone(),
                found: value.kind(),
            }),
        }
    }

    fn expect_kind(&self, expected: &'static str) -> RecordError {
        match self {
            Drafted::Draft(d) => d.wrong_kind(expected),
            Drafted::Primitive { value, path } => RecordError::WrongKind {
                path: path.clone(),
                expected,
                found: value.kind(),
            },
        }
    }

    pub fn as_object(&self) -> RecordResult<&ObjectDraft> {
        match self {
            Drafted::Draft(Draft::Object(d)) => Ok(d),
            _ => Err(self.expect_kind("object")),
        }
    }

    pub fn as_array(&self) -> RecordResult<&ArrayDraft> {
        match self {
            Drafted::Draft(Draft::Array(d)) => Ok(d),
            _ => Err(self.expect_kind("array")),
        }
    }

    pub fn as_map(&self) -> RecordResult<&MapDraft> {
        match self {
            Drafted::Draft(Draft::Map(d)) => Ok(d),
            _ => Err(self.expect_kind("map")),
        }
    }

    pub fn as_set(&self) -> RecordResult<&SetDraft> {
        match self {
            Drafted::Draft(Draft::Set(d)) => Ok(d),
            _ => Err(self.expect_kind("set")),
        }
    }

    /// Reads one level deeper. Reading through a primitive fails.
    pub fn get(&self, key: impl Into<Key>) -> RecordResult<Drafted> {
        self.container()?.get(key)
    }

    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> RecordResult<()> {
        self.container()?.set(key, value)
    }

    pub fn delete(&self, key: impl Into<Key>) -> RecordResult<()> {
        self.container()?.delete(key)
    }
}

// ── Unwrapping ────────────────────────────────────────────────────────────

impl From<&Draft> for Value {
    fn from(d: &Draft) -> Self {
        d.value()
    }
}

impl From<Draft> for Value {
    fn from(d: Draft) -> Self {
        d.value()
    }
}

impl From<&Drafted> for Value {
    fn from(d: &Drafted) -> Self {
        d.value()
    }
}

impl From<Drafted> for Value {
    fn from(d: Drafted) -> Self {
        d.value()
    }
}

macro_rules! unwrap_into_value {
    ($($draft:ty),*) => {
        $(impl From<&$draft> for Value {
            fn from(d: &$draft) -> Self {
                d.value()
            }
        })*
    };
}

unwrap_into_value!(ObjectDraft, ArrayDraft, MapDraft, SetDraft);

//! Patch records.

use std::fmt;

use crate::path::{Key, PatchPath, Path};
use crate::value::{number_to_string, Value};

// ── Op ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Remove,
    Replace,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Remove => "remove",
            Op::Replace => "replace",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ItemId ────────────────────────────────────────────────────────────────

/// Stable identifier of the array element a patch replaced or removed.
#[derive(Debug, Clone)]
pub enum ItemId {
    String(String),
    Number(f64),
}

impl ItemId {
    /// Reads an identifier out of a field value. Only strings and numbers
    /// qualify.
    pub fn from_value(value: &Value) -> Option<ItemId> {
        match value {
            Value::String(s) => Some(ItemId::String(s.clone())),
            Value::Number(n) => Some(ItemId::Number(*n)),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ItemId::String(s) => Value::String(s.clone()),
            ItemId::Number(n) => Value::Number(*n),
        }
    }
}

impl PartialEq for ItemId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ItemId::String(a), ItemId::String(b)) => a == b,
            (ItemId::Number(a), ItemId::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => false,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::String(s) => f.write_str(s),
            ItemId::Number(n) => f.write_str(&number_to_string(*n)),
        }
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::String(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId::String(s)
    }
}

impl From<f64> for ItemId {
    fn from(n: f64) -> Self {
        ItemId::Number(n)
    }
}

impl From<i32> for ItemId {
    fn from(n: i32) -> Self {
        ItemId::Number(n as f64)
    }
}

// ── Effect ────────────────────────────────────────────────────────────────

/// What a patch did to its parent, as known when it was emitted. The
/// compressor uses this to tell overwrites from position shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    /// Built outside a session; inferred conservatively on use.
    Unknown,
    /// Overwrote or removed a slot without moving siblings.
    Write,
    /// Wrote at index == length, growing the array by one.
    Append,
    /// Wrote past the end, leaving holes.
    Sparse,
    /// Inserted before existing elements, shifting them right.
    Insert,
    /// Removed the last element.
    Tail,
    /// Removed an element with successors, shifting them left.
    Shift,
    /// Length assignment. `from` is the length before the write.
    Length { from: Option<usize> },
}

// ── Patch ─────────────────────────────────────────────────────────────────

/// One recorded mutation.
///
/// `value` is present for `add` and `replace`, absent for `remove`. `id` is
/// present only when an item id extractor matched the replaced or removed
/// element.
#[derive(Debug, Clone)]
pub struct Patch {
    pub op: Op,
    pub path: PatchPath,
    pub value: Option<Value>,
    pub id: Option<ItemId>,
    pub(crate) effect: Effect,
}

impl Patch {
    pub fn add(path: impl Into<PatchPath>, value: impl Into<Value>) -> Self {
        Self::with_effect(Op::Add, path.into(), Some(value.into()), Effect::Unknown)
    }

    pub fn replace(path: impl Into<PatchPath>, value: impl Into<Value>) -> Self {
        Self::with_effect(Op::Replace, path.into(), Some(value.into()), Effect::Unknown)
    }

    pub fn remove(path: impl Into<PatchPath>) -> Self {
        Self::with_effect(Op::Remove, path.into(), None, Effect::Unknown)
    }

    pub fn with_id(mut self, id: impl Into<ItemId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub(crate) fn with_effect(
        op: Op,
        path: PatchPath,
        value: Option<Value>,
        effect: Effect,
    ) -> Self {
        Patch {
            op,
            path,
            value,
            id: None,
            effect,
        }
    }

    /// Path keys, whichever form the path is held in.
    pub fn keys(&self) -> Path {
        self.path.to_keys()
    }

    /// Same patch with its path rendered as a JSON Pointer string.
    pub fn into_pointer(self) -> Self {
        let path = match self.path {
            PatchPath::Keys(p) => PatchPath::Pointer(p.to_pointer()),
            pointer => pointer,
        };
        Patch { path, ..self }
    }

    /// Recorded effect, or a conservative guess for hand-built patches.
    pub(crate) fn resolved_effect(&self) -> Effect {
        if self.effect != Effect::Unknown {
            return self.effect;
        }
        let keys = self.path.to_keys();
        match keys.last() {
            Some(Key::String(s)) if s == "length" && self.op == Op::Replace => {
                Effect::Length { from: None }
            }
            Some(key) if key.as_index().is_some() => match self.op {
                Op::Add => Effect::Insert,
                Op::Remove => Effect::Shift,
                Op::Replace => Effect::Write,
            },
            _ => Effect::Write,
        }
    }
}

impl PartialEq for Patch {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op
            && self.path == other.path
            && self.value == other.value
            && self.id == other.id
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.path)?;
        if let Some(value) = &self.value {
            write!(f, " {value:?}")?;
        }
        if let Some(id) = &self.id {
            write!(f, " (id {id})")?;
        }
        Ok(())
    }
}

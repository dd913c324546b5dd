//! Patch paths.
//!
//! A [`Path`] is an ordered sequence of [`Key`]s from the session root to a
//! value. Keys are strings (object properties), numbers (array indices and
//! numeric map keys), symbols, or opaque values (any other map key or set
//! member). String and number keys compare by value; symbols and opaque
//! containers by identity.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use patch_recorder_json_pointer::{format_pointer, parse_index, parse_pointer_relaxed};

use crate::value::{hash_same_value, number_to_string, same_value, PropertyKey, Symbol, Value};

/// Arrays never grow past this; indices stay strictly below it.
pub(crate) const MAX_ARRAY_LENGTH: usize = u32::MAX as usize;

/// Reads a value as an array length.
pub(crate) fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n <= MAX_ARRAY_LENGTH as f64 => {
            Some(*n as usize)
        }
        _ => None,
    }
}

// ── Key ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub enum Key {
    String(String),
    Number(f64),
    Symbol(Symbol),
    Opaque(Value),
}

impl Key {
    /// The key under which `value` appears as a map key or set member.
    pub fn from_value(value: &Value) -> Key {
        match value {
            Value::String(s) => Key::String(s.clone()),
            Value::Number(n) => Key::Number(*n),
            Value::Symbol(s) => Key::Symbol(s.clone()),
            other => Key::Opaque(other.clone()),
        }
    }

    /// Inverse of [`Key::from_value`].
    pub fn to_value(&self) -> Value {
        match self {
            Key::String(s) => Value::String(s.clone()),
            Key::Number(n) => Value::Number(*n),
            Key::Symbol(s) => Value::Symbol(s.clone()),
            Key::Opaque(v) => v.clone(),
        }
    }

    /// Array index this key denotes, if any. Numeric strings count.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n < MAX_ARRAY_LENGTH as f64 => {
                Some(*n as usize)
            }
            Key::String(s) => parse_index(s),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Key::Number(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s),
            _ => None,
        }
    }

    /// Pointer token for this key.
    pub fn to_token(&self) -> Cow<'_, str> {
        match self {
            Key::String(s) => Cow::Borrowed(s),
            Key::Number(n) => Cow::Owned(number_to_string(*n)),
            Key::Symbol(s) => Cow::Owned(s.to_string()),
            Key::Opaque(v) => Cow::Owned(v.to_key_string()),
        }
    }

    pub(crate) fn property_key(&self) -> PropertyKey {
        match self {
            Key::String(s) => PropertyKey::String(s.clone()),
            Key::Symbol(s) => PropertyKey::Symbol(s.clone()),
            other => PropertyKey::String(other.to_token().into_owned()),
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::String(a), Key::String(b)) => a == b,
            (Key::Number(a), Key::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Key::Symbol(a), Key::Symbol(b)) => a == b,
            (Key::Opaque(a), Key::Opaque(b)) => same_value(a, b),
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Key::String(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            Key::Number(n) => {
                1u8.hash(state);
                let bits = if n.is_nan() {
                    f64::NAN.to_bits()
                } else if *n == 0.0 {
                    0
                } else {
                    n.to_bits()
                };
                bits.hash(state);
            }
            Key::Symbol(s) => {
                2u8.hash(state);
                s.hash(state);
            }
            Key::Opaque(v) => {
                3u8.hash(state);
                hash_same_value(v, state);
            }
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::String(s) => write!(f, "{s:?}"),
            Key::Number(n) => f.write_str(&number_to_string(*n)),
            Key::Symbol(s) => write!(f, "{s}"),
            Key::Opaque(v) => write!(f, "{v:?}"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Key::String(s.clone())
    }
}

impl From<Symbol> for Key {
    fn from(s: Symbol) -> Self {
        Key::Symbol(s)
    }
}

impl From<PropertyKey> for Key {
    fn from(k: PropertyKey) -> Self {
        match k {
            PropertyKey::String(s) => Key::String(s),
            PropertyKey::Symbol(s) => Key::Symbol(s),
        }
    }
}

impl From<f64> for Key {
    fn from(n: f64) -> Self {
        Key::Number(n)
    }
}

macro_rules! key_from_integer {
    ($($t:ty),*) => {
        $(impl From<$t> for Key {
            fn from(n: $t) -> Self {
                Key::Number(n as f64)
            }
        })*
    };
}

key_from_integer!(i32, i64, u32, usize);

// ── Path ──────────────────────────────────────────────────────────────────

/// Location of a value relative to the session root.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Key>);

/// Builds a [`Path`] from keys.
///
/// ```
/// use patch_recorder::{path, Key};
///
/// let p = path!["items", 3, "name"];
/// assert_eq!(p.len(), 3);
/// assert_eq!(p.keys()[1], Key::Number(3.0));
/// assert_eq!(p.to_pointer(), "/items/3/name");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($key:expr),+ $(,)?) => {
        $crate::Path::from_keys(vec![$($crate::Key::from($key)),+])
    };
}

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn from_keys(keys: Vec<Key>) -> Self {
        Path(keys)
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn into_keys(self) -> Vec<Key> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A new path one key deeper; `self` is left untouched.
    pub fn append(&self, key: impl Into<Key>) -> Path {
        let mut keys = Vec::with_capacity(self.0.len() + 1);
        keys.extend_from_slice(&self.0);
        keys.push(key.into());
        Path(keys)
    }

    pub fn parent(&self) -> Option<Path> {
        patch_recorder_json_pointer::parent(&self.0).map(|rest| Path(rest.to_vec()))
    }

    pub fn last(&self) -> Option<&Key> {
        self.0.last()
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        patch_recorder_json_pointer::starts_with(&self.0, &prefix.0)
    }

    /// RFC 6901 rendering; the root is the empty string.
    pub fn to_pointer(&self) -> String {
        format_pointer(self.0.iter().map(Key::to_token))
    }

    /// Reads a pointer back into string keys.
    pub fn from_pointer(pointer: &str) -> Path {
        Path(parse_pointer_relaxed(pointer).into_iter().map(Key::String).collect())
    }
}

impl FromIterator<Key> for Path {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pointer())
    }
}

// ── PatchPath ─────────────────────────────────────────────────────────────

/// Path as it appears in an emitted patch. The form is fixed per session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchPath {
    Keys(Path),
    Pointer(String),
}

impl PatchPath {
    pub fn as_keys(&self) -> Option<&Path> {
        match self {
            PatchPath::Keys(p) => Some(p),
            PatchPath::Pointer(_) => None,
        }
    }

    pub fn as_pointer(&self) -> Option<&str> {
        match self {
            PatchPath::Keys(_) => None,
            PatchPath::Pointer(s) => Some(s),
        }
    }

    pub fn to_pointer(&self) -> String {
        match self {
            PatchPath::Keys(p) => p.to_pointer(),
            PatchPath::Pointer(s) => s.clone(),
        }
    }

    /// Keys of this path; pointer tokens come back as string keys.
    pub fn to_keys(&self) -> Path {
        match self {
            PatchPath::Keys(p) => p.clone(),
            PatchPath::Pointer(s) => Path::from_pointer(s),
        }
    }
}

impl From<Path> for PatchPath {
    fn from(p: Path) -> Self {
        PatchPath::Keys(p)
    }
}

impl From<&str> for PatchPath {
    fn from(s: &str) -> Self {
        PatchPath::Pointer(s.to_string())
    }
}

impl From<String> for PatchPath {
    fn from(s: String) -> Self {
        PatchPath::Pointer(s)
    }
}

impl fmt::Display for PatchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pointer())
    }
}

//! The host structure a session mutates.
//!
//! [`Value`] is a dynamic tree with reference semantics: primitives are held
//! inline, containers are shared handles. Cloning a `Value` never copies a
//! container; [`Value::deep_clone`] does.

mod clone;
pub(crate) mod json;
mod node;

pub use node::{
    ArrayRef, Integrity, MapRef, NodeId, ObjectRef, Property, PropertyKey, SetRef, Symbol,
};
pub(crate) use node::{hash_same_value, MapKey};

use std::fmt;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Symbol(Symbol),
    Object(ObjectRef),
    Array(ArrayRef),
    Map(MapRef),
    Set(SetRef),
}

impl Value {
    /// Builds a plain object from key-value pairs.
    pub fn object<I, K, V>(entries: I) -> Value
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<PropertyKey>,
        V: Into<Value>,
    {
        let obj = ObjectRef::new();
        for (k, v) in entries {
            obj.insert(k, v);
        }
        Value::Object(obj)
    }

    pub fn array<I, V>(items: I) -> Value
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(ArrayRef::from_vec(items.into_iter().map(Into::into).collect()))
    }

    pub fn map<I, K, V>(entries: I) -> Value
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        let map = MapRef::new();
        for (k, v) in entries {
            map.insert(k, v);
        }
        Value::Map(map)
    }

    pub fn set<I, V>(members: I) -> Value
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let set = SetRef::new();
        for v in members {
            set.insert(v);
        }
        Value::Set(set)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// True for objects, arrays, maps and sets.
    pub fn is_container(&self) -> bool {
        self.node_id().is_some()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
        }
    }

    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Value::Object(o) => Some(o.id()),
            Value::Array(a) => Some(a.id()),
            Value::Map(m) => Some(m.id()),
            Value::Set(s) => Some(s.id()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&SetRef> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Shorthand for reading a property of an object value.
    pub fn get(&self, key: impl Into<PropertyKey>) -> Option<Value> {
        self.as_object().and_then(|o| o.get(key))
    }

    /// Whether both are the very same container.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self.node_id(), other.node_id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Property-key rendering: numbers in shortest form, symbols as
    /// `Symbol(desc)`, containers as their tag.
    pub fn to_key_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::String(s) => s.clone(),
            Value::Symbol(s) => s.to_string(),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Array(_) => "[object Array]".to_string(),
            Value::Map(_) => "[object Map]".to_string(),
            Value::Set(_) => "[object Set]".to_string(),
        }
    }
}

/// Renders a number the way a property key would spell it.
pub(crate) fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

// ── Comparisons ───────────────────────────────────────────────────────────

/// Identity comparison: NaN equals NaN, `+0` and `-0` differ, containers
/// compare by pointer.
pub fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if x.is_nan() && y.is_nan() {
                true
            } else {
                x == y && x.is_sign_negative() == y.is_sign_negative()
            }
        }
        _ => same_value_zero(a, b),
    }
}

/// Like [`same_value`] but `+0` equals `-0`.
pub fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        _ => a.ptr_eq(b),
    }
}

/// Strict equality: NaN never equals anything.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        _ => same_value_zero(a, b),
    }
}

/// Structural equality. Object, map and set contents compare regardless of
/// insertion order; arrays compare element-wise.
fn deep_equal(a: &Value, b: &Value) -> bool {
    if a.ptr_eq(b) {
        return true;
    }
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            let x = x.borrow();
            let y = y.borrow();
            let x_props: Vec<_> = x.props.iter().filter(|(_, p)| p.enumerable).collect();
            let y_len = y.props.values().filter(|p| p.enumerable).count();
            x_props.len() == y_len
                && x_props.iter().all(|(k, p)| {
                    y.props
                        .get(*k)
                        .is_some_and(|q| q.enumerable && deep_equal(&p.value, &q.value))
                })
        }
        (Value::Array(x), Value::Array(y)) => {
            let x = x.borrow();
            let y = y.borrow();
            x.items.len() == y.items.len()
                && x.items.iter().zip(y.items.iter()).all(|(p, q)| deep_equal(p, q))
        }
        (Value::Map(x), Value::Map(y)) => {
            let x = x.borrow();
            let y = y.borrow();
            x.entries.len() == y.entries.len()
                && x
                    .entries
                    .iter()
                    .all(|(k, v)| y.entries.get(k).is_some_and(|w| deep_equal(v, w)))
        }
        (Value::Set(x), Value::Set(y)) => {
            let x = x.borrow();
            let y = y.borrow();
            x.members.len() == y.members.len()
                && x.members.iter().all(|m| {
                    y.members.contains(m) || y.members.iter().any(|n| deep_equal(&m.0, &n.0))
                })
        }
        _ => same_value_zero(a, b),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        deep_equal(self, other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&number_to_string(*n)),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Object(o) => fmt::Debug::fmt(o, f),
            Value::Array(a) => fmt::Debug::fmt(a, f),
            Value::Map(m) => fmt::Debug::fmt(m, f),
            Value::Set(s) => fmt::Debug::fmt(s, f),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Number(n as f64)
            }
        })*
    };
}

from_integer!(i32, i64, u32, u64, usize);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Value::Symbol(s)
    }
}

impl From<PropertyKey> for Value {
    fn from(k: PropertyKey) -> Self {
        match k {
            PropertyKey::String(s) => Value::String(s),
            PropertyKey::Symbol(s) => Value::Symbol(s),
        }
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl From<ArrayRef> for Value {
    fn from(a: ArrayRef) -> Self {
        Value::Array(a)
    }
}

impl From<MapRef> for Value {
    fn from(m: MapRef) -> Self {
        Value::Map(m)
    }
}

impl From<SetRef> for Value {
    fn from(s: SetRef) -> Self {
        Value::Set(s)
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_value_edges() {
        let nan = Value::Number(f64::NAN);
        assert!(same_value(&nan, &Value::Number(f64::NAN)));
        assert!(!strict_equals(&nan, &nan));
        assert!(!same_value(&Value::from(0.0), &Value::from(-0.0)));
        assert!(same_value_zero(&Value::from(0.0), &Value::from(-0.0)));
        assert!(!same_value(&Value::Undefined, &Value::Null));
    }

    #[test]
    fn containers_compare_by_identity_in_same_value() {
        let a = Value::array([1, 2]);
        let b = Value::array([1, 2]);
        assert!(!same_value(&a, &b));
        assert!(same_value(&a, &a.clone()));
        assert_eq!(a, b);
    }

    #[test]
    fn deep_equality_ignores_key_order() {
        let a = Value::object([("x", 1), ("y", 2)]);
        let b = Value::object([("y", 2), ("x", 1)]);
        assert_eq!(a, b);
        let c = Value::set([3, 1]);
        let d = Value::set([1, 3]);
        assert_eq!(c, d);
        assert_ne!(Value::array([1, 3]), Value::array([3, 1]));
    }

    #[test]
    fn key_strings() {
        assert_eq!(Value::from(3).to_key_string(), "3");
        assert_eq!(Value::from(1.5).to_key_string(), "1.5");
        assert_eq!(Value::from(-0.0).to_key_string(), "0");
        assert_eq!(Value::from(f64::INFINITY).to_key_string(), "Infinity");
        assert_eq!(Value::object(Vec::<(&str, i32)>::new()).to_key_string(), "[object Object]");
    }
}

//! Container nodes and their shared handles.
//!
//! Every container lives behind an `Rc<RefCell<_>>`. Cloning a handle shares
//! the container; identity is the pointer, exposed as [`NodeId`].

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use super::{same_value, Value};

// ── Identity ──────────────────────────────────────────────────────────────

/// Pointer identity of a container node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    fn of<T>(rc: &Rc<T>) -> Self {
        NodeId(Rc::as_ptr(rc) as *const () as usize)
    }
}

// ── Symbol ────────────────────────────────────────────────────────────────

/// A unique key, equal only to itself.
#[derive(Clone)]
pub struct Symbol(Rc<Option<String>>);

impl Symbol {
    pub fn new(description: impl Into<String>) -> Self {
        Symbol(Rc::new(Some(description.into())))
    }

    pub fn anonymous() -> Self {
        Symbol(Rc::new(None))
    }

    pub fn description(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or_default())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ── Integrity ─────────────────────────────────────────────────────────────

/// How much of a container may still change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Integrity {
    /// Anything goes.
    #[default]
    Extensible,
    /// No new keys or elements; existing ones may change or be removed.
    NonExtensible,
    /// No new keys, no removals; existing values may be replaced.
    Sealed,
    /// Nothing changes.
    Frozen,
}

impl Integrity {
    pub fn is_extensible(self) -> bool {
        self == Integrity::Extensible
    }

    /// Whether keys or elements may be removed.
    pub fn allows_removal(self) -> bool {
        matches!(self, Integrity::Extensible | Integrity::NonExtensible)
    }

    pub fn is_frozen(self) -> bool {
        self == Integrity::Frozen
    }
}

// ── Object ────────────────────────────────────────────────────────────────

/// Key of a plain object property. Numeric keys are stored as strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(String),
    Symbol(Symbol),
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => f.write_str(s),
            PropertyKey::Symbol(s) => fmt::Display::fmt(s, f),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::String(s.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        PropertyKey::String(s)
    }
}

impl From<&String> for PropertyKey {
    fn from(s: &String) -> Self {
        PropertyKey::String(s.clone())
    }
}

impl From<Symbol> for PropertyKey {
    fn from(s: Symbol) -> Self {
        PropertyKey::Symbol(s)
    }
}

impl From<usize> for PropertyKey {
    fn from(i: usize) -> Self {
        PropertyKey::String(i.to_string())
    }
}

impl From<i32> for PropertyKey {
    fn from(i: i32) -> Self {
        PropertyKey::String(i.to_string())
    }
}

/// A property slot with its attribute flags.
#[derive(Clone, Debug)]
pub struct Property {
    pub value: Value,
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
}

impl Property {
    /// A plain data property: writable, enumerable, configurable.
    pub fn data(value: impl Into<Value>) -> Self {
        Property {
            value: value.into(),
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.enumerable = false;
        self
    }

    pub fn permanent(mut self) -> Self {
        self.configurable = false;
        self
    }
}

#[derive(Debug, Default)]
pub struct ObjectNode {
    pub(crate) props: IndexMap<PropertyKey, Property>,
    pub(crate) integrity: Integrity,
}

/// Shared handle to a plain key-value object.
#[derive(Clone, Default)]
pub struct ObjectRef(Rc<RefCell<ObjectNode>>);

impl ObjectRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> NodeId {
        NodeId::of(&self.0)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn borrow(&self) -> Ref<'_, ObjectNode> {
        self.0.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, ObjectNode> {
        self.0.borrow_mut()
    }

    pub fn get(&self, key: impl Into<PropertyKey>) -> Option<Value> {
        self.0.borrow().props.get(&key.into()).map(|p| p.value.clone())
    }

    pub fn property(&self, key: impl Into<PropertyKey>) -> Option<Property> {
        self.0.borrow().props.get(&key.into()).cloned()
    }

    pub fn contains_key(&self, key: impl Into<PropertyKey>) -> bool {
        self.0.borrow().props.contains_key(&key.into())
    }

    /// Writes a plain data property without recording anything.
    ///
    /// Meant for building structures; integrity levels are not consulted.
    pub fn insert(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Option<Value> {
        let mut node = self.0.borrow_mut();
        let key = key.into();
        match node.props.get_mut(&key) {
            Some(prop) => Some(std::mem::replace(&mut prop.value, value.into())),
            None => {
                node.props.insert(key, Property::data(value));
                None
            }
        }
    }

    pub fn define_property(&self, key: impl Into<PropertyKey>, property: Property) {
        self.0.borrow_mut().props.insert(key.into(), property);
    }

    pub fn remove(&self, key: impl Into<PropertyKey>) -> Option<Value> {
        self.0
            .borrow_mut()
            .props
            .shift_remove(&key.into())
            .map(|p| p.value)
    }

    /// Number of enumerable properties.
    pub fn len(&self) -> usize {
        self.0.borrow().props.values().filter(|p| p.enumerable).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerable keys in insertion order.
    pub fn keys(&self) -> Vec<PropertyKey> {
        self.0
            .borrow()
            .props
            .iter()
            .filter(|(_, p)| p.enumerable)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Enumerable entries in insertion order.
    pub fn entries(&self) -> Vec<(PropertyKey, Value)> {
        self.0
            .borrow()
            .props
            .iter()
            .filter(|(_, p)| p.enumerable)
            .map(|(k, p)| (k.clone(), p.value.clone()))
            .collect()
    }

    pub fn integrity(&self) -> Integrity {
        self.0.borrow().integrity
    }

    pub fn prevent_extensions(&self) {
        let mut node = self.0.borrow_mut();
        if node.integrity == Integrity::Extensible {
            node.integrity = Integrity::NonExtensible;
        }
    }

    pub fn seal(&self) {
        let mut node = self.0.borrow_mut();
        for prop in node.props.values_mut() {
            prop.configurable = false;
        }
        if node.integrity != Integrity::Frozen {
            node.integrity = Integrity::Sealed;
        }
    }

    pub fn freeze(&self) {
        let mut node = self.0.borrow_mut();
        for prop in node.props.values_mut() {
            prop.configurable = false;
            prop.writable = false;
        }
        node.integrity = Integrity::Frozen;
    }
}

// ── Array ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ArrayNode {
    pub(crate) items: Vec<Value>,
    pub(crate) integrity: Integrity,
}

/// Shared handle to an ordered sequence. Holes read as `Undefined`.
#[derive(Clone, Default)]
pub struct ArrayRef(Rc<RefCell<ArrayNode>>);

impl ArrayRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        ArrayRef(Rc::new(RefCell::new(ArrayNode {
            items,
            integrity: Integrity::Extensible,
        })))
    }

    pub fn id(&self) -> NodeId {
        NodeId::of(&self.0)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn borrow(&self) -> Ref<'_, ArrayNode> {
        self.0.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, ArrayNode> {
        self.0.borrow_mut()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().items.get(index).cloned()
    }

    /// Appends without recording anything.
    pub fn push(&self, value: impl Into<Value>) {
        self.0.borrow_mut().items.push(value.into());
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().items.clone()
    }

    pub fn integrity(&self) -> Integrity {
        self.0.borrow().integrity
    }

    pub fn prevent_extensions(&self) {
        let mut node = self.0.borrow_mut();
        if node.integrity == Integrity::Extensible {
            node.integrity = Integrity::NonExtensible;
        }
    }

    pub fn seal(&self) {
        let mut node = self.0.borrow_mut();
        if node.integrity != Integrity::Frozen {
            node.integrity = Integrity::Sealed;
        }
    }

    pub fn freeze(&self) {
        self.0.borrow_mut().integrity = Integrity::Frozen;
    }
}

// ── Map / Set ─────────────────────────────────────────────────────────────

/// Hash-map key under SameValue equality.
#[derive(Clone, Debug)]
pub(crate) struct MapKey(pub(crate) Value);

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        same_value(&self.0, &other.0)
    }
}

impl Eq for MapKey {}

impl Hash for MapKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_same_value(&self.0, state);
    }
}

/// Hash consistent with [`same_value`].
pub(crate) fn hash_same_value<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Undefined => 0u8.hash(state),
        Value::Null => 1u8.hash(state),
        Value::Bool(b) => {
            2u8.hash(state);
            b.hash(state);
        }
        Value::Number(n) => {
            3u8.hash(state);
            let bits = if n.is_nan() { f64::NAN.to_bits() } else { n.to_bits() };
            bits.hash(state);
        }
        Value::String(s) => {
            4u8.hash(state);
            s.hash(state);
        }
        Value::Symbol(s) => {
            5u8.hash(state);
            s.hash(state);
        }
        container => {
            6u8.hash(state);
            container.node_id().hash(state);
        }
    }
}

#[derive(Debug, Default)]
pub struct MapNode {
    pub(crate) entries: IndexMap<MapKey, Value>,
}

/// Shared handle to an insertion-ordered hash-map keyed by any value.
#[derive(Clone, Default)]
pub struct MapRef(Rc<RefCell<MapNode>>);

impl MapRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> NodeId {
        NodeId::of(&self.0)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn borrow(&self) -> Ref<'_, MapNode> {
        self.0.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, MapNode> {
        self.0.borrow_mut()
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.0.borrow().entries.get(&MapKey(key.clone())).cloned()
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.0.borrow().entries.contains_key(&MapKey(key.clone()))
    }

    /// Writes an entry without recording anything. Existing keys keep their
    /// position.
    pub fn insert(&self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        self.0
            .borrow_mut()
            .entries
            .insert(MapKey(key.into()), value.into())
    }

    pub fn remove(&self, key: &Value) -> Option<Value> {
        self.0.borrow_mut().entries.shift_remove(&MapKey(key.clone()))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<Value> {
        self.0.borrow().entries.keys().map(|k| k.0.clone()).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.0.borrow().entries.values().cloned().collect()
    }

    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.0
            .borrow()
            .entries
            .iter()
            .map(|(k, v)| (k.0.clone(), v.clone()))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct SetNode {
    pub(crate) members: IndexSet<MapKey>,
}

/// Shared handle to an insertion-ordered hash-set of values.
#[derive(Clone, Default)]
pub struct SetRef(Rc<RefCell<SetNode>>);

impl SetRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> NodeId {
        NodeId::of(&self.0)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn borrow(&self) -> Ref<'_, SetNode> {
        self.0.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, SetNode> {
        self.0.borrow_mut()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.0.borrow().members.contains(&MapKey(value.clone()))
    }

    /// Adds without recording anything. Returns whether the value was new.
    pub fn insert(&self, value: impl Into<Value>) -> bool {
        self.0.borrow_mut().members.insert(MapKey(value.into()))
    }

    pub fn remove(&self, value: &Value) -> bool {
        self.0.borrow_mut().members.shift_remove(&MapKey(value.clone()))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> Vec<Value> {
        self.0.borrow().members.iter().map(|k| k.0.clone()).collect()
    }
}

// ── Debug ─────────────────────────────────────────────────────────────────

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(node) => f
                .debug_map()
                .entries(node.props.iter().map(|(k, p)| (k, &p.value)))
                .finish(),
            Err(_) => f.write_str("Object(<borrowed>)"),
        }
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(node) => f.debug_list().entries(node.items.iter()).finish(),
            Err(_) => f.write_str("Array(<borrowed>)"),
        }
    }
}

impl fmt::Debug for MapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(node) => {
                f.write_str("Map")?;
                f.debug_map()
                    .entries(node.entries.iter().map(|(k, v)| (&k.0, v)))
                    .finish()
            }
            Err(_) => f.write_str("Map(<borrowed>)"),
        }
    }
}

impl fmt::Debug for SetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(node) => {
                f.write_str("Set")?;
                f.debug_set().entries(node.members.iter().map(|k| &k.0)).finish()
            }
            Err(_) => f.write_str("Set(<borrowed>)"),
        }
    }
}

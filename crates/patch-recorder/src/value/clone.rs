//! Deep copies for emitted patch values.
//!
//! Objects, arrays, maps and sets are copied recursively. Map keys stay
//! shared so identity-keyed entries keep resolving. Shared substructure and
//! cycles are copied once and re-linked.

use std::collections::HashMap;

use super::{ArrayRef, MapRef, NodeId, ObjectRef, SetRef, Value};

impl Value {
    /// Copies every reachable container; primitives are shared.
    pub fn deep_clone(&self) -> Value {
        let mut seen = HashMap::new();
        clone_with(self, &mut seen)
    }
}

fn clone_with(value: &Value, seen: &mut HashMap<NodeId, Value>) -> Value {
    let Some(id) = value.node_id() else {
        return value.clone();
    };
    if let Some(copy) = seen.get(&id) {
        return copy.clone();
    }
    match value {
        Value::Object(obj) => {
            let copy = ObjectRef::new();
            seen.insert(id, Value::Object(copy.clone()));
            for (key, child) in obj.entries() {
                copy.insert(key, clone_with(&child, seen));
            }
            Value::Object(copy)
        }
        Value::Array(arr) => {
            let copy = ArrayRef::new();
            seen.insert(id, Value::Array(copy.clone()));
            for child in arr.to_vec() {
                copy.push(clone_with(&child, seen));
            }
            Value::Array(copy)
        }
        Value::Map(map) => {
            let copy = MapRef::new();
            seen.insert(id, Value::Map(copy.clone()));
            for (key, child) in map.entries() {
                copy.insert(key, clone_with(&child, seen));
            }
            Value::Map(copy)
        }
        Value::Set(set) => {
            let copy = SetRef::new();
            seen.insert(id, Value::Set(copy.clone()));
            for member in set.values() {
                copy.insert(clone_with(&member, seen));
            }
            Value::Set(copy)
        }
        _ => value.clone(),
    }
}

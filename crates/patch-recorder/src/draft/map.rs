use std::fmt;
use std::rc::Rc;

use super::{Drafted, Handle};
use crate::emit::{emit_add, emit_remove, emit_replace};
use crate::error::RecordResult;
use crate::patch::Effect;
use crate::path::{Key, Path};
use crate::value::{same_value, MapKey, MapRef, Value};

/// Draft of a hash-map.
///
/// Whether `set` records `add` or `replace` depends on the keys the map held
/// when the session first reached it, not on its live state.
#[derive(Clone)]
pub struct MapDraft(pub(crate) Rc<Handle<MapRef>>);

impl MapDraft {
    pub fn path(&self) -> &Path {
        &self.0.path
    }

    pub fn value(&self) -> Value {
        Value::Map(self.0.node.clone())
    }

    pub fn ptr_eq(&self, other: &MapDraft) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Entry for `key`; containers come back drafted.
    pub fn get(&self, key: impl Into<Value>) -> RecordResult<Drafted> {
        self.0.live()?;
        let key = key.into();
        let value = self.0.node.get(&key).unwrap_or_default();
        Ok(self
            .0
            .session
            .drafted(value, self.0.path.append(Key::from_value(&key))))
    }

    pub fn set(&self, key: impl Into<Value>, value: impl Into<Value>) -> RecordResult<()> {
        let handle = &self.0;
        handle.live()?;
        let key = key.into();
        let value = value.into();
        let current = handle.node.get(&key);
        if current.as_ref().is_some_and(|c| same_value(c, &value)) {
            return Ok(());
        }

        handle
            .node
            .borrow_mut()
            .entries
            .insert(MapKey(key.clone()), value.clone());

        let path = handle.path.append(Key::from_value(&key));
        if handle.session.map_had_key(&handle.node, &key) {
            let old = current.unwrap_or_default();
            emit_replace(&handle.session, path, &value, Some(&old), Effect::Write);
        } else {
            emit_add(&handle.session, path, &value, Effect::Write);
        }
        Ok(())
    }

    /// Removes `key`; returns whether it was there.
    pub fn delete(&self, key: impl Into<Value>) -> RecordResult<bool> {
        let handle = &self.0;
        handle.live()?;
        let key = key.into();
        let Some(old) = handle.node.remove(&key) else {
            return Ok(false);
        };
        emit_remove(
            &handle.session,
            handle.path.append(Key::from_value(&key)),
            Some(&old),
            Effect::Write,
        );
        Ok(true)
    }

    /// Removes every entry, one `remove` per entry in iteration order.
    pub fn clear(&self) -> RecordResult<()> {
        let handle = &self.0;
        handle.live()?;
        let entries = handle.node.entries();
        handle.node.borrow_mut().entries.clear();
        for (key, old) in &entries {
            emit_remove(
                &handle.session,
                handle.path.append(Key::from_value(key)),
                Some(old),
                Effect::Write,
            );
        }
        Ok(())
    }

    pub fn has(&self, key: impl Into<Value>) -> bool {
        self.0.node.contains_key(&key.into())
    }

    pub fn len(&self) -> usize {
        self.0.node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.node.is_empty()
    }

    pub fn keys(&self) -> Vec<Value> {
        self.0.node.keys()
    }

    pub fn values(&self) -> Vec<Value> {
        self.0.node.values()
    }

    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.0.node.entries()
    }

    /// Calls `f(value, key)` for each entry.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Value, &Value),
    {
        for (k, v) in &self.entries() {
            f(v, k);
        }
    }
}

impl fmt::Debug for MapDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapDraft")
            .field("path", &self.0.path)
            .finish_non_exhaustive()
    }
}

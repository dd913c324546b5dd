use std::fmt;
use std::rc::Rc;

use super::{Drafted, Handle};
use crate::emit::{emit_add, emit_remove, emit_replace};
use crate::error::{RecordError, RecordResult};
use crate::patch::Effect;
use crate::path::{Key, Path};
use crate::value::{same_value, ObjectRef, Property, PropertyKey, Value};

/// Draft of a plain object.
#[derive(Clone)]
pub struct ObjectDraft(pub(crate) Rc<Handle<ObjectRef>>);

impl ObjectDraft {
    pub fn path(&self) -> &Path {
        &self.0.path
    }

    pub fn value(&self) -> Value {
        Value::Object(self.0.node.clone())
    }

    pub fn ptr_eq(&self, other: &ObjectDraft) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn get(&self, key: impl Into<Key>) -> RecordResult<Drafted> {
        self.0.live()?;
        let key = property_key(key.into());
        let value = self.0.node.get(key.property_key()).unwrap_or_default();
        Ok(self.0.session.drafted(value, self.0.path.append(key)))
    }

    /// Assigns a property, recording `add` for a new key and `replace` for
    /// an existing one.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> RecordResult<()> {
        let handle = &self.0;
        handle.live()?;
        let key = property_key(key.into());
        let value = value.into();
        let pk = key.property_key();

        let (current, writable, integrity) = {
            let node = handle.node.borrow();
            let prop = node.props.get(&pk);
            (
                prop.map(|p| p.value.clone()),
                prop.map_or(true, |p| p.writable),
                node.integrity,
            )
        };
        let had = current.is_some();
        let current = current.unwrap_or_default();
        if same_value(&current, &value) && (!value.is_undefined() || had) {
            return Ok(());
        }
        if integrity.is_frozen() {
            return Err(RecordError::Frozen {
                path: handle.path.clone(),
            });
        }
        if !writable {
            return Err(RecordError::ReadOnly {
                path: handle.path.clone(),
                key,
            });
        }
        if !had && !integrity.is_extensible() {
            return Err(RecordError::NotExtensible {
                path: handle.path.clone(),
                key,
            });
        }

        {
            let mut node = handle.node.borrow_mut();
            match node.props.get_mut(&pk) {
                Some(prop) => prop.value = value.clone(),
                None => {
                    node.props.insert(pk, Property::data(value.clone()));
                }
            }
        }

        let path = handle.path.append(key);
        if had {
            emit_replace(&handle.session, path, &value, Some(&current), Effect::Write);
        } else {
            emit_add(&handle.session, path, &value, Effect::Write);
        }
        Ok(())
    }

    /// Removes a property. Absent keys are left alone.
    pub fn delete(&self, key: impl Into<Key>) -> RecordResult<()> {
        let handle = &self.0;
        handle.live()?;
        let key = property_key(key.into());
        let pk = key.property_key();

        let (current, configurable, integrity) = {
            let node = handle.node.borrow();
            match node.props.get(&pk) {
                Some(p) => (p.value.clone(), p.configurable, node.integrity),
                None => return Ok(()),
            }
        };
        if integrity.is_frozen() {
            return Err(RecordError::Frozen {
                path: handle.path.clone(),
            });
        }
        if !configurable || !integrity.allows_removal() {
            return Err(RecordError::NotConfigurable {
                path: handle.path.clone(),
                key,
            });
        }

        handle.node.borrow_mut().props.shift_remove(&pk);
        emit_remove(
            &handle.session,
            handle.path.append(key),
            Some(&current),
            Effect::Write,
        );
        Ok(())
    }

    pub fn has(&self, key: impl Into<Key>) -> bool {
        self.0
            .node
            .contains_key(property_key(key.into()).property_key())
    }

    pub fn len(&self) -> usize {
        self.0.node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.node.is_empty()
    }

    pub fn keys(&self) -> Vec<PropertyKey> {
        self.0.node.keys()
    }

    /// Raw entries; nested containers are not drafted.
    pub fn entries(&self) -> Vec<(PropertyKey, Value)> {
        self.0.node.entries()
    }
}

/// Object keys are strings or symbols; anything else is stringified.
fn property_key(key: Key) -> Key {
    match key {
        Key::String(_) | Key::Symbol(_) => key,
        other => Key::String(other.to_token().into_owned()),
    }
}

impl fmt::Debug for ObjectDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDraft")
            .field("path", &self.0.path)
            .finish_non_exhaustive()
    }
}

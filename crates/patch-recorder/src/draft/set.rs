use std::fmt;
use std::rc::Rc;

use super::Handle;
use crate::emit::{emit_add, emit_remove};
use crate::error::RecordResult;
use crate::patch::Effect;
use crate::path::{Key, Path};
use crate::value::{SetRef, Value};

/// Draft of a hash-set. A member's path key is the member itself.
#[derive(Clone)]
pub struct SetDraft(pub(crate) Rc<Handle<SetRef>>);

impl SetDraft {
    pub fn path(&self) -> &Path {
        &self.0.path
    }

    pub fn value(&self) -> Value {
        Value::Set(self.0.node.clone())
    }

    pub fn ptr_eq(&self, other: &SetDraft) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Adds `value`; returns whether it was new.
    pub fn add(&self, value: impl Into<Value>) -> RecordResult<bool> {
        let handle = &self.0;
        handle.live()?;
        let value = value.into();
        if !handle.node.insert(value.clone()) {
            return Ok(false);
        }
        emit_add(
            &handle.session,
            handle.path.append(Key::from_value(&value)),
            &value,
            Effect::Write,
        );
        Ok(true)
    }

    /// Removes `value`; returns whether it was there.
    pub fn delete(&self, value: impl Into<Value>) -> RecordResult<bool> {
        let handle = &self.0;
        handle.live()?;
        let value = value.into();
        if !handle.node.remove(&value) {
            return Ok(false);
        }
        emit_remove(
            &handle.session,
            handle.path.append(Key::from_value(&value)),
            Some(&value),
            Effect::Write,
        );
        Ok(true)
    }

    pub fn clear(&self) -> RecordResult<()> {
        let handle = &self.0;
        handle.live()?;
        let members = handle.node.values();
        handle.node.borrow_mut().members.clear();
        for member in &members {
            emit_remove(
                &handle.session,
                handle.path.append(Key::from_value(member)),
                Some(member),
                Effect::Write,
            );
        }
        Ok(())
    }

    pub fn has(&self, value: impl Into<Value>) -> bool {
        self.0.node.contains(&value.into())
    }

    pub fn len(&self) -> usize {
        self.0.node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.node.is_empty()
    }

    pub fn values(&self) -> Vec<Value> {
        self.0.node.values()
    }

    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&Value),
    {
        self.values().iter().for_each(f);
    }
}

impl fmt::Debug for SetDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetDraft")
            .field("path", &self.0.path)
            .finish_non_exhaustive()
    }
}

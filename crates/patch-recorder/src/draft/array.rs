use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use super::{Drafted, Handle};
use crate::emit::{emit_add, emit_length, emit_remove, emit_replace};
use crate::error::{RecordError, RecordResult};
use crate::patch::Effect;
use crate::path::{length_of, Key, Path, MAX_ARRAY_LENGTH};
use crate::value::{same_value, same_value_zero, strict_equals, ArrayRef, Integrity, Value};

/// Draft of an array.
///
/// Element writes record `replace` inside the current length and `add` at
/// or past it. Bulk operations record one patch per touched index, in an
/// order a sequential applier can follow.
#[derive(Clone)]
pub struct ArrayDraft(pub(crate) Rc<Handle<ArrayRef>>);

impl ArrayDraft {
    pub fn path(&self) -> &Path {
        &self.0.path
    }

    pub fn value(&self) -> Value {
        Value::Array(self.0.node.clone())
    }

    pub fn ptr_eq(&self, other: &ArrayDraft) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn len(&self) -> usize {
        self.0.node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.node.is_empty()
    }

    fn state(&self) -> (usize, Integrity) {
        let node = self.0.node.borrow();
        (node.items.len(), node.integrity)
    }

    fn ensure_growable(&self, integrity: Integrity, len: usize) -> RecordResult<()> {
        if integrity.is_frozen() {
            return Err(self.frozen());
        }
        if !integrity.is_extensible() {
            return Err(RecordError::NotExtensible {
                path: self.0.path.clone(),
                key: Key::from(len),
            });
        }
        Ok(())
    }

    fn ensure_shrinkable(&self, integrity: Integrity, index: usize) -> RecordResult<()> {
        if integrity.is_frozen() {
            return Err(self.frozen());
        }
        if !integrity.allows_removal() {
            return Err(RecordError::NotConfigurable {
                path: self.0.path.clone(),
                key: Key::from(index),
            });
        }
        Ok(())
    }

    fn frozen(&self) -> RecordError {
        RecordError::Frozen {
            path: self.0.path.clone(),
        }
    }

    fn invalid(&self, key: Key) -> RecordError {
        RecordError::InvalidIndex {
            path: self.0.path.clone(),
            key,
        }
    }

    // ── Element access ────────────────────────────────────────────────────

    pub fn get(&self, index: usize) -> RecordResult<Drafted> {
        self.0.live()?;
        let value = self.0.node.get(index).unwrap_or_default();
        Ok(self.0.session.drafted(value, self.0.path.append(index)))
    }

    pub(crate) fn get_key(&self, key: Key) -> RecordResult<Drafted> {
        if let Some(index) = key.as_index() {
            return self.get(index);
        }
        self.0.live()?;
        let value = if key.as_str() == Some("length") {
            Value::from(self.len())
        } else {
            Value::Undefined
        };
        Ok(Drafted::Primitive {
            value,
            path: self.0.path.append(key),
        })
    }

    /// Writes one element. Writing past the end pads with `undefined`.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> RecordResult<()> {
        let handle = &self.0;
        handle.live()?;
        if index >= MAX_ARRAY_LENGTH {
            return Err(self.invalid(Key::from(index)));
        }
        let value = value.into();
        let (current, len, integrity) = {
            let node = handle.node.borrow();
            (node.items.get(index).cloned(), node.items.len(), node.integrity)
        };
        let had = index < len;
        let current = current.unwrap_or_default();
        if same_value(&current, &value) && (!value.is_undefined() || had) {
            return Ok(());
        }
        if had {
            if integrity.is_frozen() {
                return Err(self.frozen());
            }
        } else {
            self.ensure_growable(integrity, index)?;
        }

        {
            let mut node = handle.node.borrow_mut();
            if had {
                node.items[index] = value.clone();
            } else {
                node.items.resize(index, Value::Undefined);
                node.items.push(value.clone());
            }
        }

        let path = handle.path.append(index);
        if had {
            emit_replace(&handle.session, path, &value, Some(&current), Effect::Write);
        } else {
            let effect = if index == len {
                Effect::Append
            } else {
                Effect::Sparse
            };
            emit_add(&handle.session, path, &value, effect);
        }
        Ok(())
    }

    pub(crate) fn set_key(&self, key: Key, value: Value) -> RecordResult<()> {
        if let Some(index) = key.as_index() {
            return self.set(index, value);
        }
        self.0.live()?;
        if key.as_str() == Some("length") {
            if let Some(len) = length_of(&value) {
                return self.set_len(len);
            }
        }
        Err(self.invalid(key))
    }

    /// Clears an element to `undefined` without shrinking. Indices past the
    /// end are left alone.
    pub fn delete(&self, index: usize) -> RecordResult<()> {
        self.0.live()?;
        if index >= self.len() {
            return Ok(());
        }
        self.set(index, Value::Undefined)
    }

    pub(crate) fn delete_key(&self, key: Key) -> RecordResult<()> {
        match key.as_index() {
            Some(index) => self.delete(index),
            None => {
                self.0.live()?;
                Err(self.invalid(key))
            }
        }
    }

    // ── Ends ──────────────────────────────────────────────────────────────

    /// Appends values; returns the new length.
    pub fn push<I, V>(&self, values: I) -> RecordResult<usize>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let handle = &self.0;
        handle.live()?;
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let (len, integrity) = self.state();
        if values.is_empty() {
            return Ok(len);
        }
        self.ensure_growable(integrity, len)?;

        handle.node.borrow_mut().items.extend(values.iter().cloned());
        for (i, value) in values.iter().enumerate() {
            emit_add(
                &handle.session,
                handle.path.append(len + i),
                value,
                Effect::Append,
            );
        }
        Ok(len + values.len())
    }

    /// Removes the last element. Reported as a length change unless the
    /// session asks for element removals.
    pub fn pop(&self) -> RecordResult<Value> {
        let handle = &self.0;
        handle.live()?;
        let (len, integrity) = self.state();
        if len == 0 {
            return Ok(Value::Undefined);
        }
        self.ensure_shrinkable(integrity, len - 1)?;

        let old = handle.node.borrow_mut().items.pop().unwrap_or_default();
        if handle.session.options.report_shrink_as_length {
            emit_length(&handle.session, &handle.path, len - 1, len);
        } else {
            emit_remove(
                &handle.session,
                handle.path.append(len - 1),
                Some(&old),
                Effect::Tail,
            );
        }
        Ok(old)
    }

    /// Removes the first element. Survivors move down without patches of
    /// their own.
    pub fn shift(&self) -> RecordResult<Value> {
        let handle = &self.0;
        handle.live()?;
        let (len, integrity) = self.state();
        if len == 0 {
            return Ok(Value::Undefined);
        }
        self.ensure_shrinkable(integrity, 0)?;

        let old = handle.node.borrow_mut().items.remove(0);
        let effect = if len == 1 { Effect::Tail } else { Effect::Shift };
        emit_remove(&handle.session, handle.path.append(0), Some(&old), effect);
        Ok(old)
    }

    /// Prepends values; returns the new length.
    pub fn unshift<I, V>(&self, values: I) -> RecordResult<usize>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let handle = &self.0;
        handle.live()?;
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let (len, integrity) = self.state();
        if values.is_empty() {
            return Ok(len);
        }
        self.ensure_growable(integrity, len)?;

        handle
            .node
            .borrow_mut()
            .items
            .splice(0..0, values.iter().cloned());
        let effect = if len == 0 {
            Effect::Append
        } else {
            Effect::Insert
        };
        for (i, value) in values.iter().enumerate() {
            emit_add(&handle.session, handle.path.append(i), value, effect);
        }
        Ok(len + values.len())
    }

    // ── Splice ────────────────────────────────────────────────────────────

    /// Removes `delete_count` elements at `start` and inserts `items` there.
    /// A negative `start` counts from the end; `None` deletes to the end.
    /// Returns the removed elements.
    ///
    /// Overlapping positions are recorded as `replace`, extra items as
    /// `add`, and extra removals as `remove` from the highest index down.
    pub fn splice<I, V>(
        &self,
        start: isize,
        delete_count: Option<usize>,
        items: I,
    ) -> RecordResult<Vec<Value>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let handle = &self.0;
        handle.live()?;
        let inserted: Vec<Value> = items.into_iter().map(Into::into).collect();
        let (len, integrity) = self.state();
        let start = if start < 0 {
            len.saturating_sub(start.unsigned_abs())
        } else {
            start.unsigned_abs().min(len)
        };
        let delete_count = delete_count.map_or(len - start, |n| n.min(len - start));
        if delete_count == 0 && inserted.is_empty() {
            return Ok(Vec::new());
        }
        if integrity.is_frozen() {
            return Err(self.frozen());
        }
        if inserted.len() > delete_count {
            self.ensure_growable(integrity, len)?;
        }
        if delete_count > inserted.len() {
            self.ensure_shrinkable(integrity, start + inserted.len())?;
        }

        let removed: Vec<Value> = handle
            .node
            .borrow_mut()
            .items
            .splice(start..start + delete_count, inserted.iter().cloned())
            .collect();

        let session = &handle.session;
        let common = delete_count.min(inserted.len());
        for (i, (new, old)) in inserted.iter().zip(&removed).enumerate() {
            emit_replace(
                session,
                handle.path.append(start + i),
                new,
                Some(old),
                Effect::Write,
            );
        }
        let mut running = len;
        for (i, value) in inserted.iter().enumerate().skip(common) {
            let index = start + i;
            let effect = if index < running {
                Effect::Insert
            } else {
                Effect::Append
            };
            emit_add(session, handle.path.append(index), value, effect);
            running += 1;
        }
        for i in (common..delete_count).rev() {
            let index = start + i;
            let effect = if index + 1 == running {
                Effect::Tail
            } else {
                Effect::Shift
            };
            emit_remove(session, handle.path.append(index), Some(&removed[i]), effect);
            running -= 1;
        }
        Ok(removed)
    }

    /// Inserts one element before `index` (clamped to the length).
    pub fn insert(&self, index: usize, value: impl Into<Value>) -> RecordResult<()> {
        let start = isize::try_from(index).unwrap_or(isize::MAX);
        self.splice(start, Some(0), [value.into()]).map(drop)
    }

    /// Removes the element at `index`, shifting later ones down.
    pub fn remove(&self, index: usize) -> RecordResult<Option<Value>> {
        let start = isize::try_from(index).unwrap_or(isize::MAX);
        let removed = self.splice(start, Some(1), std::iter::empty::<Value>())?;
        Ok(removed.into_iter().next())
    }

    /// Sets the length directly, truncating or padding with `undefined`.
    /// Always recorded as `replace .../length`.
    pub fn set_len(&self, new_len: usize) -> RecordResult<()> {
        let handle = &self.0;
        handle.live()?;
        if new_len > MAX_ARRAY_LENGTH {
            return Err(self.invalid(Key::from(new_len)));
        }
        let (len, integrity) = self.state();
        if new_len == len {
            return Ok(());
        }
        if new_len > len {
            self.ensure_growable(integrity, len)?;
        } else {
            self.ensure_shrinkable(integrity, new_len)?;
        }

        handle
            .node
            .borrow_mut()
            .items
            .resize(new_len, Value::Undefined);
        emit_length(&handle.session, &handle.path, new_len, len);
        Ok(())
    }

    // ── Reordering ────────────────────────────────────────────────────────

    /// Stable sort with a caller comparator. Recorded as a single `replace`
    /// of the whole array, or nothing if the order did not change.
    pub fn sort_by<F>(&self, compare: F) -> RecordResult<()>
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        self.0.live()?;
        let before = self.0.node.to_vec();
        let mut after = before.clone();
        after.sort_by(compare);
        self.reorder(before, after)
    }

    /// Sorts by string form with `undefined` last.
    pub fn sort(&self) -> RecordResult<()> {
        self.sort_by(default_order)
    }

    pub fn reverse(&self) -> RecordResult<()> {
        self.0.live()?;
        let before = self.0.node.to_vec();
        let mut after = before.clone();
        after.reverse();
        self.reorder(before, after)
    }

    fn reorder(&self, before: Vec<Value>, after: Vec<Value>) -> RecordResult<()> {
        let handle = &self.0;
        if before.iter().zip(&after).all(|(a, b)| same_value(a, b)) {
            return Ok(());
        }
        if handle.node.integrity().is_frozen() {
            return Err(self.frozen());
        }
        handle.node.borrow_mut().items = after;
        emit_replace(
            &handle.session,
            handle.path.clone(),
            &self.value(),
            Some(&Value::array(before)),
            Effect::Write,
        );
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────
    //
    // These read the raw node and hand back plain values; nothing they return
    // is drafted.

    pub fn values(&self) -> Vec<Value> {
        self.0.node.to_vec()
    }

    pub fn includes(&self, needle: &Value) -> bool {
        self.values().iter().any(|v| same_value_zero(v, needle))
    }

    pub fn index_of(&self, needle: &Value) -> Option<usize> {
        self.values().iter().position(|v| strict_equals(v, needle))
    }

    pub fn find<P>(&self, mut predicate: P) -> Option<Value>
    where
        P: FnMut(&Value) -> bool,
    {
        self.values().into_iter().find(|v| predicate(v))
    }

    pub fn find_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&Value) -> bool,
    {
        self.values().iter().position(predicate)
    }

    /// Copy of `[start, end)`; negative bounds count from the end.
    pub fn slice(&self, start: isize, end: Option<isize>) -> Vec<Value> {
        let values = self.values();
        let len = values.len();
        let clamp = |i: isize| {
            if i < 0 {
                len.saturating_sub(i.unsigned_abs())
            } else {
                i.unsigned_abs().min(len)
            }
        };
        let start = clamp(start);
        let end = end.map_or(len, clamp);
        if start >= end {
            return Vec::new();
        }
        values[start..end].to_vec()
    }

    pub fn concat<I, V>(&self, other: I) -> Vec<Value>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut values = self.values();
        values.extend(other.into_iter().map(Into::into));
        values
    }

    pub fn map<T, F>(&self, f: F) -> Vec<T>
    where
        F: FnMut(&Value) -> T,
    {
        self.values().iter().map(f).collect()
    }

    pub fn filter<P>(&self, mut predicate: P) -> Vec<Value>
    where
        P: FnMut(&Value) -> bool,
    {
        self.values().into_iter().filter(|v| predicate(v)).collect()
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Value, usize),
    {
        for (i, v) in self.values().iter().enumerate() {
            f(v, i);
        }
    }

    pub fn fold<T, F>(&self, init: T, f: F) -> T
    where
        F: FnMut(T, &Value) -> T,
    {
        self.values().iter().fold(init, f)
    }
}

fn default_order(a: &Value, b: &Value) -> Ordering {
    match (a.is_undefined(), b.is_undefined()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.to_key_string().cmp(&b.to_key_string()),
    }
}

impl fmt::Debug for ArrayDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayDraft")
            .field("path", &self.0.path)
            .finish_non_exhaustive()
    }
}

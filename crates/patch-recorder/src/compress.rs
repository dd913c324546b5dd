//! Patch list compression.
//!
//! Same-path patches are merged into the earliest one of the pair, patches
//! made moot by a later write above them are dropped, and array growth that
//! a later shrink undoes is cancelled. Applying the output in order gives the
//! same final state as applying the input in order.
//!
//! Array index shifts make later patches refer to different elements than
//! earlier ones at the same path, so an insert or a shifting removal seals
//! its array: nothing recorded below it before the shift takes part in any
//! later merge. Length changes close every element of their array the same
//! way.

use std::collections::HashMap;

use tracing::trace;

use crate::patch::{Effect, Op, Patch};
use crate::path::{length_of, Key};

/// Condenses a patch list recorded by one session.
///
/// Patches built by hand carry no emission details, so they are treated
/// conservatively: a numeric trailing key on `add` or `remove` counts as an
/// index shift and is never merged.
pub fn compress(patches: Vec<Patch>) -> Vec<Patch> {
    let before = patches.len();
    let mut compressor = Compressor {
        slots: Vec::with_capacity(before),
        root: Node::default(),
    };
    for patch in patches {
        compressor.push(patch);
    }
    let out: Vec<Patch> = compressor.slots.into_iter().flatten().collect();
    trace!(before, after = out.len(), "compressed patch list");
    out
}

// ── Path trie ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Node {
    /// Surviving patches positioned exactly here.
    live: Vec<usize>,
    /// Patches recorded below this node before an index shift. They can still
    /// be superseded by a write at or above this node but never merge.
    sealed: Vec<usize>,
    /// The patch the next one at this path may merge into.
    open: Option<Open>,
    /// Length change of this node as an array since the session began.
    length: Length,
    children: HashMap<Key, Node>,
}

/// Net element count change, plus a generation bumped whenever the change
/// is not a single step at the end (sparse writes, length assignments,
/// shifts, whole-array writes).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Length {
    generation: u32,
    delta: i64,
}

#[derive(Debug, Clone, Copy)]
struct Open {
    slot: usize,
    /// Parent length right after the open patch took effect.
    length: Length,
}

impl Node {
    fn descend(&mut self, keys: &[Key]) -> &mut Node {
        let mut node = self;
        for key in keys {
            node = node.children.entry(key.clone()).or_default();
        }
        node
    }

    fn child(&mut self, key: &Key) -> &mut Node {
        self.children.entry(key.clone()).or_default()
    }

    /// Drops every patch strictly below this node.
    fn kill_children(&mut self, slots: &mut [Option<Patch>]) {
        for slot in self.sealed.drain(..) {
            kill(slots, slot);
        }
        for (_, mut child) in self.children.drain() {
            child.kill_all(slots);
        }
    }

    fn kill_all(&mut self, slots: &mut [Option<Patch>]) {
        for slot in self.live.drain(..) {
            kill(slots, slot);
        }
        self.open = None;
        self.kill_children(slots);
    }

    /// Freezes everything below this node in place.
    fn seal(&mut self) {
        let mut sealed = std::mem::take(&mut self.sealed);
        for (_, child) in self.children.drain() {
            child.collect(&mut sealed);
        }
        self.sealed = sealed;
    }

    fn collect(self, out: &mut Vec<usize>) {
        out.extend(self.live);
        out.extend(self.sealed);
        for (_, child) in self.children {
            child.collect(out);
        }
    }

    fn step(&mut self, effect: Effect) {
        match effect {
            Effect::Append => self.length.delta += 1,
            Effect::Tail => self.length.delta -= 1,
            Effect::Sparse | Effect::Insert | Effect::Shift | Effect::Length { .. } => {
                self.restart_length()
            }
            Effect::Unknown | Effect::Write => {}
        }
    }

    fn restart_length(&mut self) {
        self.length = Length {
            generation: self.length.generation + 1,
            delta: 0,
        };
    }

    /// Whether this element's only surviving patch is an append made in
    /// `generation` that is still open.
    fn appended_in(&self, slots: &[Option<Patch>], generation: u32) -> bool {
        let mut live = self.live.iter().copied().filter(|&i| slots[i].is_some());
        let (Some(slot), None, Some(open)) = (live.next(), live.next(), self.open) else {
            return false;
        };
        open.slot == slot
            && open.length.generation == generation
            && slots[slot]
                .as_ref()
                .is_some_and(|p| p.op == Op::Add && p.effect == Effect::Append)
    }

    /// Drops what truncating the array below this element makes moot:
    /// everything inside it, and writes here that left the length alone.
    /// Patches that resized the array stay.
    fn truncate(&mut self, slots: &mut [Option<Patch>]) {
        self.kill_children(slots);
        self.open = None;
        self.live.retain(|&slot| {
            let resized = slots[slot]
                .as_ref()
                .is_some_and(|p| p.resolved_effect() != Effect::Write);
            if !resized {
                kill(slots, slot);
            }
            resized
        });
    }
}

fn kill(slots: &mut [Option<Patch>], slot: usize) {
    if let Some(patch) = slots[slot].take() {
        trace!(op = patch.op.as_str(), path = %patch.path, "dropped superseded patch");
    }
}

// ── Merging ───────────────────────────────────────────────────────────────

enum Merged {
    One(Patch),
    Cancel,
    Both(Patch, Patch),
}

/// Combines two consecutive patches at the same path. The result sits where
/// `existing` was and keeps its id.
fn merge(existing: Patch, incoming: Patch) -> Merged {
    let first = existing.resolved_effect();
    let second = incoming.resolved_effect();
    match (existing.op, incoming.op) {
        (Op::Replace, Op::Replace) | (Op::Add, Op::Replace) | (Op::Add, Op::Add) => {
            Merged::One(Patch {
                value: incoming.value,
                ..existing
            })
        }
        (Op::Replace, Op::Remove) => Merged::One(Patch {
            op: Op::Remove,
            value: None,
            effect: second,
            ..existing
        }),
        (Op::Add, Op::Remove) if matches!(first, Effect::Write | Effect::Append) => Merged::Cancel,
        (Op::Remove, Op::Add) if matches!(second, Effect::Write | Effect::Append) => {
            Merged::One(Patch {
                op: Op::Replace,
                value: incoming.value,
                effect: Effect::Write,
                ..existing
            })
        }
        _ => Merged::Both(existing, incoming),
    }
}

// ── Compressor ────────────────────────────────────────────────────────────

struct Compressor {
    slots: Vec<Option<Patch>>,
    root: Node,
}

impl Compressor {
    fn push(&mut self, patch: Patch) {
        let keys = patch.keys().into_keys();
        match patch.resolved_effect() {
            Effect::Insert | Effect::Shift => self.push_shifting(patch, &keys),
            Effect::Length { from: Some(from) } => self.push_length(patch, &keys, from),
            Effect::Length { from: None } => self.push_shifting(patch, &keys),
            effect => self.push_write(patch, &keys, effect),
        }
    }

    fn append(&mut self, patch: Patch) -> usize {
        self.slots.push(Some(patch));
        self.slots.len() - 1
    }

    /// A patch that moves siblings. Removals drop the edits made inside the
    /// removed element first.
    fn push_shifting(&mut self, patch: Patch, keys: &[Key]) {
        let Some((last, parent)) = keys.split_last() else {
            return self.push_write(patch, keys, Effect::Write);
        };
        let removal = patch.op == Op::Remove;
        trace!(path = %patch.path, "sealed array");
        let slot = self.append(patch);

        let seq = self.root.descend(parent);
        seq.step(Effect::Shift);
        if removal {
            if let Some(child) = seq.children.get_mut(last) {
                child.kill_children(&mut self.slots);
            }
        }
        seq.seal();
        seq.child(last).live.push(slot);
    }

    /// A write that replaces or removes the whole value at its path without
    /// moving siblings.
    fn push_write(&mut self, patch: Patch, keys: &[Key], effect: Effect) {
        let (parent_keys, last) = match keys.split_last() {
            Some((last, parent)) => (parent, Some(last)),
            None => (keys, None),
        };
        let parent = self.root.descend(parent_keys);
        let before = parent.length;
        parent.step(effect);
        let after = parent.length;
        // A merge moves the incoming patch's length change back to the
        // earlier slot; only valid if the length is what it was there.
        let resizes = matches!(effect, Effect::Append | Effect::Sparse | Effect::Tail);
        let node = match last {
            Some(key) => parent.child(key),
            None => parent,
        };
        node.kill_children(&mut self.slots);
        node.restart_length();

        let existing = node
            .open
            .filter(|open| !resizes || open.length == before)
            .and_then(|open| self.slots[open.slot].take().map(|patch| (open, patch)));
        let incoming = match existing {
            None => patch,
            Some((open, existing)) => match merge(existing, patch) {
                Merged::One(merged) => {
                    trace!(op = merged.op.as_str(), path = %merged.path, "merged patches");
                    self.slots[open.slot] = Some(merged);
                    if resizes {
                        node.open = Some(Open {
                            slot: open.slot,
                            length: after,
                        });
                    }
                    return;
                }
                Merged::Cancel => {
                    trace!(path = %keys_display(keys), "cancelled add and remove");
                    node.open = None;
                    node.live.retain(|&i| i != open.slot);
                    return;
                }
                Merged::Both(existing, incoming) => {
                    self.slots[open.slot] = Some(existing);
                    incoming
                }
            },
        };

        self.slots.push(Some(incoming));
        let slot = self.slots.len() - 1;
        node.live.push(slot);
        node.open = Some(Open {
            slot,
            length: after,
        });
    }

    /// `replace <seq>/length`. Drops moot writes past the new end, and the
    /// length patch itself when it only undoes appends.
    fn push_length(&mut self, mut patch: Patch, keys: &[Key], from: usize) {
        let Some(len) = patch.value.as_ref().and_then(length_of) else {
            return self.push_shifting(patch, keys);
        };
        let Some((last, seq_keys)) = keys.split_last() else {
            return self.push_write(patch, keys, Effect::Write);
        };
        let seq = self.root.descend(seq_keys);
        let generation = seq.length.generation;
        seq.step(Effect::Length { from: Some(from) });

        let doomed: Vec<Key> = seq
            .children
            .keys()
            .filter(|k| k.as_index().is_some_and(|i| i >= len))
            .cloned()
            .collect();

        // Appends in one generation pair off with tail removals, so the
        // elements on top that were all appended in the current one were
        // seen by nothing that survives. Cutting them leaves the array no
        // shorter than the new length.
        let mut top = from;
        while top > len
            && seq
                .children
                .get(&Key::from(top - 1))
                .is_some_and(|child| child.appended_in(&self.slots, generation))
        {
            top -= 1;
        }
        for index in top..from {
            if let Some(mut child) = seq.children.remove(&Key::from(index)) {
                child.kill_all(&mut self.slots);
            }
        }
        if top == len && len < from {
            trace!(path = %patch.path, "cancelled appends and shrink");
            return;
        }
        patch.effect = Effect::Length { from: Some(top) };

        for key in &doomed {
            if let Some(child) = seq.children.get_mut(key) {
                child.truncate(&mut self.slots);
            }
        }
        for child in seq.children.values_mut() {
            child.open = None;
        }
        self.slots.push(Some(patch));
        let slot = self.slots.len() - 1;
        seq.child(last).live.push(slot);
    }
}

fn keys_display(keys: &[Key]) -> String {
    crate::path::Path::from_keys(keys.to_vec()).to_pointer()
}

//! Patch construction.
//!
//! Every value that goes into a patch is deep-cloned on the way in, so later
//! writes to the live tree never reach patches already recorded.

use tracing::trace;

use crate::patch::{Effect, ItemId, Op, Patch};
use crate::path::Path;
use crate::session::Session;
use crate::value::Value;

pub(crate) fn emit_add(session: &Session, path: Path, value: &Value, effect: Effect) {
    let patch = Patch::with_effect(Op::Add, path.into(), Some(value.deep_clone()), effect);
    push(session, patch);
}

pub(crate) fn emit_replace(
    session: &Session,
    path: Path,
    value: &Value,
    old: Option<&Value>,
    effect: Effect,
) {
    let id = item_id(session, &path, old);
    let mut patch =
        Patch::with_effect(Op::Replace, path.into(), Some(value.deep_clone()), effect);
    patch.id = id;
    push(session, patch);
}

pub(crate) fn emit_remove(session: &Session, path: Path, old: Option<&Value>, effect: Effect) {
    let id = item_id(session, &path, old);
    let mut patch = Patch::with_effect(Op::Remove, path.into(), None, effect);
    patch.id = id;
    push(session, patch);
}

/// `replace <seq>/length`, remembering the length it replaced.
pub(crate) fn emit_length(session: &Session, seq: &Path, len: usize, from: usize) {
    let patch = Patch::with_effect(
        Op::Replace,
        seq.append("length").into(),
        Some(Value::from(len)),
        Effect::Length { from: Some(from) },
    );
    push(session, patch);
}

/// Id of the item a patch at `path` replaced or removed.
fn item_id(session: &Session, path: &Path, old: Option<&Value>) -> Option<ItemId> {
    let old = old.filter(|v| !v.is_undefined())?;
    let config = session.options.item_id.as_ref()?;
    let extract = config.lookup(&path.parent()?)?;
    extract(old)
}

fn push(session: &Session, patch: Patch) {
    trace!(op = patch.op.as_str(), path = %patch.path, "recorded patch");
    session.patches.borrow_mut().push(patch);
}

#![allow(dead_code)]

//! A lenient JSON patch applier standing in for a downstream consumer.
//!
//! `add` at an array index below the length inserts, at or past it assigns
//! (padding with `null`). `replace` of an array's `length` resizes. Removing
//! a missing key is ignored. Maps are objects here, the shape
//! `Value::to_json` gives them. Sets are not addressable.

use patch_recorder::{Op, Patch, Value};
use serde_json::Value as Json;

pub fn apply(doc: &mut Json, patches: &[Patch]) {
    for patch in patches {
        apply_one(doc, patch);
    }
}

pub fn applied(base: &Json, patches: &[Patch]) -> Json {
    let mut doc = base.clone();
    apply(&mut doc, patches);
    doc
}

/// Checks that replaying `patches` on `before` reproduces `after`.
pub fn assert_replays(before: &Json, patches: &[Patch], after: &Value) {
    assert_eq!(
        applied(before, patches),
        after.to_json(),
        "replaying {} patches diverged",
        patches.len()
    );
}

fn apply_one(doc: &mut Json, patch: &Patch) {
    let tokens: Vec<String> = patch
        .keys()
        .keys()
        .iter()
        .map(|k| k.to_token().into_owned())
        .collect();
    let value = patch.value.as_ref().map(Value::to_json).unwrap_or(Json::Null);
    let Some((last, parent)) = tokens.split_last() else {
        *doc = value;
        return;
    };
    let target = parent.iter().fold(doc, |node, token| match node {
        Json::Object(m) => m
            .get_mut(token)
            .unwrap_or_else(|| panic!("missing key {token} for {patch}")),
        Json::Array(items) => {
            let i: usize = token.parse().expect("array index");
            &mut items[i]
        }
        other => panic!("cannot descend into {other} for {patch}"),
    });

    match target {
        Json::Object(m) => match patch.op {
            Op::Remove => {
                m.remove(last);
            }
            Op::Add | Op::Replace => {
                m.insert(last.clone(), value);
            }
        },
        Json::Array(items) => {
            if last == "length" {
                let len = value.as_u64().expect("length value") as usize;
                items.resize(len, Json::Null);
                return;
            }
            let i: usize = last.parse().expect("array index");
            match patch.op {
                Op::Add if i < items.len() => items.insert(i, value),
                Op::Remove => {
                    if i < items.len() {
                        items.remove(i);
                    }
                }
                Op::Replace if i < items.len() => items[i] = value,
                _ => {
                    items.resize(i, Json::Null);
                    items.push(value);
                }
            }
        }
        other => panic!("cannot apply {patch} to {other}"),
    }
}

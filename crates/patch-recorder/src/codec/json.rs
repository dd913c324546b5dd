//! JSON codec for recorded patches.
//!
//! Patches serialize as RFC 6902 objects (`op`, `path`, optional `value`,
//! optional `id`). Key paths become arrays of tokens, with numeric keys kept
//! as JSON numbers; pointer paths stay strings.

use patch_recorder_json_pointer::{parse_pointer, validate_pointer, validate_tokens};
use serde_json::{json, Map, Value as Json};
use thiserror::Error;

use crate::patch::{ItemId, Op, Patch};
use crate::path::{Key, PatchPath, Path};
use crate::value::json::number_to_json;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("patch must be an object")]
    NotAnObject,
    #[error("unknown op: {0}")]
    UnknownOp(String),
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("{0} requires a value")]
    MissingValue(&'static str),
    #[error("id must be a string or a number")]
    InvalidId,
}

// ── Path helpers ──────────────────────────────────────────────────────────

fn encode_key(key: &Key) -> Json {
    match key {
        Key::Number(n) => number_to_json(*n),
        other => Json::String(other.to_token().into_owned()),
    }
}

fn encode_path(path: &PatchPath) -> Json {
    match path {
        PatchPath::Pointer(s) => Json::String(s.clone()),
        PatchPath::Keys(p) => Json::Array(p.keys().iter().map(encode_key).collect()),
    }
}

fn decode_path(v: &Json) -> Result<PatchPath, CodecError> {
    match v {
        Json::String(s) => {
            validate_pointer(s).map_err(|e| CodecError::InvalidPath(e.to_string()))?;
            parse_pointer(s).map_err(|e| CodecError::InvalidPath(e.to_string()))?;
            Ok(PatchPath::Pointer(s.clone()))
        }
        Json::Array(tokens) => {
            validate_tokens(tokens).map_err(|e| CodecError::InvalidPath(e.to_string()))?;
            tokens
                .iter()
                .map(|t| match t {
                    Json::String(s) => Ok(Key::String(s.clone())),
                    Json::Number(n) => Ok(Key::Number(n.as_f64().unwrap_or(f64::NAN))),
                    other => Err(CodecError::InvalidPath(other.to_string())),
                })
                .collect::<Result<Path, _>>()
                .map(PatchPath::Keys)
        }
        other => Err(CodecError::InvalidPath(other.to_string())),
    }
}

fn decode_op(v: Option<&Json>) -> Result<Op, CodecError> {
    match v.and_then(Json::as_str) {
        Some("add") => Ok(Op::Add),
        Some("remove") => Ok(Op::Remove),
        Some("replace") => Ok(Op::Replace),
        Some(other) => Err(CodecError::UnknownOp(other.to_string())),
        None => Err(CodecError::UnknownOp(String::new())),
    }
}

fn decode_id(v: &Json) -> Result<ItemId, CodecError> {
    match v {
        Json::String(s) => Ok(ItemId::String(s.clone())),
        Json::Number(n) => Ok(ItemId::Number(n.as_f64().unwrap_or(f64::NAN))),
        _ => Err(CodecError::InvalidId),
    }
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize a [`Patch`] to a JSON object.
pub fn to_json(patch: &Patch) -> Json {
    let mut m = Map::new();
    m.insert("op".into(), json!(patch.op.as_str()));
    m.insert("path".into(), encode_path(&patch.path));
    if let Some(value) = &patch.value {
        m.insert("value".into(), value.to_json());
    }
    if let Some(id) = &patch.id {
        let id = match id {
            ItemId::String(s) => Json::String(s.clone()),
            ItemId::Number(n) => number_to_json(*n),
        };
        m.insert("id".into(), id);
    }
    Json::Object(m)
}

/// Serialize a patch list to a JSON array.
pub fn to_json_patch(patches: &[Patch]) -> Json {
    Json::Array(patches.iter().map(to_json).collect())
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Deserialize a patch object. Values come back as plain objects and arrays.
pub fn from_json(v: &Json) -> Result<Patch, CodecError> {
    let obj = v.as_object().ok_or(CodecError::NotAnObject)?;
    let op = decode_op(obj.get("op"))?;
    let path = decode_path(obj.get("path").unwrap_or(&Json::Null))?;
    let mut patch = match op {
        Op::Remove => Patch::remove(path),
        Op::Add | Op::Replace => {
            let value = obj
                .get("value")
                .map(Value::from_json)
                .ok_or(CodecError::MissingValue(op.as_str()))?;
            if op == Op::Add {
                Patch::add(path, value)
            } else {
                Patch::replace(path, value)
            }
        }
    };
    if let Some(id) = obj.get("id") {
        patch.id = Some(decode_id(id)?);
    }
    Ok(patch)
}

/// Deserialize a JSON array of patch objects.
pub fn from_json_patch(v: &Json) -> Result<Vec<Patch>, CodecError> {
    v.as_array()
        .ok_or(CodecError::NotAnObject)?
        .iter()
        .map(from_json)
        .collect()
}

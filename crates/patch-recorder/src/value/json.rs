//! Conversion between [`Value`] and `serde_json::Value`.

use serde_json::{Map, Number};

use super::{ArrayRef, ObjectRef, PropertyKey, Value};

impl Value {
    /// Builds a tree of plain objects and arrays from JSON.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Array(ArrayRef::from_vec(items.iter().map(Value::from_json).collect()))
            }
            serde_json::Value::Object(map) => {
                let obj = ObjectRef::new();
                for (k, v) in map {
                    obj.insert(k.as_str(), Value::from_json(v));
                }
                Value::Object(obj)
            }
        }
    }

    /// Lossy JSON rendering.
    ///
    /// `undefined` and non-finite numbers become `null`, symbols their
    /// `Symbol(desc)` text, maps objects with stringified keys, sets arrays.
    /// Hidden object properties are skipped. Cyclic input does not terminate.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Symbol(s) => serde_json::Value::String(s.to_string()),
            Value::Object(obj) => {
                let mut out = Map::new();
                for (k, v) in obj.entries() {
                    let key = match k {
                        PropertyKey::String(s) => s,
                        PropertyKey::Symbol(s) => s.to_string(),
                    };
                    out.insert(key, v.to_json());
                }
                serde_json::Value::Object(out)
            }
            Value::Array(arr) => {
                serde_json::Value::Array(arr.to_vec().iter().map(Value::to_json).collect())
            }
            Value::Map(map) => {
                let mut out = Map::new();
                for (k, v) in map.entries() {
                    out.insert(k.to_key_string(), v.to_json());
                }
                serde_json::Value::Object(out)
            }
            Value::Set(set) => {
                serde_json::Value::Array(set.values().iter().map(Value::to_json).collect())
            }
        }
    }
}

/// Integral numbers serialize as JSON integers.
pub(crate) fn number_to_json(n: f64) -> serde_json::Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_roundtrip_keeps_order() {
        let doc = json!({"b": [1, 2.5, null, true], "a": {"s": "x"}});
        let value = Value::from_json(&doc);
        assert_eq!(value.to_json(), doc);
        let keys: Vec<_> = value.as_object().unwrap().keys();
        assert_eq!(keys, vec![PropertyKey::from("b"), PropertyKey::from("a")]);
    }

    #[test]
    fn exotic_values_render_lossily() {
        let value = Value::array([
            Value::Undefined,
            Value::Number(f64::NAN),
            Value::map([(1, "one")]),
            Value::set(["a"]),
        ]);
        assert_eq!(value.to_json(), json!([null, null, {"1": "one"}, ["a"]]));
    }

    #[test]
    fn negative_zero_is_integral() {
        assert_eq!(number_to_json(-0.0), json!(0));
        assert_eq!(number_to_json(3.0), json!(3));
    }
}

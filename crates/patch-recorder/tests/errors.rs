use patch_recorder::{path, record, Draft, ObjectRef, Property, RecordError, Value};
use serde_json::json;

#[test]
fn map_and_set_reject_generic_writes() {
    let root = Value::object([("m", Value::map([("a", 1)])), ("s", Value::set([1]))]);
    let err = record(&root, |d| d.get("m")?.set("a", 2)).unwrap_err();
    assert_eq!(
        err,
        RecordError::DirectWrite {
            path: path!["m"],
            kind: "map"
        }
    );
    let err = record(&root, |d| d.get("s")?.delete(1)).unwrap_err();
    assert_eq!(
        err,
        RecordError::DirectDelete {
            path: path!["s"],
            kind: "set"
        }
    );
}

#[test]
fn read_only_property_names_the_key() {
    let obj = ObjectRef::new();
    obj.define_property("id", Property::data(7).read_only());
    let root = Value::Object(obj);
    let err = record(&root, |d| d.set("id", 8)).unwrap_err();
    assert!(matches!(err, RecordError::ReadOnly { .. }));
    assert!(err.to_string().contains("id"), "{err}");
    assert_eq!(root.get("id"), Some(Value::from(7)));
}

#[test]
fn frozen_array_rejects_growth() {
    let root = Value::from(json!({"list": [1]}));
    root.get("list").unwrap().as_array().unwrap().freeze();
    let err = record(&root, |d| d.get("list")?.as_array()?.push([2]).map(drop)).unwrap_err();
    assert_eq!(err, RecordError::Frozen { path: path!["list"] });
}

#[test]
fn sealed_array_allows_in_bounds_writes_only() {
    let root = Value::from(json!({"list": [1, 2]}));
    root.get("list").unwrap().as_array().unwrap().seal();
    let patches = record(&root, |d| d.get("list")?.as_array()?.set(0, 9)).unwrap();
    assert_eq!(patches.len(), 1);
    let err = record(&root, |d| d.get("list")?.as_array()?.pop().map(drop)).unwrap_err();
    assert!(matches!(err, RecordError::NotConfigurable { .. }));
    let err = record(&root, |d| d.get("list")?.as_array()?.push([3]).map(drop)).unwrap_err();
    assert!(matches!(err, RecordError::NotExtensible { .. }));
}

#[test]
fn non_index_array_keys_are_rejected() {
    let root = Value::from(json!({"list": [1]}));
    let err = record(&root, |d| d.get("list")?.set("color", "red")).unwrap_err();
    assert!(matches!(err, RecordError::InvalidIndex { .. }));
}

#[test]
fn out_of_range_indices_and_lengths_are_rejected() {
    let root = Value::from(json!({"list": [1]}));
    let err = record(&root, |d| d.get("list")?.as_array()?.set(usize::MAX, 2)).unwrap_err();
    assert!(matches!(err, RecordError::InvalidIndex { .. }));
    let err = record(&root, |d| d.get("list")?.set("4294967295", 2)).unwrap_err();
    assert!(matches!(err, RecordError::InvalidIndex { .. }));
    let err = record(&root, |d| d.get("list")?.as_array()?.set_len(usize::MAX)).unwrap_err();
    assert!(matches!(err, RecordError::InvalidIndex { .. }));
    assert_eq!(root.to_json(), json!({"list": [1]}));
}

#[test]
fn writing_through_undefined_fails() {
    let root = Value::from(json!({}));
    let err = record(&root, |d| d.get("profile")?.set("name", "x")).unwrap_err();
    assert_eq!(
        err,
        RecordError::NotAContainer {
            path: path!["profile"],
            found: "undefined"
        }
    );
}

#[test]
fn wrong_kind_is_reported() {
    let root = Value::from(json!({"obj": {}}));
    let err = record(&root, |d| d.get("obj")?.as_array()?.push([1]).map(drop)).unwrap_err();
    assert!(matches!(err, RecordError::WrongKind { expected: "array", found: "object", .. }));
}

#[test]
fn callback_failure_returns_no_patches() {
    let root = Value::from(json!({"a": 1}));
    let result = record(&root, |d| {
        d.set("a", 2)?;
        Err(RecordError::aborted("validation failed"))
    });
    assert_eq!(result, Err(RecordError::Aborted("validation failed".into())));
    assert_eq!(root.get("a"), Some(Value::from(2)));
}

#[test]
fn drafts_are_revoked_after_the_session() {
    let root = Value::from(json!({"a": 1, "list": [1]}));
    let mut kept: Option<Draft> = None;
    let mut kept_list: Option<Draft> = None;
    record(&root, |d| {
        kept = Some(d.clone());
        kept_list = d.get("list")?.into_draft();
        Ok(())
    })
    .unwrap();

    let draft = kept.unwrap();
    assert_eq!(draft.set("a", 2), Err(RecordError::Revoked));
    assert_eq!(draft.get("a").unwrap_err(), RecordError::Revoked);
    let list = kept_list.unwrap();
    assert_eq!(
        list.as_array().unwrap().push([2]).unwrap_err(),
        RecordError::Revoked
    );
    assert_eq!(root.get("a"), Some(Value::from(1)));
}

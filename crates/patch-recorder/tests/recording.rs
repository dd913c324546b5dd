mod common;

use patch_recorder::{path, record, record_with, Patch, RecordOptions, Value};
use serde_json::json;

use common::assert_replays;

fn items(values: &[i32]) -> Value {
    Value::object([("items", Value::array(values.iter().copied()))])
}

fn raw() -> RecordOptions {
    RecordOptions::default().with_compress(false)
}

// ── Arrays ────────────────────────────────────────────────────────────────

#[test]
fn push_appends_one_add_per_value() {
    let root = items(&[1, 2, 3]);
    let before = root.to_json();
    let patches = record(&root, |d| d.get("items")?.as_array()?.push([4, 5]).map(drop)).unwrap();
    assert_eq!(
        patches,
        vec![Patch::add(path!["items", 3], 4), Patch::add(path!["items", 4], 5)]
    );
    assert_eq!(root.to_json(), json!({"items": [1, 2, 3, 4, 5]}));
    assert_replays(&before, &patches, &root);
}

#[test]
fn pop_reports_length() {
    let root = items(&[1, 2, 3]);
    let before = root.to_json();
    let patches = record(&root, |d| {
        let popped = d.get("items")?.as_array()?.pop()?;
        assert_eq!(popped, Value::from(3));
        Ok(())
    })
    .unwrap();
    assert_eq!(patches, vec![Patch::replace(path!["items", "length"], 2)]);
    assert_eq!(root.to_json(), json!({"items": [1, 2]}));
    assert_replays(&before, &patches, &root);
}

#[test]
fn pop_reports_element_removal_when_asked() {
    let root = items(&[1, 2, 3]);
    let options = RecordOptions::default().with_shrink_as_length(false);
    let patches = record_with(&root, &options, |d| d.get("items")?.as_array()?.pop().map(drop)).unwrap();
    assert_eq!(patches, vec![Patch::remove(path!["items", 2])]);
}

#[test]
fn splice_with_equal_counts_replaces() {
    let root = items(&[1, 2, 3, 4, 5]);
    let before = root.to_json();
    let patches = record(&root, |d| {
        let removed = d.get("items")?.as_array()?.splice(1, Some(2), [10, 20])?;
        assert_eq!(removed, vec![Value::from(2), Value::from(3)]);
        Ok(())
    })
    .unwrap();
    assert_eq!(
        patches,
        vec![
            Patch::replace(path!["items", 1], 10),
            Patch::replace(path!["items", 2], 20),
        ]
    );
    assert_eq!(root.to_json(), json!({"items": [1, 10, 20, 4, 5]}));
    assert_replays(&before, &patches, &root);
}

#[test]
fn splice_removes_from_the_highest_index() {
    let root = items(&[1, 2, 3, 4, 5]);
    let before = root.to_json();
    let patches = record(&root, |d| d.get("items")?.as_array()?.splice(1, Some(3), [9]).map(drop)).unwrap();
    assert_eq!(
        patches,
        vec![
            Patch::replace(path!["items", 1], 9),
            Patch::remove(path!["items", 3]),
            Patch::remove(path!["items", 2]),
        ]
    );
    assert_eq!(root.to_json(), json!({"items": [1, 9, 5]}));
    assert_replays(&before, &patches, &root);
}

#[test]
fn splice_inserts_in_the_middle() {
    let root = items(&[1, 4]);
    let before = root.to_json();
    let patches = record(&root, |d| d.get("items")?.as_array()?.splice(1, Some(0), [2, 3]).map(drop)).unwrap();
    assert_eq!(
        patches,
        vec![Patch::add(path!["items", 1], 2), Patch::add(path!["items", 2], 3)]
    );
    assert_replays(&before, &patches, &root);
}

#[test]
fn negative_splice_start_counts_from_the_end() {
    let root = items(&[1, 2, 3]);
    let patches = record(&root, |d| d.get("items")?.as_array()?.splice(-1, None, [7]).map(drop)).unwrap();
    assert_eq!(patches, vec![Patch::replace(path!["items", 2], 7)]);
}

#[test]
fn shift_and_unshift() {
    let root = items(&[1, 2, 3]);
    let before = root.to_json();
    let patches = record(&root, |d| {
        let list = d.get("items")?;
        let list = list.as_array()?;
        assert_eq!(list.shift()?, Value::from(1));
        list.unshift([0, -1])?;
        Ok(())
    })
    .unwrap();
    assert_eq!(
        patches,
        vec![
            Patch::remove(path!["items", 0]),
            Patch::add(path!["items", 0], 0),
            Patch::add(path!["items", 1], -1),
        ]
    );
    assert_eq!(root.to_json(), json!({"items": [0, -1, 2, 3]}));
    assert_replays(&before, &patches, &root);
}

#[test]
fn sort_and_reverse_replace_the_whole_array() {
    let root = items(&[3, 1, 2]);
    let before = root.to_json();
    let patches = record(&root, |d| d.get("items")?.as_array()?.sort()).unwrap();
    assert_eq!(patches, vec![Patch::replace(path!["items"], Value::array([1, 2, 3]))]);
    assert_replays(&before, &patches, &root);

    let unchanged = record(&root, |d| d.get("items")?.as_array()?.sort()).unwrap();
    assert!(unchanged.is_empty());

    let patches = record(&root, |d| d.get("items")?.as_array()?.reverse()).unwrap();
    assert_eq!(patches, vec![Patch::replace(path!["items"], Value::array([3, 2, 1]))]);
}

#[test]
fn index_writes_classify_by_length() {
    let root = items(&[1]);
    let before = root.to_json();
    let patches = record_with(&root, &raw(), |d| {
        let list = d.get("items")?;
        let list = list.as_array()?;
        list.set(0, 5)?;
        list.set(1, 6)?;
        list.set(4, 9)?;
        Ok(())
    })
    .unwrap();
    assert_eq!(
        patches,
        vec![
            Patch::replace(path!["items", 0], 5),
            Patch::add(path!["items", 1], 6),
            Patch::add(path!["items", 4], 9),
        ]
    );
    assert_eq!(root.to_json(), json!({"items": [5, 6, null, null, 9]}));
    assert_replays(&before, &patches, &root);
}

#[test]
fn array_delete_clears_without_shrinking() {
    let root = items(&[1, 2]);
    let patches = record(&root, |d| {
        let list = d.get("items")?;
        list.delete(0)?;
        list.delete(7)?;
        Ok(())
    })
    .unwrap();
    assert_eq!(patches, vec![Patch::replace(path!["items", 0], Value::Undefined)]);
    assert_eq!(root.get("items").unwrap().as_array().unwrap().len(), 2);
}

#[test]
fn length_writes() {
    let root = items(&[1, 2, 3, 4]);
    let before = root.to_json();
    let patches = record(&root, |d| {
        let list = d.get("items")?;
        list.set("length", 2)?;
        list.as_array()?.set_len(3)?;
        Ok(())
    })
    .unwrap();
    assert_eq!(
        patches,
        vec![
            Patch::replace(path!["items", "length"], 2),
            Patch::replace(path!["items", "length"], 3),
        ]
    );
    assert_eq!(root.to_json(), json!({"items": [1, 2, null]}));
    assert_replays(&before, &patches, &root);
}

#[test]
fn queries_never_record() {
    let root = items(&[1, 2, 3]);
    let patches = record(&root, |d| {
        let list = d.get("items")?;
        let list = list.as_array()?;
        assert!(list.includes(&Value::from(2)));
        assert_eq!(list.index_of(&Value::from(3)), Some(2));
        assert_eq!(list.slice(1, None), vec![Value::from(2), Value::from(3)]);
        let doubled = list.map(|v| v.as_f64().unwrap_or_default() * 2.0);
        assert_eq!(doubled, vec![2.0, 4.0, 6.0]);
        let sum = list.fold(0.0, |acc, v| acc + v.as_f64().unwrap_or_default());
        assert_eq!(sum, 6.0);
        Ok(())
    })
    .unwrap();
    assert!(patches.is_empty());
}

// ── Nesting and identity ──────────────────────────────────────────────────

#[test]
fn nested_edits_use_full_paths() {
    let root = Value::from(json!({"todos": [{"title": "a", "done": false}]}));
    let before = root.to_json();
    let patches = record(&root, |d| {
        let todo = d.get("todos")?.get(0)?;
        todo.set("done", true)?;
        todo.delete("title")?;
        Ok(())
    })
    .unwrap();
    assert_eq!(
        patches,
        vec![
            Patch::replace(path!["todos", 0, "done"], true),
            Patch::remove(path!["todos", 0, "title"]),
        ]
    );
    assert_replays(&before, &patches, &root);
}

#[test]
fn shifted_elements_get_fresh_paths() {
    let root = Value::from(json!({"rows": [{"n": 1}, {"n": 2}]}));
    let before = root.to_json();
    let patches = record(&root, |d| {
        let rows = d.get("rows")?;
        let rows = rows.as_array()?;
        let second = rows.get(1)?;
        rows.shift()?;
        let moved = rows.get(0)?;
        assert_eq!(moved.path(), &path!["rows", 0]);
        assert!(!moved.draft().unwrap().ptr_eq(second.draft().unwrap()));
        moved.set("n", 5)?;
        Ok(())
    })
    .unwrap();
    assert_eq!(
        patches,
        vec![
            Patch::remove(path!["rows", 0]),
            Patch::replace(path!["rows", 0, "n"], 5),
        ]
    );
    assert_replays(&before, &patches, &root);
}

#[test]
fn assigning_a_draft_stores_the_raw_node() {
    let root = Value::from(json!({"user": {"name": "ann"}}));
    let patches = record(&root, |d| {
        let user = d.get("user")?;
        d.set("owner", &user)
    })
    .unwrap();
    assert_eq!(
        patches,
        vec![Patch::add(path!["owner"], Value::from(json!({"name": "ann"})))]
    );
    let user = root.get("user").unwrap();
    assert!(root.get("owner").unwrap().ptr_eq(&user));
}

#[test]
fn emitted_values_are_snapshots() {
    let root = Value::from(json!({"a": {"n": 1}}));
    let patches = record_with(&root, &raw(), |d| {
        d.set("b", Value::from(json!({"n": 1})))?;
        d.get("b")?.set("n", 2)?;
        Ok(())
    })
    .unwrap();
    assert_eq!(patches[0].value, Some(Value::from(json!({"n": 1}))));
    assert_eq!(patches[1], Patch::replace(path!["b", "n"], 2));
}

#[test]
fn redundant_writes_emit_nothing() {
    let root = Value::from(json!({"a": 1, "list": [1, 2], "nested": {"x": null}}));
    let before = root.to_json();
    let patches = record(&root, |d| {
        d.set("a", 1)?;
        d.get("list")?.as_array()?.set(1, 2)?;
        d.get("nested")?.set("x", Value::Null)?;
        d.delete("missing")?;
        Ok(())
    })
    .unwrap();
    assert!(patches.is_empty());
    assert_eq!(root.to_json(), before);
}

// ── Maps and sets ─────────────────────────────────────────────────────────

#[test]
fn map_set_twice_compresses_to_one_add() {
    let root = Value::object([("map", Value::map([("a", 1)]))]);
    let before = root.to_json();
    let patches = record(&root, |d| {
        let map = d.get("map")?;
        let map = map.as_map()?;
        map.set("b", 2)?;
        map.set("b", 3)?;
        Ok(())
    })
    .unwrap();
    assert_eq!(patches, vec![Patch::add(path!["map", "b"], 3)]);
    assert_replays(&before, &patches, &root);
}

#[test]
fn map_values_are_drafted() {
    let root = Value::object([("map", Value::map([("cfg", Value::object([("on", false)]))]))]);
    let before = root.to_json();
    let patches = record(&root, |d| d.get("map")?.as_map()?.get("cfg")?.set("on", true)).unwrap();
    assert_eq!(patches, vec![Patch::replace(path!["map", "cfg", "on"], true)]);
    assert_replays(&before, &patches, &root);
}

#[test]
fn set_add_twice_is_one_add() {
    let root = Value::object([("set", Value::set([1, 2]))]);
    let patches = record(&root, |d| {
        let set = d.get("set")?;
        let set = set.as_set()?;
        set.add(3)?;
        set.add(3)?;
        Ok(())
    })
    .unwrap();
    assert_eq!(patches, vec![Patch::add(path!["set", 3], 3)]);
}

// ── Compression ───────────────────────────────────────────────────────────

#[test]
fn push_then_pop_leaves_nothing() {
    let root = items(&[1, 2, 3]);
    let patches = record(&root, |d| {
        let list = d.get("items")?;
        let list = list.as_array()?;
        list.push([4])?;
        list.pop()?;
        Ok(())
    })
    .unwrap();
    assert!(patches.is_empty());
}

#[test]
fn add_then_delete_leaves_nothing() {
    let root = Value::from(json!({"a": 1}));
    let patches = record(&root, |d| {
        d.set("tmp", 1)?;
        d.set("tmp", 2)?;
        d.delete("tmp")?;
        Ok(())
    })
    .unwrap();
    assert!(patches.is_empty());
}

#[test]
fn growing_an_emptied_array_replays() {
    let root = Value::from(json!({"list": [3, 1, 2]}));
    let before = root.to_json();
    let patches = record(&root, |d| {
        let list = d.get("list")?;
        let list = list.as_array()?;
        list.splice(0, Some(3), Vec::<Value>::new())?;
        list.set_len(1)
    })
    .unwrap();
    assert_eq!(root.to_json(), json!({"list": [null]}));
    assert_replays(&before, &patches, &root);
}

#[test]
fn popping_everything_then_growing_replays() {
    let root = Value::from(json!({"list": [3, 1, 2]}));
    let before = root.to_json();
    let options = RecordOptions::default().with_shrink_as_length(false);
    let patches = record_with(&root, &options, |d| {
        let list = d.get("list")?;
        let list = list.as_array()?;
        for _ in 0..3 {
            list.pop()?;
        }
        list.set_len(1)
    })
    .unwrap();
    assert_eq!(root.to_json(), json!({"list": [null]}));
    assert_replays(&before, &patches, &root);
}

#[test]
fn refilling_an_emptied_array_replays() {
    let root = Value::from(json!({"list": [3, 1, 2]}));
    let before = root.to_json();
    let patches = record(&root, |d| {
        let list = d.get("list")?;
        let list = list.as_array()?;
        list.splice(0, Some(3), Vec::<Value>::new())?;
        list.set(2, 0)?;
        list.set(1, 0)
    })
    .unwrap();
    assert_eq!(root.to_json(), json!({"list": [null, 0, 0]}));
    assert_replays(&before, &patches, &root);
}

#[test]
fn raw_stream_is_chronological() {
    let root = Value::from(json!({"a": 1}));
    let patches = record_with(&root, &raw(), |d| {
        d.set("a", 2)?;
        d.set("a", 3)?;
        Ok(())
    })
    .unwrap();
    assert_eq!(
        patches,
        vec![Patch::replace(path!["a"], 2), Patch::replace(path!["a"], 3)]
    );
}

mod common;

use proptest::collection::vec;
use proptest::prelude::*;

use patch_recorder::{compress, record_with, Draft, RecordOptions, RecordResult, Value};
use serde_json::json;

use common::applied;

const KEYS: [&str; 3] = ["a", "b", "c"];

#[derive(Debug, Clone)]
enum Step {
    Push(i32),
    Pop,
    Shift,
    Unshift(i32),
    Set(usize, i32),
    Delete(usize),
    Splice(isize, usize, Vec<i32>),
    SetLen(usize),
    Reverse,
    Sort,
    Put(usize, i32),
    Remove(usize),
    RowEdit(usize, i32),
    RowInsert(usize, i32),
    RowRemove(usize),
    MapSet(usize, i32),
    MapDelete(usize),
    MapClear,
}

fn arb_step() -> impl Strategy<Value = Step> {
    let value = 0..5i32;
    let index = 0..7usize;
    prop_oneof![
        value.clone().prop_map(Step::Push),
        Just(Step::Pop),
        Just(Step::Shift),
        value.clone().prop_map(Step::Unshift),
        (index.clone(), value.clone()).prop_map(|(i, v)| Step::Set(i, v)),
        index.clone().prop_map(Step::Delete),
        (-3..5isize, 0..3usize, vec(value.clone(), 0..3))
            .prop_map(|(start, count, items)| Step::Splice(start, count, items)),
        (0..6usize).prop_map(Step::SetLen),
        Just(Step::Reverse),
        Just(Step::Sort),
        (0..KEYS.len(), value.clone()).prop_map(|(k, v)| Step::Put(k, v)),
        (0..KEYS.len()).prop_map(Step::Remove),
        (index.clone(), value.clone()).prop_map(|(i, v)| Step::RowEdit(i, v)),
        (index.clone(), value.clone()).prop_map(|(i, v)| Step::RowInsert(i, v)),
        index.prop_map(Step::RowRemove),
        (0..KEYS.len(), value).prop_map(|(k, v)| Step::MapSet(k, v)),
        (0..KEYS.len()).prop_map(Step::MapDelete),
        Just(Step::MapClear),
    ]
}

fn base() -> Value {
    let root = Value::from(json!({
        "list": [3, 1, 2],
        "obj": {"a": 0},
        "rows": [{"n": 0}, {"n": 1}]
    }));
    if let Some(obj) = root.as_object() {
        obj.insert("dict", Value::map([("a", 0), ("b", 1)]));
    }
    root
}

fn run(d: &Draft, steps: &[Step]) -> RecordResult<()> {
    let list = d.get("list")?;
    let list = list.as_array()?;
    let obj = d.get("obj")?;
    let rows = d.get("rows")?;
    let rows = rows.as_array()?;
    let dict = d.get("dict")?;
    let dict = dict.as_map()?;
    for step in steps {
        match step {
            Step::Push(v) => {
                list.push([*v])?;
            }
            Step::Pop => {
                list.pop()?;
            }
            Step::Shift => {
                list.shift()?;
            }
            Step::Unshift(v) => {
                list.unshift([*v])?;
            }
            Step::Set(i, v) => list.set(*i, *v)?,
            Step::Delete(i) => list.delete(*i)?,
            Step::Splice(start, count, items) => {
                list.splice(*start, Some(*count), items.iter().copied())?;
            }
            Step::SetLen(n) => list.set_len(*n)?,
            Step::Reverse => list.reverse()?,
            Step::Sort => list.sort()?,
            Step::Put(k, v) => obj.set(KEYS[*k], *v)?,
            Step::Remove(k) => obj.delete(KEYS[*k])?,
            Step::RowEdit(i, v) => {
                if *i < rows.len() {
                    rows.get(*i)?.set("n", *v)?;
                }
            }
            Step::RowInsert(i, v) => rows.insert(*i, Value::object([("n", *v)]))?,
            Step::RowRemove(i) => {
                rows.remove(*i)?;
            }
            Step::MapSet(k, v) => dict.set(KEYS[*k], *v)?,
            Step::MapDelete(k) => {
                dict.delete(KEYS[*k])?;
            }
            Step::MapClear => dict.clear()?,
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2048))]

    /// Raw and compressed patch lists both replay to the mutated state.
    #[test]
    fn prop_compression_preserves_final_state(
        steps in vec(arb_step(), 0..24),
        shrink_as_length in any::<bool>(),
    ) {
        let options = RecordOptions::default()
            .with_shrink_as_length(shrink_as_length)
            .with_compress(false);
        let root = base();
        let before = root.to_json();
        let raw = record_with(&root, &options, |d| run(d, &steps)).unwrap();
        let after = root.to_json();
        prop_assert_eq!(applied(&before, &raw), after.clone());

        let compressed = compress(raw.clone());
        prop_assert!(compressed.len() <= raw.len());
        prop_assert_eq!(applied(&before, &compressed), after);

        let fresh = base();
        let direct = record_with(&fresh, &options.with_compress(true), |d| run(d, &steps)).unwrap();
        prop_assert_eq!(direct, compressed);
    }

    /// Recording a no-op session yields nothing and leaves the tree alone.
    #[test]
    fn prop_rewriting_current_values_is_silent(index in 0..3usize) {
        let root = base();
        let before = root.to_json();
        let patches = record_with(&root, &RecordOptions::default(), |d| {
            let list = d.get("list")?;
            let list = list.as_array()?;
            let current = list.values()[index].clone();
            list.set(index, current)?;
            d.get("obj")?.set("a", 0)
        })
        .unwrap();
        prop_assert!(patches.is_empty());
        prop_assert_eq!(root.to_json(), before);
    }
}

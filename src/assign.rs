//! Writing resolved values into the output tree.
//!
//! Absent values and empty collections are pruned: they never create a key
//! and never replace what an earlier iteration wrote. Writing an array over
//! an array appends, so repeated iterations targeting one path accumulate.

use indexmap::IndexMap;

use crate::value::Value;

/// Write `value` into `target` at the dotted `path`.
///
/// Missing intermediate levels are created as objects. A path running into
/// an existing non-object value is left alone.
pub fn assign(target: &mut Value, value: Option<Value>, path: &str) {
    let Some(value) = kept(value) else {
        return;
    };

    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return;
    };

    let mut node = target;
    for segment in segments {
        let Value::Object(map) = node else {
            return;
        };
        node = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(IndexMap::new()));
    }

    if let Value::Object(map) = node {
        place(map, last, value);
    }
}

/// Write `value` under the literal `key`, without splitting on dots.
///
/// Used when a `!` key merges a nested object into its parent.
pub fn assign_key(target: &mut Value, key: &str, value: Option<Value>) {
    if let Some(value) = kept(value)
        && let Value::Object(map) = target
    {
        place(map, key, value);
    }
}

fn kept(value: Option<Value>) -> Option<Value> {
    value.filter(|value| !value.is_empty_collection())
}

fn place(map: &mut IndexMap<String, Value>, key: &str, value: Value) {
    match (map.get_mut(key), value) {
        (Some(Value::Array(existing)), Value::Array(items)) => existing.extend(items),
        (Some(slot), value) => *slot = value,
        (None, value) => {
            map.insert(key.to_string(), value);
        }
    }
}

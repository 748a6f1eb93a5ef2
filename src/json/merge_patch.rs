//! RFC 7386 JSON Merge Patch.

use super::dom::Value;

/// Apply a merge patch: `null` members in an object patch remove the
/// corresponding key; other members replace recursively when both sides
/// are objects, or overwrite wholesale otherwise.
pub fn apply(target: &Value, patch: &Value) -> Value {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            let mut result = target_map.clone();
            for (key, patch_value) in patch_map {
                if patch_value.is_null() {
                    result.shift_remove(key);
                } else {
                    let merged = match result.get(key) {
                        Some(existing) => apply(existing, patch_value),
                        None => apply(&Value::Object(Default::default()), patch_value),
                    };
                    result.insert(key.clone(), merged);
                }
            }
            Value::Object(result)
        }
        _ => patch.clone(),
    }
}

/// Compute a merge patch that transforms `from` into `to`, when one exists.
/// Per RFC 7386 §2, a diff cannot represent turning a non-null value into
/// `null` via merge patch semantics (the sentinel collides with deletion);
/// callers needing that must fall back to [`crate::json::patch`].
pub fn diff(from: &Value, to: &Value) -> Value {
    match (from, to) {
        (Value::Object(from_map), Value::Object(to_map)) => {
            let mut patch = indexmap::IndexMap::new();
            for key in from_map.keys() {
                if !to_map.contains_key(key) {
                    patch.insert(key.clone(), Value::Null);
                }
            }
            for (key, to_value) in to_map {
                match from_map.get(key) {
                    Some(from_value) if from_value == to_value => {}
                    Some(from_value) => {
                        patch.insert(key.clone(), diff(from_value, to_value));
                    }
                    None => {
                        patch.insert(key.clone(), to_value.clone());
                    }
                }
            }
            Value::Object(patch)
        }
        _ if from == to => Value::Object(Default::default()),
        _ => to.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::dom::{parse, ParseOptions};

    fn v(s: &str) -> Value {
        parse(s.as_bytes(), &ParseOptions::default()).unwrap()
    }

    #[test]
    fn null_member_removes_key() {
        let target = v(r#"{"a":1,"b":2}"#);
        let patch = v(r#"{"b":null}"#);
        let merged = apply(&target, &patch);
        assert!(merged.as_object().unwrap().get("b").is_none());
        assert_eq!(merged.as_object().unwrap()["a"].as_number().unwrap().as_i64(), Some(1));
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let target = v(r#"{"a":{"x":1,"y":2}}"#);
        let patch = v(r#"{"a":{"y":3}}"#);
        let merged = apply(&target, &patch);
        let a = merged.as_object().unwrap()["a"].as_object().unwrap();
        assert_eq!(a["x"].as_number().unwrap().as_i64(), Some(1));
        assert_eq!(a["y"].as_number().unwrap().as_i64(), Some(3));
    }

    #[test]
    fn scalar_patch_overwrites_wholesale() {
        let target = v(r#"{"a":[1,2,3]}"#);
        let patch = v(r#"{"a":[4,5]}"#);
        let merged = apply(&target, &patch);
        assert_eq!(merged.as_object().unwrap()["a"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn diff_round_trips_through_apply() {
        let from = v(r#"{"a":1,"b":2}"#);
        let to = v(r#"{"a":1,"c":3}"#);
        let patch = diff(&from, &to);
        let merged = apply(&from, &patch);
        assert_eq!(merged, to);
    }
}

//! RFC 6902 JSON Patch.

use super::dom::Value;
use super::error::{Error, ErrorKind, Result};
use super::pointer::{self, ParentToken, Pointer};

/// A single patch operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Add a member/element at `path`.
    Add { path: Pointer, value: Value },
    /// Remove the member/element at `path`.
    Remove { path: Pointer },
    /// Replace the value at `path`.
    Replace { path: Pointer, value: Value },
    /// Move the value at `from` to `path`.
    Move { from: Pointer, path: Pointer },
    /// Copy the value at `from` to `path`.
    Copy { from: Pointer, path: Pointer },
    /// Assert the value at `path` equals `value`.
    Test { path: Pointer, value: Value },
}

/// Parse a patch document (a JSON array of operation objects) into
/// [`Operation`]s.
pub fn from_value(doc: &Value) -> Result<Vec<Operation>> {
    let ops = doc
        .as_array()
        .ok_or_else(|| Error::new(ErrorKind::Invalid, "a patch document must be a JSON array"))?;
    ops.iter().map(parse_operation).collect()
}

fn parse_operation(obj: &Value) -> Result<Operation> {
    let map = obj
        .as_object()
        .ok_or_else(|| Error::new(ErrorKind::Invalid, "each patch operation must be an object"))?;
    let op = map
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::new(ErrorKind::Invalid, "operation is missing 'op'"))?;
    let path = parse_pointer_field(map, "path")?;
    match op {
        "add" => Ok(Operation::Add {
            path,
            value: require_value(map, "value")?,
        }),
        "remove" => Ok(Operation::Remove { path }),
        "replace" => Ok(Operation::Replace {
            path,
            value: require_value(map, "value")?,
        }),
        "move" => Ok(Operation::Move {
            from: parse_pointer_field(map, "from")?,
            path,
        }),
        "copy" => Ok(Operation::Copy {
            from: parse_pointer_field(map, "from")?,
            path,
        }),
        "test" => Ok(Operation::Test {
            path,
            value: require_value(map, "value")?,
        }),
        other => Err(Error::new(ErrorKind::Invalid, format!("unknown patch op '{other}'"))),
    }
}

fn parse_pointer_field(map: &indexmap::IndexMap<String, Value>, field: &str) -> Result<Pointer> {
    let s = map
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::new(ErrorKind::Invalid, format!("operation is missing '{field}'")))?;
    Pointer::parse(s)
}

fn require_value(map: &indexmap::IndexMap<String, Value>, field: &str) -> Result<Value> {
    map.get(field)
        .cloned()
        .ok_or_else(|| Error::new(ErrorKind::Invalid, format!("operation is missing '{field}'")))
}

/// Apply `ops` to `doc` atomically: either every operation succeeds and
/// `doc` reflects the result, or `doc` is left unchanged and the first
/// failure is returned.
pub fn apply(doc: &Value, ops: &[Operation]) -> Result<Value> {
    let mut working = doc.clone();
    for op in ops {
        apply_one(&mut working, op)?;
    }
    Ok(working)
}

fn apply_one(doc: &mut Value, op: &Operation) -> Result<()> {
    match op {
        Operation::Add { path, value } => add(doc, path, value.clone()),
        Operation::Remove { path } => remove(doc, path).map(|_| ()),
        Operation::Replace { path, value } => {
            if path.is_root() {
                *doc = value.clone();
                return Ok(());
            }
            let slot = pointer::get_mut(doc, path)?;
            *slot = value.clone();
            Ok(())
        }
        Operation::Move { from, path } => {
            if is_prefix_of(from, path) {
                return Err(Error::new(
                    ErrorKind::PatchFailed,
                    "cannot move a value into one of its own descendants",
                ));
            }
            let value = remove(doc, from)?;
            add(doc, path, value)
        }
        Operation::Copy { from, path } => {
            let value = pointer::get(doc, from)?.clone();
            add(doc, path, value)
        }
        Operation::Test { path, value } => {
            let actual = pointer::get(doc, path)?;
            if actual != value {
                return Err(
                    Error::new(ErrorKind::PatchFailed, "test operation failed: value mismatch")
                        .with_pointer(path.to_string_form()),
                );
            }
            Ok(())
        }
    }
}

fn add(doc: &mut Value, path: &Pointer, value: Value) -> Result<()> {
    if path.is_root() {
        *doc = value;
        return Ok(());
    }
    let (parent, token) = pointer::resolve_parent(doc, path)?;
    match (parent, token) {
        (Value::Object(map), ParentToken::Key(key)) => {
            map.insert(key, value);
            Ok(())
        }
        (Value::Array(items), ParentToken::Key(key)) => {
            let idx = pointer::parse_array_index(&key)?;
            if idx > items.len() {
                return Err(Error::new(ErrorKind::PatchFailed, "add index out of bounds"));
            }
            items.insert(idx, value);
            Ok(())
        }
        (Value::Array(items), ParentToken::Append) => {
            items.push(value);
            Ok(())
        }
        (Value::Object(_), ParentToken::Append) => Err(Error::new(
            ErrorKind::InvalidPointer,
            "'-' is not valid for an object member",
        )),
        _ => Err(Error::new(ErrorKind::PatchFailed, "cannot add into a scalar value")),
    }
}

fn remove(doc: &mut Value, path: &Pointer) -> Result<Value> {
    if path.is_root() {
        return Err(Error::new(ErrorKind::PatchFailed, "cannot remove the document root"));
    }
    let (parent, token) = pointer::resolve_parent(doc, path)?;
    match (parent, token) {
        (Value::Object(map), ParentToken::Key(key)) => map
            .shift_remove(&key)
            .ok_or_else(|| Error::new(ErrorKind::PointerNotFound, format!("no member '{key}'"))),
        (Value::Array(items), ParentToken::Key(key)) => {
            let idx = pointer::parse_array_index(&key)?;
            if idx >= items.len() {
                return Err(Error::new(ErrorKind::PointerNotFound, "index out of bounds"));
            }
            Ok(items.remove(idx))
        }
        (Value::Array(_), ParentToken::Append) => Err(Error::new(
            ErrorKind::PointerNotFound,
            "'-' does not refer to an existing element",
        )),
        _ => Err(Error::new(ErrorKind::PatchFailed, "cannot remove from a scalar value")),
    }
}

fn is_prefix_of(candidate: &Pointer, other: &Pointer) -> bool {
    let a = candidate.to_string_form();
    let b = other.to_string_form();
    b == a || b.starts_with(&(a + "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::dom::{parse as parse_json, ParseOptions};

    fn ops_from(s: &str) -> Vec<Operation> {
        let doc = parse_json(s.as_bytes(), &ParseOptions::default()).unwrap();
        from_value(&doc).unwrap()
    }

    #[test]
    fn add_appends_with_dash_token() {
        let doc = parse_json(br#"{"a":[1,2]}"#, &ParseOptions::default()).unwrap();
        let ops = ops_from(r#"[{"op":"add","path":"/a/-","value":3}]"#);
        let out = apply(&doc, &ops).unwrap();
        assert_eq!(out.as_object().unwrap()["a"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn replace_updates_scalar() {
        let doc = parse_json(br#"{"a":1}"#, &ParseOptions::default()).unwrap();
        let ops = ops_from(r#"[{"op":"replace","path":"/a","value":2}]"#);
        let out = apply(&doc, &ops).unwrap();
        assert_eq!(out.as_object().unwrap()["a"].as_number().unwrap().as_i64(), Some(2));
    }

    #[test]
    fn test_failure_leaves_document_unchanged() {
        let doc = parse_json(br#"{"a":1}"#, &ParseOptions::default()).unwrap();
        let ops = ops_from(r#"[{"op":"replace","path":"/a","value":99},{"op":"test","path":"/a","value":1}]"#);
        let err = apply(&doc, &ops).unwrap_err();
        assert_eq!(err.kind, ErrorKind::PatchFailed);
        assert_eq!(doc.as_object().unwrap()["a"].as_number().unwrap().as_i64(), Some(1));
    }

    #[test]
    fn move_relocates_value() {
        let doc = parse_json(br#"{"a":1,"b":{}}"#, &ParseOptions::default()).unwrap();
        let ops = ops_from(r#"[{"op":"move","from":"/a","path":"/b/a"}]"#);
        let out = apply(&doc, &ops).unwrap();
        assert!(out.as_object().unwrap().get("a").is_none());
        assert_eq!(out.as_object().unwrap()["b"].as_object().unwrap()["a"].as_number().unwrap().as_i64(), Some(1));
    }

    #[test]
    fn move_into_own_descendant_is_rejected() {
        let doc = parse_json(br#"{"a":{"b":1}}"#, &ParseOptions::default()).unwrap();
        let ops = ops_from(r#"[{"op":"move","from":"/a","path":"/a/c"}]"#);
        let err = apply(&doc, &ops).unwrap_err();
        assert_eq!(err.kind, ErrorKind::PatchFailed);
    }
}

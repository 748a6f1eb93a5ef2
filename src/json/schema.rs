//! A core subset of JSON Schema validation keywords.

use super::dom::Value;
use super::error::{Error, ErrorKind, Result};

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the offending instance location.
    pub instance_path: String,
    /// The keyword that was violated (e.g. `"type"`, `"minLength"`).
    pub keyword: &'static str,
    /// Human-readable explanation.
    pub message: String,
}

/// Validate `instance` against `schema`, collecting every violation rather
/// than stopping at the first.
pub fn validate(instance: &Value, schema: &Value) -> Result<Vec<Violation>> {
    let schema_obj = schema
        .as_object()
        .ok_or_else(|| Error::new(ErrorKind::Invalid, "schema must be a JSON object"))?;
    let mut violations = Vec::new();
    check(instance, schema_obj, "", &mut violations);
    Ok(violations)
}

fn check(instance: &Value, schema: &indexmap::IndexMap<String, Value>, path: &str, out: &mut Vec<Violation>) {
    if let Some(ty) = schema.get("type") {
        check_type(instance, ty, path, out);
    }
    if let Some(Value::Array(allowed)) = schema.get("enum") {
        if !allowed.contains(instance) {
            out.push(violation(path, "enum", "value is not one of the enumerated constants"));
        }
    }
    if let Some(expected) = schema.get("const") {
        if instance != expected {
            out.push(violation(path, "const", "value does not equal the required constant"));
        }
    }
    match instance {
        Value::Number(n) => {
            if let Some(min) = schema.get("minimum").and_then(Value::as_number).and_then(super::Number::as_f64) {
                if n.as_f64().is_some_and(|v| v < min) {
                    out.push(violation(path, "minimum", format!("value is below minimum {min}")));
                }
            }
            if let Some(max) = schema.get("maximum").and_then(Value::as_number).and_then(super::Number::as_f64) {
                if n.as_f64().is_some_and(|v| v > max) {
                    out.push(violation(path, "maximum", format!("value exceeds maximum {max}")));
                }
            }
        }
        Value::String(s) => {
            if let Some(min) = schema.get("minLength").and_then(Value::as_number).and_then(super::Number::as_u64) {
                if (s.len() as u64) < min {
                    out.push(violation(path, "minLength", format!("string is shorter than {min}")));
                }
            }
            if let Some(max) = schema.get("maxLength").and_then(Value::as_number).and_then(super::Number::as_u64) {
                if (s.len() as u64) > max {
                    out.push(violation(path, "maxLength", format!("string is longer than {max}")));
                }
            }
        }
        Value::Array(items) => {
            if let Some(min) = schema.get("minItems").and_then(Value::as_number).and_then(super::Number::as_u64) {
                if (items.len() as u64) < min {
                    out.push(violation(path, "minItems", format!("array has fewer than {min} items")));
                }
            }
            if let Some(max) = schema.get("maxItems").and_then(Value::as_number).and_then(super::Number::as_u64) {
                if (items.len() as u64) > max {
                    out.push(violation(path, "maxItems", format!("array has more than {max} items")));
                }
            }
            if let Some(item_schema) = schema.get("items").and_then(Value::as_object) {
                for (i, item) in items.iter().enumerate() {
                    check(item, item_schema, &format!("{path}/{i}"), out);
                }
            }
        }
        Value::Object(props) => {
            if let Some(required) = schema.get("required").and_then(Value::as_array) {
                for name in required {
                    if let Some(name) = name.as_str() {
                        if !props.contains_key(name) {
                            out.push(violation(path, "required", format!("missing required property '{name}'")));
                        }
                    }
                }
            }
            if let Some(prop_schemas) = schema.get("properties").and_then(Value::as_object) {
                for (name, prop_schema) in prop_schemas {
                    if let (Some(value), Some(sub)) = (props.get(name), prop_schema.as_object()) {
                        check(value, sub, &format!("{path}/{name}"), out);
                    }
                }
            }
        }
        Value::Null | Value::Bool(_) => {}
    }
}

fn check_type(instance: &Value, type_spec: &Value, path: &str, out: &mut Vec<Violation>) {
    let allowed: Vec<&str> = match type_spec {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => return,
    };
    if !allowed.iter().any(|&t| matches_type(instance, t)) {
        out.push(violation(path, "type", format!("value does not match type {allowed:?}")));
    }
}

fn matches_type(instance: &Value, ty: &str) -> bool {
    match ty {
        "null" => instance.is_null(),
        "boolean" => matches!(instance, Value::Bool(_)),
        "string" => matches!(instance, Value::String(_)),
        "number" => matches!(instance, Value::Number(_)),
        "integer" => matches!(instance, Value::Number(n) if n.is_integer()),
        "array" => matches!(instance, Value::Array(_)),
        "object" => matches!(instance, Value::Object(_)),
        _ => false,
    }
}

fn violation(path: &str, keyword: &'static str, message: impl Into<String>) -> Violation {
    Violation {
        instance_path: path.to_string(),
        keyword,
        message: message.into(),
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
    fn type_mismatch_is_reported() {
        let schema = v(r#"{"type":"string"}"#);
        let violations = validate(&v("1"), &schema).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].keyword, "type");
    }

    #[test]
    fn required_property_missing_is_reported() {
        let schema = v(r#"{"type":"object","required":["a"]}"#);
        let violations = validate(&v("{}"), &schema).unwrap();
        assert_eq!(violations[0].keyword, "required");
    }

    #[test]
    fn nested_properties_are_checked_recursively() {
        let schema = v(r#"{"type":"object","properties":{"a":{"type":"integer","minimum":0}}}"#);
        let violations = validate(&v(r#"{"a":-1}"#), &schema).unwrap();
        assert_eq!(violations[0].instance_path, "/a");
        assert_eq!(violations[0].keyword, "minimum");
    }

    #[test]
    fn valid_instance_has_no_violations() {
        let schema = v(r#"{"type":"array","items":{"type":"number"},"minItems":1}"#);
        let violations = validate(&v("[1,2,3]"), &schema).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn min_max_length_count_utf8_bytes_not_chars() {
        let schema = v(r#"{"type":"string","maxLength":3}"#);
        // "éé" is 2 chars but 4 UTF-8 bytes: only a byte-counted maxLength
        // catches this as over the limit of 3.
        let violations = validate(&v(r#""éé""#), &schema).unwrap();
        assert_eq!(violations[0].keyword, "maxLength");
    }
}

//! Converts a composed (all-scalars-are-strings) [`Node`] tree into typed
//! values, using each node's explicit tag (if any) or the active
//! [`Resolver`]'s implicit-typing rules otherwise.

use crate::yaml::error::{Error, ErrorKind, Result};
use crate::yaml::resolver::{Resolver, Schema};
use crate::yaml::tag::TagKind;
use crate::yaml::value::{Node, Value};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use indexmap::IndexMap;

/// How aggressively unrecognized / application-specific tags are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstructMode {
    /// Only the standard `tag:yaml.org,2002:*` tags are accepted; any other
    /// explicit tag is rejected. Appropriate for untrusted input.
    #[default]
    Safe,
    /// Unrecognized explicit tags are kept as opaque strings/collections
    /// instead of erroring.
    Full,
}

/// Walk `node`, replacing every scalar's placeholder `Value::String` with
/// its typed value, resolved per `resolver` and `mode`.
pub fn construct(node: &Node, resolver: &Resolver, mode: ConstructMode) -> Result<Node> {
    let kind = effective_kind(node, resolver);
    let value = match &node.value {
        Value::String(s) => construct_scalar(s, &kind, resolver.schema(), mode, node)?,
        Value::Sequence(items) => {
            let constructed: Vec<Node> = items.iter().map(|n| construct(n, resolver, mode)).collect::<Result<_>>()?;
            if matches!(kind, TagKind::Omap | TagKind::Pairs) {
                validate_pairs_shape(&constructed, node)?;
            }
            Value::Sequence(constructed)
        }
        Value::Mapping(map) => {
            let mut constructed = IndexMap::new();
            for (k, v) in map {
                constructed.insert(construct(k, resolver, mode)?, construct(v, resolver, mode)?);
            }
            if matches!(kind, TagKind::Set) {
                validate_set_shape(&constructed, node)?;
            }
            Value::Mapping(constructed)
        }
        already_typed => already_typed.clone(),
    };
    let mut out = node.clone();
    out.value = value;
    Ok(out)
}

fn effective_kind(node: &Node, resolver: &Resolver) -> TagKind {
    match &node.tag {
        Some(uri) if uri != "?" => TagKind::from_uri(uri),
        _ => match &node.value {
            Value::String(s) => resolver.resolve(s),
            Value::Sequence(_) => TagKind::Seq,
            Value::Mapping(_) => TagKind::Map,
            _ => TagKind::Str,
        },
    }
}

fn construct_scalar(value: &str, kind: &TagKind, schema: Schema, mode: ConstructMode, node: &Node) -> Result<Value> {
    match kind {
        TagKind::Null => Ok(Value::Null),
        TagKind::Bool => construct_bool(value, schema, node),
        TagKind::Int => construct_int(value, schema, node),
        TagKind::Float => construct_float(value, schema, node),
        TagKind::Str | TagKind::Seq | TagKind::Map => Ok(Value::String(value.to_string())),
        TagKind::Binary => construct_binary(value, node),
        TagKind::Timestamp => construct_timestamp(value, node),
        TagKind::Set | TagKind::Omap | TagKind::Pairs => Ok(Value::String(value.to_string())),
        TagKind::Custom(uri) => match mode {
            ConstructMode::Safe => Err(Error::at(ErrorKind::UnresolvedTag, format!("unrecognized tag '{uri}' in safe mode"), node.position)),
            ConstructMode::Full => Ok(Value::String(value.to_string())),
        },
    }
}

fn construct_bool(value: &str, schema: Schema, node: &Node) -> Result<Value> {
    let matched = match schema {
        Schema::Json => match value {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Schema::Core => match value {
            "true" | "True" | "TRUE" => Some(true),
            "false" | "False" | "FALSE" => Some(false),
            _ => None,
        },
        Schema::Yaml11 | Schema::Failsafe => match value.to_ascii_lowercase().as_str() {
            "true" | "y" | "yes" | "on" => Some(true),
            "false" | "n" | "no" | "off" => Some(false),
            _ => None,
        },
    };
    matched
        .map(Value::Bool)
        .ok_or_else(|| Error::at(ErrorKind::TagMismatch, format!("'{value}' is not a valid boolean"), node.position))
}

fn construct_int(value: &str, schema: Schema, node: &Node) -> Result<Value> {
    let cleaned = value.replace('_', "");
    let (sign, body) = match cleaned.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    let parsed = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = body.strip_prefix("0o").or_else(|| body.strip_prefix("0O")) {
        i64::from_str_radix(oct, 8).ok()
    } else if schema == Schema::Yaml11 && body.contains(':') {
        crate::yaml::resolver::parse_sexagesimal_int(&cleaned)
    } else if schema == Schema::Yaml11 && body.len() > 1 && body.starts_with('0') {
        i64::from_str_radix(body, 8).ok()
    } else {
        body.parse::<i64>().ok()
    };
    match parsed {
        Some(v) if schema == Schema::Yaml11 && body.contains(':') => Ok(Value::Int(v)),
        Some(v) => Ok(Value::Int(sign * v)),
        None => Err(Error::at(ErrorKind::TagMismatch, format!("'{value}' is not a valid integer"), node.position)),
    }
}

fn construct_float(value: &str, schema: Schema, node: &Node) -> Result<Value> {
    let lower = value.to_ascii_lowercase();
    match lower.as_str() {
        ".inf" | "+.inf" => return Ok(Value::Float(f64::INFINITY)),
        "-.inf" => return Ok(Value::Float(f64::NEG_INFINITY)),
        ".nan" => return Ok(Value::Float(f64::NAN)),
        _ => {}
    }
    let cleaned = value.replace('_', "");
    if schema == Schema::Yaml11 && cleaned.contains(':') {
        return crate::yaml::resolver::parse_sexagesimal_float(&cleaned)
            .map(Value::Float)
            .ok_or_else(|| Error::at(ErrorKind::TagMismatch, format!("'{value}' is not a valid float"), node.position));
    }
    cleaned
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|_| Error::at(ErrorKind::TagMismatch, format!("'{value}' is not a valid float"), node.position))
}

fn construct_binary(value: &str, node: &Node) -> Result<Value> {
    let clean: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(&clean)
        .map(Value::Binary)
        .map_err(|_| Error::at(ErrorKind::TagMismatch, format!("'{value}' is not valid base64"), node.position))
}

/// Validate (loosely) that `value` looks like an ISO 8601 timestamp, per
/// YAML 1.2's `!!timestamp` grammar: `YYYY-MM-DD` or a full
/// `YYYY-MM-DDTHH:MM:SS(.ffff)?(Z|[+-]HH:MM)?` datetime.
fn construct_timestamp(value: &str, node: &Node) -> Result<Value> {
    let trimmed = value.trim();
    let bytes = trimmed.as_bytes();
    let date_ok = bytes.len() >= 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[8..10].iter().all(u8::is_ascii_digit);
    if !date_ok {
        return Err(Error::at(ErrorKind::TagMismatch, format!("'{value}' is not a valid timestamp"), node.position));
    }
    if bytes.len() == 10 {
        return Ok(Value::String(trimmed.to_string()));
    }
    let rest = &trimmed[10..];
    let rest = rest.trim_start();
    let Some(sep) = rest.chars().next() else {
        return Err(Error::at(ErrorKind::TagMismatch, format!("'{value}' is not a valid timestamp"), node.position));
    };
    if sep != 'T' && sep != 't' && !sep.is_whitespace() {
        return Err(Error::at(ErrorKind::TagMismatch, format!("'{value}' is not a valid timestamp"), node.position));
    }
    let time = &rest[1..];
    let time_bytes = time.as_bytes();
    let time_ok = time_bytes.len() >= 8
        && time_bytes[2] == b':'
        && time_bytes[5] == b':'
        && time_bytes[..2].iter().all(u8::is_ascii_digit)
        && time_bytes[3..5].iter().all(u8::is_ascii_digit)
        && time_bytes[6..8].iter().all(u8::is_ascii_digit);
    if !time_ok {
        return Err(Error::at(ErrorKind::TagMismatch, format!("'{value}' is not a valid timestamp"), node.position));
    }
    Ok(Value::String(trimmed.to_string()))
}

fn validate_set_shape(map: &IndexMap<Node, Node>, node: &Node) -> Result<()> {
    if map.values().all(Node::is_null) {
        Ok(())
    } else {
        Err(Error::at(ErrorKind::TagMismatch, "!!set mapping values must all be null", node.position))
    }
}

fn validate_pairs_shape(items: &[Node], node: &Node) -> Result<()> {
    for item in items {
        match &item.value {
            Value::Mapping(m) if m.len() == 1 => {}
            _ => return Err(Error::at(ErrorKind::TagMismatch, "!!omap/!!pairs item must be a single-entry mapping", node.position)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yaml::composer::{compose, DuplicateKeyMode};
    use crate::yaml::limits::Limits;
    use crate::yaml::parser::{parse_documents, ParseOptions};

    fn construct_one(yaml: &str, schema: Schema) -> Node {
        let docs = parse_documents(yaml, ParseOptions::default()).unwrap();
        let composed = compose(&docs[0], &Limits::default(), DuplicateKeyMode::Error).unwrap();
        construct(&composed, &Resolver::new(schema), ConstructMode::Safe).unwrap()
    }

    #[test]
    fn core_schema_types_plain_scalars() {
        let node = construct_one("a: 1\nb: 3.5\nc: true\nd: ~\n", Schema::Core);
        assert_eq!(node.get("a").unwrap().value, Value::Int(1));
        assert_eq!(node.get("b").unwrap().value, Value::Float(3.5));
        assert_eq!(node.get("c").unwrap().value, Value::Bool(true));
        assert!(node.get("d").unwrap().is_null());
    }

    #[test]
    fn explicit_tag_overrides_implicit_typing() {
        let node = construct_one("a: !!str 123\n", Schema::Core);
        assert_eq!(node.get("a").unwrap().value, Value::String("123".to_string()));
    }

    #[test]
    fn binary_tag_decodes_base64() {
        let node = construct_one("a: !!binary aGVsbG8=\n", Schema::Core);
        assert_eq!(node.get("a").unwrap().value, Value::Binary(b"hello".to_vec()));
    }

    #[test]
    fn invalid_timestamp_is_rejected() {
        let docs = parse_documents("a: !!timestamp not-a-date\n", ParseOptions::default()).unwrap();
        let composed = compose(&docs[0], &Limits::default(), DuplicateKeyMode::Error).unwrap();
        let err = construct(&composed, &Resolver::new(Schema::Core), ConstructMode::Safe).unwrap_err();
        assert_eq!(err.kind, crate::yaml::error::ErrorKind::TagMismatch);
    }

    #[test]
    fn safe_mode_rejects_unknown_custom_tag() {
        let docs = parse_documents("a: !python/object:x.Y 1\n", ParseOptions::default()).unwrap();
        let composed = compose(&docs[0], &Limits::default(), DuplicateKeyMode::Error).unwrap();
        let err = construct(&composed, &Resolver::new(Schema::Core), ConstructMode::Safe).unwrap_err();
        assert_eq!(err.kind, crate::yaml::error::ErrorKind::UnresolvedTag);
    }
}

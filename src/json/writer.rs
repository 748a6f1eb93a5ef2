//! JSON writers: compact, pretty, and canonical (sorted-keys) emission.

use super::dom::Value;
use super::error::{Error, ErrorKind, Result};
use super::number::Number;
use crate::core::{Sink, SinkStatus};

/// Formatting style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// No insignificant whitespace.
    Compact,
    /// Indented, one member/element per line.
    Pretty,
}

/// Options controlling how a [`Value`] is serialized.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Compact or pretty layout.
    pub layout: Layout,
    /// Indentation unit for [`Layout::Pretty`].
    pub indent: String,
    /// Sort object keys lexicographically (canonical form, RFC 8785-ish).
    pub canonical: bool,
    /// Escape all non-ASCII characters as `\uXXXX`.
    pub ascii_only: bool,
    /// Reformat numbers to minimal canonical form (bare-digit integers,
    /// shortest round-tripping floats) instead of preserving the source
    /// lexeme.
    pub canonical_numbers: bool,
    /// Force canonical string rendering (no solidus escaping, no non-ASCII
    /// escaping) regardless of `escape_solidus`/`ascii_only`/`escape_unicode`.
    pub canonical_strings: bool,
    /// Escape all non-ASCII characters as `\uXXXX`. Equivalent to
    /// `ascii_only`; either flag triggers the same escaping.
    pub escape_unicode: bool,
    /// Escape `/` as `\/`.
    pub escape_solidus: bool,
    /// Allow `NaN`/`Infinity`/`-Infinity` to be emitted verbatim. When
    /// false (the default), writing a non-finite number is an error.
    pub allow_nonfinite_numbers: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            layout: Layout::Compact,
            indent: "  ".to_string(),
            canonical: false,
            ascii_only: false,
            canonical_numbers: false,
            canonical_strings: false,
            escape_unicode: false,
            escape_solidus: false,
            allow_nonfinite_numbers: false,
        }
    }
}

/// Serialize `value` to `sink` under `options`.
pub fn write_value(value: &Value, options: &WriteOptions, sink: &mut dyn Sink) -> Result<()> {
    write_node(value, options, 0, sink)
}

/// Serialize `value` to a freshly allocated `String`.
pub fn to_string(value: &Value, options: &WriteOptions) -> Result<String> {
    let mut buf = Vec::new();
    write_value(value, options, &mut buf)?;
    String::from_utf8(buf).map_err(|_| Error::new(ErrorKind::Invalid, "non-UTF-8 output"))
}

fn write_node(value: &Value, options: &WriteOptions, depth: usize, sink: &mut dyn Sink) -> Result<()> {
    match value {
        Value::Null => emit(sink, b"null"),
        Value::Bool(true) => emit(sink, b"true"),
        Value::Bool(false) => emit(sink, b"false"),
        Value::Number(n) => write_number(n, options, sink),
        Value::String(s) => write_string(s, options, sink),
        Value::Array(items) => write_array(items, options, depth, sink),
        Value::Object(map) => write_object(map, options, depth, sink),
    }
}

fn write_number(n: &Number, options: &WriteOptions, sink: &mut dyn Sink) -> Result<()> {
    if !n.is_finite() && !options.allow_nonfinite_numbers {
        return Err(Error::new(ErrorKind::NonFinite, "refusing to write a non-finite number"));
    }
    if options.canonical_numbers {
        if let Some(lexeme) = n.to_canonical_lexeme() {
            return emit(sink, lexeme.as_bytes());
        }
    }
    emit(sink, n.as_str().as_bytes())
}

fn write_array(items: &[Value], options: &WriteOptions, depth: usize, sink: &mut dyn Sink) -> Result<()> {
    if items.is_empty() {
        return emit(sink, b"[]");
    }
    emit(sink, b"[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            emit(sink, b",")?;
        }
        newline_indent(options, depth + 1, sink)?;
        write_node(item, options, depth + 1, sink)?;
    }
    newline_indent(options, depth, sink)?;
    emit(sink, b"]")
}

fn write_object(map: &indexmap::IndexMap<String, Value>, options: &WriteOptions, depth: usize, sink: &mut dyn Sink) -> Result<()> {
    if map.is_empty() {
        return emit(sink, b"{}");
    }
    emit(sink, b"{")?;
    let mut keys: Vec<&String> = map.keys().collect();
    if options.canonical {
        keys.sort();
    }
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            emit(sink, b",")?;
        }
        newline_indent(options, depth + 1, sink)?;
        write_string(key, options, sink)?;
        emit(sink, if options.layout == Layout::Pretty { b": " } else { b":" })?;
        write_node(&map[*key], options, depth + 1, sink)?;
    }
    newline_indent(options, depth, sink)?;
    emit(sink, b"}")
}

fn newline_indent(options: &WriteOptions, depth: usize, sink: &mut dyn Sink) -> Result<()> {
    if options.layout == Layout::Pretty {
        emit(sink, b"\n")?;
        for _ in 0..depth {
            emit(sink, options.indent.as_bytes())?;
        }
    }
    Ok(())
}

fn write_string(s: &str, options: &WriteOptions, sink: &mut dyn Sink) -> Result<()> {
    let escape_solidus = options.escape_solidus && !options.canonical_strings;
    let escape_non_ascii = (options.ascii_only || options.escape_unicode) && !options.canonical_strings;
    emit(sink, b"\"")?;
    for c in s.chars() {
        match c {
            '"' => emit(sink, b"\\\"")?,
            '\\' => emit(sink, b"\\\\")?,
            '/' if escape_solidus => emit(sink, b"\\/")?,
            '\n' => emit(sink, b"\\n")?,
            '\r' => emit(sink, b"\\r")?,
            '\t' => emit(sink, b"\\t")?,
            '\u{8}' => emit(sink, b"\\b")?,
            '\u{c}' => emit(sink, b"\\f")?,
            c if (c as u32) < 0x20 => emit(sink, format!("\\u{:04x}", c as u32).as_bytes())?,
            c if escape_non_ascii && (c as u32) > 0x7F => {
                let cp = c as u32;
                if cp > 0xFFFF {
                    let v = cp - 0x10000;
                    let hi = 0xD800 + (v >> 10);
                    let lo = 0xDC00 + (v & 0x3FF);
                    emit(sink, format!("\\u{hi:04x}\\u{lo:04x}").as_bytes())?;
                } else {
                    emit(sink, format!("\\u{cp:04x}").as_bytes())?;
                }
            }
            c => {
                let mut buf = [0u8; 4];
                emit(sink, c.encode_utf8(&mut buf).as_bytes())?;
            }
        }
    }
    emit(sink, b"\"")
}

fn emit(sink: &mut dyn Sink, bytes: &[u8]) -> Result<()> {
    match sink.write(bytes) {
        SinkStatus::Ok => Ok(()),
        SinkStatus::Write => Err(Error::new(ErrorKind::Write, "sink rejected a write")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::dom::{parse, ParseOptions};

    #[test]
    fn compact_round_trip() {
        let v = parse(br#"{"a":[1,2,"x"]}"#, &ParseOptions::default()).unwrap();
        assert_eq!(to_string(&v, &WriteOptions::default()).unwrap(), r#"{"a":[1,2,"x"]}"#);
    }

    #[test]
    fn pretty_indents_nested_values() {
        let v = parse(br#"{"a":1}"#, &ParseOptions::default()).unwrap();
        let mut opts = WriteOptions::default();
        opts.layout = Layout::Pretty;
        let s = to_string(&v, &opts).unwrap();
        assert_eq!(s, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn canonical_sorts_keys() {
        let v = parse(br#"{"z":1,"a":2}"#, &ParseOptions::default()).unwrap();
        let mut opts = WriteOptions::default();
        opts.canonical = true;
        assert_eq!(to_string(&v, &opts).unwrap(), r#"{"a":2,"z":1}"#);
    }

    #[test]
    fn strings_escape_control_characters() {
        let v = Value::String("a\nb\tc".to_string());
        assert_eq!(to_string(&v, &WriteOptions::default()).unwrap(), r#""a\nb\tc""#);
    }

    #[test]
    fn nonfinite_number_rejected_by_default() {
        let v = Value::Number(Number::from_lexeme("NaN".to_string()));
        let err = to_string(&v, &WriteOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NonFinite);
    }

    #[test]
    fn nonfinite_number_allowed_with_option() {
        let v = Value::Number(Number::from_lexeme("NaN".to_string()));
        let options = WriteOptions { allow_nonfinite_numbers: true, ..WriteOptions::default() };
        assert_eq!(to_string(&v, &options).unwrap(), "NaN");
    }

    #[test]
    fn canonical_numbers_reformats_the_lexeme() {
        let v = Value::Number(Number::from_lexeme("1.50".to_string()));
        let options = WriteOptions { canonical_numbers: true, ..WriteOptions::default() };
        assert_eq!(to_string(&v, &options).unwrap(), "1.5");
    }

    #[test]
    fn escape_solidus_escapes_forward_slash() {
        let v = Value::String("a/b".to_string());
        let options = WriteOptions { escape_solidus: true, ..WriteOptions::default() };
        assert_eq!(to_string(&v, &options).unwrap(), r#""a\/b""#);
    }

    #[test]
    fn canonical_strings_overrides_escape_solidus() {
        let v = Value::String("a/b".to_string());
        let options = WriteOptions { escape_solidus: true, canonical_strings: true, ..WriteOptions::default() };
        assert_eq!(to_string(&v, &options).unwrap(), r#""a/b""#);
    }
}

//! Renders a [`Node`] tree back to YAML text, honoring each node's scalar
//! and collection style where it was recorded, and collapsing repeated
//! anchors into aliases on re-occurrence.

use crate::core::{Sink, SinkStatus};
use crate::yaml::error::{Error, ErrorKind, Result};
use crate::yaml::value::{CollectionStyle, Node, ScalarStyle, Value};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::{HashMap, HashSet};

/// Options controlling how a document tree is serialized.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Spaces per indentation level for block collections.
    pub indent: usize,
    /// Force every collection to flow style (`[...]`/`{...}`), ignoring
    /// each node's recorded [`CollectionStyle`]. Used for canonical output.
    pub force_flow: bool,
    /// Emit an explicit `---` before the document.
    pub explicit_start: bool,
    /// Emit an explicit `...` after the document.
    pub explicit_end: bool,
    /// Emit `&name` for every anchored node, even ones never referenced by
    /// an alias elsewhere in the tree. Off by default: an anchor that is
    /// never aliased again is write noise, so it's suppressed unless this
    /// fidelity mode is requested.
    pub preserve_all_anchors: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            force_flow: false,
            explicit_start: false,
            explicit_end: false,
            preserve_all_anchors: false,
        }
    }
}

/// Serialize a single document `node` to `sink`.
pub fn write_document(node: &Node, options: &WriteOptions, sink: &mut dyn Sink) -> Result<()> {
    let mut emitted = HashSet::new();
    let anchor_counts = count_anchor_occurrences(node);
    let mut w = Writer { options, emitted: &mut emitted, anchor_counts: &anchor_counts, sink };
    if options.explicit_start {
        emit(w.sink, b"---\n")?;
    }
    w.write_leading_comments(&node.comments.leading, 0)?;
    w.write_node(node, 0, true)?;
    w.write_trailing_comment(&node.comments.trailing)?;
    emit(w.sink, b"\n")?;
    if options.explicit_end {
        emit(w.sink, b"...\n")?;
    }
    Ok(())
}

/// Counts how many nodes in the tree carry each anchor name. An anchor
/// used only once (its defining node) was never aliased and doesn't need
/// to appear in the output unless `preserve_all_anchors` is set.
fn count_anchor_occurrences(node: &Node) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    fn walk(node: &Node, counts: &mut HashMap<String, usize>) {
        if let Some(anchor) = &node.anchor {
            *counts.entry(anchor.clone()).or_insert(0) += 1;
        }
        match &node.value {
            Value::Sequence(items) => items.iter().for_each(|item| walk(item, counts)),
            Value::Mapping(map) => map.iter().for_each(|(k, v)| {
                walk(k, counts);
                walk(v, counts);
            }),
            _ => {}
        }
    }
    walk(node, &mut counts);
    counts
}

/// Serialize `node` to a freshly allocated `String`.
pub fn to_string(node: &Node, options: &WriteOptions) -> Result<String> {
    let mut buf = Vec::new();
    write_document(node, options, &mut buf)?;
    String::from_utf8(buf).map_err(|_| Error::new(ErrorKind::Invalid, "non-UTF-8 output"))
}

struct Writer<'a> {
    options: &'a WriteOptions,
    emitted: &'a mut HashSet<String>,
    anchor_counts: &'a HashMap<String, usize>,
    sink: &'a mut dyn Sink,
}

impl<'a> Writer<'a> {
    fn write_node(&mut self, node: &Node, indent: usize, at_line_start: bool) -> Result<()> {
        if let Some(anchor) = &node.anchor {
            if self.emitted.contains(anchor) {
                emit(self.sink, format!("*{anchor}").as_bytes())?;
                return Ok(());
            }
            let aliased_elsewhere = self.anchor_counts.get(anchor).copied().unwrap_or(0) > 1;
            if aliased_elsewhere || self.options.preserve_all_anchors {
                self.emitted.insert(anchor.clone());
                emit(self.sink, format!("&{anchor} ").as_bytes())?;
            }
        }
        self.write_node_value(node, indent, at_line_start)
    }

    /// Write leading comment lines, each on its own padded line.
    fn write_leading_comments(&mut self, comments: &[String], indent: usize) -> Result<()> {
        let pad = " ".repeat(indent);
        for c in comments {
            emit(self.sink, pad.as_bytes())?;
            emit(self.sink, format!("# {c}\n").as_bytes())?;
        }
        Ok(())
    }

    /// Append a same-line trailing comment, if any.
    fn write_trailing_comment(&mut self, comment: &Option<String>) -> Result<()> {
        if let Some(c) = comment {
            emit(self.sink, format!(" # {c}").as_bytes())?;
        }
        Ok(())
    }

    fn write_node_value(&mut self, node: &Node, indent: usize, at_line_start: bool) -> Result<()> {
        if let Some(tag) = &node.tag {
            emit(self.sink, format!("{} ", shorthand_tag(tag)).as_bytes())?;
        }
        match &node.value {
            Value::Null => emit(self.sink, b"null"),
            Value::Bool(b) => emit(self.sink, if *b { b"true" } else { b"false" }),
            Value::Int(i) => emit(self.sink, i.to_string().as_bytes()),
            Value::Float(f) => emit(self.sink, format_float(*f).as_bytes()),
            Value::String(s) => self.write_string(s, node.scalar_style, indent),
            Value::Binary(bytes) => emit(self.sink, STANDARD.encode(bytes).as_bytes()),
            Value::Sequence(items) => self.write_sequence(items, node.collection_style, indent, at_line_start),
            Value::Mapping(map) => self.write_mapping(map, node.collection_style, indent, at_line_start),
        }
    }

    fn write_string(&mut self, s: &str, style: ScalarStyle, indent: usize) -> Result<()> {
        match style {
            ScalarStyle::SingleQuoted => {
                emit(self.sink, b"'")?;
                emit(self.sink, s.replace('\'', "''").as_bytes())?;
                emit(self.sink, b"'")
            }
            ScalarStyle::DoubleQuoted => self.write_double_quoted(s),
            ScalarStyle::Literal => self.write_block_scalar(s, '|', indent),
            ScalarStyle::Folded => self.write_block_scalar(s, '>', indent),
            ScalarStyle::Plain => {
                if plain_is_safe(s) {
                    emit(self.sink, s.as_bytes())
                } else {
                    self.write_double_quoted(s)
                }
            }
        }
    }

    fn write_double_quoted(&mut self, s: &str) -> Result<()> {
        emit(self.sink, b"\"")?;
        for c in s.chars() {
            match c {
                '"' => emit(self.sink, b"\\\"")?,
                '\\' => emit(self.sink, b"\\\\")?,
                '\n' => emit(self.sink, b"\\n")?,
                '\t' => emit(self.sink, b"\\t")?,
                '\r' => emit(self.sink, b"\\r")?,
                c if (c as u32) < 0x20 => emit(self.sink, format!("\\x{:02x}", c as u32).as_bytes())?,
                c => {
                    let mut buf = [0u8; 4];
                    emit(self.sink, c.encode_utf8(&mut buf).as_bytes())?;
                }
            }
        }
        emit(self.sink, b"\"")
    }

    fn write_block_scalar(&mut self, s: &str, indicator: char, indent: usize) -> Result<()> {
        emit(self.sink, format!("{indicator}\n").as_bytes())?;
        let pad = " ".repeat(indent + self.options.indent);
        for line in s.trim_end_matches('\n').split('\n') {
            emit(self.sink, pad.as_bytes())?;
            emit(self.sink, line.as_bytes())?;
            emit(self.sink, b"\n")?;
        }
        Ok(())
    }

    fn write_sequence(&mut self, items: &[Node], style: CollectionStyle, indent: usize, at_line_start: bool) -> Result<()> {
        let flow = self.options.force_flow || style == CollectionStyle::Flow;
        if items.is_empty() {
            return emit(self.sink, b"[]");
        }
        if flow {
            emit(self.sink, b"[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    emit(self.sink, b", ")?;
                }
                self.write_node(item, indent, false)?;
            }
            return emit(self.sink, b"]");
        }
        if !at_line_start {
            emit(self.sink, b"\n")?;
        }
        let pad = " ".repeat(indent);
        for (i, item) in items.iter().enumerate() {
            if !item.comments.leading.is_empty() {
                self.write_leading_comments(&item.comments.leading, indent)?;
                emit(self.sink, pad.as_bytes())?;
            } else if i > 0 || !at_line_start {
                emit(self.sink, pad.as_bytes())?;
            }
            emit(self.sink, b"- ")?;
            self.write_node(item, indent + 2, true)?;
            self.write_trailing_comment(&item.comments.trailing)?;
            if i + 1 < items.len() {
                emit(self.sink, b"\n")?;
            }
        }
        Ok(())
    }

    fn write_mapping(&mut self, map: &indexmap::IndexMap<Node, Node>, style: CollectionStyle, indent: usize, at_line_start: bool) -> Result<()> {
        let flow = self.options.force_flow || style == CollectionStyle::Flow;
        if map.is_empty() {
            return emit(self.sink, b"{}");
        }
        if flow {
            emit(self.sink, b"{")?;
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    emit(self.sink, b", ")?;
                }
                self.write_node(k, indent, false)?;
                emit(self.sink, b": ")?;
                self.write_node(v, indent, false)?;
            }
            return emit(self.sink, b"}");
        }
        if !at_line_start {
            emit(self.sink, b"\n")?;
        }
        let pad = " ".repeat(indent);
        for (i, (k, v)) in map.iter().enumerate() {
            if !k.comments.leading.is_empty() {
                self.write_leading_comments(&k.comments.leading, indent)?;
                emit(self.sink, pad.as_bytes())?;
            } else if i > 0 || !at_line_start {
                emit(self.sink, pad.as_bytes())?;
            }
            self.write_node(k, indent, false)?;
            emit(self.sink, b":")?;
            match &v.value {
                Value::Sequence(items) if !items.is_empty() && v.collection_style == CollectionStyle::Block && !self.options.force_flow => {
                    emit(self.sink, b"\n")?;
                    self.write_node(v, indent, false)?;
                }
                Value::Mapping(entries) if !entries.is_empty() && v.collection_style == CollectionStyle::Block && !self.options.force_flow => {
                    emit(self.sink, b"\n")?;
                    let child_pad = " ".repeat(indent + self.options.indent);
                    emit(self.sink, child_pad.as_bytes())?;
                    self.write_node(v, indent + self.options.indent, true)?;
                }
                _ => {
                    emit(self.sink, b" ")?;
                    self.write_node(v, indent, false)?;
                }
            }
            self.write_trailing_comment(&v.comments.trailing)?;
            if i + 1 < map.len() {
                emit(self.sink, b"\n")?;
            }
        }
        Ok(())
    }
}

fn plain_is_safe(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    if matches!(s, "null" | "Null" | "NULL" | "~" | "true" | "True" | "TRUE" | "false" | "False" | "FALSE") {
        return false;
    }
    if s.parse::<f64>().is_ok() || s.parse::<i64>().is_ok() {
        return false;
    }
    let first = s.chars().next().unwrap();
    if matches!(first, '!' | '&' | '*' | '?' | '|' | '>' | '\'' | '"' | '%' | '@' | '`' | '#' | '-' | ' ') {
        return false;
    }
    !s.contains([':', '\n', '#']) && !s.ends_with(' ') && !s.starts_with(' ')
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        ".nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { ".inf".to_string() } else { "-.inf".to_string() }
    } else if f == f.trunc() && f.abs() < 1e15 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

fn shorthand_tag(uri: &str) -> String {
    uri.strip_prefix("tag:yaml.org,2002:").map_or_else(|| format!("!<{uri}>"), |suffix| format!("!!{suffix}"))
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
    use crate::yaml::composer::{compose, DuplicateKeyMode};
    use crate::yaml::limits::Limits;
    use crate::yaml::parser::{parse_documents, ParseOptions};

    fn compose_one(yaml: &str) -> Node {
        let docs = parse_documents(yaml, ParseOptions::default()).unwrap();
        compose(&docs[0], &Limits::default(), DuplicateKeyMode::Error).unwrap()
    }

    #[test]
    fn flat_mapping_round_trips_as_block() {
        let node = compose_one("a: 1\nb: two\n");
        let out = to_string(&node, &WriteOptions::default()).unwrap();
        assert!(out.contains("a: 1"));
        assert!(out.contains("b: two"));
    }

    #[test]
    fn flow_sequence_round_trips_bracketed() {
        let node = compose_one("[1, 2, 3]\n");
        let out = to_string(&node, &WriteOptions::default()).unwrap();
        assert_eq!(out.trim_end(), "[1, 2, 3]");
    }

    #[test]
    fn repeated_anchor_becomes_alias_on_second_use() {
        let node = compose_one("a: &x 1\nb: *x\n");
        let out = to_string(&node, &WriteOptions::default()).unwrap();
        assert!(out.contains("&x 1"));
        assert!(out.contains("*x"));
    }

    #[test]
    fn binary_value_round_trips_as_base64() {
        let node = Node::new(Value::Binary(b"hello".to_vec()));
        let out = to_string(&node, &WriteOptions::default()).unwrap();
        assert_eq!(out.trim_end(), "aGVsbG8=");
    }

    #[test]
    fn anchor_never_aliased_is_suppressed_by_default() {
        let node = compose_one("a: &x 1\nb: 2\n");
        let out = to_string(&node, &WriteOptions::default()).unwrap();
        assert!(!out.contains('&'));
    }

    #[test]
    fn preserve_all_anchors_keeps_an_unaliased_anchor() {
        let node = compose_one("a: &x 1\nb: 2\n");
        let options = WriteOptions { preserve_all_anchors: true, ..WriteOptions::default() };
        let out = to_string(&node, &options).unwrap();
        assert!(out.contains("&x 1"));
    }

    #[test]
    fn captured_comments_are_re_emitted_on_write() {
        let options = ParseOptions { preserve_comments: true, ..ParseOptions::default() };
        let docs = parse_documents("# about a\na: 1 # one\nb: 2\n", options).unwrap();
        let node = compose(&docs[0], &Limits::default(), DuplicateKeyMode::Error).unwrap();
        let out = to_string(&node, &WriteOptions::default()).unwrap();
        assert!(out.contains("# about a"));
        assert!(out.contains("# one"));
    }
}

//! Builds the [`Node`] tree from a flat event stream: anchor/alias
//! resolution and merge-key (`<<`) expansion. Every scalar becomes a
//! `Value::String` here, regardless of its apparent type — typed
//! construction happens later, in [`crate::yaml::constructor`].

use crate::yaml::error::{Error, ErrorKind, Result};
use crate::yaml::limits::Limits;
use crate::yaml::parser::Event;
use crate::yaml::value::{Node, Value};
use indexmap::IndexMap;
use std::collections::HashMap;

/// How a duplicate key within one mapping is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeyMode {
    /// Reject the document.
    #[default]
    Error,
    /// Keep the first occurrence's value.
    FirstWins,
    /// Keep the last occurrence's value.
    LastWins,
    /// Collect every value for the key into a sequence.
    Collect,
}

/// Compose one document's worth of events (bracketed by `DocumentStart`/
/// `DocumentEnd`) into a single root [`Node`].
pub fn compose(events: &[Event], limits: &Limits, dup_mode: DuplicateKeyMode) -> Result<Node> {
    let mut cx = Composer {
        events,
        idx: 0,
        anchors: HashMap::new(),
        limits,
        dup_mode,
        alias_expansion_used: 0,
    };
    match events.first() {
        Some(Event::DocumentStart { .. }) => cx.idx += 1,
        _ => return Err(Error::new(ErrorKind::State, "composer expects a DocumentStart event")),
    }
    let root = cx.compose_node(0)?;
    cx.drain_leading_comments();
    match events.get(cx.idx) {
        Some(Event::DocumentEnd { .. }) => {}
        _ => return Err(Error::new(ErrorKind::State, "composer expects a DocumentEnd event")),
    }
    if cx.anchors.len() > limits.max_anchors {
        return Err(Error::new(ErrorKind::Limit, "too many anchors in document"));
    }
    Ok(root)
}

struct Composer<'a> {
    events: &'a [Event],
    idx: usize,
    anchors: HashMap<String, Node>,
    limits: &'a Limits,
    dup_mode: DuplicateKeyMode,
    /// Running total of node counts introduced by resolved aliases so far,
    /// charged against `limits.max_alias_expansion`.
    alias_expansion_used: usize,
}

/// Transitive node count of a composed subtree. Anchors store subtrees that
/// have already had their own aliases resolved into clones, so counting here
/// naturally reflects the fully expanded size, not just the literal syntax.
fn count_nodes(node: &Node) -> usize {
    1 + match &node.value {
        Value::Sequence(items) => items.iter().map(count_nodes).sum(),
        Value::Mapping(map) => map.iter().map(|(k, v)| count_nodes(k) + count_nodes(v)).sum(),
        _ => 0,
    }
}

impl<'a> Composer<'a> {
    /// Consume every standalone (non-inline) comment event at the current
    /// position, returning their text. These precede whatever real event
    /// comes next and become that node's leading comments.
    fn drain_leading_comments(&mut self) -> Vec<String> {
        let mut leading = Vec::new();
        while let Some(Event::Comment { inline: false, .. }) = self.events.get(self.idx) {
            if let Some(Event::Comment { text, .. }) = self.events.get(self.idx) {
                leading.push(text.clone());
            }
            self.idx += 1;
        }
        leading
    }

    /// Look past any standalone comment events without consuming them, to
    /// see what the next structural event actually is.
    fn peek_past_comments(&self) -> Option<&Event> {
        let mut i = self.idx;
        while let Some(Event::Comment { inline: false, .. }) = self.events.get(i) {
            i += 1;
        }
        self.events.get(i)
    }

    fn compose_node(&mut self, depth: usize) -> Result<Node> {
        if depth > self.limits.max_depth {
            return Err(Error::new(ErrorKind::Limit, "maximum document nesting depth exceeded"));
        }
        let leading = self.drain_leading_comments();
        let event = self
            .events
            .get(self.idx)
            .ok_or_else(|| Error::new(ErrorKind::State, "unexpected end of event stream"))?
            .clone();
        let mut node = match event {
            Event::Alias { name, position } => {
                self.idx += 1;
                let node = self
                    .anchors
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| Error::at(ErrorKind::UndefinedAnchor, format!("undefined anchor '{name}'"), position))?;
                self.alias_expansion_used = self.alias_expansion_used.saturating_add(count_nodes(&node));
                if self.alias_expansion_used > self.limits.max_alias_expansion {
                    return Err(Error::at(ErrorKind::Limit, "alias expansion budget exceeded", position));
                }
                node
            }
            Event::Scalar { value, style, anchor, tag, position } => {
                self.idx += 1;
                if value.len() > self.limits.max_scalar_length {
                    return Err(Error::at(ErrorKind::Limit, "scalar exceeds maximum length", position));
                }
                let mut node = Node::new(Value::String(value)).at(position);
                node.scalar_style = style;
                if let Some(tag) = tag {
                    node.tag = Some(tag);
                }
                if let Some(anchor) = anchor {
                    node = node.with_anchor(anchor.clone());
                    self.register_anchor(anchor, node.clone())?;
                }
                node
            }
            Event::SequenceStart { anchor, tag, style, position } => {
                self.idx += 1;
                let mut items = Vec::new();
                loop {
                    match self.peek_past_comments() {
                        Some(Event::SequenceEnd) => {
                            self.drain_leading_comments();
                            self.idx += 1;
                            break;
                        }
                        Some(_) => {
                            items.push(self.compose_node(depth + 1)?);
                            if items.len() > self.limits.max_collection_size {
                                return Err(Error::at(ErrorKind::Limit, "sequence exceeds maximum size", position));
                            }
                        }
                        None => return Err(Error::new(ErrorKind::Unterminated, "unterminated sequence")),
                    }
                }
                let mut node = Node::new(Value::Sequence(items)).at(position);
                node.collection_style = style;
                if let Some(tag) = tag {
                    node.tag = Some(tag);
                }
                if let Some(anchor) = anchor {
                    node = node.with_anchor(anchor.clone());
                    self.register_anchor(anchor, node.clone())?;
                }
                node
            }
            Event::MappingStart { anchor, tag, style, position } => {
                self.idx += 1;
                let mut explicit = Vec::new();
                let mut merge_sources = Vec::new();
                loop {
                    match self.peek_past_comments() {
                        Some(Event::MappingEnd) => {
                            self.drain_leading_comments();
                            self.idx += 1;
                            break;
                        }
                        Some(_) => {
                            let key = self.compose_node(depth + 1)?;
                            let value = self.compose_node(depth + 1)?;
                            if key.as_str() == Some("<<") {
                                merge_sources.push(value);
                            } else {
                                explicit.push((key, value));
                            }
                            if explicit.len() + merge_sources.len() > self.limits.max_collection_size {
                                return Err(Error::at(ErrorKind::Limit, "mapping exceeds maximum size", position));
                            }
                        }
                        None => return Err(Error::new(ErrorKind::Unterminated, "unterminated mapping")),
                    }
                }
                let map = self.build_mapping(explicit, merge_sources, position)?;
                let mut node = Node::new(Value::Mapping(map)).at(position);
                node.collection_style = style;
                if let Some(tag) = tag {
                    node.tag = Some(tag);
                }
                if let Some(anchor) = anchor {
                    node = node.with_anchor(anchor.clone());
                    self.register_anchor(anchor, node.clone())?;
                }
                node
            }
            other => return Err(Error::new(ErrorKind::State, format!("unexpected event in node position: {other:?}"))),
        };
        if !leading.is_empty() {
            node.comments.leading = leading;
        }
        if let Some(Event::Comment { text, inline: true, .. }) = self.events.get(self.idx) {
            node.comments.trailing = Some(text.clone());
            self.idx += 1;
        }
        Ok(node)
    }

    fn register_anchor(&mut self, name: String, node: Node) -> Result<()> {
        if self.anchors.len() >= self.limits.max_anchors {
            return Err(Error::new(ErrorKind::Limit, "too many anchors in document"));
        }
        self.anchors.insert(name, node);
        Ok(())
    }

    /// Build the final mapping: explicit keys always win; merge sources
    /// (from `<<`) are applied in order, each only filling keys still
    /// missing, so earlier merge sources win over later ones.
    fn build_mapping(&self, explicit: Vec<(Node, Node)>, merge_sources: Vec<Node>, at: crate::core::Position) -> Result<IndexMap<Node, Node>> {
        let mut result: IndexMap<Node, Node> = IndexMap::new();
        for (key, value) in explicit {
            self.insert_with_dup_mode(&mut result, key, value)?;
        }
        for source in merge_sources {
            let mappings: Vec<&IndexMap<Node, Node>> = match &source.value {
                Value::Mapping(m) => vec![m],
                Value::Sequence(items) => {
                    let mut maps = Vec::new();
                    for item in items {
                        match &item.value {
                            Value::Mapping(m) => maps.push(m),
                            _ => return Err(Error::at(ErrorKind::InvalidMerge, "merge sequence item is not a mapping", at)),
                        }
                    }
                    maps
                }
                _ => return Err(Error::at(ErrorKind::InvalidMerge, "merge value is not a mapping or sequence of mappings", at)),
            };
            for map in mappings {
                for (key, value) in map {
                    result.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        }
        Ok(result)
    }

    fn insert_with_dup_mode(&self, map: &mut IndexMap<Node, Node>, key: Node, value: Node) -> Result<()> {
        match self.dup_mode {
            DuplicateKeyMode::Error => {
                if map.contains_key(&key) {
                    return Err(Error::new(ErrorKind::DuplicateKey, format!("duplicate mapping key {:?}", key.as_str())));
                }
                map.insert(key, value);
            }
            DuplicateKeyMode::FirstWins => {
                map.entry(key).or_insert(value);
            }
            DuplicateKeyMode::LastWins => {
                map.insert(key, value);
            }
            DuplicateKeyMode::Collect => {
                if let Some(existing) = map.get_mut(&key) {
                    match &mut existing.value {
                        Value::Sequence(items) => items.push(value),
                        _ => {
                            let prior = existing.clone();
                            *existing = Node::new(Value::Sequence(vec![prior, value]));
                        }
                    }
                } else {
                    map.insert(key, value);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yaml::parser::{parse_documents, ParseOptions};

    fn compose_one(yaml: &str) -> Node {
        let docs = parse_documents(yaml, ParseOptions::default()).unwrap();
        compose(&docs[0], &Limits::default(), DuplicateKeyMode::Error).unwrap()
    }

    #[test]
    fn flat_mapping_composes_to_node_mapping() {
        let node = compose_one("a: 1\nb: two\n");
        assert_eq!(node.get("a").unwrap().as_str(), Some("1"));
        assert_eq!(node.get("b").unwrap().as_str(), Some("two"));
    }

    #[test]
    fn anchor_and_alias_compose_to_equal_nodes() {
        let node = compose_one("a: &x 1\nb: *x\n");
        assert_eq!(node.get("a").unwrap().as_str(), node.get("b").unwrap().as_str());
    }

    #[test]
    fn duplicate_key_error_mode_rejects_document() {
        let docs = parse_documents("a: 1\na: 2\n", ParseOptions::default()).unwrap();
        let err = compose(&docs[0], &Limits::default(), DuplicateKeyMode::Error).unwrap_err();
        assert_eq!(err.kind, crate::yaml::error::ErrorKind::DuplicateKey);
    }

    #[test]
    fn merge_key_fills_in_missing_keys_without_overriding_explicit() {
        let node = compose_one("base: &b\n  x: 1\n  y: 2\nchild:\n  <<: *b\n  y: 99\n");
        let child = node.get("child").unwrap();
        assert_eq!(child.get("x").unwrap().as_str(), Some("1"));
        assert_eq!(child.get("y").unwrap().as_str(), Some("99"));
    }

    #[test]
    fn merge_sequence_gives_earlier_source_precedence() {
        let node = compose_one("a: &a\n  k: from_a\nb: &b\n  k: from_b\nc:\n  <<: [*a, *b]\n");
        let c = node.get("c").unwrap();
        assert_eq!(c.get("k").unwrap().as_str(), Some("from_a"));
    }

    #[test]
    fn undefined_anchor_alias_is_an_error() {
        let docs = parse_documents("a: *missing\n", ParseOptions::default()).unwrap();
        let err = compose(&docs[0], &Limits::default(), DuplicateKeyMode::Error).unwrap_err();
        assert_eq!(err.kind, crate::yaml::error::ErrorKind::UndefinedAnchor);
    }

    #[test]
    fn repeated_aliasing_of_the_same_anchor_is_charged_every_time() {
        let docs = parse_documents("x: &x [1,2,3]\na: [*x, *x, *x]\n", ParseOptions::default()).unwrap();
        let limits = Limits { max_alias_expansion: 10, ..Limits::default() };
        let err = compose(&docs[0], &limits, DuplicateKeyMode::Error).unwrap_err();
        assert_eq!(err.kind, crate::yaml::error::ErrorKind::Limit);
    }

    #[test]
    fn aliasing_under_the_expansion_budget_succeeds() {
        let docs = parse_documents("x: &x [1,2,3]\na: [*x, *x, *x]\n", ParseOptions::default()).unwrap();
        let limits = Limits { max_alias_expansion: 100, ..Limits::default() };
        assert!(compose(&docs[0], &limits, DuplicateKeyMode::Error).is_ok());
    }

    fn compose_with_comments(yaml: &str) -> Node {
        let options = ParseOptions { preserve_comments: true, ..ParseOptions::default() };
        let docs = parse_documents(yaml, options).unwrap();
        compose(&docs[0], &Limits::default(), DuplicateKeyMode::Error).unwrap()
    }

    #[test]
    fn leading_and_trailing_comments_attach_to_the_right_key() {
        let node = compose_with_comments("# about a\na: 1 # one\nb: 2\n");
        let a_key = node.as_mapping().unwrap().keys().find(|k| k.as_str() == Some("a")).unwrap();
        assert_eq!(a_key.comments.leading, vec!["about a".to_string()]);
        let a_value = node.get("a").unwrap();
        assert_eq!(a_value.comments.trailing, Some("one".to_string()));
    }

    #[test]
    fn comment_dangling_before_sequence_end_does_not_break_composition() {
        let node = compose_with_comments("items:\n  - a\n  - b\n  # trailing comment\n");
        let items = node.get("items").unwrap().as_sequence().unwrap();
        assert_eq!(items.len(), 2);
    }
}

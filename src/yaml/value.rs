//! The YAML value tree: scalars, sequences, and mappings, each optionally
//! carrying anchor/tag/style metadata and a source position.

use crate::core::Position;
use indexmap::IndexMap;
use std::hash::{Hash, Hasher};

/// How a scalar was written in the source, preserved for round-tripping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarStyle {
    /// No quoting, no block indicator.
    #[default]
    Plain,
    /// `'single quoted'`
    SingleQuoted,
    /// `"double quoted"`
    DoubleQuoted,
    /// `|` literal block scalar.
    Literal,
    /// `>` folded block scalar.
    Folded,
}

/// Flow vs. block layout for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionStyle {
    /// Indentation-based layout (the default).
    #[default]
    Block,
    /// `[...]` / `{...}` inline layout.
    Flow,
}

/// Comments attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comments {
    /// Comment lines appearing immediately before the node.
    pub leading: Vec<String>,
    /// A comment on the same line as the node (or its closing token).
    pub trailing: Option<String>,
}

impl Comments {
    /// No comments.
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_none()
    }
}

/// A YAML scalar, sequence, or mapping value, with the metadata needed to
/// re-emit it in a form close to the source.
#[derive(Debug, Clone)]
pub enum Value {
    /// `null` / `~` / empty.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// `!!binary`-tagged scalar: raw bytes, base64-encoded on the wire.
    Binary(Vec<u8>),
    Sequence(Vec<Node>),
    Mapping(IndexMap<Node, Node>),
}

/// A [`Value`] plus its anchor, tag, style, comments, and source position.
#[derive(Debug, Clone)]
pub struct Node {
    /// The value itself.
    pub value: Value,
    /// An anchor name (`&name`) defined at this node, if any.
    pub anchor: Option<String>,
    /// The resolved tag URI, if the node was explicitly or implicitly tagged.
    pub tag: Option<String>,
    /// Source scalar style (meaningless for collections).
    pub scalar_style: ScalarStyle,
    /// Source collection style (meaningless for scalars).
    pub collection_style: CollectionStyle,
    /// Comments attached to this node.
    pub comments: Comments,
    /// Position of the node's first byte in the source.
    pub position: Position,
}

impl Node {
    /// Wrap a bare value with no metadata, at the start position.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            anchor: None,
            tag: None,
            scalar_style: ScalarStyle::default(),
            collection_style: CollectionStyle::default(),
            comments: Comments::default(),
            position: Position::start(),
        }
    }

    /// Attach a source position.
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Attach an anchor name.
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    /// Attach a resolved tag URI.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Shorthand for a null node.
    pub fn null() -> Self {
        Self::new(Value::Null)
    }

    /// Shorthand for a string node.
    pub fn string(s: impl Into<String>) -> Self {
        Self::new(Value::String(s.into()))
    }

    /// Borrow as a str, if this node is a plain string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as a sequence, if this node is one.
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match &self.value {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as a mapping, if this node is one.
    pub fn as_mapping(&self) -> Option<&IndexMap<Node, Node>> {
        match &self.value {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a mapping entry by a plain string key.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping()?.iter().find(|(k, _)| k.as_str() == Some(key)).map(|(_, v)| v)
    }

    /// Whether this node is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self.value, Value::Null)
    }

    /// Replace this node's comments outright.
    pub fn set_comments(&mut self, comments: Comments) {
        self.comments = comments;
    }

    /// Append a leading comment line.
    pub fn add_leading_comment(&mut self, text: impl Into<String>) {
        self.comments.leading.push(text.into());
    }

    /// Set (or replace) the trailing, same-line comment.
    pub fn set_trailing_comment(&mut self, text: impl Into<String>) {
        self.comments.trailing = Some(text.into());
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.is_nan() && b.is_nan() || a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Binary(a), Self::Binary(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Mapping(a), Self::Mapping(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Null => 0u8.hash(state),
            Self::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Self::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Self::Float(f) => {
                3u8.hash(state);
                if f.is_nan() {
                    u64::MAX.hash(state);
                } else if *f == 0.0 {
                    0u64.hash(state);
                } else {
                    f.to_bits().hash(state);
                }
            }
            Self::String(s) => {
                4u8.hash(state);
                s.hash(state);
            }
            Self::Binary(b) => {
                5u8.hash(state);
                b.hash(state);
            }
            Self::Sequence(items) => {
                6u8.hash(state);
                for item in items {
                    item.hash(state);
                }
            }
            Self::Mapping(map) => {
                7u8.hash(state);
                map.len().hash(state);
            }
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
impl Eq for Node {}
impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_finds_string_keyed_entry() {
        let mut map = IndexMap::new();
        map.insert(Node::string("name"), Node::string("Alice"));
        let n = Node::new(Value::Mapping(map));
        assert_eq!(n.get("name").unwrap().as_str(), Some("Alice"));
    }

    #[test]
    fn nan_floats_compare_equal_for_anchor_dedup() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    }
}

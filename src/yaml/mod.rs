//! YAML: a recursive-descent block/flow parser, an anchor/alias/merge-key
//! aware composer, tag-directed typed construction under any of the four
//! standard schemas, and a style-preserving writer.
//!
//! Unlike [`crate::csv`] and [`crate::json`], this parser buffers the
//! whole document before parsing rather than accepting incremental
//! `feed()`/`finish()` chunks: YAML's indentation and multi-line
//! plain-scalar rules need unbounded lookahead across line boundaries that
//! a chunk-tolerant scanner would have to buffer internally anyway, so
//! there is no streaming benefit to preserve.

mod composer;
mod constructor;
mod error;
mod limits;
mod parser;
mod resolver;
mod scanner;
mod tag;
mod value;
mod writer;

pub use composer::DuplicateKeyMode;
pub use constructor::ConstructMode;
pub use error::{Error, ErrorKind, Result};
pub use limits::Limits;
pub use parser::{Event, ParseOptions};
pub use resolver::Schema;
pub use tag::{Tag, TagDirectives, TagHandle, TagKind};
pub use value::{CollectionStyle, Comments, Node, ScalarStyle, Value};
pub use writer::{to_string, write_document, WriteOptions};

use crate::core::Sink;

/// Configuration for a full parse→compose→construct pass.
#[derive(Debug, Clone, Copy)]
pub struct YamlConfig {
    /// Which implicit-typing schema governs untagged plain scalars.
    pub schema: Schema,
    /// Resource limits enforced while parsing and composing.
    pub limits: Limits,
    /// How duplicate mapping keys are handled.
    pub duplicate_key_mode: DuplicateKeyMode,
    /// Whether unrecognized explicit tags are rejected or passed through.
    pub construct_mode: ConstructMode,
    /// Capture `#` comments onto the nodes they sit next to instead of
    /// discarding them.
    pub preserve_comments: bool,
}

impl Default for YamlConfig {
    fn default() -> Self {
        Self {
            schema: Schema::Core,
            limits: Limits::default(),
            duplicate_key_mode: DuplicateKeyMode::default(),
            construct_mode: ConstructMode::default(),
            preserve_comments: false,
        }
    }
}

/// A document's own `%YAML 1.1` directive (if present) selects the
/// [`Schema::Yaml11`] implicit-typing rules regardless of `configured`; a
/// `%YAML 1.2`-or-absent directive leaves `configured` as chosen by the
/// caller.
fn document_schema(events: &[Event], configured: Schema) -> Schema {
    match events.first() {
        Some(Event::DocumentStart { yaml_version: Some((1, 1)), .. }) => Schema::Yaml11,
        _ => configured,
    }
}

/// Entry point for the full YAML pipeline: parse, compose, and construct.
pub struct Yaml;

impl Yaml {
    /// Parse every document in a (possibly multi-document) YAML stream,
    /// returning one fully typed [`Node`] per document.
    pub fn parse_all(input: &str, config: &YamlConfig) -> Result<Vec<Node>> {
        let parse_options = ParseOptions { max_depth: config.limits.max_depth, preserve_comments: config.preserve_comments };
        let docs = parser::parse_documents(input, parse_options)?;
        docs.iter()
            .enumerate()
            .map(|(i, events)| {
                let schema = document_schema(events, config.schema);
                let resolver = resolver::Resolver::new(schema);
                let composed = composer::compose(events, &config.limits, config.duplicate_key_mode).map_err(|e| e.in_document(i))?;
                constructor::construct(&composed, &resolver, config.construct_mode).map_err(|e| e.in_document(i))
            })
            .collect()
    }

    /// Parse a stream expected to hold exactly one document.
    pub fn parse(input: &str, config: &YamlConfig) -> Result<Node> {
        let mut docs = Self::parse_all(input, config)?;
        match docs.len() {
            1 => Ok(docs.remove(0)),
            0 => Err(Error::new(ErrorKind::Invalid, "expected one YAML document, found none")),
            n => Err(Error::new(ErrorKind::Invalid, format!("expected one YAML document, found {n}"))),
        }
    }

    /// Serialize a single document to `sink`.
    pub fn write(node: &Node, options: &WriteOptions, sink: &mut dyn Sink) -> Result<()> {
        write_document(node, options, sink)
    }

    /// Serialize multiple documents as a single multi-document stream.
    pub fn write_all(nodes: &[Node], options: &WriteOptions, sink: &mut dyn Sink) -> Result<()> {
        let mut per_doc = options.clone();
        per_doc.explicit_start = true;
        for node in nodes {
            write_document(node, &per_doc, sink)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_then_write_is_stable_for_a_flat_mapping() {
        let node = Yaml::parse("a: 1\nb: two\n", &YamlConfig::default()).unwrap();
        let out = to_string(&node, &WriteOptions::default()).unwrap();
        let reparsed = Yaml::parse(&out, &YamlConfig::default()).unwrap();
        assert_eq!(node.get("a").unwrap().value, reparsed.get("a").unwrap().value);
        assert_eq!(node.get("b").unwrap().value, reparsed.get("b").unwrap().value);
    }

    #[test]
    fn multi_document_stream_parses_to_two_nodes() {
        let docs = Yaml::parse_all("a: 1\n---\nb: 2\n", &YamlConfig::default()).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn yaml11_schema_types_on_off_as_booleans() {
        let config = YamlConfig { schema: Schema::Yaml11, ..YamlConfig::default() };
        let node = Yaml::parse("a: on\nb: off\n", &config).unwrap();
        assert_eq!(node.get("a").unwrap().value, Value::Bool(true));
        assert_eq!(node.get("b").unwrap().value, Value::Bool(false));
    }

    #[test]
    fn yaml_1_1_directive_enables_yaml11_booleans_without_config_change() {
        let node = Yaml::parse("%YAML 1.1\n---\nyes\n", &YamlConfig::default()).unwrap();
        assert_eq!(node.value, Value::Bool(true));

        let node = Yaml::parse("yes\n", &YamlConfig::default()).unwrap();
        assert_eq!(node.value, Value::String("yes".to_string()));
    }

    #[test]
    fn parse_single_rejects_multi_document_stream() {
        let err = Yaml::parse("a: 1\n---\nb: 2\n", &YamlConfig::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Invalid);
    }

    #[test]
    fn preserve_comments_survives_the_full_parse_compose_construct_pass() {
        let config = YamlConfig { preserve_comments: true, ..YamlConfig::default() };
        let node = Yaml::parse("# about a\na: 1 # one\nb: 2\n", &config).unwrap();
        let a_key = node.as_mapping().unwrap().keys().find(|k| k.as_str() == Some("a")).unwrap();
        assert_eq!(a_key.comments.leading, vec!["about a".to_string()]);
        assert_eq!(node.get("a").unwrap().comments.trailing, Some("one".to_string()));
    }

    #[test]
    fn comments_are_dropped_without_preserve_comments() {
        let node = Yaml::parse("# about a\na: 1 # one\nb: 2\n", &YamlConfig::default()).unwrap();
        let a_key = node.as_mapping().unwrap().keys().find(|k| k.as_str() == Some("a")).unwrap();
        assert!(a_key.comments.is_empty());
    }
}

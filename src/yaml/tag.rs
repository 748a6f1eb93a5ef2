//! YAML tag handles and the tag-directive table that expands them to URIs.

use super::error::{Error, ErrorKind, Result};
use std::collections::HashMap;
use std::fmt;

/// The three forms a tag shorthand can take, per YAML 1.2 §6.8.2.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagHandle {
    /// `!suffix`
    Primary,
    /// `!!suffix`
    Secondary,
    /// `!name!suffix`
    Named(String),
}

impl fmt::Display for TagHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "!"),
            Self::Secondary => write!(f, "!!"),
            Self::Named(name) => write!(f, "!{name}!"),
        }
    }
}

/// A quick classification of a resolved tag URI, for dispatch without
/// repeated string comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// `tag:yaml.org,2002:null`
    Null,
    /// `tag:yaml.org,2002:bool`
    Bool,
    /// `tag:yaml.org,2002:int`
    Int,
    /// `tag:yaml.org,2002:float`
    Float,
    /// `tag:yaml.org,2002:str`
    Str,
    /// `tag:yaml.org,2002:seq`
    Seq,
    /// `tag:yaml.org,2002:map`
    Map,
    /// `tag:yaml.org,2002:binary`
    Binary,
    /// `tag:yaml.org,2002:timestamp`
    Timestamp,
    /// `tag:yaml.org,2002:set`
    Set,
    /// `tag:yaml.org,2002:omap`
    Omap,
    /// `tag:yaml.org,2002:pairs`
    Pairs,
    /// Any other URI, application-defined.
    Custom(String),
}

impl TagKind {
    pub(crate) fn from_uri(uri: &str) -> Self {
        match uri {
            "tag:yaml.org,2002:null" => Self::Null,
            "tag:yaml.org,2002:bool" => Self::Bool,
            "tag:yaml.org,2002:int" => Self::Int,
            "tag:yaml.org,2002:float" => Self::Float,
            "tag:yaml.org,2002:str" => Self::Str,
            "tag:yaml.org,2002:seq" => Self::Seq,
            "tag:yaml.org,2002:map" => Self::Map,
            "tag:yaml.org,2002:binary" => Self::Binary,
            "tag:yaml.org,2002:timestamp" => Self::Timestamp,
            "tag:yaml.org,2002:set" => Self::Set,
            "tag:yaml.org,2002:omap" => Self::Omap,
            "tag:yaml.org,2002:pairs" => Self::Pairs,
            other => Self::Custom(other.to_string()),
        }
    }
}

/// A resolved tag: the full URI plus enough of the source form to round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    /// The fully expanded tag URI.
    pub uri: String,
    /// The shorthand as written in the source (e.g. `!!int`, `!local`).
    pub original: String,
    /// Quick classification of `uri`.
    pub kind: TagKind,
}

impl Tag {
    /// The non-specific tag for a plain/quoted scalar with no explicit tag
    /// (resolved later by the implicit-typing rules of the active schema).
    pub fn non_specific_scalar() -> Self {
        Self {
            uri: "?".to_string(),
            original: String::new(),
            kind: TagKind::Str,
        }
    }
}

/// Expands tag handles (`!`, `!!`, `!name!`) to full URIs according to the
/// `%TAG` directives in scope and the default secondary-handle prefix.
#[derive(Debug, Clone)]
pub struct TagDirectives {
    handles: HashMap<String, String>,
}

impl Default for TagDirectives {
    fn default() -> Self {
        let mut handles = HashMap::new();
        handles.insert("!".to_string(), "!".to_string());
        handles.insert("!!".to_string(), "tag:yaml.org,2002:".to_string());
        Self { handles }
    }
}

impl TagDirectives {
    /// A fresh table holding only the two built-in handles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a `%TAG handle prefix` directive, overriding any built-in
    /// or previously declared mapping for `handle`.
    pub fn add(&mut self, handle: impl Into<String>, prefix: impl Into<String>) {
        self.handles.insert(handle.into(), prefix.into());
    }

    /// Expand a tag shorthand (e.g. `!!str`, `!local`, `!e!widget`) or a
    /// verbatim tag (`!<tag:example.com,2024:type>`) to a [`Tag`].
    pub fn resolve(&self, shorthand: &str) -> Result<Tag> {
        if let Some(inner) = shorthand.strip_prefix("!<").and_then(|s| s.strip_suffix('>')) {
            return Ok(Tag {
                uri: inner.to_string(),
                original: shorthand.to_string(),
                kind: TagKind::from_uri(inner),
            });
        }
        if shorthand.starts_with("tag:") {
            return Ok(Tag {
                uri: shorthand.to_string(),
                original: shorthand.to_string(),
                kind: TagKind::from_uri(shorthand),
            });
        }
        if let Some(suffix) = shorthand.strip_prefix("!!") {
            let prefix = self.handles.get("!!").cloned().unwrap_or_else(|| "tag:yaml.org,2002:".to_string());
            let uri = format!("{prefix}{suffix}");
            return Ok(Tag {
                uri: uri.clone(),
                original: shorthand.to_string(),
                kind: TagKind::from_uri(&uri),
            });
        }
        if let Some(rest) = shorthand.strip_prefix('!') {
            if let Some(end) = rest.find('!') {
                let handle = format!("!{}!", &rest[..end]);
                let suffix = &rest[end + 1..];
                if let Some(prefix) = self.handles.get(&handle) {
                    let uri = format!("{prefix}{suffix}");
                    return Ok(Tag {
                        uri: uri.clone(),
                        original: shorthand.to_string(),
                        kind: TagKind::from_uri(&uri),
                    });
                }
                return Err(Error::new(
                    ErrorKind::UnresolvedTag,
                    format!("undeclared tag handle '{handle}'"),
                ));
            }
            let prefix = self.handles.get("!").cloned().unwrap_or_else(|| "!".to_string());
            let uri = format!("{prefix}{rest}");
            return Ok(Tag {
                uri: uri.clone(),
                original: shorthand.to_string(),
                kind: TagKind::from_uri(&uri),
            });
        }
        Err(Error::new(ErrorKind::UnresolvedTag, format!("not a tag shorthand: '{shorthand}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secondary_handle_expands_to_core_namespace() {
        let dirs = TagDirectives::new();
        let tag = dirs.resolve("!!int").unwrap();
        assert_eq!(tag.uri, "tag:yaml.org,2002:int");
        assert_eq!(tag.kind, TagKind::Int);
    }

    #[test]
    fn verbatim_tag_is_used_as_is() {
        let dirs = TagDirectives::new();
        let tag = dirs.resolve("!<tag:example.com,2024:widget>").unwrap();
        assert_eq!(tag.uri, "tag:example.com,2024:widget");
    }

    #[test]
    fn named_handle_requires_a_directive() {
        let dirs = TagDirectives::new();
        assert!(dirs.resolve("!e!widget").is_err());

        let mut dirs = TagDirectives::new();
        dirs.add("!e!", "tag:example.com,2024:");
        let tag = dirs.resolve("!e!widget").unwrap();
        assert_eq!(tag.uri, "tag:example.com,2024:widget");
    }

    #[test]
    fn primary_handle_defaults_to_local_tag() {
        let dirs = TagDirectives::new();
        let tag = dirs.resolve("!local").unwrap();
        assert_eq!(tag.uri, "!local");
    }
}

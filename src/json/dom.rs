//! JSON DOM: an order-preserving tree of [`Value`]s.

use super::error::{Error, ErrorKind, Result};
use super::number::Number;
use super::scanner::{Event, ScanOptions, Scanner};
use crate::core::{utf8, ErrorContext, Position};
use indexmap::IndexMap;

/// How to resolve a duplicate key within a single object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKeyMode {
    /// Fail the parse (default).
    Error,
    /// Keep the first value seen for the key.
    FirstWins,
    /// Keep the last value seen for the key (RFC 8259's "most implementations" behavior).
    LastWins,
    /// Collect every value seen for the key into an array under it.
    Collect,
}

/// A parsed JSON value. Objects preserve member insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// A number, preserving its source lexeme.
    Number(Number),
    /// A UTF-8 string.
    String(String),
    /// An ordered sequence of values.
    Array(Vec<Value>),
    /// An order-preserving map of string keys to values.
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Borrow as an array, if this is one.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Borrow as an object, if this is one.
    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Mutably borrow as an object, if this is one.
    pub fn as_object_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Mutably borrow as an array, if this is one.
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Borrow as a string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as a number, if this is one.
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Borrow as a bool, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this value is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(Number::from_i64(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Options controlling a JSON parse.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Scanner-level extensions.
    pub scan: ScanOptions,
    /// How duplicate object keys are resolved.
    pub duplicate_key_mode: DuplicateKeyMode,
    /// Generate a context snippet on error.
    pub enable_context_snippet: bool,
    /// Bytes of context before/after the error offset in the snippet.
    pub context_radius_bytes: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            scan: ScanOptions::default(),
            duplicate_key_mode: DuplicateKeyMode::Error,
            enable_context_snippet: true,
            context_radius_bytes: 40,
        }
    }
}

/// Parse a complete JSON document from `input`.
pub fn parse(input: &[u8], options: &ParseOptions) -> Result<Value> {
    let (_, bom_len) = utf8::detect_bom(input);
    let body = &input[bom_len..];

    let mut scanner = Scanner::new(options.scan);
    let mut events = scanner.feed(body).map_err(|e| attach_context(e, body, options))?;
    events.extend(scanner.finish().map_err(|e| attach_context(e, body, options))?);

    let mut builder = Builder::new(options.duplicate_key_mode);
    for event in events {
        if matches!(event, Event::End) {
            continue;
        }
        builder.push(event).map_err(|e| attach_context(e, body, options))?;
    }
    builder.finish().map_err(|e| attach_context(e, body, options))
}

fn attach_context(mut err: Error, body: &[u8], options: &ParseOptions) -> Error {
    if options.enable_context_snippet && err.context.is_none() {
        let pos = if err.position == Position::start() && err.byte_offset > 0 {
            Position::at(1, err.byte_offset + 1, err.byte_offset)
        } else {
            err.position
        };
        err.context = Some(ErrorContext::from_input(body, pos, options.context_radius_bytes));
    }
    err
}

enum Container {
    Array(Vec<Value>),
    Object(IndexMap<String, Value>, Option<String>),
}

struct Builder {
    dup_mode: DuplicateKeyMode,
    stack: Vec<Container>,
    pending_key: Option<String>,
    root: Option<Value>,
}

impl Builder {
    fn new(dup_mode: DuplicateKeyMode) -> Self {
        Self {
            dup_mode,
            stack: Vec::new(),
            pending_key: None,
            root: None,
        }
    }

    fn push(&mut self, event: Event) -> Result<()> {
        match event {
            Event::ArrayBegin => self.stack.push(Container::Array(Vec::new())),
            Event::ObjectBegin => self.stack.push(Container::Object(IndexMap::new(), None)),
            Event::ArrayEnd => {
                let Some(Container::Array(items)) = self.stack.pop() else {
                    return Err(Error::new(ErrorKind::State, "unbalanced array end"));
                };
                self.emit(Value::Array(items))?;
            }
            Event::ObjectEnd => {
                let Some(Container::Object(map, _)) = self.stack.pop() else {
                    return Err(Error::new(ErrorKind::State, "unbalanced object end"));
                };
                self.emit(Value::Object(map))?;
            }
            Event::Key(k) => self.pending_key = Some(k),
            Event::Null => self.emit(Value::Null)?,
            Event::Bool(b) => self.emit(Value::Bool(b))?,
            Event::Number(n) => self.emit(Value::Number(n))?,
            Event::Str(s) => self.emit(Value::String(s))?,
            Event::End => {}
        }
        Ok(())
    }

    fn emit(&mut self, value: Value) -> Result<()> {
        match self.stack.last_mut() {
            None => self.root = Some(value),
            Some(Container::Array(items)) => items.push(value),
            Some(Container::Object(map, _)) => {
                let key = self
                    .pending_key
                    .take()
                    .ok_or_else(|| Error::new(ErrorKind::State, "object value without a key"))?;
                self.insert(map, key, value)?;
            }
        }
        Ok(())
    }

    fn insert(&self, map: &mut IndexMap<String, Value>, key: String, value: Value) -> Result<()> {
        match self.dup_mode {
            DuplicateKeyMode::Error => {
                if map.contains_key(&key) {
                    return Err(Error::new(ErrorKind::DuplicateKey, format!("duplicate key '{key}'")));
                }
                map.insert(key, value);
            }
            DuplicateKeyMode::FirstWins => {
                map.entry(key).or_insert(value);
            }
            DuplicateKeyMode::LastWins => {
                map.insert(key, value);
            }
            DuplicateKeyMode::Collect => match map.get_mut(&key) {
                Some(Value::Array(existing)) => existing.push(value),
                Some(existing) => {
                    let prior = existing.clone();
                    *existing = Value::Array(vec![prior, value]);
                }
                None => {
                    map.insert(key, value);
                }
            },
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Value> {
        self.root.take().ok_or_else(|| Error::new(ErrorKind::Invalid, "no value parsed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_structure() {
        let v = parse(br#"{"a": [1, 2, {"b": null}]}"#, &ParseOptions::default()).unwrap();
        let obj = v.as_object().unwrap();
        let arr = obj["a"].as_array().unwrap();
        assert_eq!(arr.len(), 3);
        assert!(arr[2].as_object().unwrap()["b"].is_null());
    }

    #[test]
    fn duplicate_key_error_mode_fails() {
        let err = parse(br#"{"a": 1, "a": 2}"#, &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateKey);
    }

    #[test]
    fn duplicate_key_last_wins() {
        let mut opts = ParseOptions::default();
        opts.duplicate_key_mode = DuplicateKeyMode::LastWins;
        let v = parse(br#"{"a": 1, "a": 2}"#, &opts).unwrap();
        assert_eq!(v.as_object().unwrap()["a"].as_number().unwrap().as_i64(), Some(2));
    }

    #[test]
    fn duplicate_key_collect_gathers_array() {
        let mut opts = ParseOptions::default();
        opts.duplicate_key_mode = DuplicateKeyMode::Collect;
        let v = parse(br#"{"a": 1, "a": 2, "a": 3}"#, &opts).unwrap();
        let collected = v.as_object().unwrap()["a"].as_array().unwrap();
        assert_eq!(collected.len(), 3);
    }

    #[test]
    fn object_preserves_insertion_order() {
        let v = parse(br#"{"z": 1, "a": 2}"#, &ParseOptions::default()).unwrap();
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}

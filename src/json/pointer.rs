//! RFC 6901 JSON Pointer.

use super::dom::Value;
use super::error::{Error, ErrorKind, Result};

/// A parsed JSON Pointer: an ordered list of reference tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointer {
    tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Key(String),
    /// The `-` token: one past the last element of an array (valid only
    /// as the final token of an `add` operation).
    End,
}

impl Pointer {
    /// The pointer referring to the document root (`""`).
    pub fn root() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Parse a pointer string such as `/a/b/0`.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        if !s.starts_with('/') {
            return Err(Error::new(ErrorKind::InvalidPointer, "pointer must start with '/' or be empty"));
        }
        let mut tokens = Vec::new();
        for raw in s[1..].split('/') {
            if raw == "-" {
                tokens.push(Token::End);
            } else {
                tokens.push(Token::Key(unescape(raw)));
            }
        }
        Ok(Self { tokens })
    }

    /// Render back to the canonical string form.
    pub fn to_string_form(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            out.push('/');
            match token {
                Token::Key(k) => out.push_str(&escape(k)),
                Token::End => out.push('-'),
            }
        }
        out
    }

    /// Whether this pointer refers to the document root.
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// All tokens but the last, as a pointer to the parent container.
    fn parent_tokens(&self) -> &[Token] {
        &self.tokens[..self.tokens.len().saturating_sub(1)]
    }

    fn last_token(&self) -> Option<&Token> {
        self.tokens.last()
    }
}

fn escape(raw: &str) -> String {
    raw.replace('~', "~0").replace('/', "~1")
}

fn unescape(raw: &str) -> String {
    // Order matters: ~1 before ~0 would double-unescape "~01" incorrectly
    // if done in the other order, so replace ~1 first is also wrong —
    // the correct RFC 6901 order is ~1 -> / then ~0 -> ~, applied left to right.
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.peek() {
                Some('0') => {
                    out.push('~');
                    chars.next();
                }
                Some('1') => {
                    out.push('/');
                    chars.next();
                }
                _ => out.push('~'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Resolve `pointer` against `root`, returning a shared reference.
pub fn get<'a>(root: &'a Value, pointer: &Pointer) -> Result<&'a Value> {
    let mut current = root;
    for token in &pointer.tokens {
        current = step(current, token)?;
    }
    Ok(current)
}

/// Resolve `pointer` against `root`, returning a mutable reference.
/// Supports in-place scalar mutation; structural replacement at the
/// pointer's own location is out of scope (use [`crate::json::patch`]).
pub fn get_mut<'a>(root: &'a mut Value, pointer: &Pointer) -> Result<&'a mut Value> {
    let mut current = root;
    for token in &pointer.tokens {
        current = step_mut(current, token)?;
    }
    Ok(current)
}

fn step<'a>(value: &'a Value, token: &Token) -> Result<&'a Value> {
    match (value, token) {
        (Value::Object(map), Token::Key(k)) => map
            .get(k)
            .ok_or_else(|| Error::new(ErrorKind::PointerNotFound, format!("no member '{k}'"))),
        (Value::Array(items), Token::Key(k)) => {
            let idx = parse_array_index(k)?;
            items
                .get(idx)
                .ok_or_else(|| Error::new(ErrorKind::PointerNotFound, format!("index {idx} out of bounds")))
        }
        (Value::Array(_), Token::End) => Err(Error::new(
            ErrorKind::PointerNotFound,
            "'-' does not refer to an existing element",
        )),
        _ => Err(Error::new(ErrorKind::PointerNotFound, "cannot index a scalar value")),
    }
}

fn step_mut<'a>(value: &'a mut Value, token: &Token) -> Result<&'a mut Value> {
    match (value, token) {
        (Value::Object(map), Token::Key(k)) => map
            .get_mut(k)
            .ok_or_else(|| Error::new(ErrorKind::PointerNotFound, format!("no member '{k}'"))),
        (Value::Array(items), Token::Key(k)) => {
            let idx = parse_array_index(k)?;
            let len = items.len();
            items
                .get_mut(idx)
                .ok_or_else(|| Error::new(ErrorKind::PointerNotFound, format!("index {idx} out of bounds (len {len})")))
        }
        (Value::Array(_), Token::End) => Err(Error::new(
            ErrorKind::PointerNotFound,
            "'-' does not refer to an existing element",
        )),
        _ => Err(Error::new(ErrorKind::PointerNotFound, "cannot index a scalar value")),
    }
}

pub(crate) fn parse_array_index(s: &str) -> Result<usize> {
    if s == "0" {
        return Ok(0);
    }
    if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::new(ErrorKind::InvalidPointer, format!("invalid array index '{s}'")));
    }
    s.parse().map_err(|_| Error::new(ErrorKind::InvalidPointer, format!("invalid array index '{s}'")))
}

pub(crate) enum ParentToken {
    Key(String),
    Append,
}

/// Resolve the parent container and final token of `pointer`, for callers
/// (e.g. [`crate::json::patch`]) that need to mutate the parent directly.
pub(crate) fn resolve_parent<'a>(root: &'a mut Value, pointer: &Pointer) -> Result<(&'a mut Value, ParentToken)> {
    if pointer.is_root() {
        return Err(Error::new(ErrorKind::InvalidPointer, "pointer has no parent"));
    }
    let mut current = root;
    for token in pointer.parent_tokens() {
        current = step_mut(current, token)?;
    }
    let last = match pointer.last_token().unwrap() {
        Token::Key(k) => ParentToken::Key(k.clone()),
        Token::End => ParentToken::Append,
    };
    Ok((current, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::dom::{parse as parse_json, ParseOptions};

    #[test]
    fn parses_and_resolves_nested_pointer() {
        let v = parse_json(br#"{"a":{"b":[1,2,3]}}"#, &ParseOptions::default()).unwrap();
        let p = Pointer::parse("/a/b/1").unwrap();
        assert_eq!(get(&v, &p).unwrap().as_number().unwrap().as_i64(), Some(2));
    }

    #[test]
    fn tilde_and_slash_escapes_round_trip() {
        let p = Pointer::parse("/a~1b/c~0d").unwrap();
        assert_eq!(p.to_string_form(), "/a~1b/c~0d");
    }

    #[test]
    fn empty_string_is_root_pointer() {
        let v = parse_json(b"42", &ParseOptions::default()).unwrap();
        let p = Pointer::parse("").unwrap();
        assert_eq!(get(&v, &p).unwrap(), &v);
    }

    #[test]
    fn missing_member_is_not_found() {
        let v = parse_json(br#"{"a":1}"#, &ParseOptions::default()).unwrap();
        let p = Pointer::parse("/b").unwrap();
        let err = get(&v, &p).unwrap_err();
        assert_eq!(err.kind, ErrorKind::PointerNotFound);
    }

    #[test]
    fn get_mut_allows_in_place_scalar_mutation() {
        let mut v = parse_json(br#"{"a":1}"#, &ParseOptions::default()).unwrap();
        let p = Pointer::parse("/a").unwrap();
        *get_mut(&mut v, &p).unwrap() = Value::Number(crate::json::number::Number::from_i64(2));
        assert_eq!(v.as_object().unwrap()["a"].as_number().unwrap().as_i64(), Some(2));
    }
}

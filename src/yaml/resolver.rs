//! Implicit typing: guessing a scalar's tag from its plain text, under one
//! of the four standard schemas.

use super::tag::TagKind;

/// Which family of implicit-typing rules governs untagged plain scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// No implicit typing at all; every scalar is a string.
    Failsafe,
    /// JSON-compatible: `true`/`false`/`null` and JSON number grammar only.
    Json,
    /// YAML 1.2 Core schema (the default): adds `~`, case-insensitive
    /// bool/null spellings, and `0x`/`0o` integers.
    Core,
    /// YAML 1.1-compatible: adds `yes`/`no`/`on`/`off` booleans, sexagesimal
    /// (base-60) integers/floats, and a looser octal form (`0777`).
    Yaml11,
}

/// Resolves the implicit tag of a plain scalar under a [`Schema`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    schema: Schema,
}

impl Resolver {
    /// Create a resolver for `schema`.
    pub const fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// The schema this resolver was built for.
    pub const fn schema(&self) -> Schema {
        self.schema
    }

    /// Classify `value` (the plain scalar's content) under the active
    /// schema's implicit-typing rules.
    pub fn resolve(&self, value: &str) -> TagKind {
        match self.schema {
            Schema::Failsafe => TagKind::Str,
            Schema::Json => self.resolve_json(value),
            Schema::Core => self.resolve_core(value),
            Schema::Yaml11 => self.resolve_yaml11(value),
        }
    }

    fn resolve_json(&self, value: &str) -> TagKind {
        match value {
            "true" | "false" => TagKind::Bool,
            "null" => TagKind::Null,
            _ if is_json_number(value) => TagKind::Float,
            _ => TagKind::Str,
        }
    }

    fn resolve_core(&self, value: &str) -> TagKind {
        match value {
            "~" | "null" | "Null" | "NULL" | "" => TagKind::Null,
            "true" | "True" | "TRUE" | "false" | "False" | "FALSE" => TagKind::Bool,
            ".nan" | ".NaN" | ".NAN" => TagKind::Float,
            ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" | "-.inf" | "-.Inf" | "-.INF" => TagKind::Float,
            _ if is_core_int(value) => TagKind::Int,
            _ if is_core_float(value) => TagKind::Float,
            _ => TagKind::Str,
        }
    }

    fn resolve_yaml11(&self, value: &str) -> TagKind {
        match value.to_ascii_lowercase().as_str() {
            "~" | "null" => TagKind::Null,
            "y" | "yes" | "n" | "no" | "true" | "false" | "on" | "off" => TagKind::Bool,
            _ => {
                if is_yaml11_int(value) {
                    TagKind::Int
                } else if is_yaml11_float(value) {
                    TagKind::Float
                } else if value.is_empty() {
                    TagKind::Null
                } else {
                    TagKind::Str
                }
            }
        }
    }
}

fn is_json_number(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || c == '+' || c == '-')
        && s.chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn is_core_int(s: &str) -> bool {
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    if let Some(hex) = s.strip_prefix("0x") {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some(oct) = s.strip_prefix("0o") {
        return !oct.is_empty() && oct.chars().all(|c| ('0'..='7').contains(&c));
    }
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn is_core_float(s: &str) -> bool {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    if body.is_empty() || !body.contains(['.', 'e', 'E']) {
        return false;
    }
    body.parse::<f64>().is_ok()
}

/// Sexagesimal (colon-separated base-60) integers, a YAML 1.1 extension
/// (e.g. `190:20:30` = 190*3600 + 20*60 + 30).
fn is_yaml11_int(s: &str) -> bool {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    if body.contains(':') {
        return body.split(':').all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
    }
    if let Some(oct) = body.strip_prefix('0') {
        if !oct.is_empty() && oct.chars().all(|c| ('0'..='7').contains(&c)) {
            return true;
        }
    }
    is_core_int(s)
}

fn is_yaml11_float(s: &str) -> bool {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    if body.contains(':') {
        let parts: Vec<&str> = body.split(':').collect();
        return parts.len() > 1
            && parts[..parts.len() - 1].iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
            && parts.last().is_some_and(|p| !p.is_empty() && p.replace('.', "").chars().all(|c| c.is_ascii_digit()));
    }
    is_core_float(s)
}

/// Parse a sexagesimal integer lexeme (as recognized by [`is_yaml11_int`])
/// into its base-10 value.
pub fn parse_sexagesimal_int(s: &str) -> Option<i64> {
    let (neg, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let mut value: i64 = 0;
    for part in body.split(':') {
        value = value.checked_mul(60)?.checked_add(part.parse::<i64>().ok()?)?;
    }
    Some(if neg { -value } else { value })
}

/// Parse a sexagesimal float lexeme into its base-10 value.
pub fn parse_sexagesimal_float(s: &str) -> Option<f64> {
    let (neg, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let mut value: f64 = 0.0;
    for part in body.split(':') {
        value = value * 60.0 + part.parse::<f64>().ok()?;
    }
    Some(if neg { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failsafe_never_types_beyond_string() {
        let r = Resolver::new(Schema::Failsafe);
        assert_eq!(r.resolve("true"), TagKind::Str);
        assert_eq!(r.resolve("42"), TagKind::Str);
    }

    #[test]
    fn json_schema_is_case_sensitive() {
        let r = Resolver::new(Schema::Json);
        assert_eq!(r.resolve("true"), TagKind::Bool);
        assert_eq!(r.resolve("True"), TagKind::Str);
    }

    #[test]
    fn core_schema_accepts_tilde_and_hex() {
        let r = Resolver::new(Schema::Core);
        assert_eq!(r.resolve("~"), TagKind::Null);
        assert_eq!(r.resolve("0xFF"), TagKind::Int);
        assert_eq!(r.resolve("3.14"), TagKind::Float);
    }

    #[test]
    fn yaml11_schema_accepts_sexagesimal_and_on_off() {
        let r = Resolver::new(Schema::Yaml11);
        assert_eq!(r.resolve("on"), TagKind::Bool);
        assert_eq!(r.resolve("190:20:30"), TagKind::Int);
        assert_eq!(parse_sexagesimal_int("190:20:30"), Some(685230));
    }
}

//! A JSON number that preserves its original lexeme.

use std::fmt;

/// A JSON number. Always carries the source lexeme so round-tripping
/// preserves formatting (`1.0` stays `1.0`, not `1`); integer and float
/// views are derived lazily on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    lexeme: String,
}

impl Number {
    /// Wrap an already-validated number lexeme (ASCII JSON number grammar).
    pub(crate) fn from_lexeme(lexeme: String) -> Self {
        Self { lexeme }
    }

    /// Construct from an `i64`.
    pub fn from_i64(value: i64) -> Self {
        Self {
            lexeme: value.to_string(),
        }
    }

    /// Construct from a `u64`.
    pub fn from_u64(value: u64) -> Self {
        Self {
            lexeme: value.to_string(),
        }
    }

    /// Construct from an `f64`, returning `None` for NaN/infinite values
    /// which the JSON grammar cannot represent.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Some(Self {
            lexeme: format_finite_f64(value),
        })
    }

    /// The original source text of this number.
    pub fn as_str(&self) -> &str {
        &self.lexeme
    }

    /// Whether the lexeme has no `.` or exponent, i.e. is an integer in
    /// JSON's grammar.
    pub fn is_integer(&self) -> bool {
        !self.lexeme.contains(['.', 'e', 'E'])
    }

    /// Parse as `i64`, if the lexeme is an integer and fits.
    pub fn as_i64(&self) -> Option<i64> {
        if self.is_integer() {
            self.lexeme.parse().ok()
        } else {
            None
        }
    }

    /// Parse as `u64`, if the lexeme is a non-negative integer and fits.
    pub fn as_u64(&self) -> Option<u64> {
        if self.is_integer() {
            self.lexeme.parse().ok()
        } else {
            None
        }
    }

    /// Parse as `f64`. Always succeeds for a well-formed lexeme.
    pub fn as_f64(&self) -> Option<f64> {
        self.lexeme.parse().ok()
    }

    /// Whether this number is finite, i.e. not a `NaN`/`Infinity`/`-Infinity`
    /// lexeme admitted by the `allow_nonfinite_numbers` scan extension.
    pub fn is_finite(&self) -> bool {
        self.as_f64().map(|f| f.is_finite()).unwrap_or(true)
    }

    /// Re-render in minimal canonical form: bare digits for integers, the
    /// shortest round-tripping form for floats. `None` for a non-finite
    /// lexeme, which canonical form cannot represent.
    pub fn to_canonical_lexeme(&self) -> Option<String> {
        if let Some(i) = self.as_i64() {
            return Some(i.to_string());
        }
        if let Some(u) = self.as_u64() {
            return Some(u.to_string());
        }
        let f = self.as_f64()?;
        if !f.is_finite() {
            return None;
        }
        Some(format_finite_f64(f))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lexeme)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

fn format_finite_f64(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e17 {
        format!("{value:.1}")
    } else {
        let mut s = format!("{value}");
        if !s.contains(['.', 'e', 'E']) {
            s.push_str(".0");
        }
        s
    }
}

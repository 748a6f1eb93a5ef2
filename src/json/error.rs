//! Error types for JSON processing.

use crate::core::{ErrorContext, Position};
use std::fmt;

/// Result type alias for JSON operations.
pub type Result<T> = std::result::Result<T, Error>;

/// JSON-namespaced status kinds, parallel to [`crate::csv::ErrorKind`] and
/// [`crate::yaml::ErrorKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input not otherwise classified.
    Invalid,
    /// Size / depth budget exceeded.
    Limit,
    /// Unexpected end of input.
    UnexpectedEof,
    /// A token was not one of the expected kinds.
    UnexpectedToken,
    /// Invalid UTF-8 byte sequence.
    InvalidUtf8,
    /// A `\uXXXX` escape or surrogate pair was malformed.
    InvalidEscape,
    /// A number literal could not be parsed.
    InvalidNumber,
    /// A duplicate object key under [`crate::json::DuplicateKeyMode::Error`].
    DuplicateKey,
    /// A JSON Pointer referenced a path that does not exist.
    PointerNotFound,
    /// A JSON Pointer token was malformed (bad `~` escape, bad array index).
    InvalidPointer,
    /// A JSON Patch operation's preconditions were not met (e.g. `test` failed).
    PatchFailed,
    /// A value did not satisfy a schema keyword.
    SchemaViolation,
    /// NaN/Infinity encountered with the non-finite extension disabled.
    NonFinite,
    /// A sink write returned a non-OK status.
    Write,
    /// API misuse.
    State,
}

/// A JSON processing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// The kind of failure.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Byte offset from the start of input.
    pub byte_offset: usize,
    /// Position (line/column) of the error.
    pub position: Position,
    /// JSON Pointer path, when the error concerns a specific location.
    pub pointer: Option<String>,
    /// Optional surrounding-context snippet.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Construct an error with no positional context.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            byte_offset: 0,
            position: Position::start(),
            pointer: None,
            context: None,
        }
    }

    /// Construct an error at a specific position.
    pub fn at(kind: ErrorKind, message: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            message: message.into(),
            byte_offset: position.offset,
            position,
            pointer: None,
            context: None,
        }
    }

    /// Attach a JSON Pointer describing the location of the failure.
    pub fn with_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.pointer = Some(pointer.into());
        self
    }

    /// Attach a context snippet.
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON error at {}: {}", self.position, self.message)?;
        if let Some(pointer) = &self.pointer {
            write!(f, " (at {pointer})")?;
        }
        if let Some(ctx) = &self.context {
            write!(f, "\n  | {}", ctx.line_content)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_pointer_when_present() {
        let err = Error::new(ErrorKind::PatchFailed, "test failed").with_pointer("/a/0");
        assert!(err.to_string().contains("/a/0"));
    }
}

//! Error types for CSV processing.

use crate::core::{ErrorContext, Position};
use std::fmt;

/// Result type alias for CSV operations.
pub type Result<T> = std::result::Result<T, Error>;

/// CSV-namespaced status kinds, parallel to [`crate::json::ErrorKind`] and
/// [`crate::yaml::ErrorKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input not otherwise classified.
    Invalid,
    /// Size / count budget exceeded.
    Limit,
    /// EOF encountered inside a quoted field.
    UnterminatedQuote,
    /// A quote appeared in an unquoted field when disallowed.
    UnexpectedQuote,
    /// A lone CR or LF under a strict-CRLF-only dialect.
    IncompleteCrlf,
    /// Invalid UTF-8 byte sequence in a field (when validation is enabled).
    InvalidUtf8,
    /// A duplicate header name under [`crate::csv::HeaderDupMode::Error`].
    DuplicateHeader,
    /// A row's length disagreed with the table's column count.
    IrregularRow,
    /// A sink write returned a non-OK status.
    Write,
    /// API misuse (e.g., asking for a header before any row was parsed).
    State,
}

/// A CSV processing error.
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
    /// 0-based row index, when applicable.
    pub row_index: Option<usize>,
    /// 0-based column index, when applicable.
    pub col_index: Option<usize>,
    /// Optional surrounding-context snippet.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Construct an error with no positional context (e.g., write errors).
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            byte_offset: 0,
            position: Position::start(),
            row_index: None,
            col_index: None,
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
            row_index: None,
            col_index: None,
            context: None,
        }
    }

    /// Attach row/column indices.
    pub const fn with_indices(mut self, row_index: usize, col_index: usize) -> Self {
        self.row_index = Some(row_index);
        self.col_index = Some(col_index);
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
        write!(
            f,
            "CSV error at {}: {}",
            self.position, self.message
        )?;
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
    fn display_includes_position_and_message() {
        let err = Error::at(ErrorKind::UnterminatedQuote, "eof in quote", Position::at(3, 5, 10));
        let s = err.to_string();
        assert!(s.contains("line 3"));
        assert!(s.contains("eof in quote"));
    }
}

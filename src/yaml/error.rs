//! Error types for YAML processing.

use crate::core::{ErrorContext, Position};
use std::fmt;

/// Result type alias for YAML operations.
pub type Result<T> = std::result::Result<T, Error>;

/// YAML-namespaced status kinds, parallel to [`crate::csv::ErrorKind`] and
/// [`crate::json::ErrorKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input not otherwise classified.
    Invalid,
    /// Size / depth budget exceeded.
    Limit,
    /// Bad indentation (dedent below an enclosing block, tab in indentation).
    Indentation,
    /// An unterminated flow collection, block scalar, or quoted scalar.
    Unterminated,
    /// An alias referenced an anchor that was never defined.
    UndefinedAnchor,
    /// An anchor/alias expansion formed a cycle.
    AliasCycle,
    /// A `!!` tag could not be resolved under the active schema.
    UnresolvedTag,
    /// A scalar's content did not validate against its (possibly implicit) tag.
    TagMismatch,
    /// A duplicate mapping key under [`crate::yaml::DuplicateKeyMode::Error`].
    DuplicateKey,
    /// A `<<` merge key's value was not a mapping or sequence of mappings.
    InvalidMerge,
    /// A sink write returned a non-OK status.
    Write,
    /// API misuse.
    State,
}

/// A YAML processing error.
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
    /// 0-based document index, for multi-document streams.
    pub document_index: Option<usize>,
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
            document_index: None,
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
            document_index: None,
            context: None,
        }
    }

    /// Attach the index of the document this error occurred in.
    pub const fn in_document(mut self, index: usize) -> Self {
        self.document_index = Some(index);
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
        write!(f, "YAML error at {}: {}", self.position, self.message)?;
        if let Some(doc) = self.document_index {
            write!(f, " (document {doc})")?;
        }
        if let Some(ctx) = &self.context {
            write!(f, "\n  | {}", ctx.line_content)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

//! Persistence error types.

use crate::core::TreeError;
use crate::validation::Violation;
use thiserror::Error;

/// Errors that can occur while saving or loading the text format.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Reading or writing the underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input ended inside an unfinished construct
    #[error("Unexpected end of input in {context}")]
    UnexpectedEof { context: &'static str },

    /// A known marker appeared where a different one was required
    #[error("Expected {expected} but found '{found}'")]
    UnexpectedMarker {
        expected: &'static str,
        found: String,
    },

    /// A `:token:` that is not part of the format
    #[error("Unknown marker '{0}'")]
    UnknownMarker(String),

    /// A marker appeared where a name was required
    #[error("Missing name in {context}")]
    MissingName { context: &'static str },

    /// Tokens left over after the root state was closed
    #[error("Unexpected input after the root state: '{0}'")]
    TrailingInput(String),

    /// Loaded data violates the tree's structural rules
    #[error("Invalid structure: {0}")]
    Tree(#[from] TreeError),

    /// The tree holds names or triggers the format cannot represent
    #[error("Tree cannot be saved: {} violation(s), first: {}", .0.len(), .0.first().map(ToString::to_string).unwrap_or_default())]
    Unpersistable(Vec<Violation>),

    /// The configured indent would be read back as part of a name
    #[error("Indent {0:?} must consist of whitespace only")]
    InvalidIndent(String),
}

//! Violations that keep a tree from surviving a text save/load round trip.

use thiserror::Error;

/// A name or trigger the text format cannot reproduce.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Violation {
    #[error("{subject} is empty")]
    EmptyLabel { subject: String },

    #[error("{subject} '{label}' has leading, trailing, repeated or non-space whitespace")]
    IrregularWhitespace { subject: String, label: String },

    #[error("{subject} '{label}' contains the marker-like token '{token}'")]
    MarkerToken {
        subject: String,
        label: String,
        token: String,
    },

    /// Only children's transitions are written, so the saved state's own are lost
    #[error("{subject} declares trigger '{trigger}', which the text format cannot hold")]
    TopLevelTransition { subject: String, trigger: String },
}

//! Build errors for the machine builder.

use crate::core::TreeError;
use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("No states declared. Call .state(name) before .build()")]
    NoStates,

    #[error("Invalid machine structure: {0}")]
    Tree(#[from] TreeError),

    #[error("Initial state '{0}' was never declared")]
    UnknownInitial(String),
}

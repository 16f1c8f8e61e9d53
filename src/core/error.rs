//! Errors raised by structural tree operations.

use super::state::StateId;
use thiserror::Error;

/// Structural conflicts and missing references reported by [`StateTree`](super::StateTree).
///
/// A failing operation leaves the tree exactly as it was.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("State {0} does not exist in this tree")]
    UnknownState(StateId),

    #[error("State '{parent}' already has a child named '{name}'")]
    DuplicateChild { parent: String, name: String },

    #[error("Trigger names must not be empty")]
    EmptyTrigger,

    #[error("State '{state}' already declares trigger '{trigger}'")]
    DuplicateTrigger { state: String, trigger: String },

    #[error("Transition target '{target}' is not a sibling of '{from}'")]
    NotSibling { from: String, target: String },

    #[error("State '{child}' is not a child of '{parent}'")]
    NotAChild { parent: String, child: String },

    #[error("State '{state}' has no parent")]
    NoParent { state: String },

    #[error("State '{state}' has no sibling named '{name}'")]
    UnknownSibling { state: String, name: String },

    #[error("State '{parent}' has no child named '{name}'")]
    UnknownChild { parent: String, name: String },
}

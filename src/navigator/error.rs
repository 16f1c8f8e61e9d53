//! Navigator error types.

use thiserror::Error;

/// Errors reported by [`Navigator`](super::Navigator) operations.
///
/// None of these change the navigator's position.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    /// The navigator has no current state
    #[error("Navigator has not been started")]
    NotStarted,

    /// The current state was deleted from the tree
    #[error("Current state no longer exists in the tree")]
    StaleState,

    /// Neither the current state nor any ancestor declares the trigger
    #[error("No transition for trigger '{trigger}' from state '{from}'")]
    NoTransition { from: String, trigger: String },

    /// A trigger sequence stopped partway; earlier triggers stay applied
    #[error("Trigger sequence stopped at '{trigger}' after {applied} applied trigger(s)")]
    SequenceInterrupted { applied: usize, trigger: String },

    /// Hierarchy index past the root
    #[error("Hierarchy index {index} out of range for depth {depth}")]
    HierarchyIndex { index: usize, depth: usize },
}

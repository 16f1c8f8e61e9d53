//! Core hierarchy types and logic.
//!
//! This module contains the state tree and everything that operates on it
//! without a cursor:
//! - State handles and node data
//! - Tree construction, lookup and deletion
//! - Triggered transitions and their ancestor-scoped resolution
//! - A timestamped history of applied triggers

mod error;
mod history;
mod state;
mod transition;
mod tree;

pub use error::TreeError;
pub use history::{TransitionHistory, TransitionRecord};
pub use state::{StateId, StateNode};
pub use tree::{Ancestors, StateTree};

//! Statetree: a hierarchical finite state machine library
//!
//! States form a tree. Each state may hold named children, one of which is
//! its entry child, and named triggers that lead to sibling states. A
//! [`Navigator`] tracks the active leaf: applying a trigger searches the
//! active state and then its ancestors for a matching transition, moves to
//! the target and descends through entry children to a leaf.
//!
//! # Core Concepts
//!
//! - **StateTree**: arena of states addressed by generational [`StateId`]s
//! - **Navigator**: the active state, its cached hierarchy and history
//! - **StateMachine**: a flat facade over one root and one navigator
//! - **Persistence**: a whitespace-delimited text format and serde checkpoints
//!
//! # Example
//!
//! ```rust
//! use statetree::{Navigator, StateTree};
//!
//! let mut tree = StateTree::new("door");
//! let root = tree.root();
//! let locked = tree.create_child(root, "locked").unwrap();
//! tree.create_child(locked, "closed").unwrap();
//! let unlocked = tree.create_loopback(locked, "unlocked", "unlock", "lock").unwrap();
//! let closed = tree.create_child(unlocked, "closed").unwrap();
//! tree.create_loopback(closed, "opened", "open", "close").unwrap();
//!
//! let mut navigator = Navigator::starting_at(&tree, root);
//! assert_eq!(navigator.hierarchy(&tree).unwrap(), ["closed", "locked", "door"]);
//!
//! assert!(navigator.apply_trigger(&tree, "open").is_err());
//! navigator.apply_sequence(&tree, ["unlock", "open"]).unwrap();
//! assert_eq!(navigator.hierarchy(&tree).unwrap(), ["opened", "unlocked", "door"]);
//!
//! // `lock` is declared on `unlocked`, an ancestor of the active leaf
//! navigator.apply_sequence(&tree, ["close", "lock"]).unwrap();
//! assert_eq!(navigator.current_name(&tree), Some("closed"));
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod machine;
pub mod navigator;
pub mod persist;
pub mod validation;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use crate::core::{StateId, StateTree, TransitionHistory, TransitionRecord, TreeError};
pub use machine::StateMachine;
pub use navigator::{NavigationError, Navigator};
pub use persist::{PersistError, TextFormat};

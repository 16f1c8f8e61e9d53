//! Flat state machine facade.
//!
//! [`StateMachine`] owns a tree rooted at a state named `"root"` and one
//! [`Navigator`] over it. The root's direct children are "the states"; the
//! facade forwards construction to the tree and execution to the navigator.

use crate::checkpoint::{Checkpoint, CheckpointError, StateSnapshot, CHECKPOINT_VERSION};
use crate::core::{StateId, StateTree, TreeError};
use crate::navigator::{NavigationError, Navigator};
use crate::persist::{self, PersistError, TextFormat};
use chrono::Utc;
use std::collections::BTreeSet;
use std::io::{Read, Write};
use tracing::{info, warn};

/// Name of the root state of every machine built with [`StateMachine::new`].
pub const ROOT_NAME: &str = "root";

/// A root state plus a navigator, driven by state names.
///
/// # Example
///
/// ```rust
/// use statetree::StateMachine;
///
/// let mut machine = StateMachine::new();
/// machine.add_state("idle").unwrap();
/// machine.add_state("running").unwrap();
/// machine.add_transition("idle", "running", "start").unwrap();
/// machine.add_transition("running", "idle", "stop").unwrap();
///
/// machine.set_state("idle").unwrap();
/// machine.transition("start").unwrap();
/// assert_eq!(machine.current_state(), Some("running"));
///
/// assert!(machine.transition("start").is_err());
/// assert_eq!(machine.current_state(), Some("running"));
/// ```
#[derive(Clone, Debug)]
pub struct StateMachine {
    tree: StateTree,
    navigator: Navigator,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a machine with an empty root named `"root"`.
    pub fn new() -> Self {
        Self::from_tree(StateTree::new(ROOT_NAME))
    }

    /// Wrap an existing tree; the navigator starts unset.
    pub fn from_tree(tree: StateTree) -> Self {
        Self {
            tree,
            navigator: Navigator::new(),
        }
    }

    pub fn tree(&self) -> &StateTree {
        &self.tree
    }

    /// Mutable access to the underlying tree.
    ///
    /// Deletions made here do not reset the navigator; a navigator left on a
    /// deleted state reports [`NavigationError::StaleState`].
    pub fn tree_mut(&mut self) -> &mut StateTree {
        &mut self.tree
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    pub fn into_parts(self) -> (StateTree, Navigator) {
        (self.tree, self.navigator)
    }

    pub fn add_state(&mut self, name: impl Into<String>) -> Result<StateId, TreeError> {
        let root = self.tree.root();
        self.tree.create_child(root, name)
    }

    /// Delete a state and its subtree.
    ///
    /// If the navigator is on the deleted state, or anywhere inside it, the
    /// navigator is reset.
    pub fn delete_state(&mut self, name: &str) -> Result<(), TreeError> {
        let root = self.tree.root();
        let state = self.tree.require_child(root, name)?;
        let current_inside = self
            .navigator
            .current()
            .is_some_and(|current| self.tree.is_ancestor_or_self(state, current));

        self.tree.delete_child(root, state)?;
        if current_inside {
            warn!(state = name, "deleted the active state; navigator reset");
            self.navigator.reset();
        }
        Ok(())
    }

    pub fn add_transition(&mut self, from: &str, to: &str, trigger: &str) -> Result<StateId, TreeError> {
        let root = self.tree.root();
        self.tree.link_children(root, from, to, trigger)
    }

    /// Remove `trigger` from state `from`; `false` if either is unknown.
    pub fn delete_transition(&mut self, from: &str, trigger: &str) -> bool {
        let root = self.tree.root();
        match self.tree.find_child(root, from) {
            Some(state) => self.tree.delete_transition(state, trigger),
            None => false,
        }
    }

    /// Make `name` active, cascading through its entry children.
    pub fn set_state(&mut self, name: &str) -> Result<StateId, TreeError> {
        let root = self.tree.root();
        let state = self.tree.require_child(root, name)?;
        self.navigator
            .begin_at(&self.tree, state)
            .ok_or(TreeError::UnknownState(state))
    }

    /// Enter the root, cascading to its entry leaf.
    pub fn begin(&mut self) -> Option<StateId> {
        let root = self.tree.root();
        self.navigator.begin_at(&self.tree, root)
    }

    pub fn transition(&mut self, trigger: &str) -> Result<StateId, NavigationError> {
        self.navigator.apply_trigger(&self.tree, trigger)
    }

    /// Apply triggers in order; see [`Navigator::apply_sequence`] for the
    /// partial-commit behavior on failure.
    pub fn transition_sequence<I, S>(&mut self, triggers: I) -> Result<usize, NavigationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.navigator.apply_sequence(&self.tree, triggers)
    }

    pub fn repeat_last_transition(&mut self) -> Result<StateId, NavigationError> {
        self.navigator.apply_last_trigger(&self.tree)
    }

    pub fn current_state(&self) -> Option<&str> {
        self.navigator.current_name(&self.tree)
    }

    pub fn hierarchy(&mut self) -> Result<&[String], NavigationError> {
        self.navigator.hierarchy(&self.tree)
    }

    pub fn available_triggers(&self) -> Result<BTreeSet<String>, NavigationError> {
        self.navigator.available_triggers(&self.tree)
    }

    /// Write the tree in the text format.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), PersistError> {
        persist::save(&self.tree, writer)
    }

    pub fn save_with<W: Write>(&self, writer: &mut W, format: &TextFormat) -> Result<(), PersistError> {
        persist::save_with(&self.tree, writer, format)
    }

    /// Read a machine from the text format; the navigator starts unset.
    pub fn load<R: Read>(reader: R) -> Result<Self, PersistError> {
        persist::load(reader).map(Self::from_tree)
    }

    /// Capture the tree, the navigator position and its history.
    pub fn checkpoint(&self) -> Checkpoint {
        let current = self
            .navigator
            .current()
            .filter(|id| self.tree.contains(*id))
            .map(|id| self.tree.ancestor_path(id));

        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            root: StateSnapshot::capture(&self.tree, self.tree.root()),
            current,
            last_trigger: self.navigator.last_trigger().to_string(),
            history: self.navigator.history().clone(),
        }
    }

    /// Rebuild a machine from a checkpoint.
    pub fn from_checkpoint(checkpoint: &Checkpoint) -> Result<Self, CheckpointError> {
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: checkpoint.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        let tree = checkpoint.root.restore()?;
        let current = match &checkpoint.current {
            None => None,
            Some(hierarchy) => {
                let mut path: Vec<&str> = hierarchy.iter().map(String::as_str).collect();
                path.reverse();
                let found = match path.split_first() {
                    Some((root, rest)) if *root == checkpoint.root.name => tree.find_by_path(rest),
                    _ => None,
                };
                let state = found.ok_or_else(|| {
                    CheckpointError::ValidationFailed(format!(
                        "current state {hierarchy:?} is not in the checkpointed tree"
                    ))
                })?;
                Some(state)
            }
        };

        let mut machine = Self::from_tree(tree);
        machine.navigator.restore(
            current,
            checkpoint.last_trigger.clone(),
            checkpoint.history.clone(),
        );
        info!(checkpoint = %checkpoint.id, "restored machine from checkpoint");
        Ok(machine)
    }
}

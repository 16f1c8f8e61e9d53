//! State handles and the per-state node data stored in a [`StateTree`].
//!
//! A state is identified by a [`StateId`], a generational index into the
//! tree's arena. Deleting a state bumps the generation of its slot, so a
//! handle kept after the state is gone never aliases a newer state.
//!
//! [`StateTree`]: super::StateTree

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Handle to a state inside one [`StateTree`](super::StateTree).
///
/// Handles are cheap to copy and never own the state they point to. A handle
/// is only meaningful for the tree that issued it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct StateId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl StateId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot index of this handle.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// A node in the state hierarchy.
///
/// Children are owned by the tree on behalf of this node; transitions and
/// the entry child are plain handles into the same tree.
///
/// # Invariants
///
/// - `entry_child`, when set, is one of `children`.
/// - every transition target shares this node's parent.
/// - `children` is non-empty iff `entry_child` is set.
#[derive(Clone, Debug)]
pub struct StateNode {
    pub(crate) name: String,
    pub(crate) parent: Option<StateId>,
    pub(crate) children: BTreeMap<String, StateId>,
    pub(crate) transitions: BTreeMap<String, StateId>,
    pub(crate) entry_child: Option<StateId>,
}

impl StateNode {
    pub(crate) fn new(name: String, parent: Option<StateId>) -> Self {
        Self {
            name,
            parent,
            children: BTreeMap::new(),
            transitions: BTreeMap::new(),
            entry_child: None,
        }
    }

    /// Name of the state, unique among its siblings.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Containing state, `None` for the root.
    pub fn parent(&self) -> Option<StateId> {
        self.parent
    }

    /// Child entered automatically when this state is entered.
    pub fn entry_child(&self) -> Option<StateId> {
        self.entry_child
    }

    /// Direct children ordered by name.
    pub fn children(&self) -> impl Iterator<Item = (&str, StateId)> + '_ {
        self.children.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Locally declared transitions as `(trigger, target)` ordered by trigger.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, StateId)> + '_ {
        self.transitions
            .iter()
            .map(|(trigger, id)| (trigger.as_str(), *id))
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// A leaf has no entry child, so entering it stops here.
    pub fn is_leaf(&self) -> bool {
        self.entry_child.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

//! Checkpoint and resume for state machines.
//!
//! A [`Checkpoint`] captures a machine's whole tree by name together with
//! the navigator's position, last trigger and transition history, so a
//! machine can be written out and rebuilt in another process. Ids are not
//! stored; restoring allocates fresh ones.

use crate::core::{StateId, StateTree, TransitionHistory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Name-based copy of one state and its subtree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub name: String,

    /// Name of the entry child; `None` for leaves
    pub entry_child: Option<String>,

    pub children: Vec<StateSnapshot>,

    /// Trigger to target name; targets are siblings or the state itself
    pub transitions: BTreeMap<String, String>,
}

impl StateSnapshot {
    /// Copy the subtree rooted at `state`.
    pub fn capture(tree: &StateTree, state: StateId) -> Self {
        let Some(node) = tree.get(state) else {
            return Self {
                name: String::new(),
                entry_child: None,
                children: Vec::new(),
                transitions: BTreeMap::new(),
            };
        };

        Self {
            name: node.name().to_string(),
            entry_child: node
                .entry_child()
                .and_then(|entry| tree.name(entry))
                .map(str::to_string),
            children: node
                .children()
                .map(|(_, child)| Self::capture(tree, child))
                .collect(),
            transitions: node
                .transitions()
                .filter_map(|(trigger, target)| {
                    tree.name(target)
                        .map(|target| (trigger.to_string(), target.to_string()))
                })
                .collect(),
        }
    }

    /// Rebuild a tree rooted at this snapshot.
    pub fn restore(&self) -> Result<StateTree, CheckpointError> {
        if self.name.is_empty() {
            return Err(CheckpointError::ValidationFailed(
                "root state has no name".to_string(),
            ));
        }

        let mut tree = StateTree::new(self.name.clone());
        let root = tree.root();
        self.build(&mut tree, root)?;
        self.wire(&mut tree, root)?;
        Ok(tree)
    }

    fn build(&self, tree: &mut StateTree, state: StateId) -> Result<(), CheckpointError> {
        for child in &self.children {
            let id = tree.create_child(state, child.name.clone())?;
            child.build(tree, id)?;
        }
        match &self.entry_child {
            Some(entry) => {
                tree.set_entry_child_by_name(state, entry)?;
            }
            None if !self.children.is_empty() => {
                return Err(CheckpointError::ValidationFailed(format!(
                    "state `{}` has children but no entry child",
                    self.name
                )));
            }
            None => {}
        }
        Ok(())
    }

    fn wire(&self, tree: &mut StateTree, state: StateId) -> Result<(), CheckpointError> {
        for (trigger, target) in &self.transitions {
            if tree.parent(state).is_none() && *target == self.name {
                tree.add_self_transition(state, trigger.clone())?;
            } else {
                tree.add_transition_by_name(state, target, trigger.clone())?;
            }
        }
        for child in &self.children {
            if let Some(id) = tree.find_child(state, &child.name) {
                child.wire(tree, id)?;
            }
        }
        Ok(())
    }
}

/// Serializable checkpoint of a state machine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// The whole state tree
    pub root: StateSnapshot,

    /// Hierarchy of the active state, leaf first; `None` if not started
    pub current: Option<Vec<String>>,

    pub last_trigger: String,

    /// Complete transition history
    pub history: TransitionHistory,
}

impl Checkpoint {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    fn check_version(&self) -> Result<(), CheckpointError> {
        if self.version == CHECKPOINT_VERSION {
            Ok(())
        } else {
            Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            })
        }
    }
}

//! Triggered transitions between sibling states and their resolution.
//!
//! A transition is declared on a source state and targets a sibling of that
//! state. Resolution is ancestor-scoped: a trigger missing from a state's own
//! table is looked up on its parent, then the grandparent, up to the root.
//! Whatever target is found is then entered, cascading through entry
//! children down to a leaf.

use super::error::TreeError;
use super::state::StateId;
use super::tree::StateTree;
use std::collections::BTreeSet;
use tracing::{debug, trace};

impl StateTree {
    fn check_trigger(&self, source: StateId, trigger: &str) -> Result<(), TreeError> {
        if trigger.is_empty() {
            return Err(TreeError::EmptyTrigger);
        }
        let node = self.node(source)?;
        if node.transitions.contains_key(trigger) {
            return Err(TreeError::DuplicateTrigger {
                state: node.name.clone(),
                trigger: trigger.to_string(),
            });
        }
        Ok(())
    }

    fn check_new_sibling(&self, state: StateId, name: &str) -> Result<StateId, TreeError> {
        let node = self.node(state)?;
        let parent = node.parent.ok_or_else(|| TreeError::NoParent {
            state: node.name.clone(),
        })?;
        let parent_node = self.node(parent)?;
        if parent_node.children.contains_key(name) {
            return Err(TreeError::DuplicateChild {
                parent: parent_node.name.clone(),
                name: name.to_string(),
            });
        }
        Ok(parent)
    }

    /// Declare `source --trigger--> target`.
    ///
    /// Fails unless both states share a parent, the trigger is non-empty and
    /// `source` does not already declare it. Returns `target` on success.
    pub fn add_transition(
        &mut self,
        source: StateId,
        target: StateId,
        trigger: impl Into<String>,
    ) -> Result<StateId, TreeError> {
        let trigger = trigger.into();
        let source_node = self.node(source)?;
        let target_node = self.node(target)?;
        if source_node.parent != target_node.parent {
            return Err(TreeError::NotSibling {
                from: source_node.name.clone(),
                target: target_node.name.clone(),
            });
        }
        self.check_trigger(source, &trigger)?;

        debug!(source = %source, target = %target, trigger = %trigger, "added transition");
        if let Some(node) = self.get_mut(source) {
            node.transitions.insert(trigger, target);
        }
        Ok(target)
    }

    /// Declare a transition to the sibling of `source` named `target`.
    pub fn add_transition_by_name(
        &mut self,
        source: StateId,
        target: &str,
        trigger: impl Into<String>,
    ) -> Result<StateId, TreeError> {
        let target_id = self
            .find_sibling(source, target)
            .ok_or_else(|| TreeError::UnknownSibling {
                state: self.label(source),
                name: target.to_string(),
            })?;
        self.add_transition(source, target_id, trigger)
    }

    /// Declare a transition from `state` back to itself.
    pub fn add_self_transition(
        &mut self,
        state: StateId,
        trigger: impl Into<String>,
    ) -> Result<StateId, TreeError> {
        self.add_transition(state, state, trigger)
    }

    /// Wire `from --trigger--> to` between two direct children of `parent`.
    pub fn link_children(
        &mut self,
        parent: StateId,
        from: &str,
        to: &str,
        trigger: impl Into<String>,
    ) -> Result<StateId, TreeError> {
        let from = self.require_child(parent, from)?;
        let to = self.require_child(parent, to)?;
        self.add_transition(from, to, trigger)
    }

    /// Create a sibling of `state` reachable from it through `trigger`.
    pub fn create_sibling_with_transition(
        &mut self,
        state: StateId,
        name: impl Into<String>,
        trigger: impl Into<String>,
    ) -> Result<StateId, TreeError> {
        let name = name.into();
        let trigger = trigger.into();
        let parent = self.check_new_sibling(state, &name)?;
        self.check_trigger(state, &trigger)?;

        let sibling = self.create_child(parent, name)?;
        self.add_transition(state, sibling, trigger)
    }

    /// Create a sub-mode next to `state` that returns to it.
    ///
    /// Wires `state --enter_trigger--> new` and `new --return_trigger--> state`.
    /// The new state shares `state`'s parent, since transitions only connect
    /// siblings.
    pub fn create_loopback(
        &mut self,
        state: StateId,
        name: impl Into<String>,
        enter_trigger: impl Into<String>,
        return_trigger: impl Into<String>,
    ) -> Result<StateId, TreeError> {
        let return_trigger = return_trigger.into();
        if return_trigger.is_empty() {
            return Err(TreeError::EmptyTrigger);
        }
        let sibling = self.create_sibling_with_transition(state, name, enter_trigger)?;
        self.add_transition(sibling, state, return_trigger)?;
        Ok(sibling)
    }

    /// Create children and chain each consecutive pair through `trigger`.
    ///
    /// A link is only made when both ends were created.
    pub fn create_linked_children<I, S>(
        &mut self,
        parent: StateId,
        names: I,
        trigger: &str,
    ) -> Vec<Result<StateId, TreeError>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let created = self.create_children(parent, names);
        for pair in created.windows(2) {
            if let (Ok(from), Ok(to)) = (&pair[0], &pair[1]) {
                // Fresh children have empty tables, so only an empty trigger can fail here.
                if let Err(error) = self.add_transition(*from, *to, trigger) {
                    trace!(%error, "skipped chain link");
                }
            }
        }
        created
    }

    /// Remove the transition declared under `trigger`; `true` if one existed.
    pub fn delete_transition(&mut self, state: StateId, trigger: &str) -> bool {
        let removed = self
            .get_mut(state)
            .is_some_and(|node| node.transitions.remove(trigger).is_some());
        if removed {
            debug!(state = %state, trigger, "deleted transition");
        }
        removed
    }

    /// Remove every transition of `state` that targets `target`.
    pub fn delete_transitions_to(&mut self, state: StateId, target: StateId) -> bool {
        let Some(node) = self.get_mut(state) else {
            return false;
        };
        let before = node.transitions.len();
        node.transitions.retain(|_, to| *to != target);
        let removed = before - node.transitions.len();
        if removed > 0 {
            debug!(state = %state, target = %target, removed, "deleted transitions");
        }
        removed > 0
    }

    /// Cascade from `state` through entry children to the leaf that becomes active.
    ///
    /// Entry children are always direct children, so the cascade is bounded by
    /// the height of the tree.
    pub fn enter(&self, state: StateId) -> Option<StateId> {
        let mut current = state;
        let mut node = self.get(current)?;
        while let Some(entry) = node.entry_child {
            current = entry;
            node = self.get(current)?;
        }
        Some(current)
    }

    /// Resolve `trigger` from `state` and enter the target.
    ///
    /// `state`'s own table wins; otherwise each ancestor's table is checked in
    /// turn. `None` if no level declares the trigger.
    pub fn resolve(&self, state: StateId, trigger: &str) -> Option<StateId> {
        let target = self
            .ancestors(state)
            .find_map(|id| self.get(id)?.transitions.get(trigger).copied());
        match target {
            Some(target) => self.enter(target),
            None => {
                trace!(state = %state, trigger, "trigger not declared on any ancestor");
                None
            }
        }
    }

    /// Triggers declared on `state` itself.
    pub fn local_triggers(&self, state: StateId) -> Vec<&str> {
        self.get(state)
            .map(|node| node.transitions.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every trigger resolvable from `state`, including inherited ones.
    pub fn applicable_triggers(&self, state: StateId) -> BTreeSet<String> {
        self.ancestors(state)
            .flat_map(|id| self.local_triggers(id))
            .map(str::to_string)
            .collect()
    }
}

//! Arena-backed state hierarchy.
//!
//! The tree owns every state. Parent/child ownership is expressed by the
//! `children` maps; transitions and entry children are non-owning handles
//! that deletion repairs explicitly.

use super::error::TreeError;
use super::state::{StateId, StateNode};
use tracing::{debug, trace};

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<StateNode>,
}

/// A hierarchy of named states rooted at a single parentless state.
///
/// # Example
///
/// ```rust
/// use statetree::core::StateTree;
///
/// let mut tree = StateTree::new("door");
/// let root = tree.root();
/// let locked = tree.create_child(root, "locked").unwrap();
/// let unlocked = tree.create_child(root, "unlocked").unwrap();
///
/// // The first child becomes the entry child automatically.
/// assert_eq!(tree.enter(root), Some(locked));
/// assert_eq!(tree.find_sibling(locked, "unlocked"), Some(unlocked));
/// assert_eq!(tree.ancestor_path(unlocked), vec!["unlocked", "door"]);
/// ```
#[derive(Clone, Debug)]
pub struct StateTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: StateId,
    len: usize,
}

impl Default for StateTree {
    fn default() -> Self {
        Self::new("root")
    }
}

impl StateTree {
    /// Create a tree holding only a root state.
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = StateId::new(0, 0);
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(StateNode::new(root_name.into(), None)),
            }],
            free: Vec::new(),
            root,
            len: 1,
        }
    }

    pub fn root(&self) -> StateId {
        self.root
    }

    /// Number of live states, root included.
    pub fn state_count(&self) -> usize {
        self.len
    }

    /// Check whether `id` refers to a live state of this tree.
    pub fn contains(&self, id: StateId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: StateId) -> Option<&StateNode> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: StateId) -> Option<&mut StateNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub(crate) fn node(&self, id: StateId) -> Result<&StateNode, TreeError> {
        self.get(id).ok_or(TreeError::UnknownState(id))
    }

    pub fn name(&self, id: StateId) -> Option<&str> {
        self.get(id).map(StateNode::name)
    }

    /// Name used in error messages; stale handles render as their id.
    pub(crate) fn label(&self, id: StateId) -> String {
        self.name(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    pub fn parent(&self, id: StateId) -> Option<StateId> {
        self.get(id).and_then(StateNode::parent)
    }

    pub fn entry_child(&self, id: StateId) -> Option<StateId> {
        self.get(id).and_then(StateNode::entry_child)
    }

    fn alloc(&mut self, node: StateNode) -> StateId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return StateId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        StateId::new(index, 0)
    }

    fn release(&mut self, id: StateId) {
        if let Some(slot) = self.slots.get_mut(id.index as usize) {
            if slot.generation == id.generation && slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                self.len -= 1;
            }
        }
    }

    /// Add an empty child under `parent`.
    ///
    /// The first child of a state with no entry child becomes its entry child.
    pub fn create_child(
        &mut self,
        parent: StateId,
        name: impl Into<String>,
    ) -> Result<StateId, TreeError> {
        let name = name.into();
        let parent_node = self.node(parent)?;
        if parent_node.children.contains_key(&name) {
            return Err(TreeError::DuplicateChild {
                parent: parent_node.name.clone(),
                name,
            });
        }

        let child = self.alloc(StateNode::new(name.clone(), Some(parent)));
        let parent_node = self
            .get_mut(parent)
            .ok_or(TreeError::UnknownState(parent))?;
        parent_node.children.insert(name, child);
        if parent_node.entry_child.is_none() {
            parent_node.entry_child = Some(child);
        }
        debug!(parent = %parent, child = %child, "created state");
        Ok(child)
    }

    /// Batch form of [`create_child`](Self::create_child); results are positional.
    pub fn create_children<I, S>(
        &mut self,
        parent: StateId,
        names: I,
    ) -> Vec<Result<StateId, TreeError>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .map(|name| self.create_child(parent, name))
            .collect()
    }

    /// Add a new state next to `state`, under the same parent.
    pub fn create_sibling(
        &mut self,
        state: StateId,
        name: impl Into<String>,
    ) -> Result<StateId, TreeError> {
        let node = self.node(state)?;
        let parent = node.parent.ok_or_else(|| TreeError::NoParent {
            state: node.name.clone(),
        })?;
        self.create_child(parent, name)
    }

    /// Look up a direct child by name.
    pub fn find_child(&self, parent: StateId, name: &str) -> Option<StateId> {
        let found = self.get(parent)?.children.get(name).copied();
        if found.is_none() {
            trace!(parent = %parent, name, "no such child");
        }
        found
    }

    /// Look up a state among the siblings of `state`.
    ///
    /// The root has no siblings, so it searches its own children instead.
    pub fn find_sibling(&self, state: StateId, name: &str) -> Option<StateId> {
        match self.get(state)?.parent {
            Some(parent) => self.find_child(parent, name),
            None => self.find_child(state, name),
        }
    }

    /// Descend from the root through the given child names.
    pub fn find_by_path<S: AsRef<str>>(&self, path: &[S]) -> Option<StateId> {
        path.iter()
            .try_fold(self.root, |state, name| {
                self.find_child(state, name.as_ref())
            })
    }

    /// Replace the entry child of `parent`; `child` must be one of its children.
    pub fn set_entry_child(&mut self, parent: StateId, child: StateId) -> Result<StateId, TreeError> {
        self.ensure_child(parent, child)?;
        if let Some(node) = self.get_mut(parent) {
            node.entry_child = Some(child);
        }
        debug!(parent = %parent, child = %child, "set entry child");
        Ok(child)
    }

    pub fn set_entry_child_by_name(
        &mut self,
        parent: StateId,
        name: &str,
    ) -> Result<StateId, TreeError> {
        let child = self.require_child(parent, name)?;
        self.set_entry_child(parent, child)
    }

    /// Remove `child` and its whole subtree from `parent`.
    ///
    /// Sibling transitions that targeted `child` are dropped. If `child` was the
    /// entry child, the remaining child with the smallest name takes its place.
    pub fn delete_child(&mut self, parent: StateId, child: StateId) -> Result<(), TreeError> {
        self.ensure_child(parent, child)?;

        let siblings: Vec<StateId> = self
            .node(parent)?
            .children
            .values()
            .copied()
            .filter(|&id| id != child)
            .collect();
        for sibling in siblings {
            self.delete_transitions_to(sibling, child);
        }

        let name = self.node(child)?.name.clone();
        if let Some(node) = self.get_mut(parent) {
            node.children.remove(&name);
            if node.entry_child == Some(child) {
                node.entry_child = node.children.values().next().copied();
            }
        }

        let subtree = self.subtree(child);
        for id in subtree.iter().rev() {
            self.release(*id);
        }
        debug!(parent = %parent, state = %child, removed = subtree.len(), "deleted state");
        Ok(())
    }

    pub fn delete_child_by_name(&mut self, parent: StateId, name: &str) -> Result<(), TreeError> {
        let child = self.require_child(parent, name)?;
        self.delete_child(parent, child)
    }

    /// `state` and all of its descendants in depth-first pre-order.
    pub fn subtree(&self, state: StateId) -> Vec<StateId> {
        let mut order = Vec::new();
        let mut stack = vec![state];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            order.push(id);
            stack.extend(node.children.values().rev().copied());
        }
        order
    }

    /// Handles from `state` up to the root, `state` first.
    pub fn ancestors(&self, state: StateId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(state).map(|_| state),
        }
    }

    /// Names from `state` up to the root, `state` first.
    ///
    /// Empty if `state` is not in the tree.
    pub fn ancestor_path(&self, state: StateId) -> Vec<String> {
        self.ancestors(state)
            .filter_map(|id| self.name(id).map(str::to_string))
            .collect()
    }

    /// Number of ancestors above `state`; zero for the root.
    pub fn depth(&self, state: StateId) -> usize {
        self.ancestors(state).count().saturating_sub(1)
    }

    pub fn is_ancestor_or_self(&self, ancestor: StateId, state: StateId) -> bool {
        self.ancestors(state).any(|id| id == ancestor)
    }

    fn ensure_child(&self, parent: StateId, child: StateId) -> Result<(), TreeError> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if child_node.parent != Some(parent) {
            return Err(TreeError::NotAChild {
                parent: parent_node.name.clone(),
                child: child_node.name.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn require_child(&self, parent: StateId, name: &str) -> Result<StateId, TreeError> {
        let parent_node = self.node(parent)?;
        parent_node
            .children
            .get(name)
            .copied()
            .ok_or_else(|| TreeError::UnknownChild {
                parent: parent_node.name.clone(),
                name: name.to_string(),
            })
    }
}

/// Iterator over a state and its ancestors, innermost first.
pub struct Ancestors<'a> {
    tree: &'a StateTree,
    next: Option<StateId>,
}

impl Iterator for Ancestors<'_> {
    type Item = StateId;

    fn next(&mut self) -> Option<StateId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (StateTree, StateId, StateId, StateId) {
        let mut tree = StateTree::new("root");
        let root = tree.root();
        let a = tree.create_child(root, "a").unwrap();
        let b = tree.create_child(root, "b").unwrap();
        let c = tree.create_child(root, "c").unwrap();
        (tree, a, b, c)
    }

    #[test]
    fn new_tree_has_only_root() {
        let tree = StateTree::new("machine");

        assert_eq!(tree.state_count(), 1);
        assert_eq!(tree.name(tree.root()), Some("machine"));
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn first_child_becomes_entry_child() {
        let (tree, a, _, _) = sample();

        assert_eq!(tree.entry_child(tree.root()), Some(a));
        assert_eq!(tree.state_count(), 4);
    }

    #[test]
    fn duplicate_child_is_rejected_without_mutation() {
        let (mut tree, _, _, _) = sample();
        let root = tree.root();

        let result = tree.create_child(root, "b");

        assert!(matches!(result, Err(TreeError::DuplicateChild { .. })));
        assert_eq!(tree.state_count(), 4);
    }

    #[test]
    fn create_children_reports_positionally() {
        let mut tree = StateTree::default();
        let root = tree.root();

        let results = tree.create_children(root, ["x", "y", "x"]);

        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(results[2].is_err());
    }

    #[test]
    fn sibling_of_root_is_rejected() {
        let mut tree = StateTree::default();
        let root = tree.root();

        assert!(matches!(
            tree.create_sibling(root, "other"),
            Err(TreeError::NoParent { .. })
        ));
    }

    #[test]
    fn find_sibling_searches_parent_children() {
        let (mut tree, a, b, _) = sample();
        let nested = tree.create_child(a, "nested").unwrap();

        assert_eq!(tree.find_sibling(a, "b"), Some(b));
        assert_eq!(tree.find_sibling(a, "nested"), None);
        assert_eq!(tree.find_child(a, "nested"), Some(nested));
    }

    #[test]
    fn root_find_sibling_searches_own_children() {
        let (tree, a, _, _) = sample();

        assert_eq!(tree.find_sibling(tree.root(), "a"), Some(a));
    }

    #[test]
    fn find_by_path_descends_by_name() {
        let (mut tree, _, b, _) = sample();
        let deep = tree.create_child(b, "deep").unwrap();

        assert_eq!(tree.find_by_path(&["b", "deep"]), Some(deep));
        assert_eq!(tree.find_by_path::<&str>(&[]), Some(tree.root()));
        assert_eq!(tree.find_by_path(&["b", "missing"]), None);
    }

    #[test]
    fn set_entry_child_requires_direct_child() {
        let (mut tree, a, b, _) = sample();
        let root = tree.root();
        let nested = tree.create_child(a, "nested").unwrap();

        assert_eq!(tree.set_entry_child(root, b), Ok(b));
        assert_eq!(tree.entry_child(root), Some(b));
        assert!(matches!(
            tree.set_entry_child(root, nested),
            Err(TreeError::NotAChild { .. })
        ));
        assert_eq!(tree.entry_child(root), Some(b));
        assert!(tree.set_entry_child_by_name(root, "missing").is_err());
    }

    #[test]
    fn deleting_entry_child_reassigns_entry() {
        let (mut tree, a, b, _) = sample();
        let root = tree.root();

        tree.delete_child(root, a).unwrap();

        assert!(!tree.contains(a));
        assert_eq!(tree.entry_child(root), Some(b));
    }

    #[test]
    fn deleting_only_child_clears_entry() {
        let mut tree = StateTree::default();
        let root = tree.root();
        let only = tree.create_child(root, "only").unwrap();

        tree.delete_child(root, only).unwrap();

        assert_eq!(tree.entry_child(root), None);
        assert_eq!(tree.state_count(), 1);
    }

    #[test]
    fn deleting_removes_whole_subtree() {
        let (mut tree, a, _, _) = sample();
        let root = tree.root();
        let inner = tree.create_child(a, "inner").unwrap();
        let leaf = tree.create_child(inner, "leaf").unwrap();

        tree.delete_child_by_name(root, "a").unwrap();

        assert!(!tree.contains(inner));
        assert!(!tree.contains(leaf));
        assert_eq!(tree.state_count(), 3);
    }

    #[test]
    fn delete_non_child_fails() {
        let (mut tree, a, b, _) = sample();

        assert!(matches!(
            tree.delete_child(a, b),
            Err(TreeError::NotAChild { .. })
        ));
        assert!(tree.contains(b));
    }

    #[test]
    fn reused_slot_does_not_revive_stale_handle() {
        let (mut tree, a, _, _) = sample();
        let root = tree.root();

        tree.delete_child(root, a).unwrap();
        let fresh = tree.create_child(root, "fresh").unwrap();

        assert_eq!(fresh.index(), a.index());
        assert!(!tree.contains(a));
        assert_eq!(tree.name(fresh), Some("fresh"));
    }

    #[test]
    fn ancestor_path_lists_self_first() {
        let (mut tree, _, _, c) = sample();
        let inner = tree.create_child(c, "inner").unwrap();

        assert_eq!(tree.ancestor_path(inner), vec!["inner", "c", "root"]);
        assert_eq!(tree.depth(inner), 2);
        assert_eq!(tree.depth(tree.root()), 0);
        assert!(tree.is_ancestor_or_self(c, inner));
        assert!(!tree.is_ancestor_or_self(inner, c));
    }

    #[test]
    fn subtree_is_preorder() {
        let (mut tree, a, b, c) = sample();
        let a1 = tree.create_child(a, "a1").unwrap();

        assert_eq!(tree.subtree(tree.root()), vec![tree.root(), a, a1, b, c]);
    }
}

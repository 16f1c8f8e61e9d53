//! Cursor over a [`StateTree`].
//!
//! The navigator is the only place that holds an execution position. It
//! never owns the tree; every operation borrows the tree it navigates.
//!
//! # Example
//!
//! ```rust
//! use statetree::core::StateTree;
//! use statetree::navigator::Navigator;
//!
//! let mut tree = StateTree::new("light");
//! let root = tree.root();
//! let off = tree.create_child(root, "off").unwrap();
//! let on = tree.create_child(root, "on").unwrap();
//! tree.add_transition(off, on, "flip").unwrap();
//! tree.add_transition(on, off, "flip").unwrap();
//!
//! let mut nav = Navigator::new();
//! nav.begin_at(&tree, root);
//! assert_eq!(nav.current_name(&tree), Some("off"));
//!
//! nav.apply_trigger(&tree, "flip").unwrap();
//! assert_eq!(nav.hierarchy(&tree).unwrap(), ["on", "light"]);
//! ```

mod error;

pub use error::NavigationError;

use crate::core::{StateId, StateTree, TransitionHistory, TransitionRecord};
use chrono::Utc;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Tracks the active leaf state of a tree and applies triggers to it.
#[derive(Clone, Debug, Default)]
pub struct Navigator {
    current: Option<StateId>,
    /// Ancestor names of `current`; `None` means invalidated.
    hierarchy_cache: Option<Vec<String>>,
    last_trigger: String,
    history: TransitionHistory,
    /// Most records kept in `history`; unbounded when `None`.
    history_limit: Option<usize>,
}

impl Navigator {
    /// Create a navigator with no current state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a navigator that keeps at most `limit` history records.
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            history_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Create a navigator already entered at `root`.
    pub fn starting_at(tree: &StateTree, root: StateId) -> Self {
        let mut navigator = Self::new();
        navigator.begin_at(tree, root);
        navigator
    }

    pub fn current(&self) -> Option<StateId> {
        self.current
    }

    pub fn is_started(&self) -> bool {
        self.current.is_some()
    }

    /// Enter `root`, cascading to a leaf, and make that leaf current.
    ///
    /// A handle that is not in the tree leaves the current state unchanged.
    /// The hierarchy cache is invalidated either way.
    pub fn begin_at(&mut self, tree: &StateTree, root: StateId) -> Option<StateId> {
        self.hierarchy_cache = None;
        let leaf = tree.enter(root)?;
        self.current = Some(leaf);
        debug!(root = %root, leaf = %leaf, "navigator entered");
        Some(leaf)
    }

    /// Re-run the entry cascade from the current state.
    ///
    /// Settles back onto a leaf after the tree gained children below it.
    pub fn begin(&mut self, tree: &StateTree) -> Option<StateId> {
        self.hierarchy_cache = None;
        let current = self.current?;
        self.begin_at(tree, current)
    }

    /// Apply `trigger` to the current state.
    ///
    /// The trigger is remembered as the last trigger whether or not it
    /// resolves. On failure the current state and the hierarchy cache are
    /// left untouched.
    pub fn apply_trigger(
        &mut self,
        tree: &StateTree,
        trigger: &str,
    ) -> Result<StateId, NavigationError> {
        trigger.clone_into(&mut self.last_trigger);

        let current = self.current.ok_or(NavigationError::NotStarted)?;
        if !tree.contains(current) {
            return Err(NavigationError::StaleState);
        }
        let Some(next) = tree.resolve(current, trigger) else {
            trace!(state = %current, trigger, "trigger did not resolve");
            return Err(NavigationError::NoTransition {
                from: tree.name(current).unwrap_or_default().to_string(),
                trigger: trigger.to_string(),
            });
        };

        self.history.record(TransitionRecord {
            from: tree.ancestor_path(current),
            to: tree.ancestor_path(next),
            trigger: trigger.to_string(),
            timestamp: Utc::now(),
        });
        if let Some(limit) = self.history_limit {
            self.history.keep_last(limit);
        }
        self.current = Some(next);
        self.hierarchy_cache = None;
        debug!(from = %current, to = %next, trigger, "applied trigger");
        Ok(next)
    }

    /// Apply the remembered last trigger again.
    pub fn apply_last_trigger(&mut self, tree: &StateTree) -> Result<StateId, NavigationError> {
        let trigger = self.last_trigger.clone();
        self.apply_trigger(tree, &trigger)
    }

    /// Apply triggers in order, stopping at the first one that fails.
    ///
    /// This is not atomic: triggers applied before the failing one stay
    /// applied, and the error reports how many there were. Returns the number
    /// of triggers applied on success.
    pub fn apply_sequence<I, S>(&mut self, tree: &StateTree, triggers: I) -> Result<usize, NavigationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut applied = 0;
        for trigger in triggers {
            let trigger = trigger.as_ref();
            if let Err(error) = self.apply_trigger(tree, trigger) {
                debug!(applied, trigger, %error, "trigger sequence interrupted");
                return Err(NavigationError::SequenceInterrupted {
                    applied,
                    trigger: trigger.to_string(),
                });
            }
            applied += 1;
        }
        Ok(applied)
    }

    /// Name of the current leaf state.
    pub fn current_name<'t>(&self, tree: &'t StateTree) -> Option<&'t str> {
        tree.name(self.current?)
    }

    /// Names from the current leaf up to the root, leaf first.
    ///
    /// Computed on first access after an invalidation and cached until the
    /// current state changes. A cached value is never returned once the
    /// current state has been deleted from `tree`.
    pub fn hierarchy(&mut self, tree: &StateTree) -> Result<&[String], NavigationError> {
        let current = self.current.ok_or(NavigationError::NotStarted)?;
        if !tree.contains(current) {
            self.hierarchy_cache = None;
            return Err(NavigationError::StaleState);
        }
        if self.hierarchy_cache.is_none() {
            self.hierarchy_cache = Some(tree.ancestor_path(current));
        }
        Ok(self.hierarchy_cache.as_deref().unwrap_or(&[]))
    }

    /// Entry `n` of [`hierarchy`](Self::hierarchy): `0` is the leaf.
    pub fn hierarchy_at(&mut self, tree: &StateTree, n: usize) -> Result<&str, NavigationError> {
        let hierarchy = self.hierarchy(tree)?;
        hierarchy
            .get(n)
            .map(String::as_str)
            .ok_or(NavigationError::HierarchyIndex {
                index: n,
                depth: hierarchy.len(),
            })
    }

    /// Whether the hierarchy cache currently holds a computed value.
    pub fn is_hierarchy_cached(&self) -> bool {
        self.hierarchy_cache.is_some()
    }

    /// Every trigger resolvable from the current state.
    pub fn available_triggers(&self, tree: &StateTree) -> Result<BTreeSet<String>, NavigationError> {
        let current = self.current.ok_or(NavigationError::NotStarted)?;
        if !tree.contains(current) {
            return Err(NavigationError::StaleState);
        }
        Ok(tree.applicable_triggers(current))
    }

    pub fn last_trigger(&self) -> &str {
        &self.last_trigger
    }

    /// Set the trigger used by [`apply_last_trigger`](Self::apply_last_trigger).
    pub fn set_last_trigger(&mut self, trigger: impl Into<String>) {
        self.last_trigger = trigger.into();
    }

    /// Successful triggers, oldest first.
    ///
    /// Each record holds two full hierarchies, so without a limit the history
    /// grows for as long as triggers are applied. See
    /// [`set_history_limit`](Self::set_history_limit).
    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    pub fn history_limit(&self) -> Option<usize> {
        self.history_limit
    }

    /// Bound the history to the newest `limit` records, trimming it now.
    pub fn set_history_limit(&mut self, limit: Option<usize>) {
        self.history_limit = limit;
        if let Some(limit) = limit {
            self.history.keep_last(limit);
        }
    }

    /// Forget the current state, the cache, the last trigger and the history.
    pub fn reset(&mut self) {
        self.current = None;
        self.hierarchy_cache = None;
        self.last_trigger.clear();
        self.history.clear();
        debug!("navigator reset");
    }

    pub(crate) fn restore(
        &mut self,
        current: Option<StateId>,
        last_trigger: String,
        history: TransitionHistory,
    ) {
        self.current = current;
        self.hierarchy_cache = None;
        self.last_trigger = last_trigger;
        self.history = history;
        if let Some(limit) = self.history_limit {
            self.history.keep_last(limit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `top{ left{l1, l2}, right }` with `left --cross--> right`,
    /// `right --cross--> left`, `l1 --down--> l2`.
    fn sample() -> (StateTree, [StateId; 4]) {
        let mut tree = StateTree::new("top");
        let root = tree.root();
        let left = tree.create_child(root, "left").unwrap();
        let right = tree.create_child(root, "right").unwrap();
        let l1 = tree.create_child(left, "l1").unwrap();
        let l2 = tree.create_child(left, "l2").unwrap();
        tree.add_transition(left, right, "cross").unwrap();
        tree.add_transition(right, left, "cross").unwrap();
        tree.add_transition(l1, l2, "down").unwrap();
        (tree, [left, right, l1, l2])
    }

    #[test]
    fn new_navigator_is_not_started() {
        let (tree, _) = sample();
        let mut nav = Navigator::new();

        assert!(!nav.is_started());
        assert_eq!(nav.current_name(&tree), None);
        assert_eq!(nav.apply_trigger(&tree, "cross"), Err(NavigationError::NotStarted));
        assert_eq!(nav.hierarchy(&tree), Err(NavigationError::NotStarted));
        assert_eq!(nav.begin(&tree), None);
    }

    #[test]
    fn begin_at_root_cascades_to_leaf() {
        let (tree, [_, _, l1, _]) = sample();
        let nav = Navigator::starting_at(&tree, tree.root());

        assert_eq!(nav.current(), Some(l1));
    }

    #[test]
    fn begin_at_twice_is_idempotent() {
        let (tree, _) = sample();
        let mut nav = Navigator::new();

        let first = nav.begin_at(&tree, tree.root());
        let first_hierarchy = nav.hierarchy(&tree).unwrap().to_vec();
        let second = nav.begin_at(&tree, tree.root());

        assert_eq!(first, second);
        assert_eq!(nav.hierarchy(&tree).unwrap(), first_hierarchy.as_slice());
    }

    #[test]
    fn begin_resettles_after_tree_grows() {
        let (mut tree, [_, right, _, _]) = sample();
        let mut nav = Navigator::starting_at(&tree, right);
        let inner = tree.create_child(right, "inner").unwrap();

        assert_eq!(nav.begin(&tree), Some(inner));
        assert_eq!(nav.hierarchy(&tree).unwrap(), ["inner", "right", "top"]);
    }

    #[test]
    fn apply_trigger_moves_and_invalidates_cache() {
        let (tree, [_, right, _, _]) = sample();
        let mut nav = Navigator::starting_at(&tree, tree.root());
        nav.hierarchy(&tree).unwrap();
        assert!(nav.is_hierarchy_cached());

        assert_eq!(nav.apply_trigger(&tree, "cross"), Ok(right));

        assert!(!nav.is_hierarchy_cached());
        assert_eq!(nav.hierarchy(&tree).unwrap(), ["right", "top"]);
    }

    #[test]
    fn failed_trigger_keeps_state_and_cache() {
        let (tree, [_, _, l1, _]) = sample();
        let mut nav = Navigator::starting_at(&tree, tree.root());
        nav.hierarchy(&tree).unwrap();

        let result = nav.apply_trigger(&tree, "missing");

        assert!(matches!(result, Err(NavigationError::NoTransition { .. })));
        assert_eq!(nav.current(), Some(l1));
        assert!(nav.is_hierarchy_cached());
        assert_eq!(nav.last_trigger(), "missing");
    }

    #[test]
    fn hierarchy_at_indexes_leaf_first() {
        let (tree, _) = sample();
        let mut nav = Navigator::starting_at(&tree, tree.root());

        assert_eq!(nav.hierarchy_at(&tree, 0), Ok("l1"));
        assert_eq!(nav.hierarchy_at(&tree, 2), Ok("top"));
        assert_eq!(
            nav.hierarchy_at(&tree, 3),
            Err(NavigationError::HierarchyIndex { index: 3, depth: 3 })
        );
    }

    #[test]
    fn apply_last_trigger_repeats() {
        let (tree, [_, right, l1, _]) = sample();
        let mut nav = Navigator::starting_at(&tree, tree.root());

        nav.set_last_trigger("cross");
        assert_eq!(nav.apply_last_trigger(&tree), Ok(right));
        assert_eq!(nav.apply_last_trigger(&tree), Ok(l1));
    }

    #[test]
    fn apply_sequence_commits_partially() {
        let (tree, [_, right, _, _]) = sample();
        let mut nav = Navigator::starting_at(&tree, tree.root());

        let result = nav.apply_sequence(&tree, ["down", "cross", "down"]);

        assert_eq!(
            result,
            Err(NavigationError::SequenceInterrupted {
                applied: 2,
                trigger: "down".to_string(),
            })
        );
        assert_eq!(nav.current(), Some(right));
    }

    #[test]
    fn apply_sequence_reports_count() {
        let (tree, [_, _, _, l2]) = sample();
        let mut nav = Navigator::starting_at(&tree, tree.root());

        assert_eq!(nav.apply_sequence(&tree, vec!["down".to_string()]), Ok(1));
        assert_eq!(nav.current(), Some(l2));
    }

    #[test]
    fn available_triggers_include_inherited() {
        let (tree, _) = sample();
        let nav = Navigator::starting_at(&tree, tree.root());

        let triggers: Vec<String> = nav.available_triggers(&tree).unwrap().into_iter().collect();

        assert_eq!(triggers, vec!["cross", "down"]);
    }

    #[test]
    fn successful_triggers_are_recorded() {
        let (tree, _) = sample();
        let mut nav = Navigator::starting_at(&tree, tree.root());

        nav.apply_trigger(&tree, "down").unwrap();
        let _ = nav.apply_trigger(&tree, "nope");
        nav.apply_trigger(&tree, "cross").unwrap();

        let history = nav.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history.transitions()[0].from_leaf(), Some("l1"));
        assert_eq!(history.transitions()[0].to_leaf(), Some("l2"));
        assert_eq!(history.transitions()[1].to, vec!["right", "top"]);
    }

    #[test]
    fn deleted_current_state_is_stale() {
        let (mut tree, [left, _, _, _]) = sample();
        let mut nav = Navigator::starting_at(&tree, tree.root());
        let root = tree.root();
        assert_eq!(nav.hierarchy(&tree).unwrap(), ["l1", "left", "top"]);
        assert!(nav.is_hierarchy_cached());

        tree.delete_child(root, left).unwrap();

        assert_eq!(nav.hierarchy(&tree), Err(NavigationError::StaleState));
        assert!(!nav.is_hierarchy_cached());
        assert_eq!(nav.hierarchy_at(&tree, 0), Err(NavigationError::StaleState));
        assert_eq!(nav.apply_trigger(&tree, "cross"), Err(NavigationError::StaleState));
        assert_eq!(nav.current_name(&tree), None);
    }

    #[test]
    fn history_limit_keeps_newest_records() {
        let (tree, _) = sample();
        let mut nav = Navigator::with_history_limit(2);
        nav.begin_at(&tree, tree.root());

        nav.apply_sequence(&tree, ["down", "cross", "cross"]).unwrap();

        assert_eq!(nav.history().len(), 2);
        assert_eq!(nav.history().transitions()[0].trigger, "cross");
        assert_eq!(nav.history_limit(), Some(2));

        nav.set_history_limit(Some(1));
        assert_eq!(nav.history().len(), 1);
        nav.set_history_limit(None);
        nav.apply_trigger(&tree, "cross").unwrap();
        assert_eq!(nav.history().len(), 2);
    }

    #[test]
    fn reset_clears_everything() {
        let (tree, _) = sample();
        let mut nav = Navigator::starting_at(&tree, tree.root());
        nav.apply_trigger(&tree, "down").unwrap();
        nav.hierarchy(&tree).unwrap();

        nav.reset();

        assert!(!nav.is_started());
        assert!(!nav.is_hierarchy_cached());
        assert_eq!(nav.last_trigger(), "");
        assert!(nav.history().is_empty());
    }
}

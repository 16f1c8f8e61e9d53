//! Persistability checks for state trees.
//!
//! Uses Stillwater's `Validation` type so that every unpersistable name and
//! trigger in a tree is reported in one pass, rather than stopping at the
//! first one. Transitions declared on the top state of a saved subtree are
//! reported too, since the format only records transitions between children.
//!
//! # Example
//!
//! ```rust
//! use statetree::core::StateTree;
//! use statetree::validation::{check_persistable, violations};
//!
//! let mut tree = StateTree::new("root");
//! let root = tree.root();
//! tree.create_child(root, "fine").unwrap();
//! tree.create_child(root, "not :fine:").unwrap();
//! tree.create_child(root, "").unwrap();
//!
//! assert!(check_persistable(&tree).is_failure());
//! assert_eq!(violations(&tree).len(), 2);
//! ```

pub mod rules;
pub mod violations;

pub use rules::{check_label, CheckResult};
pub use violations::Violation;

use crate::core::{StateId, StateTree};
use stillwater::validation::Validation;

/// Check every state name and trigger in `tree`, accumulating all violations.
pub fn check_persistable(tree: &StateTree) -> CheckResult {
    check_subtree(tree, tree.root())
}

/// Check the subtree rooted at `state` as it would be saved on its own.
pub fn check_subtree(tree: &StateTree, state: StateId) -> CheckResult {
    let mut checks: Vec<CheckResult> = Vec::new();

    for id in tree.subtree(state) {
        let Some(node) = tree.get(id) else {
            continue;
        };
        let path = display_path(tree, id);
        checks.push(check_label(&format!("state `{path}`"), node.name()));
        for (trigger, _) in node.transitions() {
            checks.push(check_label(&format!("trigger on state `{path}`"), trigger));
            if id == state {
                checks.push(Validation::fail(Violation::TopLevelTransition {
                    subject: format!("saved state `{path}`"),
                    trigger: trigger.to_string(),
                }));
            }
        }
    }

    Validation::all_vec(checks).map(|_| ())
}

/// Every violation in `tree`; empty when the tree is persistable.
pub fn violations(tree: &StateTree) -> Vec<Violation> {
    violations_in(tree, tree.root())
}

/// Every violation in the subtree rooted at `state`.
pub fn violations_in(tree: &StateTree, state: StateId) -> Vec<Violation> {
    match check_subtree(tree, state) {
        Validation::Success(_) => Vec::new(),
        Validation::Failure(errors) => errors.into_vec(),
    }
}

/// Root-first `a/b/c` rendering of a state's position.
fn display_path(tree: &StateTree, id: StateId) -> String {
    let mut path = tree.ancestor_path(id);
    path.reverse();
    path.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_tree_is_persistable() {
        let mut tree = StateTree::new("door");
        let root = tree.root();
        let locked = tree.create_child(root, "locked").unwrap();
        tree.create_loopback(locked, "un locked", "unlock", "lock").unwrap();

        assert!(check_persistable(&tree).is_success());
        assert!(violations(&tree).is_empty());
    }

    #[test]
    fn violations_from_states_and_triggers_accumulate() {
        let mut tree = StateTree::new("root");
        let root = tree.root();
        let a = tree.create_child(root, "a ").unwrap();
        let b = tree.create_child(root, "b").unwrap();
        tree.add_transition(b, a, ":to:").unwrap();
        tree.add_transition(a, b, "fine").unwrap();

        let found = violations(&tree);

        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|v| matches!(
            v,
            Violation::IrregularWhitespace { subject, .. } if subject == "state `root/a `"
        )));
        assert!(found.iter().any(|v| matches!(
            v,
            Violation::MarkerToken { subject, .. } if subject == "trigger on state `root/b`"
        )));
    }

    #[test]
    fn root_transition_is_reported() {
        let mut tree = StateTree::new("solo");
        let root = tree.root();
        tree.add_self_transition(root, "again").unwrap();

        assert_eq!(
            violations(&tree),
            vec![Violation::TopLevelTransition {
                subject: "saved state `solo`".to_string(),
                trigger: "again".to_string(),
            }]
        );
    }

    #[test]
    fn subtree_check_ignores_other_branches() {
        let mut tree = StateTree::new("root");
        let root = tree.root();
        let clean = tree.create_child(root, "clean").unwrap();
        tree.create_child(clean, "inner").unwrap();
        tree.create_child(root, "bad :end:").unwrap();

        assert!(check_subtree(&tree, clean).is_success());
        assert_eq!(violations(&tree).len(), 1);
    }

    #[test]
    fn saved_state_transitions_are_reported() {
        let mut tree = StateTree::new("root");
        let root = tree.root();
        let a = tree.create_child(root, "a").unwrap();
        let b = tree.create_child(root, "b").unwrap();
        tree.add_transition(a, b, "go").unwrap();

        assert!(violations(&tree).is_empty());
        assert!(matches!(
            violations_in(&tree, a).as_slice(),
            [Violation::TopLevelTransition { trigger, .. }] if trigger == "go"
        ));
    }

    #[test]
    fn root_name_is_checked() {
        let tree = StateTree::new("");

        assert_eq!(violations(&tree).len(), 1);
    }
}

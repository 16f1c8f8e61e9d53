//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::core::StateTree;
use crate::machine::{StateMachine, ROOT_NAME};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingTransition {
    from: String,
    to: String,
    trigger: String,
}

/// Builder for constructing flat state machines with a fluent API.
///
/// Nothing is validated until [`build`](Self::build), which applies the
/// declarations in order and reports the first structural error.
#[derive(Clone, Debug)]
pub struct MachineBuilder {
    root: String,
    states: Vec<String>,
    transitions: Vec<PendingTransition>,
    entry: Option<String>,
    initial: Option<String>,
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self {
            root: ROOT_NAME.to_string(),
            states: Vec::new(),
            transitions: Vec::new(),
            entry: None,
            initial: None,
        }
    }

    /// Rename the root state (defaults to `"root"`).
    pub fn root(mut self, name: impl Into<String>) -> Self {
        self.root = name.into();
        self
    }

    pub fn state(mut self, name: impl Into<String>) -> Self {
        self.states.push(name.into());
        self
    }

    /// Declare several states at once.
    pub fn states<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn transition(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        trigger: impl Into<String>,
    ) -> Self {
        self.transitions.push(PendingTransition {
            from: from.into(),
            to: to.into(),
            trigger: trigger.into(),
        });
        self
    }

    /// Declare states in order, each linked to the next by `trigger`.
    pub fn chain<I, S>(mut self, names: I, trigger: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        for pair in names.windows(2) {
            self = self.transition(pair[0].clone(), pair[1].clone(), trigger);
        }
        self.states.extend(names);
        self
    }

    /// Choose the state entered by [`StateMachine::begin`]; defaults to the
    /// first declared state.
    pub fn entry(mut self, name: impl Into<String>) -> Self {
        self.entry = Some(name.into());
        self
    }

    /// State made active by `build`; without it the machine begins at the
    /// root's entry state.
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    /// Build the machine and make its initial state active.
    pub fn build(self) -> Result<StateMachine, BuildError> {
        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        let mut machine = StateMachine::from_tree(StateTree::new(self.root));
        for state in self.states {
            machine.add_state(state)?;
        }
        if let Some(entry) = &self.entry {
            let root = machine.tree().root();
            machine.tree_mut().set_entry_child_by_name(root, entry)?;
        }
        for transition in &self.transitions {
            machine.add_transition(&transition.from, &transition.to, &transition.trigger)?;
        }

        match self.initial {
            Some(initial) => {
                machine
                    .set_state(&initial)
                    .map_err(|_| BuildError::UnknownInitial(initial))?;
            }
            None => {
                machine.begin();
            }
        }
        debug!(
            states = machine.tree().state_count(),
            current = machine.current_state().unwrap_or_default(),
            "built state machine"
        );
        Ok(machine)
    }
}

impl Default for MachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TreeError;

    #[test]
    fn builder_requires_states() {
        let result = MachineBuilder::new().build();

        assert!(matches!(result, Err(BuildError::NoStates)));
    }

    #[test]
    fn builder_begins_at_first_state() {
        let machine = MachineBuilder::new()
            .states(["idle", "busy"])
            .transition("idle", "busy", "work")
            .build()
            .unwrap();

        assert_eq!(machine.current_state(), Some("idle"));
    }

    #[test]
    fn entry_overrides_first_state() {
        let machine = MachineBuilder::new()
            .states(["idle", "busy"])
            .entry("busy")
            .build()
            .unwrap();

        assert_eq!(machine.current_state(), Some("busy"));
    }

    #[test]
    fn initial_state_is_active() {
        let mut machine = MachineBuilder::new()
            .root("job")
            .chain(["queued", "running", "done"], "advance")
            .initial("running")
            .build()
            .unwrap();

        assert_eq!(machine.hierarchy().unwrap(), ["running", "job"]);
        machine.transition("advance").unwrap();
        assert_eq!(machine.current_state(), Some("done"));
    }

    #[test]
    fn unknown_initial_is_reported() {
        let result = MachineBuilder::new().state("idle").initial("missing").build();

        assert_eq!(
            result.err(),
            Some(BuildError::UnknownInitial("missing".to_string()))
        );
    }

    #[test]
    fn duplicate_state_is_reported() {
        let result = MachineBuilder::new().states(["a", "a"]).build();

        assert!(matches!(
            result,
            Err(BuildError::Tree(TreeError::DuplicateChild { .. }))
        ));
    }

    #[test]
    fn transition_to_undeclared_state_is_reported() {
        let result = MachineBuilder::new()
            .state("a")
            .transition("a", "b", "go")
            .build();

        assert!(matches!(
            result,
            Err(BuildError::Tree(TreeError::UnknownChild { .. }))
        ));
    }
}

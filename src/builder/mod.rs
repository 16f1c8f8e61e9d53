//! Builder API for ergonomic state machine construction.
//!
//! [`MachineBuilder`] collects states and transitions by name and applies
//! them in one step, so a whole machine is either built or rejected.

pub mod error;
pub mod machine;

pub use error::BuildError;
pub use machine::MachineBuilder;

use crate::machine::StateMachine;

/// Build a machine whose states form a cycle driven by a single trigger.
///
/// # Example
///
/// ```
/// use statetree::builder::cycle;
///
/// let mut machine = cycle(["red", "green", "amber"], "next").unwrap();
/// machine.transition_sequence(["next", "next", "next"]).unwrap();
/// assert_eq!(machine.current_state(), Some("red"));
/// ```
pub fn cycle<I, S>(names: I, trigger: &str) -> Result<StateMachine, BuildError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names: Vec<String> = names.into_iter().map(Into::into).collect();
    let builder = MachineBuilder::new().chain(names.clone(), trigger);
    match (names.first(), names.last()) {
        (Some(first), Some(last)) if names.len() > 1 => {
            builder.transition(last.clone(), first.clone(), trigger).build()
        }
        _ => builder.build(),
    }
}

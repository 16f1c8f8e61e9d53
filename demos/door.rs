//! Interactive Door
//!
//! Builds the locked/unlocked/opened door, saves it in the text format,
//! loads it back and then reads triggers from stdin, one per line.
//!
//! Key concepts:
//! - Loopback states wired with `create_loopback`
//! - Triggers inherited from ancestor states
//! - Text save/load round trip
//!
//! Run with: cargo run --example door
//! Set RUST_LOG=statetree=debug to see every transition.

use statetree::{persist, StateMachine, StateTree};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

const HISTORY_LIMIT: usize = 256;

fn build_door() -> Result<StateTree, statetree::TreeError> {
    let mut tree = StateTree::new("door");
    let root = tree.root();
    let locked = tree.create_child(root, "locked")?;
    tree.create_child(locked, "closed")?;
    let unlocked = tree.create_loopback(locked, "unlocked", "unlock", "lock")?;
    let closed = tree.create_child(unlocked, "closed")?;
    tree.create_loopback(closed, "opened", "open", "close")?;
    Ok(tree)
}

fn show(machine: &mut StateMachine) {
    match machine.hierarchy() {
        Ok(hierarchy) => println!("  state: {}", hierarchy.join(" < ")),
        Err(e) => println!("  state: <{e}>"),
    }
    if let Ok(triggers) = machine.available_triggers() {
        let triggers: Vec<String> = triggers.into_iter().collect();
        println!("  triggers: {}", triggers.join(", "));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("=== Door State Machine ===\n");

    let text = persist::to_text(&build_door()?)?;
    println!("Saved form:\n{text}");

    let mut machine = StateMachine::load(text.as_bytes())?;
    machine.navigator_mut().set_history_limit(Some(HISTORY_LIMIT));
    machine.begin();
    show(&mut machine);

    println!("\nEnter a trigger, an empty line to repeat the last one, or `quit`.");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let trigger = line.trim();
        if trigger == "quit" {
            break;
        }

        let result = if trigger.is_empty() {
            machine.repeat_last_transition()
        } else {
            machine.transition(trigger)
        };
        if let Err(e) = result {
            println!("  {e}");
        }
        show(&mut machine);
    }

    println!(
        "\n{} most recent transitions kept.",
        machine.navigator().history().len()
    );
    Ok(())
}

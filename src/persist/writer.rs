//! Recursive writer for the text format.

use super::error::PersistError;
use super::{TextFormat, CHILDREN, END, IS, TO, TRANSITIONS};
use crate::core::{StateId, StateTree};
use crate::validation::violations_in;
use std::io::{self, Write};
use tracing::info;

/// Write the subtree rooted at `state`.
///
/// The entry child of every state is written before its other children so
/// that loading, which makes the first child the entry child, restores it.
pub fn save_state<W: Write>(
    tree: &StateTree,
    state: StateId,
    writer: &mut W,
    format: &TextFormat,
) -> Result<(), PersistError> {
    if !format.indent.chars().all(char::is_whitespace) {
        return Err(PersistError::InvalidIndent(format.indent.clone()));
    }
    if format.validate {
        let found = violations_in(tree, state);
        if !found.is_empty() {
            return Err(PersistError::Unpersistable(found));
        }
    }

    write_state(tree, state, 0, writer, format)?;
    writer.flush()?;
    info!(states = tree.subtree(state).len(), "saved state tree");
    Ok(())
}

fn write_state<W: Write>(
    tree: &StateTree,
    state: StateId,
    depth: usize,
    out: &mut W,
    format: &TextFormat,
) -> io::Result<()> {
    let Some(node) = tree.get(state) else {
        return Ok(());
    };
    let indent = format.indent.repeat(depth);

    if node.child_count() == 0 {
        return writeln!(out, "{indent}{} {END}", node.name());
    }

    writeln!(out, "{indent}{} {CHILDREN}", node.name())?;
    let entry = node.entry_child();
    if let Some(entry) = entry {
        write_state(tree, entry, depth + 1, out, format)?;
    }
    for (_, child) in node.children() {
        if Some(child) != entry {
            write_state(tree, child, depth + 1, out, format)?;
        }
    }

    writeln!(out, "{indent}{TRANSITIONS}")?;
    let inner = format.indent.repeat(depth + 1);
    for (child_name, child) in node.children() {
        let Some(child_node) = tree.get(child) else {
            continue;
        };
        for (trigger, target) in child_node.transitions() {
            let target = tree.name(target).unwrap_or_default();
            writeln!(out, "{inner}{child_name} {TO} {target} {IS} {trigger} {END}")?;
        }
    }
    writeln!(out, "{indent}{END}")
}

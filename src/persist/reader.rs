//! Token-level parser for the text format.
//!
//! Input is split on whitespace. A run of ordinary tokens up to the next
//! marker forms a phrase, joined with single spaces, so names may contain
//! spaces. Each state body is a sequence of `:children:` and
//! `:transitions:` blocks closed by `:end:`.

use super::error::PersistError;
use super::{is_marker, CHILDREN, END, IS, TO, TRANSITIONS};
use crate::core::{StateId, StateTree};
use std::str::SplitWhitespace;
use tracing::info;

/// Parse a complete tree from `input`.
pub fn parse_tree(input: &str) -> Result<StateTree, PersistError> {
    let mut parser = Parser {
        tokens: input.split_whitespace(),
    };

    let (name, flag) = parser.phrase("root state")?;
    if name.is_empty() {
        return Err(PersistError::MissingName {
            context: "root state",
        });
    }
    let mut tree = StateTree::new(name);
    let root = tree.root();
    parser.body(&mut tree, root, flag)?;

    let rest: Vec<&str> = parser.tokens.collect();
    if !rest.is_empty() {
        return Err(PersistError::TrailingInput(rest.join(" ")));
    }
    info!(states = tree.state_count(), "loaded state tree");
    Ok(tree)
}

struct Parser<'a> {
    tokens: SplitWhitespace<'a>,
}

impl<'a> Parser<'a> {
    /// Read tokens up to and including the next marker.
    fn phrase(&mut self, context: &'static str) -> Result<(String, &'a str), PersistError> {
        let mut words: Vec<&str> = Vec::new();
        for token in self.tokens.by_ref() {
            if is_marker(token) {
                return Ok((words.join(" "), token));
            }
            words.push(token);
        }
        Err(PersistError::UnexpectedEof { context })
    }

    fn named_phrase(&mut self, context: &'static str) -> Result<(String, &'a str), PersistError> {
        let (name, marker) = self.phrase(context)?;
        if name.is_empty() {
            return Err(PersistError::MissingName { context });
        }
        Ok((name, marker))
    }

    fn expect(marker: &str, expected: &'static str) -> Result<(), PersistError> {
        if marker == expected {
            Ok(())
        } else {
            Err(PersistError::UnexpectedMarker {
                expected,
                found: marker.to_string(),
            })
        }
    }

    fn body(&mut self, tree: &mut StateTree, state: StateId, mut flag: &'a str) -> Result<(), PersistError> {
        loop {
            flag = match flag {
                END => return Ok(()),
                CHILDREN => self.children(tree, state)?,
                TRANSITIONS => self.transitions(tree, state)?,
                TO | IS => {
                    return Err(PersistError::UnexpectedMarker {
                        expected: "`:children:`, `:transitions:` or `:end:`",
                        found: flag.to_string(),
                    })
                }
                other => return Err(PersistError::UnknownMarker(other.to_string())),
            };
        }
    }

    /// Returns the marker that closed the block.
    fn children(&mut self, tree: &mut StateTree, parent: StateId) -> Result<&'a str, PersistError> {
        loop {
            let (name, marker) = self.phrase("children block")?;
            if name.is_empty() {
                return Ok(marker);
            }
            let child = tree.create_child(parent, name)?;
            self.body(tree, child, marker)?;
        }
    }

    /// Returns the marker that closed the block.
    fn transitions(&mut self, tree: &mut StateTree, parent: StateId) -> Result<&'a str, PersistError> {
        loop {
            let (from, marker) = self.phrase("transitions block")?;
            if from.is_empty() {
                return Ok(marker);
            }
            Self::expect(marker, TO)?;
            let (to, marker) = self.named_phrase("transition target")?;
            Self::expect(marker, IS)?;
            let (trigger, marker) = self.named_phrase("transition trigger")?;
            Self::expect(marker, END)?;

            tree.link_children(parent, &from, &to, trigger)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TreeError;

    #[test]
    fn parses_leaf_root() {
        let tree = parse_tree("solo :end:").unwrap();

        assert_eq!(tree.name(tree.root()), Some("solo"));
        assert_eq!(tree.state_count(), 1);
    }

    #[test]
    fn parses_children_and_transitions() {
        let input = "
            root :children:
                b :end:
                a :end:
            :transitions:
                a :to: b :is: go :end:
                b :to: a :is: come back :end:
            :end:
        ";

        let tree = parse_tree(input).unwrap();
        let root = tree.root();
        let a = tree.find_child(root, "a").unwrap();
        let b = tree.find_child(root, "b").unwrap();

        assert_eq!(tree.entry_child(root), Some(b));
        assert_eq!(tree.resolve(a, "go"), Some(b));
        assert_eq!(tree.resolve(b, "come back"), Some(a));
    }

    #[test]
    fn names_may_contain_spaces() {
        let tree = parse_tree("front door :children: half open :end: :transitions: :end:").unwrap();

        assert_eq!(tree.name(tree.root()), Some("front door"));
        assert!(tree.find_child(tree.root(), "half open").is_some());
    }

    #[test]
    fn parses_nested_blocks() {
        let input = "top :children: mid :children: leaf :end: :transitions: :end: \
                     :transitions: :end:";

        let tree = parse_tree(input).unwrap();

        assert!(tree.find_by_path(&["mid", "leaf"]).is_some());
        assert_eq!(tree.state_count(), 3);
    }

    #[test]
    fn truncated_input_is_an_error() {
        let result = parse_tree("root :children: a :end:");

        assert!(matches!(result, Err(PersistError::UnexpectedEof { .. })));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            parse_tree("   "),
            Err(PersistError::UnexpectedEof { .. })
        ));
        assert!(matches!(
            parse_tree(":end:"),
            Err(PersistError::MissingName { .. })
        ));
    }

    #[test]
    fn unknown_marker_is_an_error() {
        let result = parse_tree("root :bogus:");

        assert!(matches!(result, Err(PersistError::UnknownMarker(m)) if m == ":bogus:"));
    }

    #[test]
    fn misplaced_marker_is_an_error() {
        let result = parse_tree("root :children: :transitions: a :is: b :end: :end:");

        assert!(matches!(
            result,
            Err(PersistError::UnexpectedMarker { found, .. }) if found == ":is:"
        ));
    }

    #[test]
    fn transition_to_unknown_child_is_an_error() {
        let result = parse_tree("root :children: a :end: :transitions: a :to: z :is: go :end: :end:");

        assert!(matches!(
            result,
            Err(PersistError::Tree(TreeError::UnknownChild { .. }))
        ));
    }

    #[test]
    fn duplicate_child_is_an_error() {
        let result = parse_tree("root :children: a :end: a :end: :transitions: :end:");

        assert!(matches!(
            result,
            Err(PersistError::Tree(TreeError::DuplicateChild { .. }))
        ));
    }

    #[test]
    fn trailing_input_is_an_error() {
        let result = parse_tree("root :end: extra");

        assert!(matches!(result, Err(PersistError::TrailingInput(rest)) if rest == "extra"));
    }
}

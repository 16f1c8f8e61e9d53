//! Plain-text save and load for state trees.
//!
//! The format is whitespace-delimited and recursive:
//!
//! ```text
//! door :children:
//!     locked :children:
//!         closed :end:
//!     :transitions:
//!     :end:
//!     unlocked :end:
//! :transitions:
//!     locked :to: unlocked :is: unlock :end:
//!     unlocked :to: locked :is: lock :end:
//! :end:
//! ```
//!
//! Each state writes its name, then either `:end:` (leaf) or a children block
//! followed by one transitions block listing every child's outgoing
//! transitions. The entry child is always written first among its siblings.
//!
//! Only transitions declared on descendants of the saved state are written.
//! A transition declared on the saved state itself has no place in the
//! format, so validating saves refuse such a tree with
//! [`Violation::TopLevelTransition`](crate::validation::Violation::TopLevelTransition).

mod error;
mod reader;
mod writer;

pub use error::PersistError;
pub use reader::parse_tree;
pub use writer::save_state;

use crate::core::StateTree;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

pub const CHILDREN: &str = ":children:";
pub const TRANSITIONS: &str = ":transitions:";
pub const TO: &str = ":to:";
pub const IS: &str = ":is:";
pub const END: &str = ":end:";

/// Whether `token` is shaped like a format marker (`:name:`).
pub fn is_marker(token: &str) -> bool {
    token.len() >= 2 && token.starts_with(':') && token.ends_with(':')
}

/// Options controlling how trees are written.
///
/// # Example
///
/// ```rust
/// use statetree::persist::TextFormat;
///
/// let format: TextFormat = serde_json::from_str(r#"{ "indent": "    " }"#).unwrap();
/// assert_eq!(format.indent, "    ");
/// assert!(format.validate);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextFormat {
    /// Indentation written once per nesting level; whitespace only
    pub indent: String,

    /// Refuse to write trees whose names or triggers would not read back
    pub validate: bool,
}

impl Default for TextFormat {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            validate: true,
        }
    }
}

impl TextFormat {
    pub fn with_indent(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
            ..Self::default()
        }
    }
}

/// Write the whole tree with the default format.
pub fn save<W: Write>(tree: &StateTree, writer: &mut W) -> Result<(), PersistError> {
    save_with(tree, writer, &TextFormat::default())
}

pub fn save_with<W: Write>(
    tree: &StateTree,
    writer: &mut W,
    format: &TextFormat,
) -> Result<(), PersistError> {
    save_state(tree, tree.root(), writer, format)
}

/// Render the whole tree to a string with the default format.
pub fn to_text(tree: &StateTree) -> Result<String, PersistError> {
    let mut out = Vec::new();
    save(tree, &mut out)?;
    String::from_utf8(out)
        .map_err(|e| PersistError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Read a complete tree from `reader`.
pub fn load<R: Read>(mut reader: R) -> Result<StateTree, PersistError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    parse_tree(&input)
}

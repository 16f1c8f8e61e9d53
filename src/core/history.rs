//! Timestamped log of applied triggers.
//!
//! Each record keeps the full hierarchy of the leaf before and after the
//! trigger, since leaf names alone are only unique among siblings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single successful trigger.
///
/// `from` and `to` are hierarchies in navigator order: the leaf first, the
/// root last.
///
/// # Example
///
/// ```rust
/// use statetree::core::TransitionRecord;
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     from: vec!["closed".into(), "unlocked".into(), "door".into()],
///     to: vec!["opened".into(), "unlocked".into(), "door".into()],
///     trigger: "open".into(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.to_leaf(), Some("opened"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Hierarchy of the leaf the trigger was applied to
    pub from: Vec<String>,
    /// Hierarchy of the leaf that became active
    pub to: Vec<String>,
    /// The trigger that was applied
    pub trigger: String,
    /// When the trigger was applied
    pub timestamp: DateTime<Utc>,
}

impl TransitionRecord {
    pub fn from_leaf(&self) -> Option<&str> {
        self.from.first().map(String::as_str)
    }

    pub fn to_leaf(&self) -> Option<&str> {
        self.to.first().map(String::as_str)
    }
}

/// Ordered history of applied triggers.
///
/// # Example
///
/// ```rust
/// use statetree::core::{TransitionHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let mut history = TransitionHistory::new();
/// history.record(TransitionRecord {
///     from: vec!["red".into(), "light".into()],
///     to: vec!["green".into(), "light".into()],
///     trigger: "go".into(),
///     timestamp: Utc::now(),
/// });
/// history.record(TransitionRecord {
///     from: vec!["green".into(), "light".into()],
///     to: vec!["amber".into(), "light".into()],
///     trigger: "slow".into(),
///     timestamp: Utc::now(),
/// });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 3); // red -> green -> amber
/// assert_eq!(path[2][0], "amber");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionHistory {
    transitions: Vec<TransitionRecord>,
}

impl TransitionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn record(&mut self, transition: TransitionRecord) {
        self.transitions.push(transition);
    }

    /// Hierarchies visited in order: the first record's origin, then the
    /// destination of every record.
    pub fn get_path(&self) -> Vec<&[String]> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from.as_slice());
        }
        for transition in &self.transitions {
            path.push(transition.to.as_slice());
        }
        path
    }

    /// Time between the first and last record, `None` when empty.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.transitions.last()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }

    /// Drop the oldest records so that at most `limit` remain.
    pub fn keep_last(&mut self, limit: usize) {
        let excess = self.transitions.len().saturating_sub(limit);
        self.transitions.drain(..excess);
    }
}

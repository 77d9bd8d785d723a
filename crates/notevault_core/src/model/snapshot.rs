//! Snapshot and bounded history stack.
//!
//! # Responsibility
//! - Capture editable note fields at a point in time.
//! - Keep undo/redo stacks bounded with FIFO eviction.
//!
//! # Invariants
//! - A `Snapshot` is never mutated after it is pushed.
//! - `HistoryStack::len()` never exceeds `MAX_HISTORY`.
//! - Eviction always drops the oldest entry (head) first.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of entries kept per history stack.
pub const MAX_HISTORY: usize = 20;

/// Immutable capture of a note's editable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub title: String,
    pub content: String,
    /// Unix epoch milliseconds at capture time.
    pub captured_at: i64,
}

impl Snapshot {
    pub fn new(title: impl Into<String>, content: impl Into<String>, captured_at: i64) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            captured_at,
        }
    }

    /// Returns whether the captured text equals the given title/content pair.
    pub fn matches(&self, title: &str, content: &str) -> bool {
        self.title == title && self.content == content
    }
}

/// Ordered snapshot stack, newest at the tail.
///
/// Serialized as a plain array so read models stay schema-friendly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryStack {
    entries: VecDeque<Snapshot>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes onto the tail, evicting from the head while over capacity.
    ///
    /// Returns the number of evicted entries.
    pub fn push(&mut self, snapshot: Snapshot) -> usize {
        self.entries.push_back(snapshot);
        let mut evicted = 0;
        while self.entries.len() > MAX_HISTORY {
            self.entries.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Removes and returns the newest entry.
    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    /// Returns the newest entry without removing it.
    pub fn peek(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.entries.get(index)
    }

    pub fn to_vec(&self) -> Vec<Snapshot> {
        self.entries.iter().cloned().collect()
    }
}

impl FromIterator<Snapshot> for HistoryStack {
    /// Builds a stack from oldest-to-newest entries, applying eviction.
    fn from_iter<T: IntoIterator<Item = Snapshot>>(iter: T) -> Self {
        let mut stack = Self::new();
        for snapshot in iter {
            stack.push(snapshot);
        }
        stack
    }
}

#[cfg(test)]
mod tests {
    use super::{HistoryStack, Snapshot, MAX_HISTORY};

    fn snap(index: usize) -> Snapshot {
        Snapshot::new(format!("t{index}"), format!("c{index}"), index as i64)
    }

    #[test]
    fn push_evicts_oldest_first() {
        let mut stack = HistoryStack::new();
        let mut evicted = 0;
        for index in 0..=MAX_HISTORY {
            evicted += stack.push(snap(index));
        }

        assert_eq!(evicted, 1);
        assert_eq!(stack.len(), MAX_HISTORY);
        assert_eq!(stack.get(0).map(|s| s.title.as_str()), Some("t1"));
        assert_eq!(
            stack.peek().map(|s| s.title.clone()),
            Some(format!("t{MAX_HISTORY}"))
        );
    }

    #[test]
    fn pop_takes_newest() {
        let mut stack: HistoryStack = (0..3).map(snap).collect();
        assert_eq!(stack.pop().map(|s| s.captured_at), Some(2));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn serializes_as_plain_array() {
        let stack: HistoryStack = (0..2).map(snap).collect();
        let json = serde_json::to_value(&stack).expect("stack should serialize");
        assert!(json.is_array());
        assert_eq!(json.as_array().map(Vec::len), Some(2));
    }
}

//! Bounded, ordered history of conversation turns.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Author of a [`Turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Role name as the remote service spells it.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("invalid window configuration: {0}")]
    InvalidConfig(String),
}

/// FIFO of turns holding at most `capacity` entries.
///
/// Appending past capacity evicts from the oldest end. Eviction does not
/// look at roles, so the window can start with a model turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationWindow {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl Default for ConversationWindow {
    fn default() -> Self {
        Self {
            turns: VecDeque::new(),
            capacity: super::DEFAULT_HISTORY,
        }
    }
}

impl ConversationWindow {
    /// Create an empty window.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::InvalidConfig`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, WindowError> {
        if capacity == 0 {
            return Err(WindowError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            turns: VecDeque::with_capacity(capacity.min(256)),
            capacity,
        })
    }

    /// Push a turn at the tail, evicting the oldest turns past capacity.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// Independent copy of the current turns, oldest first.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(window: &ConversationWindow) -> Vec<&str> {
        window.iter().map(Turn::text).collect()
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert!(matches!(
            ConversationWindow::new(0),
            Err(WindowError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_new_window_is_empty() {
        let window = ConversationWindow::new(4).unwrap();
        assert!(window.is_empty());
        assert_eq!(window.len(), 0);
        assert_eq!(window.capacity(), 4);
        assert!(window.snapshot().is_empty());
    }

    #[test]
    fn test_append_evicts_oldest() {
        let mut window = ConversationWindow::new(3).unwrap();
        for text in ["A", "B", "C", "D"] {
            window.append(Turn::user(text));
        }
        assert_eq!(texts(&window), vec!["B", "C", "D"]);
    }

    #[test]
    fn test_eviction_ignores_roles() {
        let mut window = ConversationWindow::new(2).unwrap();
        window.append(Turn::user("q1"));
        window.append(Turn::model("a1"));
        window.append(Turn::user("q2"));
        let snapshot = window.snapshot();
        assert_eq!(snapshot[0], Turn::model("a1"));
        assert_eq!(snapshot[1], Turn::user("q2"));
    }

    #[test]
    fn test_capacity_one_keeps_latest() {
        let mut window = ConversationWindow::new(1).unwrap();
        window.append(Turn::user("first"));
        window.append(Turn::model("second"));
        assert_eq!(window.snapshot(), vec![Turn::model("second")]);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut window = ConversationWindow::new(3).unwrap();
        window.append(Turn::user("A"));
        let snapshot = window.snapshot();
        window.append(Turn::user("B"));
        window.clear();
        assert_eq!(snapshot, vec![Turn::user("A")]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut window = ConversationWindow::new(5).unwrap();
        window.append(Turn::user("A"));
        window.append(Turn::model("B"));
        window.clear();
        assert!(window.snapshot().is_empty());
        assert_eq!(window.capacity(), 5);
        window.append(Turn::user("C"));
        assert_eq!(texts(&window), vec!["C"]);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), "\"model\"");
        assert_eq!(Role::Model.to_string(), "model");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn window_keeps_most_recent_suffix(
                capacity in 1usize..20,
                items in prop::collection::vec("[a-z]{1,4}", 0..60),
            ) {
                let mut window = ConversationWindow::new(capacity).unwrap();
                for item in &items {
                    window.append(Turn::user(item.clone()));
                    prop_assert!(window.len() <= capacity);
                }
                let keep = items.len().min(capacity);
                let expected: Vec<&str> = items[items.len() - keep..]
                    .iter()
                    .map(String::as_str)
                    .collect();
                prop_assert_eq!(texts(&window), expected);
            }
        }
    }
}

//! Conversation history: an append-only sequence of turns.
//!
//! The history is a plain value owned by the caller and threaded through
//! [`ChatSession::process`](crate::session::ChatSession::process). The only
//! mutations are [`History::push`] and the bulk [`History::clear`].

use serde::{Deserialize, Serialize};

/// One (request, response) exchange. Immutable once recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub request: String,
    pub response: String,
}

impl Turn {
    pub fn new(request: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            response: response.into(),
        }
    }
}

/// Ordered conversation history, oldest turn first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Remove every turn and return the (now empty) sequence.
    pub fn clear(&mut self) -> &[Turn] {
        self.turns.clear();
        &self.turns
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }
}

impl From<Vec<Turn>> for History {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_submission_order() {
        let mut history = History::new();
        history.push(Turn::new("first", "1"));
        history.push(Turn::new("second", "2"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.turns()[0].request, "first");
        assert_eq!(history.last().unwrap().response, "2");
    }

    #[test]
    fn clear_always_yields_empty() {
        let mut history = History::from(vec![Turn::new("a", "b"), Turn::new("c", "d")]);
        assert!(history.clear().is_empty());
        assert!(history.is_empty());

        // Clearing an already-empty history is fine.
        assert!(history.clear().is_empty());
    }

    #[test]
    fn serializes_as_plain_array() {
        let history = History::from(vec![Turn::new("q", "a")]);
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json, serde_json::json!([{"request": "q", "response": "a"}]));

        let back: History = serde_json::from_value(json).unwrap();
        assert_eq!(back, history);
    }
}

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_HISTORY_LIMIT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Error turns are shown to the user but never replayed to the model.
    #[serde(default)]
    pub is_error: bool,
}

/// Append-only session history capped at a fixed number of turns; the oldest
/// turn is evicted first.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<ConversationTurn>,
    capacity: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_LIMIT)
    }
}

impl ConversationHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(TurnRole::User, text.into(), false);
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.push(TurnRole::Assistant, text.into(), false);
    }

    pub fn push_error(&mut self, text: impl Into<String>) {
        self.push(TurnRole::Assistant, text.into(), true);
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ConversationTurn> + '_ {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.back()
    }

    /// The newest `count` turns, oldest first.
    pub fn recent(&self, count: usize) -> Vec<&ConversationTurn> {
        let skip = self.turns.len().saturating_sub(count);
        self.turns.iter().skip(skip).collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    fn push(&mut self, role: TurnRole, text: String, is_error: bool) {
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(ConversationTurn {
            role,
            text,
            timestamp: Utc::now(),
            is_error,
        });
    }
}

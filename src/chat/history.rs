//! Bounded in-memory conversation history.

use std::collections::VecDeque;
use std::fmt;

/// Maximum number of turns kept (five user/assistant exchanges).
///
/// A fixed count, not a token budget.
pub const MAX_HISTORY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Rolling, in-memory conversation record.
///
/// Oldest turns are evicted first once more than [`MAX_HISTORY`]
/// are held.
#[derive(Debug, Default)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self {
            turns: VecDeque::with_capacity(MAX_HISTORY + 2),
        }
    }

    /// Appends a user turn and the assistant's reply, then trims.
    pub fn push_exchange(&mut self, user_input: &str, reply: &str) {
        self.turns.push_back(Turn {
            role: Role::User,
            content: user_input.to_string(),
        });
        self.turns.push_back(Turn {
            role: Role::Assistant,
            content: reply.to_string(),
        });
        while self.turns.len() > MAX_HISTORY {
            self.turns.pop_front();
        }
    }

    /// Turns in chronological order (oldest first).
    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Owned copy of the turns, oldest first.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

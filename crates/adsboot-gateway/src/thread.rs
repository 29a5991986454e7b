//! Conversation threads for multi-turn chat

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    /// Sent on the wire as `model`
    #[serde(rename = "model")]
    Assistant,
}

impl Role {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "model",
        }
    }
}

/// One message in a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    /// Display only; never sent to the backend
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }
}

/// A turn as replayed to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
}

/// Ordered, append-only log of turns for one chat surface
///
/// Turns are never edited or reordered. [`reset`](Self::reset) is the only
/// way to shrink a thread and it discards everything but the seed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationThread {
    turns: Vec<ConversationTurn>,
    /// Auxiliary context injected into the first user turn after a reset
    context: Option<String>,
}

impl ConversationThread {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a single seed turn (usually an assistant greeting)
    pub fn seeded(seed: ConversationTurn) -> Self {
        Self {
            turns: vec![seed],
            context: None,
        }
    }

    pub fn with_context(seed: ConversationTurn, context: impl Into<String>) -> Self {
        Self {
            turns: vec![seed],
            context: Some(context.into()),
        }
    }

    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// Drop all history and start over from `seed`. Irreversible.
    pub fn reset(&mut self, seed: ConversationTurn) {
        log::debug!("Resetting thread ({} turns discarded)", self.turns.len());
        self.turns.clear();
        self.turns.push(seed);
    }

    /// Replace the carried context, e.g. after results were regenerated
    pub fn set_context(&mut self, context: Option<String>) {
        self.context = context;
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// No user turn has been appended since creation or the last reset
    pub fn is_fresh(&self) -> bool {
        !self.turns.iter().any(|turn| turn.role == Role::User)
    }

    /// Role and text of every turn in insertion order
    pub fn to_history_payload(&self) -> Vec<HistoryEntry> {
        self.turns
            .iter()
            .map(|turn| HistoryEntry {
                role: turn.role,
                text: turn.text.clone(),
            })
            .collect()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

//! Conversation history storage
//!
//! Keeps the most recent user/advisor exchanges. Older messages are
//! dropped from the front once the bound is reached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Advisor,
}

impl MessageRole {
    /// Role name expected by the Gemini `contents` array
    pub fn as_provider_role(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Advisor => "model",
        }
    }
}

/// A single message in the conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub message_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub role: MessageRole,
    pub content: String,
}

impl ConversationMessage {
    pub fn new(role: MessageRole, content: String) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            role,
            content,
        }
    }
}

/// Bounded conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationHistory {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    messages: VecDeque<ConversationMessage>,
    /// Two messages per exchange
    max_messages: usize,
}

impl ConversationHistory {
    /// History that keeps at most `max_exchanges` question/answer pairs
    pub fn new(max_exchanges: usize) -> Self {
        let max_messages = max_exchanges * 2;

        Self {
            created_at: Utc::now(),
            updated_at: Utc::now(),
            messages: VecDeque::with_capacity(max_messages),
            max_messages,
        }
    }

    /// Record a completed exchange, evicting the oldest messages if needed
    pub fn record_exchange(&mut self, question: &str, answer: &str) {
        self.push(ConversationMessage::new(MessageRole::User, question.to_string()));
        self.push(ConversationMessage::new(MessageRole::Advisor, answer.to_string()));
    }

    pub fn push(&mut self, message: ConversationMessage) {
        if self.max_messages == 0 {
            return;
        }

        self.messages.push_back(message);
        while self.messages.len() > self.max_messages {
            self.messages.pop_front();
        }
        self.updated_at = Utc::now();
    }

    /// Iterate over all messages, oldest first
    pub fn messages(&self) -> impl Iterator<Item = &ConversationMessage> {
        self.messages.iter()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Change the bound, trimming from the front if it shrank
    pub fn set_max_exchanges(&mut self, max_exchanges: usize) {
        self.max_messages = max_exchanges * 2;
        while self.messages.len() > self.max_messages {
            self.messages.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.updated_at = Utc::now();
    }
}

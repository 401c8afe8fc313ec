//! Chat session
//!
//! Transcript of the advisor panel. Starts with a welcome message, ignores
//! blank input, and keeps the welcome message when cleared.

use crate::advisor::FinancialAdvisor;
use crate::models::{AdviceCategory, AdviceResponse, FinancialSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

const WELCOME_MESSAGE: &str = "Hi, I'm Finley, your financial advisor. I've looked over your \
numbers and I'm ready to help. Ask me about budgeting, saving, investing, debt, or your goals.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<AdviceCategory>,
}

impl ChatMessage {
    fn user(content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            is_user: true,
            timestamp: Utc::now(),
            category: None,
        }
    }

    fn advisor(content: String, category: AdviceCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            is_user: false,
            timestamp: Utc::now(),
            category: Some(category),
        }
    }
}

pub struct ChatSession {
    advisor: Arc<FinancialAdvisor>,
    messages: RwLock<Vec<ChatMessage>>,
    /// Held for a whole question/answer turn so exchanges never interleave
    turn: Mutex<()>,
}

impl ChatSession {
    pub fn new(advisor: Arc<FinancialAdvisor>) -> Self {
        Self {
            advisor,
            messages: RwLock::new(vec![welcome()]),
            turn: Mutex::new(()),
        }
    }

    /// Send a user message and append the advisor's reply.
    /// Returns `None` without touching the transcript for blank input.
    pub async fn send_message(
        &self,
        content: &str,
        snapshot: &FinancialSnapshot,
    ) -> Option<AdviceResponse> {
        let content = content.trim();
        if content.is_empty() {
            debug!("Ignoring blank chat message");
            return None;
        }

        let _turn = self.turn.lock().await;

        self.messages
            .write()
            .await
            .push(ChatMessage::user(content.to_string()));

        let advice = self.advisor.get_advice(content, snapshot).await;

        self.messages
            .write()
            .await
            .push(ChatMessage::advisor(advice.content.clone(), advice.category));

        Some(advice)
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    /// Drop everything except the welcome message
    pub async fn clear(&self) {
        let _turn = self.turn.lock().await;
        let mut messages = self.messages.write().await;
        messages.truncate(1);
    }
}

fn welcome() -> ChatMessage {
    ChatMessage::advisor(WELCOME_MESSAGE.to_string(), AdviceCategory::General)
}

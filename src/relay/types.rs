//! Chat completion wire types

use serde::Serialize;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
}

/// Message in a chat request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Non-streaming chat request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub stream: bool,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Single-shot request: one user message, no history
    #[must_use]
    pub fn single_user(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            stream: false,
            messages: vec![ChatMessage {
                role: ChatRole::User,
                content: text.into(),
            }],
        }
    }
}

/// Completion text returned by a backend, already trimmed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatReply {
    pub content: String,
}

impl ChatReply {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

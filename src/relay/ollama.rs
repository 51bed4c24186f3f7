//! Ollama-compatible chat backend

use super::types::{ChatReply, ChatRequest};
use super::{ChatBackend, RelayConfig, RelayError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Backend talking to a local Ollama `/api/chat` endpoint
pub struct OllamaBackend {
    client: Client,
    chat_url: String,
    model_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    message: Option<OllamaMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OllamaBackend {
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be constructed.
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RelayError::unavailable(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            chat_url: config.chat_url(),
            model_id: config.model.clone(),
        })
    }

    fn normalize_response(body: &str) -> Result<ChatReply, RelayError> {
        let parsed: OllamaChatResponse = serde_json::from_str(body)
            .map_err(|e| RelayError::decode(format!("Invalid chat response: {e}")))?;

        let content = parsed
            .message
            .and_then(|m| m.content)
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(ChatReply { content })
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, RelayError> {
        let response = self
            .client
            .post(&self.chat_url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RelayError::transport(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    RelayError::transport(format!("Connection failed: {e}"))
                } else {
                    RelayError::transport(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        // An unreadable error body still reports the status
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(RelayError::http(status.as_u16(), &body));
        }

        Self::normalize_response(&body)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

//! Relay to a local language model
//!
//! Each relayed turn is a single, stateless chat completion. Failures
//! never cross this boundary as errors; they come back as
//! [`RelayOutcome::Failed`].

mod config;
mod error;
mod ollama;
#[cfg(test)]
pub mod testing;
mod types;

pub use config::RelayConfig;
pub use error::{RelayError, RelayErrorKind};
pub use ollama::OllamaBackend;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Reply used when the relay is opened without any text
pub const RELAY_READY: &str = "Pro Mode ist aktiv (Local LLM). Sag oder tippe etwas.";
/// Reply used when the model answers with an empty completion
pub const EMPTY_COMPLETION: &str = "Keine Antwort erhalten.";

/// Common interface for chat completion backends
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, RelayError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for chat backends
pub struct LoggingBackend {
    inner: Arc<dyn ChatBackend>,
    model_id: String,
}

impl LoggingBackend {
    #[must_use]
    pub fn new(inner: Arc<dyn ChatBackend>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl ChatBackend for LoggingBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, RelayError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    reply_chars = reply.content.chars().count(),
                    "Relay request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Relay request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Outcome of a relayed turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Replied { reply: String },
    Failed { error: String },
}

impl RelayOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, RelayOutcome::Replied { .. })
    }
}

/// Relay client: one stateless completion per turn
#[derive(Clone)]
pub struct Relay {
    backend: Arc<dyn ChatBackend>,
}

impl Relay {
    #[must_use]
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Build the production relay: Ollama backend wrapped with logging
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be constructed.
    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        let backend = OllamaBackend::new(config)?;
        Ok(Self::new(Arc::new(LoggingBackend::new(Arc::new(backend)))))
    }

    #[must_use]
    pub fn model_id(&self) -> &str {
        self.backend.model_id()
    }

    /// Relay `user_text` to the model.
    ///
    /// Empty text answers with [`RELAY_READY`] without contacting the
    /// service.
    pub async fn relay(&self, user_text: &str) -> RelayOutcome {
        let text = user_text.trim();
        if text.is_empty() {
            return RelayOutcome::Replied {
                reply: RELAY_READY.to_string(),
            };
        }

        let request = ChatRequest::single_user(self.backend.model_id(), text);
        match self.backend.complete(&request).await {
            Ok(reply) if reply.is_empty() => RelayOutcome::Replied {
                reply: EMPTY_COMPLETION.to_string(),
            },
            Ok(reply) => RelayOutcome::Replied {
                reply: reply.content,
            },
            Err(e) => RelayOutcome::Failed { error: e.message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedBackend;
    use super::*;

    #[tokio::test]
    async fn test_empty_text_short_circuits() {
        let backend = Arc::new(ScriptedBackend::new("test-model"));
        let relay = Relay::new(backend.clone());

        let outcome = relay.relay("   ").await;

        assert_eq!(
            outcome,
            RelayOutcome::Replied {
                reply: RELAY_READY.to_string()
            }
        );
        assert!(backend.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_reply_is_passed_through() {
        let backend = Arc::new(ScriptedBackend::new("test-model"));
        backend.queue_reply("Guten Tag!");
        let relay = Relay::new(backend.clone());

        let outcome = relay.relay("  Hallo  ").await;

        assert_eq!(
            outcome,
            RelayOutcome::Replied {
                reply: "Guten Tag!".to_string()
            }
        );
        let requests = backend.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0], ChatRequest::single_user("test-model", "Hallo"));
    }

    #[tokio::test]
    async fn test_empty_completion_gets_default_text() {
        let backend = Arc::new(ScriptedBackend::new("test-model"));
        backend.queue_reply("");
        let relay = Relay::new(backend);

        let outcome = relay.relay("Hallo").await;

        assert_eq!(
            outcome,
            RelayOutcome::Replied {
                reply: EMPTY_COMPLETION.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_backend_error_becomes_failed_outcome() {
        let backend = Arc::new(ScriptedBackend::new("test-model"));
        backend.queue_error(RelayError::http(500, "boom"));
        let relay = Relay::new(backend);

        let outcome = relay.relay("Hallo").await;

        assert!(!outcome.is_ok());
        assert_eq!(
            outcome,
            RelayOutcome::Failed {
                error: "HTTP 500 boom".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_logging_backend_keeps_model_id() {
        let inner = Arc::new(ScriptedBackend::new("llama3.1:8b"));
        inner.queue_reply("ok");
        let logged = LoggingBackend::new(inner);

        assert_eq!(logged.model_id(), "llama3.1:8b");
        let reply = logged
            .complete(&ChatRequest::single_user("llama3.1:8b", "hi"))
            .await
            .unwrap();
        assert_eq!(reply.content, "ok");
    }
}

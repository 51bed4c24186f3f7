//! Mock chat backend for tests

use super::{ChatBackend, ChatReply, ChatRequest, RelayError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Backend that returns queued results and records every request
pub struct ScriptedBackend {
    results: Mutex<VecDeque<Result<ChatReply, RelayError>>>,
    model_id: String,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedBackend {
    #[must_use]
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_reply(&self, content: impl Into<String>) {
        self.results.lock().unwrap().push_back(Ok(ChatReply {
            content: content.into(),
        }));
    }

    pub fn queue_error(&self, error: RelayError) {
        self.results.lock().unwrap().push_back(Err(error));
    }

    #[must_use]
    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, RelayError> {
        self.requests.lock().unwrap().push(request.clone());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RelayError::transport("No scripted reply queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

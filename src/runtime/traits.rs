//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use super::{CaptureEvent, Event};
use crate::relay::{Relay, RelayOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Speech playback failed; playback errors never end a turn
#[derive(Debug, Error)]
#[error("speech output failed: {0}")]
pub struct SpeechError(pub String);

/// Speech capture could not be started
#[derive(Debug, Error)]
#[error("speech capture failed: {0}")]
pub struct CaptureError(pub String);

/// Client for relayed turns
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn relay(&self, user_text: &str) -> RelayOutcome;
}

/// Text-to-speech collaborator
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Whether the platform can speak at all
    fn is_available(&self) -> bool;

    /// Speak `text`, resolving once playback has completed
    ///
    /// # Errors
    ///
    /// Playback could not start or was interrupted by the platform.
    async fn speak(&self, text: &str, locale: &str) -> Result<(), SpeechError>;

    /// Stop playback immediately
    fn cancel(&self);
}

/// Speech-to-text collaborator
///
/// Results are reported through the [`CaptureSink`] handed to `start`:
/// any number of interim texts, at most one final text, then an end.
pub trait SpeechInput: Send + Sync {
    fn is_available(&self) -> bool;

    /// Begin capturing; results arrive through `sink`
    ///
    /// # Errors
    ///
    /// The recognizer refused to start, e.g. no microphone permission.
    fn start(&self, locale: &str, sink: CaptureSink) -> Result<(), CaptureError>;

    /// Finish capture and deliver what was heard
    fn stop(&self);

    /// Drop capture without delivering results
    fn abort(&self);
}

/// Channel through which a capture reports back to its conversation
#[derive(Debug, Clone)]
pub struct CaptureSink {
    capture_id: u64,
    event_tx: mpsc::Sender<Event>,
}

impl CaptureSink {
    pub(crate) fn new(capture_id: u64, event_tx: mpsc::Sender<Event>) -> Self {
        Self {
            capture_id,
            event_tx,
        }
    }

    /// Id of the capture this sink reports for
    #[must_use]
    pub fn capture_id(&self) -> u64 {
        self.capture_id
    }

    pub async fn send(&self, event: CaptureEvent) {
        let event = Event::Capture {
            capture_id: self.capture_id,
            event,
        };
        if self.event_tx.send(event).await.is_err() {
            tracing::debug!("Capture event dropped, runtime stopped");
        }
    }

    pub async fn interim(&self, text: impl Into<String>) {
        self.send(CaptureEvent::Interim(text.into())).await;
    }

    pub async fn final_text(&self, text: impl Into<String>) {
        self.send(CaptureEvent::Final(text.into())).await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.send(CaptureEvent::Error(message.into())).await;
    }

    pub async fn end(&self) {
        self.send(CaptureEvent::End).await;
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[async_trait]
impl RelayClient for Relay {
    async fn relay(&self, user_text: &str) -> RelayOutcome {
        Relay::relay(self, user_text).await
    }
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: RelayClient + ?Sized> RelayClient for Arc<T> {
    async fn relay(&self, user_text: &str) -> RelayOutcome {
        (**self).relay(user_text).await
    }
}

#[async_trait]
impl<T: SpeechOutput + ?Sized> SpeechOutput for Arc<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    async fn speak(&self, text: &str, locale: &str) -> Result<(), SpeechError> {
        (**self).speak(text, locale).await
    }

    fn cancel(&self) {
        (**self).cancel();
    }
}

impl<T: SpeechInput + ?Sized> SpeechInput for Arc<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn start(&self, locale: &str, sink: CaptureSink) -> Result<(), CaptureError> {
        (**self).start(locale, sink)
    }

    fn stop(&self) {
        (**self).stop();
    }

    fn abort(&self) {
        (**self).abort();
    }
}

//! Mock implementations for testing
//!
//! These mocks enable runtime tests without a model server or audio devices.

use super::traits::*;
use super::{Mode, RuntimeHandle, RuntimeSettings, Snapshot, SpeechTiming};
use crate::relay::{RelayOutcome, RELAY_READY};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

/// Settings with no playback pauses
#[must_use]
pub fn settings(mode: Mode) -> RuntimeSettings {
    RuntimeSettings {
        initial_mode: mode,
        locale: "de-DE".to_string(),
        timing: SpeechTiming::immediate(),
    }
}

/// Poll snapshots until `predicate` holds
pub async fn wait_for(handle: &RuntimeHandle, predicate: impl Fn(&Snapshot) -> bool) -> Snapshot {
    for _ in 0..200 {
        let snapshot = handle.snapshot().await.unwrap();
        if predicate(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Timed out waiting for runtime state");
}

// ============================================================================
// Mock Relay
// ============================================================================

/// Relay that answers from a queue. Empty text opens with [`RELAY_READY`]
/// like the real relay.
pub struct MockRelay {
    outcomes: Mutex<VecDeque<RelayOutcome>>,
    texts: Mutex<Vec<String>>,
    gate: Option<Notify>,
}

impl MockRelay {
    #[must_use]
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            texts: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Every call waits for [`MockRelay::release`]
    #[must_use]
    pub fn gated() -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::new()
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn queue(&self, outcome: RelayOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// Texts of every call so far
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelayClient for MockRelay {
    async fn relay(&self, user_text: &str) -> RelayOutcome {
        self.texts.lock().unwrap().push(user_text.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if user_text.trim().is_empty() {
            return RelayOutcome::Replied {
                reply: RELAY_READY.to_string(),
            };
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| RelayOutcome::Failed {
                error: "No mock outcome queued".to_string(),
            })
    }
}

// ============================================================================
// Mock Speech Output
// ============================================================================

/// Speech output that records what it was asked to say
pub struct RecordingSpeech {
    available: bool,
    /// Never finish playback on its own
    blocking: bool,
    spoken: Mutex<Vec<String>>,
    cancels: AtomicUsize,
}

impl RecordingSpeech {
    #[must_use]
    pub fn new() -> Self {
        Self {
            available: true,
            blocking: false,
            spoken: Mutex::new(Vec::new()),
            cancels: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn blocking() -> Self {
        Self {
            blocking: true,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    #[must_use]
    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechOutput for RecordingSpeech {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn speak(&self, text: &str, _locale: &str) -> Result<(), SpeechError> {
        self.spoken.lock().unwrap().push(text.to_string());
        if self.blocking {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Mock Speech Input
// ============================================================================

/// Speech input that hands its sink to the test
pub struct MockSpeechInput {
    available: bool,
    sinks: Mutex<Vec<CaptureSink>>,
    stops: AtomicUsize,
    aborts: AtomicUsize,
}

impl MockSpeechInput {
    #[must_use]
    pub fn new() -> Self {
        Self {
            available: true,
            sinks: Mutex::new(Vec::new()),
            stops: AtomicUsize::new(0),
            aborts: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Sink of the most recent capture
    #[must_use]
    pub fn last_sink(&self) -> Option<CaptureSink> {
        self.sinks.lock().unwrap().last().cloned()
    }

    #[must_use]
    pub fn start_count(&self) -> usize {
        self.sinks.lock().unwrap().len()
    }

    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn abort_count(&self) -> usize {
        self.aborts.load(Ordering::SeqCst)
    }
}

impl SpeechInput for MockSpeechInput {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&self, _locale: &str, sink: CaptureSink) -> Result<(), CaptureError> {
        self.sinks.lock().unwrap().push(sink);
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn abort(&self) {
        self.aborts.fetch_add(1, Ordering::SeqCst);
    }
}

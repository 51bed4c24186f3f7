//! Runtime for live conversations
//!
//! One actor per conversation owns the mode, dialogue state, transcript and
//! busy status. Callers talk to it through a [`RuntimeHandle`]; everything it
//! does is reported as [`UiEvent`]s on a broadcast channel.

mod executor;
pub mod speech;
pub mod status;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationRuntime;
pub use speech::{NoSpeechInput, NoSpeechOutput, SpeechTiming};
pub use status::{AgentStatus, StatusError};
pub use traits::*;

use crate::dialogue::{FlowState, Slots};
use crate::relay::RelayOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};

/// How turns are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Scripted intake dialogue
    #[default]
    Browser,
    /// Free conversation relayed to the local model
    Pro,
}

impl Mode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Browser => "browser",
            Mode::Pro => "pro",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" => Ok(Mode::Browser),
            "pro" => Ok(Mode::Pro),
            other => Err(format!("unknown mode '{other}', expected 'browser' or 'pro'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// Transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Results reported by a running speech capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    Interim(String),
    Final(String),
    Error(String),
    End,
}

/// Settings fixed for the lifetime of a runtime
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub initial_mode: Mode,
    /// BCP-47 tag passed to speech collaborators
    pub locale: String,
    pub timing: SpeechTiming,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            initial_mode: Mode::Browser,
            locale: "de-DE".to_string(),
            timing: SpeechTiming::default(),
        }
    }
}

/// Events processed by the conversation actor
#[derive(Debug)]
pub enum Event {
    /// Typed or transcribed user text
    Submit { text: String },
    /// Typed contact for the contact step
    SubmitContact { raw: String },
    SwitchMode { mode: Mode },
    Reset,
    StartCapture,
    StopCapture,
    /// Result of the capture started with `capture_id`
    Capture {
        capture_id: u64,
        event: CaptureEvent,
    },
    StopSpeaking,
    Snapshot { reply: oneshot::Sender<Snapshot> },
    Shutdown,

    // Internal completions
    RelayCompleted { epoch: u64, outcome: RelayOutcome },
    PlaybackFinished { playback_id: u64 },
}

/// Events sent to UI subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    MessageAppended(ConversationMessage),
    TranscriptCleared,
    StatusChanged(AgentStatus),
    FlowChanged(FlowState),
    SummaryChanged(String),
    ModeChanged(Mode),
    /// Live text of the running capture
    CaptureText { text: String, is_final: bool },
    Notice(String),
}

/// Point-in-time view of a conversation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub mode: Mode,
    pub status: AgentStatus,
    pub flow_state: FlowState,
    pub slots: Slots,
    pub summary: String,
    pub messages: Vec<ConversationMessage>,
}

#[derive(Debug, Error)]
#[error("conversation runtime has stopped")]
pub struct RuntimeClosed;

/// Handle to interact with a running conversation
#[derive(Clone)]
pub struct RuntimeHandle {
    event_tx: mpsc::Sender<Event>,
    ui_tx: broadcast::Sender<UiEvent>,
}

impl RuntimeHandle {
    /// Queue an event for the conversation actor.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeClosed`] once the actor has shut down.
    pub async fn send(&self, event: Event) -> Result<(), RuntimeClosed> {
        self.event_tx.send(event).await.map_err(|_| RuntimeClosed)
    }

    /// # Errors
    ///
    /// Returns [`RuntimeClosed`] once the actor has shut down.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), RuntimeClosed> {
        self.send(Event::Submit { text: text.into() }).await
    }

    /// # Errors
    ///
    /// Returns [`RuntimeClosed`] if the actor stops before answering.
    pub async fn snapshot(&self) -> Result<Snapshot, RuntimeClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(Event::Snapshot { reply }).await?;
        rx.await.map_err(|_| RuntimeClosed)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.ui_tx.subscribe()
    }
}

/// Spawn a conversation actor and return its handle.
///
/// Must be called within a tokio runtime. The opening turn is produced
/// right away; use [`spawn_subscribed`] to observe it.
#[must_use]
pub fn spawn<R, O, I>(settings: RuntimeSettings, relay: R, speech_out: O, speech_in: I) -> RuntimeHandle
where
    R: RelayClient + 'static,
    O: SpeechOutput + 'static,
    I: SpeechInput + 'static,
{
    spawn_subscribed(settings, relay, speech_out, speech_in).0
}

/// Like [`spawn`], with a receiver subscribed before the first event
#[must_use]
pub fn spawn_subscribed<R, O, I>(
    settings: RuntimeSettings,
    relay: R,
    speech_out: O,
    speech_in: I,
) -> (RuntimeHandle, broadcast::Receiver<UiEvent>)
where
    R: RelayClient + 'static,
    O: SpeechOutput + 'static,
    I: SpeechInput + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = broadcast::channel(256);

    let runtime = ConversationRuntime::new(
        settings,
        relay,
        speech_out,
        speech_in,
        event_rx,
        event_tx.clone(),
        ui_tx.clone(),
    );
    tokio::spawn(runtime.run());

    (RuntimeHandle { event_tx, ui_tx }, ui_rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("pro".parse::<Mode>(), Ok(Mode::Pro));
        assert_eq!(" Browser ".parse::<Mode>(), Ok(Mode::Browser));
        assert!("cloud".parse::<Mode>().is_err());
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let snapshot = Snapshot {
            mode: Mode::Pro,
            status: AgentStatus::Thinking,
            flow_state: FlowState::AskName,
            slots: Slots::default(),
            summary: String::new(),
            messages: vec![],
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["mode"], "pro");
        assert_eq!(json["status"], "thinking");
        assert_eq!(json["flowState"], "ASK_NAME");
    }
}

//! Conversation actor
//!
//! Event handling is synchronous; relay requests and playback run in
//! spawned tasks that report back through the event channel.

use super::speech::{self, SpeechTiming};
use super::status::{AgentStatus, StatusError, StatusEvent, StatusGate, TurnPermit};
use super::traits::{CaptureSink, RelayClient, SpeechInput, SpeechOutput};
use super::{
    CaptureEvent, ConversationMessage, Event, Mode, Role, RuntimeSettings, Snapshot, UiEvent,
};
use crate::dialogue::{self, prompts, FlowState, Slots, TurnOutput};
use crate::relay::RelayOutcome;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

const NO_SPEECH_OUTPUT: &str = "Sprachausgabe ist nicht verfügbar. Antworten erscheinen nur als Text.";
const NO_SPEECH_INPUT: &str = "Spracheingabe ist nicht verfügbar. Bitte tippe deine Antwort.";
const CONTACT_NOT_EXPECTED: &str = "Gerade wird kein Kontakt abgefragt.";

struct Playback {
    id: u64,
    cancel: CancellationToken,
}

/// Text heard by the running capture
#[derive(Default)]
struct CaptureBuffer {
    interim: String,
    final_text: String,
}

impl CaptureBuffer {
    fn take_text(&mut self) -> String {
        let buffer = std::mem::take(self);
        let text = if buffer.final_text.trim().is_empty() {
            buffer.interim
        } else {
            buffer.final_text
        };
        text.trim().to_string()
    }
}

/// Runtime for a single conversation
pub struct ConversationRuntime<R, O, I>
where
    R: RelayClient + 'static,
    O: SpeechOutput + 'static,
    I: SpeechInput + 'static,
{
    settings: RuntimeSettings,
    mode: Mode,
    flow_state: FlowState,
    slots: Slots,
    summary: String,
    messages: Vec<ConversationMessage>,
    status: StatusGate,
    /// Bumped on every reset; relay results from older epochs are dropped
    epoch: u64,
    /// Permit of the relay request in flight
    pending_relay: Option<TurnPermit>,
    playback: Option<Playback>,
    next_playback_id: u64,
    capture: CaptureBuffer,
    /// Id of the running capture; events from any other capture are dropped
    active_capture: Option<u64>,
    next_capture_id: u64,
    reported_no_output: bool,
    reported_no_input: bool,
    relay: Arc<R>,
    speech_out: Arc<O>,
    speech_in: Arc<I>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    ui_tx: broadcast::Sender<UiEvent>,
}

impl<R, O, I> ConversationRuntime<R, O, I>
where
    R: RelayClient + 'static,
    O: SpeechOutput + 'static,
    I: SpeechInput + 'static,
{
    #[must_use]
    pub fn new(
        settings: RuntimeSettings,
        relay: R,
        speech_out: O,
        speech_in: I,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
        ui_tx: broadcast::Sender<UiEvent>,
    ) -> Self {
        Self {
            mode: settings.initial_mode,
            settings,
            flow_state: FlowState::Welcome,
            slots: Slots::default(),
            summary: String::new(),
            messages: Vec::new(),
            status: StatusGate::default(),
            epoch: 0,
            pending_relay: None,
            playback: None,
            next_playback_id: 0,
            capture: CaptureBuffer::default(),
            active_capture: None,
            next_capture_id: 0,
            reported_no_output: false,
            reported_no_input: false,
            relay: Arc::new(relay),
            speech_out: Arc::new(speech_out),
            speech_in: Arc::new(speech_in),
            event_rx,
            event_tx,
            ui_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(mode = %self.mode, "Starting conversation runtime");

        self.start_conversation();

        while let Some(event) = self.event_rx.recv().await {
            if matches!(event, Event::Shutdown) {
                break;
            }
            self.process_event(event);
        }

        self.cancel_playback();
        self.speech_in.abort();
        tracing::info!("Conversation runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        match event {
            Event::Submit { text } => self.handle_user_text(&text),
            Event::SubmitContact { raw } => self.handle_contact(&raw),
            Event::SwitchMode { mode } => {
                tracing::info!(from = %self.mode, to = %mode, "Switching mode");
                self.mode = mode;
                self.emit(UiEvent::ModeChanged(mode));
                self.start_conversation();
            }
            Event::Reset => self.start_conversation(),
            Event::StartCapture => self.start_capture(),
            Event::StopCapture => self.speech_in.stop(),
            Event::Capture { capture_id, event } => self.handle_capture(capture_id, event),
            Event::StopSpeaking => self.stop_speaking(),
            Event::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Event::RelayCompleted { epoch, outcome } => self.handle_relay_completed(epoch, outcome),
            Event::PlaybackFinished { playback_id } => self.handle_playback_finished(playback_id),
            Event::Shutdown => {}
        }
    }

    // ========================================================================
    // Conversation lifecycle
    // ========================================================================

    /// Clear everything and produce the opening turn of the current mode
    fn start_conversation(&mut self) {
        self.cancel_playback();
        self.speech_in.abort();
        self.capture = CaptureBuffer::default();
        self.active_capture = None;
        self.pending_relay = None;
        self.epoch += 1;
        self.update_status(StatusEvent::Reset);

        self.messages.clear();
        self.emit(UiEvent::TranscriptCleared);
        self.slots = Slots::default();
        self.set_flow_state(FlowState::Welcome);
        self.set_summary(String::new());

        tracing::info!(mode = %self.mode, epoch = self.epoch, "Conversation started");

        let permit = match self.status.begin_turn(self.epoch) {
            Ok(permit) => permit,
            Err(e) => {
                tracing::error!(error = %e, "Could not open conversation");
                return;
            }
        };
        self.emit_status();

        match self.mode {
            Mode::Browser => {
                let output = dialogue::turn(FlowState::Welcome, &Slots::default(), "");
                self.apply_turn(permit, output);
            }
            Mode::Pro => self.request_relay(permit, String::new()),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.mode,
            status: self.status.current(),
            flow_state: self.flow_state,
            slots: self.slots.clone(),
            summary: self.summary.clone(),
            messages: self.messages.clone(),
        }
    }

    // ========================================================================
    // Turns
    // ========================================================================

    fn handle_user_text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let permit = match self.status.begin_turn(self.epoch) {
            Ok(permit) => permit,
            Err(e) => return self.reject(e),
        };
        self.emit_status();
        self.push_message(Role::User, text);

        match self.mode {
            Mode::Browser => {
                let output = dialogue::turn(self.flow_state, &self.slots, text);
                self.apply_turn(permit, output);
            }
            Mode::Pro => self.request_relay(permit, text.to_string()),
        }
    }

    fn handle_contact(&mut self, raw: &str) {
        let raw = raw.trim();
        if raw.is_empty() {
            return;
        }
        if self.mode != Mode::Browser || self.flow_state != FlowState::AskContact {
            self.notify(CONTACT_NOT_EXPECTED);
            return;
        }

        let permit = match self.status.begin_turn(self.epoch) {
            Ok(permit) => permit,
            Err(e) => return self.reject(e),
        };
        self.emit_status();

        let output = dialogue::submit_contact(&self.slots, raw);
        // Only accepted contacts enter the transcript, in canonical form
        if let Some(contact) = output
            .next_slots
            .contact
            .as_deref()
            .filter(|_| output.next_state == FlowState::AskTimewindow)
        {
            self.push_message(Role::User, contact);
        }
        self.apply_turn(permit, output);
    }

    fn apply_turn(&mut self, permit: TurnPermit, output: TurnOutput) {
        let TurnOutput {
            reply,
            next_state,
            next_slots,
            summary,
            ..
        } = output;

        self.slots = next_slots;
        self.set_flow_state(next_state);
        if let Some(summary) = summary {
            self.set_summary(summary);
        }
        self.finish_turn(permit, reply);
    }

    fn request_relay(&mut self, permit: TurnPermit, text: String) {
        let epoch = permit.epoch();
        self.pending_relay = Some(permit);

        let relay = self.relay.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let outcome = relay.relay(&text).await;
            let _ = event_tx
                .send(Event::RelayCompleted { epoch, outcome })
                .await;
        });
    }

    fn handle_relay_completed(&mut self, epoch: u64, outcome: RelayOutcome) {
        let Some(permit) = self.pending_relay.take_if(|p| p.epoch() == epoch) else {
            tracing::debug!(epoch, current = self.epoch, "Discarding stale relay result");
            return;
        };

        let reply = match outcome {
            RelayOutcome::Replied { reply } => reply,
            RelayOutcome::Failed { error } => {
                tracing::warn!(error = %error, "Relay turn failed");
                format!("relay error: {error}")
            }
        };
        self.finish_turn(permit, reply);
    }

    /// Record the reply and speak it once
    #[allow(clippy::needless_pass_by_value)] // Taking the permit ends the turn
    fn finish_turn(&mut self, _permit: TurnPermit, reply: String) {
        self.push_message(Role::Agent, &reply);

        if self.speech_out.is_available() {
            self.update_status(StatusEvent::PlaybackStarted);
            self.start_playback(reply);
        } else {
            self.report_no_output();
            self.update_status(StatusEvent::TurnFinished);
        }
    }

    // ========================================================================
    // Playback
    // ========================================================================

    fn start_playback(&mut self, text: String) {
        self.next_playback_id += 1;
        let id = self.next_playback_id;
        let cancel = CancellationToken::new();
        self.playback = Some(Playback {
            id,
            cancel: cancel.clone(),
        });

        let speech_out = self.speech_out.clone();
        let event_tx = self.event_tx.clone();
        let locale = self.settings.locale.clone();
        let timing: SpeechTiming = self.settings.timing;
        let spoken = speech::spoken_form(&text);

        tokio::spawn(async move {
            let playback = async {
                tokio::time::sleep(timing.lead_in).await;
                if let Err(e) = speech_out.speak(&spoken, &locale).await {
                    tracing::warn!(error = %e, "Speech playback failed");
                }
                tokio::time::sleep(timing.settle_for(&spoken)).await;
            };

            tokio::select! {
                () = playback => {}
                () = cancel.cancelled() => {
                    tracing::debug!(playback_id = id, "Playback cancelled");
                }
            }

            let _ = event_tx
                .send(Event::PlaybackFinished { playback_id: id })
                .await;
        });
    }

    fn cancel_playback(&mut self) {
        if let Some(playback) = self.playback.take() {
            playback.cancel.cancel();
            self.speech_out.cancel();
        }
    }

    fn stop_speaking(&mut self) {
        if self.playback.is_some() {
            self.cancel_playback();
            self.update_status(StatusEvent::PlaybackFinished);
        }
    }

    fn handle_playback_finished(&mut self, playback_id: u64) {
        if self.playback.as_ref().is_some_and(|p| p.id == playback_id) {
            self.playback = None;
            self.update_status(StatusEvent::PlaybackFinished);
        }
    }

    /// Speak a prompt outside of a turn
    fn speak_prompt(&mut self, text: &str) {
        if !self.speech_out.is_available() {
            self.report_no_output();
            self.notify(text);
            return;
        }
        if self.status.current() == AgentStatus::Thinking {
            self.notify(text);
            return;
        }

        self.stop_speaking();
        self.update_status(StatusEvent::PlaybackStarted);
        self.start_playback(text.to_string());
    }

    // ========================================================================
    // Capture
    // ========================================================================

    fn start_capture(&mut self) {
        if !self.speech_in.is_available() {
            self.report_no_input();
            return;
        }
        // Contacts are typed only
        if self.mode == Mode::Browser && self.flow_state.is_typed_only() {
            self.speak_prompt(prompts::ASK_CONTACT_TYPED);
            return;
        }

        if let Err(e) = self.try_update_status(StatusEvent::CaptureStarted) {
            return self.reject(e);
        }
        self.capture = CaptureBuffer::default();
        self.next_capture_id += 1;
        self.active_capture = Some(self.next_capture_id);

        let sink = CaptureSink::new(self.next_capture_id, self.event_tx.clone());
        if let Err(e) = self.speech_in.start(&self.settings.locale, sink) {
            tracing::warn!(error = %e, "Speech capture failed to start");
            self.active_capture = None;
            self.update_status(StatusEvent::CaptureFailed);
            self.notify(e.to_string());
        }
    }

    fn handle_capture(&mut self, capture_id: u64, event: CaptureEvent) {
        if self.active_capture != Some(capture_id) {
            tracing::debug!(capture_id, ?event, "Dropping event of an inactive capture");
            return;
        }
        match event {
            CaptureEvent::Interim(text) => {
                self.capture.interim.clone_from(&text);
                self.emit(UiEvent::CaptureText {
                    text,
                    is_final: false,
                });
            }
            CaptureEvent::Final(text) => {
                self.capture.final_text.clone_from(&text);
                self.emit(UiEvent::CaptureText {
                    text,
                    is_final: true,
                });
            }
            CaptureEvent::Error(message) => {
                tracing::warn!(error = %message, "Speech capture error");
                self.update_status(StatusEvent::CaptureFailed);
                self.notify(format!("Spracherkennung fehlgeschlagen: {message}"));
            }
            CaptureEvent::End => {
                self.active_capture = None;
                self.update_status(StatusEvent::CaptureEnded);
                let text = self.capture.take_text();

                if self.mode == Mode::Browser && self.flow_state.is_typed_only() {
                    self.speak_prompt(prompts::ASK_CONTACT_TYPED);
                    return;
                }
                if !text.is_empty() {
                    self.handle_user_text(&text);
                }
            }
        }
    }

    // ========================================================================
    // State and broadcast helpers
    // ========================================================================

    fn try_update_status(&mut self, event: StatusEvent) -> Result<(), StatusError> {
        let before = self.status.current();
        let after = self.status.apply(event)?;
        if before != after {
            self.emit(UiEvent::StatusChanged(after));
        }
        Ok(())
    }

    fn update_status(&mut self, event: StatusEvent) {
        if let Err(e) = self.try_update_status(event) {
            tracing::warn!(error = %e, "Ignoring status event");
        }
    }

    fn emit_status(&self) {
        self.emit(UiEvent::StatusChanged(self.status.current()));
    }

    fn set_flow_state(&mut self, state: FlowState) {
        if self.flow_state != state {
            tracing::debug!(from = %self.flow_state, to = %state, "Flow state changed");
        }
        self.flow_state = state;
        self.emit(UiEvent::FlowChanged(state));
    }

    fn set_summary(&mut self, summary: String) {
        self.summary.clone_from(&summary);
        self.emit(UiEvent::SummaryChanged(summary));
    }

    fn push_message(&mut self, role: Role, text: &str) {
        let message = ConversationMessage::new(role, text);
        self.messages.push(message.clone());
        self.emit(UiEvent::MessageAppended(message));
    }

    fn reject(&self, error: StatusError) {
        tracing::info!(error = %error, "Input rejected");
        self.notify(error.to_string());
    }

    fn report_no_output(&mut self) {
        if !self.reported_no_output {
            self.reported_no_output = true;
            tracing::warn!("Speech output unavailable");
            self.notify(NO_SPEECH_OUTPUT);
        }
    }

    fn report_no_input(&mut self) {
        if !self.reported_no_input {
            self.reported_no_input = true;
            tracing::warn!("Speech input unavailable");
            self.notify(NO_SPEECH_INPUT);
        }
    }

    fn notify(&self, text: impl Into<String>) {
        self.emit(UiEvent::Notice(text.into()));
    }

    fn emit(&self, event: UiEvent) {
        // No subscribers is fine
        let _ = self.ui_tx.send(event);
    }
}

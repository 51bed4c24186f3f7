//! Busy status of a conversation
//!
//! A single-permit gate: a turn can only start from a status that is not
//! already producing a reply, and only a [`TurnPermit`] lets the runtime
//! dispatch one.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What the agent is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Idle,
    /// Voice capture running; no turn in progress
    Listening,
    /// A turn is being resolved
    Thinking,
    /// A reply is being played back
    Speaking,
    /// Last capture failed; the next turn recovers
    Error,
}

impl AgentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Listening => "listening",
            AgentStatus::Thinking => "thinking",
            AgentStatus::Speaking => "speaking",
            AgentStatus::Error => "error",
        }
    }

    /// Check if a reply is in progress
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, AgentStatus::Thinking | AgentStatus::Speaking)
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs of the status machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    CaptureStarted,
    CaptureEnded,
    CaptureFailed,
    TurnStarted,
    /// Turn resolved without playback
    TurnFinished,
    PlaybackStarted,
    PlaybackFinished,
    Reset,
}

/// Rejected status transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("Einen Moment bitte, ich bin noch dabei ({0}).")]
    Busy(AgentStatus),
    #[error("No status transition from {from} on {event:?}")]
    Invalid {
        from: AgentStatus,
        event: StatusEvent,
    },
}

/// Pure status transition
///
/// # Errors
///
/// [`StatusError::Busy`] while a reply is in progress, and
/// [`StatusError::Invalid`] for events that make no sense in `status`.
pub fn transition(status: AgentStatus, event: StatusEvent) -> Result<AgentStatus, StatusError> {
    use AgentStatus::{Error, Idle, Listening, Speaking, Thinking};
    use StatusEvent as E;

    match (status, event) {
        (_, E::Reset)
        | (Listening, E::CaptureEnded)
        | (Thinking, E::TurnFinished)
        | (Speaking, E::PlaybackFinished) => Ok(Idle),

        // Never overlap replies
        (Thinking | Speaking | Listening, E::CaptureStarted)
        | (Thinking | Speaking, E::TurnStarted)
        | (Speaking, E::PlaybackStarted) => Err(StatusError::Busy(status)),

        (Idle | Error, E::CaptureStarted) => Ok(Listening),
        (Idle | Listening, E::CaptureFailed) => Ok(Error),
        // Capture callbacks may arrive after a reset or alongside a turn
        (s, E::CaptureEnded | E::CaptureFailed) => Ok(s),

        (Idle | Listening | Error, E::TurnStarted) => Ok(Thinking),
        (Idle | Listening | Thinking | Error, E::PlaybackStarted) => Ok(Speaking),

        (from, event) => Err(StatusError::Invalid { from, event }),
    }
}

/// Proof that a turn was admitted. Only [`StatusGate::begin_turn`] creates
/// one, tagged with the conversation epoch it belongs to.
#[derive(Debug)]
pub struct TurnPermit {
    epoch: u64,
}

impl TurnPermit {
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Holder of the current status
#[derive(Debug, Default)]
pub struct StatusGate {
    status: AgentStatus,
}

impl StatusGate {
    #[must_use]
    pub fn current(&self) -> AgentStatus {
        self.status
    }

    /// # Errors
    ///
    /// Leaves the status unchanged and returns the [`transition`] error.
    pub fn apply(&mut self, event: StatusEvent) -> Result<AgentStatus, StatusError> {
        self.status = transition(self.status, event)?;
        Ok(self.status)
    }

    /// Admit a new turn, or refuse while a reply is in progress
    ///
    /// # Errors
    ///
    /// [`StatusError::Busy`] while thinking or speaking.
    pub fn begin_turn(&mut self, epoch: u64) -> Result<TurnPermit, StatusError> {
        self.apply(StatusEvent::TurnStarted)?;
        Ok(TurnPermit { epoch })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AgentStatus::{Error, Idle, Listening, Speaking, Thinking};

    const ALL: [AgentStatus; 5] = [Idle, Listening, Thinking, Speaking, Error];

    #[test]
    fn test_turn_rejected_while_busy() {
        for status in [Thinking, Speaking] {
            assert_eq!(
                transition(status, StatusEvent::TurnStarted),
                Err(StatusError::Busy(status))
            );
        }
    }

    #[test]
    fn test_turn_allowed_otherwise() {
        for status in [Idle, Listening, Error] {
            assert_eq!(transition(status, StatusEvent::TurnStarted), Ok(Thinking));
        }
    }

    #[test]
    fn test_reset_always_idles() {
        for status in ALL {
            assert_eq!(transition(status, StatusEvent::Reset), Ok(Idle));
        }
    }

    #[test]
    fn test_capture_lifecycle() {
        assert_eq!(transition(Idle, StatusEvent::CaptureStarted), Ok(Listening));
        assert_eq!(transition(Listening, StatusEvent::CaptureEnded), Ok(Idle));
        assert_eq!(transition(Listening, StatusEvent::CaptureFailed), Ok(Error));
        // A failed capture keeps its error after the end callback
        assert_eq!(transition(Error, StatusEvent::CaptureEnded), Ok(Error));
        assert_eq!(
            transition(Speaking, StatusEvent::CaptureStarted),
            Err(StatusError::Busy(Speaking))
        );
    }

    #[test]
    fn test_reply_lifecycle() {
        let mut gate = StatusGate::default();
        let permit = gate.begin_turn(7).unwrap();
        assert_eq!(permit.epoch(), 7);
        assert!(gate.current().is_busy());
        assert!(gate.begin_turn(7).is_err());

        assert_eq!(gate.apply(StatusEvent::PlaybackStarted), Ok(Speaking));
        assert!(gate.begin_turn(7).is_err());
        assert_eq!(gate.apply(StatusEvent::PlaybackFinished), Ok(Idle));
        assert!(gate.begin_turn(8).is_ok());
    }

    #[test]
    fn test_finished_turn_idles() {
        assert_eq!(transition(Thinking, StatusEvent::TurnFinished), Ok(Idle));
        assert_eq!(transition(Speaking, StatusEvent::PlaybackFinished), Ok(Idle));
    }

    #[test]
    fn test_rejected_event_keeps_status() {
        let mut gate = StatusGate::default();
        let _permit = gate.begin_turn(1).unwrap();
        assert!(gate.apply(StatusEvent::CaptureStarted).is_err());
        assert_eq!(gate.current(), Thinking);
    }

    #[test]
    fn test_stray_finish_is_invalid() {
        assert!(matches!(
            transition(Idle, StatusEvent::PlaybackFinished),
            Err(StatusError::Invalid { .. })
        ));
        assert!(matches!(
            transition(Speaking, StatusEvent::TurnFinished),
            Err(StatusError::Invalid { .. })
        ));
    }
}

//! Relay error types

use thiserror::Error;

/// Relay error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RelayError {
    pub kind: RelayErrorKind,
    pub message: String,
}

impl RelayError {
    #[must_use]
    pub fn new(kind: RelayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(RelayErrorKind::Transport, message)
    }

    /// Non-success status from the inference service
    #[must_use]
    pub fn http(status: u16, body: &str) -> Self {
        Self::new(RelayErrorKind::Http, format!("HTTP {status} {body}"))
    }

    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(RelayErrorKind::Decode, message)
    }

    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(RelayErrorKind::Unavailable, message)
    }
}

/// Where a relay call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayErrorKind {
    /// Connection refused, reset or timed out
    Transport,
    /// The service answered with a non-success status
    Http,
    /// The response body was not a chat completion
    Decode,
    /// No client could be built
    Unavailable,
}

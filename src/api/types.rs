//! API request and response types
//!
//! The scripted-turn endpoint speaks [`TurnInput`](crate::dialogue::TurnInput)
//! and [`TurnOutput`](crate::dialogue::TurnOutput) directly.

use crate::dialogue::{null_as_default, Slots};
use serde::{Deserialize, Serialize};

/// Typed contact for the contact step
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slots: Slots,
}

/// Text for a relayed turn
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_text: String,
}

/// Result of a relayed turn
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayResponse {
    #[must_use]
    pub fn replied(reply: String) -> Self {
        Self {
            ok: true,
            reply: Some(reply),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: String) -> Self {
        Self {
            ok: false,
            reply: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub model: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

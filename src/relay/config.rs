//! Relay configuration

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_MODEL: &str = "llama3.1:8b";

/// Where and how to reach the local inference service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub base_url: String,
    pub model: String,
    /// Client-side timeout; `None` leaves it to the transport
    pub timeout: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
        }
    }
}

impl RelayConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from `VOICE_INTAKE_RELAY_*` variables resolved by `lookup`
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            base_url: lookup("VOICE_INTAKE_RELAY_URL").unwrap_or(defaults.base_url),
            model: lookup("VOICE_INTAKE_RELAY_MODEL").unwrap_or(defaults.model),
            timeout: lookup("VOICE_INTAKE_RELAY_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .map(Duration::from_secs),
        }
    }

    /// Chat endpoint of the inference service
    #[must_use]
    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

//! Environment-driven application configuration

use crate::relay::RelayConfig;
use crate::runtime::{Mode, RuntimeSettings, SpeechTiming};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_LOCALE: &str = "de-DE";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub relay: RelayConfig,
    /// Locale handed to speech collaborators
    pub locale: String,
    /// Mode a new console conversation starts in
    pub initial_mode: Mode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            relay: RelayConfig::default(),
            locale: DEFAULT_LOCALE.to_string(),
            initial_mode: Mode::Browser,
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("VOICE_INTAKE_PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(defaults.port);

        let initial_mode = match lookup("VOICE_INTAKE_MODE").map(|m| m.parse::<Mode>()) {
            Some(Ok(mode)) => mode,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Ignoring VOICE_INTAKE_MODE");
                defaults.initial_mode
            }
            None => defaults.initial_mode,
        };

        Self {
            port,
            relay: RelayConfig::from_lookup(&lookup),
            locale: lookup("VOICE_INTAKE_LOCALE")
                .filter(|l| !l.trim().is_empty())
                .unwrap_or(defaults.locale),
            initial_mode,
        }
    }

    #[must_use]
    pub fn runtime_settings(&self) -> RuntimeSettings {
        RuntimeSettings {
            initial_mode: self.initial_mode,
            locale: self.locale.clone(),
            timing: SpeechTiming::default(),
        }
    }
}

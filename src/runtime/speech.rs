//! Speech helpers: spoken form, settling delays, unsupported platforms

use super::traits::{CaptureError, CaptureSink, SpeechError, SpeechInput, SpeechOutput};
use async_trait::async_trait;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use std::time::Duration;

static GERMAN_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+49\d{6,}").expect("phone pattern is valid"));
static LONG_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{10,}\b").expect("number pattern is valid"));

/// Replies mentioning these get a longer pause after playback
const LONG_SETTLE_WORDS: &[&str] = &["datum", "uhrzeit", "tageszeit"];

/// Pauses around playback so the next capture does not clip the reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechTiming {
    pub lead_in: Duration,
    pub settle: Duration,
    pub long_settle: Duration,
}

impl Default for SpeechTiming {
    fn default() -> Self {
        Self {
            lead_in: Duration::from_millis(220),
            settle: Duration::from_millis(320),
            long_settle: Duration::from_millis(900),
        }
    }
}

impl SpeechTiming {
    /// No pauses at all
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            lead_in: Duration::ZERO,
            settle: Duration::ZERO,
            long_settle: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn settle_for(&self, spoken: &str) -> Duration {
        let lower = spoken.to_lowercase();
        if LONG_SETTLE_WORDS.iter().any(|w| lower.contains(w)) {
            self.long_settle
        } else {
            self.settle
        }
    }
}

fn digit_word(c: char) -> Option<&'static str> {
    Some(match c {
        '0' => "null",
        '1' => "eins",
        '2' => "zwei",
        '3' => "drei",
        '4' => "vier",
        '5' => "fünf",
        '6' => "sechs",
        '7' => "sieben",
        '8' => "acht",
        '9' => "neun",
        _ => return None,
    })
}

fn speak_digits(digits: &str) -> String {
    digits
        .chars()
        .filter_map(digit_word)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Text handed to text-to-speech: phone numbers are read digit by digit
/// instead of as one huge number. The transcript is left untouched.
#[must_use]
pub fn spoken_form(text: &str) -> String {
    let text = GERMAN_NUMBER.replace_all(text, |caps: &Captures<'_>| {
        let rest = caps[0].trim_start_matches('+');
        let rest = rest.strip_prefix("49").unwrap_or(rest);
        format!("plus neunundvierzig, {}", speak_digits(rest))
    });
    LONG_NUMBER
        .replace_all(&text, |caps: &Captures<'_>| speak_digits(&caps[0]))
        .into_owned()
}

/// Speech output on a platform without text-to-speech
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpeechOutput;

#[async_trait]
impl SpeechOutput for NoSpeechOutput {
    fn is_available(&self) -> bool {
        false
    }

    async fn speak(&self, _text: &str, _locale: &str) -> Result<(), SpeechError> {
        Err(SpeechError("speech synthesis is not supported".to_string()))
    }

    fn cancel(&self) {}
}

/// Speech input on a platform without speech recognition
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpeechInput;

impl SpeechInput for NoSpeechInput {
    fn is_available(&self) -> bool {
        false
    }

    fn start(&self, _locale: &str, _sink: CaptureSink) -> Result<(), CaptureError> {
        Err(CaptureError(
            "speech recognition is not supported".to_string(),
        ))
    }

    fn stop(&self) {}

    fn abort(&self) {}
}

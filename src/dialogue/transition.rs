//! Pure turn function of the scripted flow
//!
//! Given the same state, slots and text, `turn` always produces the same
//! output. It performs no I/O.

use super::prompts;
use super::{build_summary, FlowState, Goal, Slots};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::LazyLock;

static AFFIRMATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:ja|jup|jo|yes|passt|korrekt|genau)\b").expect("affirmative pattern is valid")
});

static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:nein|no|nop|falsch|nicht|stimmt nicht)\b")
        .expect("negative pattern is valid")
});

/// Everything a turn needs; the engine keeps nothing between calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: FlowState,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slots: Slots,
}

/// Treat an explicit `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TurnInput {
    #[must_use]
    pub fn run(&self) -> TurnOutput {
        turn(self.state, &self.slots, &self.user_text)
    }
}

/// Result of a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutput {
    pub reply: String,
    pub next_state: FlowState,
    pub next_slots: Slots,
    pub is_done: bool,
    /// Present only when the flow asks for confirmation or completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl TurnOutput {
    #[must_use]
    pub fn new(reply: impl Into<String>, next_state: FlowState, next_slots: Slots) -> Self {
        Self {
            reply: reply.into(),
            next_state,
            next_slots,
            is_done: false,
            summary: None,
        }
    }

    #[must_use]
    pub fn with_summary(mut self, summary: String) -> Self {
        self.summary = Some(summary);
        self
    }

    #[must_use]
    pub fn done(mut self) -> Self {
        self.is_done = true;
        self
    }

    /// Fixed answer for a request the engine could not handle. Keeps the
    /// conversation recoverable instead of ending it.
    #[must_use]
    pub fn fallback() -> Self {
        Self::new(prompts::SERVER_ERROR, FlowState::AskGoal, Slots::default())
    }
}

/// Collapse whitespace runs (including non-breaking spaces) and trim.
/// Case is preserved.
pub(crate) fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_affirmative(lower: &str) -> bool {
    AFFIRMATIVE.is_match(lower)
}

fn is_negative(lower: &str) -> bool {
    NEGATIVE.is_match(lower)
}

/// Accept `cleaned` if it is long enough for `state`
fn long_enough(state: FlowState, cleaned: &str) -> bool {
    state
        .min_answer_len()
        .is_none_or(|min| cleaned.chars().count() >= min)
}

/// Advance the scripted flow by one turn
#[must_use]
pub fn turn(state: FlowState, slots: &Slots, user_text: &str) -> TurnOutput {
    let cleaned = normalize(user_text);
    let lower = cleaned.to_lowercase();
    let slots = slots.clone();

    match state {
        FlowState::Welcome => TurnOutput::new(prompts::GREETING, FlowState::AskGoal, slots),

        FlowState::AskGoal => {
            if !long_enough(state, &lower) {
                return TurnOutput::new(prompts::ASK_GOAL_AGAIN, state, slots);
            }
            let goal = Goal::classify(&lower);
            TurnOutput::new(prompts::ASK_TOPIC, FlowState::AskTopic, slots.with_goal(goal))
        }

        FlowState::AskTopic => {
            if !long_enough(state, &cleaned) {
                return TurnOutput::new(prompts::ASK_TOPIC_AGAIN, state, slots);
            }
            TurnOutput::new(prompts::ASK_NAME, FlowState::AskName, slots.with_topic(cleaned))
        }

        FlowState::AskName => {
            if !long_enough(state, &cleaned) {
                return TurnOutput::new(prompts::ASK_NAME_AGAIN, state, slots);
            }
            TurnOutput::new(
                prompts::ASK_CONTACT,
                FlowState::AskContact,
                slots.with_name(cleaned),
            )
        }

        // Contact is filled through `submit_contact`; spoken input only
        // gets the typed-entry reminder.
        FlowState::AskContact => TurnOutput::new(prompts::ASK_CONTACT_TYPED, state, slots),

        FlowState::AskTimewindow => {
            if !long_enough(state, &cleaned) {
                return TurnOutput::new(prompts::ASK_TIMEWINDOW_AGAIN, state, slots);
            }
            let slots = slots.with_timewindow(cleaned);
            let summary = build_summary(&slots);
            TurnOutput::new(prompts::confirmation(&summary), FlowState::Confirm, slots)
                .with_summary(summary)
        }

        FlowState::Confirm => {
            if is_affirmative(&lower) {
                let summary = build_summary(&slots);
                TurnOutput::new(prompts::CONFIRMED, FlowState::Done, slots)
                    .with_summary(summary)
                    .done()
            } else if is_negative(&lower) {
                TurnOutput::new(
                    prompts::REJECTED,
                    FlowState::AskTopic,
                    slots.without_topic_and_timewindow(),
                )
            } else {
                TurnOutput::new(prompts::CONFIRM_AGAIN, state, slots)
            }
        }

        FlowState::Done => {
            let summary = build_summary(&slots);
            TurnOutput::new(prompts::DONE, FlowState::Done, slots)
                .with_summary(summary)
                .done()
        }

        FlowState::Unrecognized => {
            tracing::debug!("Unrecognized flow state, restarting at goal");
            TurnOutput::new(prompts::RESTART, FlowState::AskGoal, Slots::default())
        }
    }
}

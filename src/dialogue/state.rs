//! Flow state of the scripted dialogue

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position in the scripted flow. Decides which prompt is emitted and
/// which input is expected next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowState {
    #[default]
    Welcome,
    AskGoal,
    AskTopic,
    AskName,
    /// Contact details are typed only; see [`crate::dialogue::submit_contact`]
    AskContact,
    AskTimewindow,
    Confirm,
    Done,
    /// A state name this build does not know. The next turn restarts the flow.
    #[serde(other)]
    Unrecognized,
}

impl FlowState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FlowState::Welcome => "WELCOME",
            FlowState::AskGoal => "ASK_GOAL",
            FlowState::AskTopic => "ASK_TOPIC",
            FlowState::AskName => "ASK_NAME",
            FlowState::AskContact => "ASK_CONTACT",
            FlowState::AskTimewindow => "ASK_TIMEWINDOW",
            FlowState::Confirm => "CONFIRM",
            FlowState::Done => "DONE",
            FlowState::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// States whose input must be typed; voice capture is refused here
    #[must_use]
    pub fn is_typed_only(self) -> bool {
        matches!(self, FlowState::AskContact)
    }

    /// Minimum character count a free-text answer needs in this state
    #[must_use]
    pub fn min_answer_len(self) -> Option<usize> {
        match self {
            FlowState::AskGoal | FlowState::AskName => Some(2),
            FlowState::AskTopic | FlowState::AskTimewindow => Some(3),
            _ => None,
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

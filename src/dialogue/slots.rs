//! Slot accumulator and goal classification

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// What the caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Booking,
    Info,
    Callback,
}

/// Ordered keyword rules; the first match wins
static GOAL_RULES: LazyLock<Vec<(Goal, Regex)>> = LazyLock::new(|| {
    [
        (Goal::Booking, r"\btermin\b"),
        (Goal::Info, r"\binfos?\b"),
        (Goal::Callback, r"\b(?:rückruf|rueckruf|callback)\b"),
    ]
    .into_iter()
    .map(|(goal, pattern)| (goal, Regex::new(pattern).expect("goal pattern is valid")))
    .collect()
});

impl Goal {
    /// Fallback when no keyword rule matches.
    ///
    /// Unmatched text is treated as an information request. This keeps the
    /// flow moving instead of re-prompting; it is pending product review.
    pub const DEFAULT: Goal = Goal::Info;

    /// Classify normalized, lower-cased text
    #[must_use]
    pub fn classify(text: &str) -> Goal {
        GOAL_RULES
            .iter()
            .find(|(_, pattern)| pattern.is_match(text))
            .map_or(Self::DEFAULT, |(goal, _)| *goal)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Goal::Booking => "booking",
            Goal::Info => "info",
            Goal::Callback => "callback",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answers collected so far.
///
/// Treated as an immutable value: every turn hands back a new `Slots`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Canonical email or `+49` phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timewindow: Option<String>,
}

impl Slots {
    #[must_use]
    pub fn with_goal(self, goal: Goal) -> Self {
        Self {
            goal: Some(goal),
            ..self
        }
    }

    #[must_use]
    pub fn with_topic(self, topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_contact(self, contact: impl Into<String>) -> Self {
        Self {
            contact: Some(contact.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_timewindow(self, timewindow: impl Into<String>) -> Self {
        Self {
            timewindow: Some(timewindow.into()),
            ..self
        }
    }

    /// Drop the answers a rejected confirmation asks for again.
    /// Goal, name and contact are kept.
    #[must_use]
    pub fn without_topic_and_timewindow(self) -> Self {
        Self {
            topic: None,
            timewindow: None,
            ..self
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

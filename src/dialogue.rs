//! Scripted intake dialogue
//!
//! A deterministic slot-filling flow built on pure state transitions.
//! Every turn receives the full conversation state and returns a fresh
//! one; nothing is retained between calls.

mod contact_step;
pub mod prompts;
pub mod slots;
pub mod state;
mod summary;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use contact_step::submit_contact;
pub use slots::{Goal, Slots};
pub use state::FlowState;
pub use summary::build_summary;
pub(crate) use transition::null_as_default;
pub use transition::{turn, TurnInput, TurnOutput};

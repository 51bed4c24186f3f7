//! Voice intake agent
//!
//! A scripted German intake dialogue (goal, topic, name, contact, time
//! window, confirmation), an alternative free-form mode relayed to a local
//! language model, and the orchestration that ties turns to speech.

pub mod api;
pub mod config;
pub mod contact;
pub mod dialogue;
pub mod relay;
pub mod runtime;

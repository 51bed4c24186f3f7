//! Typed contact entry
//!
//! Contact details bypass the keyword flow: they are only accepted as
//! typed text and go through the contact validator.

use super::prompts;
use super::{FlowState, Slots, TurnOutput};
use crate::contact;

/// Validate typed contact details and advance to the time window on
/// success. On failure the flow stays in contact entry with the
/// validation message as reply.
#[must_use]
pub fn submit_contact(slots: &Slots, raw: &str) -> TurnOutput {
    match contact::validate(raw) {
        Ok(contact) => TurnOutput::new(
            prompts::CONTACT_ACCEPTED,
            FlowState::AskTimewindow,
            slots.clone().with_contact(contact.into_string()),
        ),
        Err(e) => {
            tracing::debug!(error = %e, "Contact rejected");
            TurnOutput::new(e.to_string(), FlowState::AskContact, slots.clone())
        }
    }
}

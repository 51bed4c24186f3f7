//! Property-based tests for the scripted flow
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::normalize;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_goal() -> impl Strategy<Value = Goal> {
    prop_oneof![Just(Goal::Booking), Just(Goal::Info), Just(Goal::Callback)]
}

fn arb_text() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[A-Za-zäöü][A-Za-zäöü ]{2,20}")
}

fn arb_slots() -> impl Strategy<Value = Slots> {
    (
        proptest::option::of(arb_goal()),
        arb_text(),
        arb_text(),
        proptest::option::of("\\+49[1-9][0-9]{9}"),
        arb_text(),
    )
        .prop_map(|(goal, topic, name, contact, timewindow)| Slots {
            goal,
            topic,
            name,
            contact,
            timewindow,
        })
}

/// States that validate a minimum answer length
fn arb_length_checked_state() -> impl Strategy<Value = FlowState> {
    prop_oneof![
        Just(FlowState::AskGoal),
        Just(FlowState::AskTopic),
        Just(FlowState::AskName),
        Just(FlowState::AskTimewindow),
    ]
}

fn arb_state() -> impl Strategy<Value = FlowState> {
    prop_oneof![
        Just(FlowState::Welcome),
        arb_length_checked_state(),
        Just(FlowState::AskContact),
        Just(FlowState::Confirm),
        Just(FlowState::Done),
        Just(FlowState::Unrecognized),
    ]
}

/// Text that normalizes to fewer than `max` characters
fn arb_short_text(max: usize) -> impl Strategy<Value = String> {
    (
        "[ \t\u{00A0}]{0,3}",
        proptest::collection::vec("[a-zA-Zß]", 0..max),
        "[ \n\u{00A0}]{0,3}",
    )
        .prop_map(|(lead, chars, trail)| format!("{lead}{}{trail}", chars.concat()))
}

/// Words free of every affirmative and negative keyword
fn arb_neutral_text() -> impl Strategy<Value = String> {
    proptest::collection::vec("(vielleicht|morgen|hmm|später|eventuell)", 0..4)
        .prop_map(|words| words.join(" "))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_short_input_changes_nothing(
        state in arb_length_checked_state(),
        slots in arb_slots(),
        text in arb_short_text(2),
    ) {
        let min = state.min_answer_len().unwrap();
        prop_assume!(normalize(&text).chars().count() < min);

        let out = turn(state, &slots, &text);
        prop_assert_eq!(out.next_state, state);
        prop_assert_eq!(out.next_slots, slots);
        prop_assert!(!out.is_done);
    }

    #[test]
    fn prop_negative_confirmation_clears_exactly_topic_and_timewindow(slots in arb_slots()) {
        let out = turn(FlowState::Confirm, &slots, "nein");

        prop_assert_eq!(out.next_state, FlowState::AskTopic);
        prop_assert!(out.next_slots.topic.is_none());
        prop_assert!(out.next_slots.timewindow.is_none());
        prop_assert_eq!(out.next_slots.goal, slots.goal);
        prop_assert_eq!(out.next_slots.name, slots.name);
        prop_assert_eq!(out.next_slots.contact, slots.contact);
    }

    #[test]
    fn prop_done_is_absorbing(slots in arb_slots(), text in "\\PC{0,30}") {
        let out = turn(FlowState::Done, &slots, &text);
        prop_assert_eq!(out.next_state, FlowState::Done);
        prop_assert!(out.is_done);
        prop_assert_eq!(out.next_slots, slots);
    }

    #[test]
    fn prop_unmatched_confirmation_reprompts(slots in arb_slots(), text in arb_neutral_text()) {
        let out = turn(FlowState::Confirm, &slots, &text);
        prop_assert_eq!(out.next_state, FlowState::Confirm);
        prop_assert_eq!(out.next_slots, slots);
    }

    #[test]
    fn prop_turn_is_deterministic(state in arb_state(), slots in arb_slots(), text in "\\PC{0,40}") {
        prop_assert_eq!(turn(state, &slots, &text), turn(state, &slots, &text));
    }

    #[test]
    fn prop_slots_only_grow_before_confirmation(
        state in prop_oneof![
            Just(FlowState::Welcome),
            arb_length_checked_state(),
            Just(FlowState::AskContact),
        ],
        slots in arb_slots(),
        text in "\\PC{0,40}",
    ) {
        let out = turn(state, &slots, &text);
        let next = &out.next_slots;
        prop_assert!(slots.topic.is_none() || next.topic == slots.topic || state == FlowState::AskTopic);
        prop_assert!(slots.name.is_none() || next.name == slots.name || state == FlowState::AskName);
        prop_assert_eq!(&next.contact, &slots.contact);
        prop_assert!(next.goal.is_some() || slots.goal.is_none());
    }

    #[test]
    fn prop_stored_text_is_normalized(text in "[ \u{00A0}]{0,2}[A-Za-z]{3,8}( +[A-Za-z]{1,8}){0,3}[ ]{0,2}") {
        let out = turn(FlowState::AskTopic, &Slots::default(), &text);
        let topic = out.next_slots.topic.expect("topic accepted");
        prop_assert_eq!(topic.trim(), topic.as_str());
        prop_assert!(!topic.contains("  "));
    }

    #[test]
    fn prop_summary_present_only_at_confirm_or_done(state in arb_state(), slots in arb_slots(), text in "\\PC{0,20}") {
        let out = turn(state, &slots, &text);
        if out.summary.is_some() {
            prop_assert!(matches!(out.next_state, FlowState::Confirm | FlowState::Done));
        }
    }
}

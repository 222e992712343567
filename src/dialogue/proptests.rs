//! Property-based tests for the dialogue pipeline.
//!
//! These check that the conversation invariants hold for arbitrary input
//! sequences, not just the scripted scenarios.

use proptest::prelude::*;

use super::checker::Checker;
use super::collector::SlotCollector;
use super::engine::DialogueEngine;
use super::extractor::Validation;
use super::state::{ConversationState, MessageLogEntry, Slot};
use crate::config::DialogueConfig;

// ============================================================================
// Arbitrary Generators
// ============================================================================

/// Inputs that can never contain "order" (no 'r') or "pizza" (no 'z').
fn arb_non_order_input() -> impl Strategy<Value = String> {
    "[a-qs-yA-QS-Y0-9 ,.!?]{0,40}"
}

fn arb_utterance() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-zA-Z0-9 ]{0,30}",
        1 => Just("I want to order a pizza".to_string()),
        1 => Just("PIZZA ORDER".to_string()),
        1 => Just(String::new()),
    ]
}

fn arb_validation() -> impl Strategy<Value = Validation> {
    prop_oneof![
        Just(Validation::Skipped),
        Just(Validation::Accepted),
        proptest::option::of("[a-z ]{1,20}").prop_map(|reason| Validation::Rejected { reason }),
    ]
}

fn arb_slots() -> impl Strategy<Value = Vec<(Slot, String)>> {
    proptest::collection::vec(
        (
            prop_oneof![Just(Slot::Item), Just(Slot::Destination)],
            "[a-z]{1,10}",
        ),
        0..3,
    )
}

fn engine() -> DialogueEngine {
    DialogueEngine::new(&DialogueConfig::default())
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn checker_is_idempotent_once_active(input in arb_utterance()) {
        let checker = Checker::default();
        let mut state = ConversationState::new();
        state.raw_input = input;
        state.active_order = true;

        let once = checker.invoke(state);
        let twice = checker.invoke(once.clone());
        prop_assert!(once.active_order);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn inputs_missing_a_keyword_stay_inactive(input in arb_non_order_input()) {
        let state = ConversationState {
            raw_input: input,
            ..Default::default()
        };
        let state = Checker::default().invoke(state);
        prop_assert!(!state.active_order);
        prop_assert!(!state.ended);
    }

    #[test]
    fn collector_never_skips_the_item(slots in arb_slots()) {
        let mut state = ConversationState::new();
        state.active_order = true;
        for (slot, value) in slots {
            state.slots.insert(slot, value);
        }
        let item_missing = state.slot(Slot::Item).is_none();

        let state = SlotCollector::new().invoke(state);
        if item_missing {
            prop_assert_eq!(state.pending_slot(), Some(Slot::Item));
            prop_assert!(!state.ended);
        }
    }

    #[test]
    fn invariants_hold_over_any_conversation(
        turns in proptest::collection::vec((arb_utterance(), arb_validation()), 1..12)
    ) {
        let engine = engine();
        let mut state = ConversationState::new();
        let mut was_active = false;

        for (input, validation) in turns {
            let report = engine.run_turn(state, &input, &validation);
            state = report.state;

            // activeOrder is monotone
            prop_assert!(state.active_order || !was_active);
            was_active = state.active_order;

            // ended implies all slots filled
            if state.ended {
                prop_assert!(state.missing_slots().is_empty());
            }

            // only required slots are ever keyed
            prop_assert!(state.slots.keys().all(|k| Slot::REQUIRED.contains(k)));

            // never asks for the destination while the item is missing
            if state.slot(Slot::Item).is_none() {
                prop_assert_ne!(state.pending_slot(), Some(Slot::Destination));
            }
        }
    }

    #[test]
    fn two_extraction_turns_complete_the_order(
        item in "[a-zA-Z][a-zA-Z ]{0,15}",
        destination in "[a-zA-Z0-9][a-zA-Z0-9 ]{0,20}",
    ) {
        let engine = engine();
        let (state, _) = engine.run(ConversationState::new(), "I want to order a pizza");
        prop_assert!(state.active_order);

        let (state, _) = engine.run(state, &item);
        prop_assert!(!state.ended);
        let (state, _) = engine.run(state, &destination);

        prop_assert!(state.ended);
        let expected_item = item.to_lowercase();
        let expected_destination = destination.to_lowercase();
        prop_assert_eq!(state.slot(Slot::Item), Some(expected_item.as_str()));
        prop_assert_eq!(state.slot(Slot::Destination), Some(expected_destination.as_str()));
    }

    #[test]
    fn skipped_validation_matches_disabled_validation(
        turns in proptest::collection::vec(arb_utterance(), 1..8)
    ) {
        let engine = engine();
        let mut plain = ConversationState::new();
        let mut skipped = ConversationState::new();

        for input in turns {
            plain = engine.run(plain, &input).0;
            skipped = engine.run_turn(skipped, &input, &Validation::Skipped).state;
        }
        prop_assert_eq!(plain, skipped);
    }

    #[test]
    fn log_only_holds_known_markers(
        turns in proptest::collection::vec(arb_utterance(), 1..8)
    ) {
        let engine = engine();
        let mut state = ConversationState::new();
        for input in turns {
            state = engine.run(state, &input).0;
        }
        for entry in &state.messages {
            if let MessageLogEntry::PendingSlotMarker(id) = entry {
                prop_assert!(Slot::from_id(id).is_some());
            }
        }
    }
}

//! Per-turn pipeline: checker → router → extractor → collector.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DialogueConfig;

use super::checker::{Checker, Route, route};
use super::collector::SlotCollector;
use super::extractor::{SlotExtractor, Validation};
use super::state::{ConversationState, MessageLogEntry, Slot};

/// Pipeline position within a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Checker,
    Extractor,
    Collector,
    Terminal,
}

/// How a turn ended, for callers that want more than the reply text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The keyword check failed; the user should try again.
    Rejected,
    /// The engine asked for `slot` and waits for the next utterance.
    AwaitingSlot { slot: Slot },
    /// The candidate for `slot` failed validation; it is asked for again.
    ValueRejected { slot: Slot },
    /// Every slot is filled and the conversation has ended.
    Completed,
    /// The conversation had already ended; nothing ran.
    AlreadyEnded,
}

/// Result of one full pipeline pass.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub state: ConversationState,
    pub outcome: TurnOutcome,
    /// Assistant messages produced during this turn, oldest first.
    pub replies: Vec<String>,
}

impl TurnReport {
    /// The most recent assistant message in the whole conversation.
    pub fn latest_message(&self) -> Option<String> {
        self.state.latest_assistant_message().map(str::to_string)
    }
}

/// Drives one conversation turn through the dialogue steps.
#[derive(Debug, Clone, Default)]
pub struct DialogueEngine {
    checker: Checker,
    extractor: SlotExtractor,
    collector: SlotCollector,
}

impl DialogueEngine {
    pub fn new(config: &DialogueConfig) -> Self {
        Self::with_checker(Checker::from_config(config))
    }

    pub fn with_checker(checker: Checker) -> Self {
        Self {
            checker,
            extractor: SlotExtractor::new(),
            collector: SlotCollector::new(),
        }
    }

    pub fn checker(&self) -> &Checker {
        &self.checker
    }

    /// Run one turn with validation disabled. Returns the updated state and
    /// the latest assistant message.
    pub fn run(
        &self,
        state: ConversationState,
        raw_input: &str,
    ) -> (ConversationState, Option<String>) {
        let report = self.run_turn(state, raw_input, &Validation::Skipped);
        let message = report.latest_message();
        (report.state, message)
    }

    /// Run one turn, applying `validation` to the candidate slot value.
    pub fn run_turn(
        &self,
        mut state: ConversationState,
        raw_input: &str,
        validation: &Validation,
    ) -> TurnReport {
        if state.ended {
            debug!("Conversation already ended, ignoring turn");
            return TurnReport {
                state,
                outcome: TurnOutcome::AlreadyEnded,
                replies: Vec::new(),
            };
        }

        let turn_start = state.messages.len();
        let pending = state.pending_slot();
        state.raw_input = raw_input.to_string();

        let mut step = Step::Checker;
        loop {
            step = match step {
                Step::Checker => {
                    state = self.checker.invoke(state);
                    match route(&state) {
                        Route::Extract => Step::Extractor,
                        Route::Terminate => Step::Terminal,
                    }
                }
                Step::Extractor => {
                    state = self.extractor.invoke_with(state, validation);
                    Step::Collector
                }
                Step::Collector => {
                    state = self.collector.invoke(state);
                    Step::Terminal
                }
                Step::Terminal => break,
            };
            debug!(next = ?step, "Dialogue step");
        }

        let replies = state.messages[turn_start..]
            .iter()
            .filter_map(|entry| match entry {
                MessageLogEntry::AssistantPrompt(text) => Some(text.clone()),
                _ => None,
            })
            .collect();

        // The utterance goes in ahead of this turn's replies. It is inserted
        // after extraction so the marker was still the latest entry then.
        if !raw_input.trim().is_empty() {
            state
                .messages
                .insert(turn_start, MessageLogEntry::user(raw_input));
        }

        let outcome = outcome_of(&state, pending, validation, raw_input);
        TurnReport {
            state,
            outcome,
            replies,
        }
    }
}

fn outcome_of(
    state: &ConversationState,
    pending: Option<Slot>,
    validation: &Validation,
    raw_input: &str,
) -> TurnOutcome {
    if !state.active_order {
        return TurnOutcome::Rejected;
    }
    if state.ended {
        return TurnOutcome::Completed;
    }
    match state.pending_slot() {
        Some(slot) => {
            let rejected = pending == Some(slot)
                && matches!(validation, Validation::Rejected { .. })
                && !raw_input.trim().is_empty();
            if rejected {
                TurnOutcome::ValueRejected { slot }
            } else {
                TurnOutcome::AwaitingSlot { slot }
            }
        }
        // Every active, unfinished pass ends with the collector's marker.
        None => TurnOutcome::Rejected,
    }
}

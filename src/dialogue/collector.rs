//! Requests the next missing slot, or finalizes the order.

use tracing::{debug, info};

use super::prompts;
use super::state::{ConversationState, MessageLogEntry};

/// Asks for exactly one missing slot per turn, first-missing-wins in
/// [`Slot::REQUIRED`](super::state::Slot::REQUIRED) order. Once nothing
/// is missing it appends the completion message and ends the conversation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotCollector;

impl SlotCollector {
    pub fn new() -> Self {
        Self
    }

    pub fn invoke(&self, mut state: ConversationState) -> ConversationState {
        let Some(next) = state.missing_slots().first().copied() else {
            state
                .messages
                .push(MessageLogEntry::assistant(prompts::COMPLETION));
            state.ended = true;
            info!("Order completed");
            return state;
        };

        debug!(slot = %next, "Requesting slot");
        state
            .messages
            .push(MessageLogEntry::assistant(prompts::slot_prompt(next)));
        state.messages.push(MessageLogEntry::marker(next));
        state
    }
}

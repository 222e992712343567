//! Fills the pending slot from the latest utterance.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::prompts;
use super::state::{ConversationState, MessageLogEntry, Slot};

/// External verdict on the candidate value for this turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Validation {
    /// No validation ran (disabled, or the collaborator was unavailable).
    #[default]
    Skipped,
    Accepted,
    Rejected { reason: Option<String> },
}

/// The value a slot receives for `raw_input`: the utterance lower-cased,
/// otherwise verbatim.
pub fn slot_value(raw_input: &str) -> String {
    raw_input.to_lowercase()
}

/// Assigns the lower-cased utterance to the slot named by the pending
/// marker. Content is not inspected beyond presence.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotExtractor;

impl SlotExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract with validation disabled.
    pub fn invoke(&self, state: ConversationState) -> ConversationState {
        self.invoke_with(state, &Validation::Skipped)
    }

    /// Extract, honouring an external verdict on the candidate value.
    pub fn invoke_with(
        &self,
        mut state: ConversationState,
        validation: &Validation,
    ) -> ConversationState {
        if !state.active_order {
            debug!("No active order, nothing to extract");
            return state;
        }

        let id = match state.messages.last() {
            Some(MessageLogEntry::PendingSlotMarker(id)) => id.clone(),
            _ => {
                debug!("Latest log entry is not a pending-slot marker, skipping extraction");
                return state;
            }
        };

        let Some(slot) = Slot::from_id(&id) else {
            debug!(marker = %id, "Unknown slot marker, skipping extraction");
            return state;
        };

        let value = slot_value(&state.raw_input);
        if value.trim().is_empty() {
            debug!(slot = %slot, "Empty utterance, slot left unfilled");
            return state;
        }

        match validation {
            Validation::Rejected { reason } => {
                debug!(slot = %slot, value = %value, "Candidate value rejected");
                state.messages.push(MessageLogEntry::assistant(prompts::value_rejected(
                    slot,
                    &value,
                    reason.as_deref(),
                )));
            }
            Validation::Skipped | Validation::Accepted => {
                debug!(slot = %slot, value = %value, "Slot collected");
                state.slots.insert(slot, value);
            }
        }
        state
    }
}

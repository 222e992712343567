//! Conversation state threaded through every turn.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A piece of information the dialogue must collect before completion.
///
/// Declaration order is request priority: the item is always asked for
/// before the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Item,
    Destination,
}

impl Slot {
    /// Every required slot, in priority order.
    pub const REQUIRED: [Slot; 2] = [Slot::Item, Slot::Destination];

    /// Wire identifier used in pending-slot markers.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Destination => "destination",
        }
    }

    /// Resolve a marker identifier. Unknown identifiers yield `None`.
    pub fn from_id(id: &str) -> Option<Slot> {
        Self::REQUIRED.into_iter().find(|slot| slot.id() == id)
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// One event in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MessageLogEntry {
    /// Text shown to the user.
    AssistantPrompt(String),
    /// The next utterance should fill this slot. Holds the raw identifier
    /// so a marker naming an unknown slot survives a round trip.
    PendingSlotMarker(String),
    /// Text the user typed.
    UserUtterance(String),
}

impl MessageLogEntry {
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::AssistantPrompt(text.into())
    }

    pub fn marker(slot: Slot) -> Self {
        Self::PendingSlotMarker(slot.id().to_string())
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::UserUtterance(text.into())
    }
}

/// Mutable record of one conversation.
///
/// Invariants:
/// - `slots` only ever holds required slots (keyed by [`Slot`]).
/// - `ended` implies every required slot is filled.
/// - `active_order` never goes back to `false` once set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    /// The utterance of the current turn.
    pub raw_input: String,
    pub slots: BTreeMap<Slot, String>,
    pub messages: Vec<MessageLogEntry>,
    /// Set once the opening utterance passes the keyword check.
    pub active_order: bool,
    pub ended: bool,
}

impl ConversationState {
    /// Fresh state: no slots, empty log, both flags cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value collected for `slot`, if any.
    pub fn slot(&self, slot: Slot) -> Option<&str> {
        self.slots.get(&slot).map(String::as_str)
    }

    /// Required slots not yet filled, in priority order.
    pub fn missing_slots(&self) -> Vec<Slot> {
        Slot::REQUIRED
            .into_iter()
            .filter(|slot| !self.slots.contains_key(slot))
            .collect()
    }

    /// The slot the next utterance will fill: only when the latest log
    /// entry is a marker naming a known slot.
    pub fn pending_slot(&self) -> Option<Slot> {
        match self.messages.last() {
            Some(MessageLogEntry::PendingSlotMarker(id)) => Slot::from_id(id),
            _ => None,
        }
    }

    /// Text of the most recent assistant prompt.
    pub fn latest_assistant_message(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|entry| match entry {
            MessageLogEntry::AssistantPrompt(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

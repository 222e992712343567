//! Dialogue core: the turn-by-turn order conversation.
//!
//! Each turn runs a fixed pipeline over a [`ConversationState`]: the
//! [`Checker`] gates order initiation, the router decides whether to go on,
//! the [`SlotExtractor`] fills the slot that was asked for last turn, and
//! the [`SlotCollector`] asks for the next missing slot or finishes the
//! order. Nothing in here performs I/O; external validation arrives as a
//! precomputed [`Validation`] verdict.

pub mod checker;
pub mod collector;
pub mod engine;
pub mod extractor;
pub mod prompts;
pub mod state;

#[cfg(test)]
mod proptests;

pub use checker::{Checker, Route, route};
pub use collector::SlotCollector;
pub use engine::{DialogueEngine, Step, TurnOutcome, TurnReport};
pub use extractor::{SlotExtractor, Validation, slot_value};
pub use state::{ConversationState, MessageLogEntry, Slot};

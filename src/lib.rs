//! Pizzabot: turn-based pizza ordering dialogue.

pub mod api;
pub mod catalog;
pub mod channels;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod session;

//! Fixed response templates.

use super::state::Slot;

/// First message a transport shows before the user has typed anything.
pub const GREETING: &str =
    "Hi! I am a pizza bot. I can help you order a pizza. What would you like to order?";

/// Appended when the opening utterance fails the keyword check.
pub const REJECTION: &str =
    "Invalid order. Please specify a pizza order. Try writing 'I want to order a pizza'.";

/// Appended once every required slot is filled.
pub const COMPLETION: &str =
    "Thank you for providing all the details. Your order is being processed!";

/// Question asked to fill `slot`.
pub fn slot_prompt(slot: Slot) -> &'static str {
    match slot {
        Slot::Item => "What pizza would you like to order?",
        Slot::Destination => "What is your delivery address?",
    }
}

/// Explanation shown when a candidate value fails external validation.
pub fn value_rejected(slot: Slot, value: &str, reason: Option<&str>) -> String {
    let subject = match slot {
        Slot::Item => format!("Sorry, \"{value}\" is not on our menu."),
        Slot::Destination => format!("Sorry, we cannot deliver to \"{value}\"."),
    };
    match reason {
        Some(reason) if !reason.trim().is_empty() => format!("{subject} {}", reason.trim()),
        _ => subject,
    }
}

//! Keyword gate for order initiation, and the router that follows it.

use tracing::debug;

use crate::config::DialogueConfig;

use super::prompts;
use super::state::{ConversationState, MessageLogEntry};

/// Decides whether the conversation has become an order request.
///
/// Matching is plain substring containment on the lower-cased input: every
/// keyword must occur somewhere, in any order. There is no tokenization, so
/// a single word such as "pizzaorder" satisfies the default keyword set.
#[derive(Debug, Clone)]
pub struct Checker {
    keywords: Vec<String>,
}

impl Default for Checker {
    fn default() -> Self {
        Self::from_config(&DialogueConfig::default())
    }
}

impl Checker {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &DialogueConfig) -> Self {
        Self::new(&config.keywords)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Whether `input` contains every keyword.
    pub fn matches(&self, input: &str) -> bool {
        let input = input.to_lowercase();
        self.keywords.iter().all(|keyword| input.contains(keyword.as_str()))
    }

    /// Run the gate. An already-active order passes through untouched.
    pub fn invoke(&self, mut state: ConversationState) -> ConversationState {
        if state.active_order {
            return state;
        }

        if self.matches(&state.raw_input) {
            debug!("Order request accepted");
            state.active_order = true;
        } else {
            debug!(input = %state.raw_input, "Input is not an order request");
            state
                .messages
                .push(MessageLogEntry::assistant(prompts::REJECTION));
        }
        state
    }
}

/// Where the pipeline goes after the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Extract,
    Terminate,
}

/// Pure routing decision on the checked state.
pub fn route(state: &ConversationState) -> Route {
    if state.active_order {
        Route::Extract
    } else {
        Route::Terminate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_input(input: &str) -> ConversationState {
        ConversationState {
            raw_input: input.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_order_request() {
        let state = Checker::default().invoke(with_input("I want to order a pizza"));
        assert!(state.active_order);
        assert!(state.messages.is_empty());
        assert_eq!(route(&state), Route::Extract);
    }

    #[test]
    fn matching_is_case_insensitive_and_unordered() {
        let checker = Checker::default();
        assert!(checker.matches("PIZZA! I would like to ORDER one"));
        assert!(checker.matches("pizzaorder"));
    }

    #[test]
    fn rejects_greeting() {
        let state = Checker::default().invoke(with_input("hello"));
        assert!(!state.active_order);
        assert!(!state.ended);
        assert_eq!(
            state.messages,
            vec![MessageLogEntry::assistant(prompts::REJECTION)]
        );
        assert_eq!(route(&state), Route::Terminate);
    }

    #[test]
    fn rejects_partial_match() {
        let state = Checker::default().invoke(with_input("I want a pizza"));
        assert!(!state.active_order);
    }

    #[test]
    fn active_order_passes_through() {
        let mut state = with_input("margherita");
        state.active_order = true;
        let before = state.clone();

        let after = Checker::default().invoke(state);
        assert_eq!(after, before);
    }

    #[test]
    fn custom_keywords_are_lowercased() {
        let checker = Checker::new(["Deliver", "BURGER"]);
        assert_eq!(checker.keywords(), ["deliver", "burger"]);
        assert!(checker.matches("please deliver a burger"));
        assert!(!checker.matches("I want to order a pizza"));
    }

    #[test]
    fn empty_keyword_set_accepts_everything() {
        let checker = Checker::new(Vec::<String>::new());
        assert!(checker.invoke(with_input("")).active_order);
    }
}

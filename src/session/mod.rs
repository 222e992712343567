//! Session layer: isolates one conversation per opaque session key and
//! drives turns through the dialogue engine.
//!
//! The engine itself is synchronous. Anything that needs the network (slot
//! validation, order submission) happens here, before or after the engine
//! pass.

pub mod manager;
pub mod store;

pub use manager::{SessionGreeting, SessionManager, TurnResponse};
pub use store::{Session, SessionStore, spawn_prune_task};

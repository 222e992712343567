//! HTTP surface for conversations.

pub mod routes;

pub use routes::{ApiState, session_routes};

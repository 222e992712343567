//! Error types for pizzabot.
//!
//! The dialogue core never fails: every step returns a state. These types
//! cover the plumbing around it (configuration, the catalog collaborator,
//! sessions, and the CLI channel).

use std::time::Duration;

use uuid::Uuid;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures talking to the remote catalog/order service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    #[error("Catalog request to {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("Catalog returned HTTP {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("Catalog client could not be built: {0}")]
    Client(String),
}

/// Session lookup and lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session {id} not found")]
    NotFound { id: Uuid },

    #[error("Session {id} has already ended")]
    Ended { id: Uuid },
}

/// CLI channel errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to read input on channel {name}: {reason}")]
    ReadFailed { name: String, reason: String },

    #[error("Failed to write output on channel {name}: {reason}")]
    WriteFailed { name: String, reason: String },
}

/// Result type alias for pizzabot.
pub type Result<T> = std::result::Result<T, Error>;

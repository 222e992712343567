//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Keywords an opening utterance must contain when nothing else is set.
pub const DEFAULT_KEYWORDS: [&str; 2] = ["order", "pizza"];

/// Dialogue configuration.
#[derive(Debug, Clone)]
pub struct DialogueConfig {
    /// Substrings that must all appear in the opening utterance.
    pub keywords: Vec<String>,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl DialogueConfig {
    /// Build from `PIZZABOT_KEYWORDS` (comma-separated), falling back to
    /// the default keyword set.
    pub fn from_env() -> Self {
        match std::env::var("PIZZABOT_KEYWORDS") {
            Ok(raw) => Self {
                keywords: parse_keywords(&raw),
            },
            Err(_) => Self::default(),
        }
    }
}

/// Split a comma-separated keyword list, dropping blanks.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Remote catalog/order service configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL, e.g. `http://localhost:9000/api`.
    pub base_url: String,
    /// Optional bearer token.
    pub api_key: Option<SecretString>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl CatalogConfig {
    /// Create a config for `base_url` with no key and the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Build from `PIZZABOT_CATALOG_*`. Returns `Ok(None)` when no catalog
    /// URL is configured (validation disabled).
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Ok(base_url) = std::env::var("PIZZABOT_CATALOG_URL") else {
            return Ok(None);
        };
        if base_url.trim().is_empty() {
            return Ok(None);
        }

        let mut config = Self::new(base_url.trim());

        config.api_key = std::env::var("PIZZABOT_CATALOG_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .map(SecretString::from);

        if let Ok(raw) = std::env::var("PIZZABOT_CATALOG_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PIZZABOT_CATALOG_TIMEOUT_SECS".to_string(),
                message: format!("expected a whole number of seconds, got {raw:?}"),
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(Some(config))
    }
}

/// Session lifecycle configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sessions with no turn for this long are pruned.
    pub idle_timeout: Duration,
    /// How often the prune sweep runs.
    pub prune_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(3600), // 1 hour
            prune_interval: Duration::from_secs(60),
        }
    }
}

impl SessionConfig {
    /// Build from `PIZZABOT_SESSION_IDLE_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("PIZZABOT_SESSION_IDLE_SECS") {
            config.idle_timeout = parse_idle_secs(&raw)?;
        }
        Ok(config)
    }
}

fn parse_idle_secs(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            key: "PIZZABOT_SESSION_IDLE_SECS".to_string(),
            message: format!("expected a positive number of seconds, got {raw:?}"),
        }),
    }
}

/// REST server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Port for the REST API. `None` disables the server.
    pub http_port: Option<u16>,
}

impl ServerConfig {
    /// Build from `PIZZABOT_HTTP_PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_port = match std::env::var("PIZZABOT_HTTP_PORT") {
            Ok(raw) => Some(raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PIZZABOT_HTTP_PORT".to_string(),
                message: format!("expected a port number, got {raw:?}"),
            })?),
            Err(_) => None,
        };
        Ok(Self { http_port })
    }
}

//! Configuration errors raised while building an LLM client.

use thiserror::Error;

/// Errors that make a client impossible to construct.
///
/// These are operator mistakes: they surface at startup, before the
/// first prompt is sent.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Unsupported LLM provider: {0}")]
    UnsupportedProvider(String),

    #[error("{provider} API key is required (set `api_key` or {env_var})")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

//! Provider selection.
//!
//! Maps the `[llm] provider` config string onto a concrete client.
//! The set of providers is closed; anything else is a startup error.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::config::LlmConfig;

use super::client::LlmClient;
use super::error::ConfigError;
use super::openai::OpenAiCompatibleClient;

/// Supported LLM vendors.
///
/// Both speak the OpenAI chat-completions wire format and only differ
/// in their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    DeepSeek,
}

impl Provider {
    /// Config name, e.g. `"deepseek"`.
    pub fn name(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::DeepSeek => "deepseek",
        }
    }

    /// Vendor name as shown in error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::DeepSeek => "DeepSeek",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::DeepSeek => "https://api.deepseek.com/v1",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-3.5-turbo",
            Provider::DeepSeek => "deepseek-chat",
        }
    }

    /// Environment variable consulted when no explicit key is configured.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "deepseek" => Ok(Provider::DeepSeek),
            _ => Err(ConfigError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Constructor arguments shared by every provider.
///
/// `None` means "use the provider's default".
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl From<&LlmConfig> for ClientOptions {
    fn from(config: &LlmConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        }
    }
}

/// Builds the client for `provider_name`.
///
/// Fails if the name is not a known provider or if the provider
/// cannot be configured (missing API key, malformed base URL).
pub fn create_client(
    provider_name: &str,
    options: ClientOptions,
) -> Result<Box<dyn LlmClient>, ConfigError> {
    let provider: Provider = provider_name.parse()?;
    debug!("Creating LLM client for provider {provider}");
    let client = OpenAiCompatibleClient::new(provider, options)?;
    Ok(Box::new(client))
}

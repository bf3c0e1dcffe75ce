//! OpenAI-compatible chat-completions client.
//!
//! Calls `POST {base_url}/chat/completions` with Bearer token
//! authentication. Used for every supported provider; OpenAI and
//! DeepSeek only differ in base URL, model and key variable.
//!
//! Each call is single-turn: the whole rendered prompt (history
//! included) travels as one `role: "user"` message.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::client::LlmClient;
use super::error::ConfigError;
use super::factory::{ClientOptions, Provider};
use super::SamplingParams;

// ── Chat completions API types ───────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

// ── OpenAiCompatibleClient ───────────────────────────────

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiCompatibleClient {
    client: Client,
    provider: Provider,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiCompatibleClient {
    /// Creates a client for `provider`.
    ///
    /// The API key comes from `options.api_key`, or from the provider's
    /// environment variable when that is absent or empty.
    pub fn new(provider: Provider, options: ClientOptions) -> Result<Self, ConfigError> {
        Self::with_env(provider, options, |var| std::env::var(var).ok())
    }

    /// Like [`new`](Self::new) with a pluggable environment lookup.
    fn with_env(
        provider: Provider,
        options: ClientOptions,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = options
            .api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| env(provider.api_key_env()).filter(|key| !key.trim().is_empty()))
            .ok_or(ConfigError::MissingApiKey {
                provider: provider.display_name(),
                env_var: provider.api_key_env(),
            })?;

        let base_url = match options.base_url {
            Some(url) => normalize_base_url(&url)?,
            None => provider.default_base_url().to_string(),
        };

        let model = options
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());

        Ok(Self {
            client: Client::new(),
            provider,
            api_key,
            base_url,
            model,
        })
    }
}

/// Validates a base URL override and strips any trailing slash.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            "Calling {} API ({}) with a {} char prompt",
            self.provider.display_name(),
            self.model,
            prompt.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} API error ({status}): {body}", self.provider.display_name());
        }

        let resp: ChatResponse = response
            .json()
            .await
            .context("malformed chat completion response")?;

        if let Some(usage) = &resp.usage {
            info!(
                "LLM response: {} in / {} out tokens",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        let choice = resp
            .choices
            .into_iter()
            .next()
            .context("chat completion response contained no choices")?;

        Ok(choice.message.content.unwrap_or_default())
    }

    fn description(&self) -> String {
        format!("{} ({})", self.provider, self.model)
    }
}

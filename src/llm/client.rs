//! `LlmClient` trait — abstraction over LLM backends.
//!
//! Vendors (OpenAI, DeepSeek, …) implement this trait so the chat
//! session can be configured to use any supported backend via the
//! `[llm] provider` config field.

use anyhow::Result;
use async_trait::async_trait;
use tracing::error;

use super::SamplingParams;

/// Abstraction over LLM backends.
///
/// Implementors only provide [`complete`](LlmClient::complete), which
/// reports failures as errors. Callers that just want something to show
/// the user go through [`generate`](LlmClient::generate) instead.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends a single-turn prompt to the LLM and returns the reply text.
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String>;

    /// Human-readable description of the provider and model.
    ///
    /// Used in logs, e.g. `"deepseek (deepseek-chat)"`.
    fn description(&self) -> String;

    /// Fail-soft variant of [`complete`](LlmClient::complete).
    ///
    /// Never fails: transport and API errors come back as text starting
    /// with `"Error: "`, indistinguishable in type from a real reply.
    async fn generate(&self, prompt: &str, temperature: f32, max_tokens: u32) -> String {
        let params = SamplingParams {
            temperature,
            max_tokens,
        };
        match self.complete(prompt, &params).await {
            Ok(text) => text,
            Err(e) => {
                error!("{} API error: {e:#}", self.description());
                format!("Error: {e:#}")
            }
        }
    }
}

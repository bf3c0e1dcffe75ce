pub mod client;
pub mod error;
pub mod factory;
pub mod openai;

pub use client::LlmClient;
pub use factory::{create_client, ClientOptions};

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

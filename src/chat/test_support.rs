//! In-memory `LlmClient` for chat tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use crate::llm::{LlmClient, SamplingParams};

/// Replies from a script, then `"reply N"` once the script runs out.
/// Records every prompt and sampling pair it receives.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<String>>,
    prompts: Arc<Mutex<Vec<String>>>,
    params: Arc<Mutex<Vec<(f32, u32)>>>,
}

impl ScriptedClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            prompts: Arc::default(),
            params: Arc::default(),
        }
    }

    pub fn echoing() -> Self {
        Self::new(Vec::<String>::new())
    }

    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }

    pub fn params(&self) -> Arc<Mutex<Vec<(f32, u32)>>> {
        Arc::clone(&self.params)
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String> {
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len()
        };
        self.params
            .lock()
            .unwrap()
            .push((params.temperature, params.max_tokens));
        let scripted = self.replies.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| format!("reply {call}")))
    }

    fn description(&self) -> String {
        "scripted (test)".to_string()
    }
}

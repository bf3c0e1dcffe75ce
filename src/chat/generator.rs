//! Turns one line of user input into a reply.
//!
//! Renders the prompt with the current history as context, asks the LLM
//! and records the exchange.

use tracing::{debug, info};

use crate::llm::LlmClient;
use crate::prompt::{TemplateError, TemplateRegistry};

use super::history::ConversationHistory;

/// Turns user input into a model reply.
///
/// Renders the selected template with the rolling history as context,
/// calls the LLM, and records the exchange. Owns the history; the
/// template registry is handed in at construction.
pub struct ResponseGenerator {
    llm: Box<dyn LlmClient>,
    templates: TemplateRegistry,
    history: ConversationHistory,
}

impl ResponseGenerator {
    pub fn new(llm: Box<dyn LlmClient>, templates: TemplateRegistry) -> Self {
        Self {
            llm,
            templates,
            history: ConversationHistory::new(),
        }
    }

    /// Produces the reply to `user_input`.
    ///
    /// The reply is returned verbatim, including `"Error: …"` text from a
    /// failed LLM call; such replies are recorded in the history like any
    /// other. Only template rendering errors are returned as `Err`, in
    /// which case the history is left untouched.
    pub async fn generate_response(
        &mut self,
        user_input: &str,
        template_name: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, TemplateError> {
        let context = self.history.snapshot();
        let prompt = self
            .templates
            .render(template_name, user_input, Some(context.as_slice()))?;

        debug!(
            "Rendered '{template_name}' prompt ({} chars, {} context turns)",
            prompt.chars().count(),
            context.len()
        );

        let reply = self.llm.generate(&prompt, temperature, max_tokens).await;

        self.history.push_exchange(user_input, &reply);

        info!(
            "Reply: {} chars, history now {} turns",
            reply.chars().count(),
            self.history.len()
        );

        Ok(reply)
    }

    /// Forgets the conversation so far.
    pub fn clear_context(&mut self) {
        if !self.history.is_empty() {
            info!("Clearing {} turns of context", self.history.len());
        }
        self.history.clear();
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn llm_description(&self) -> String {
        self.llm.description()
    }
}

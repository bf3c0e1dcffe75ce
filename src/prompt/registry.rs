//! Named prompt templates.
//!
//! Holds the three built-ins plus anything declared under
//! `[templates.*]`. Lookups of unknown names fall back to `default`.

use std::collections::HashMap;

use tracing::debug;

use crate::chat::Turn;
use crate::config::TemplateConfig;

use super::template::{PromptTemplate, TemplateError};

/// Name of the template that unknown lookups fall back to.
pub const DEFAULT_TEMPLATE: &str = "default";

/// Named prompt templates.
///
/// The `default` entry always exists: it can be replaced through
/// [`register`](Self::register) but never removed, so [`get`](Self::get)
/// cannot fail.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    default: PromptTemplate,
    templates: HashMap<String, PromptTemplate>,
}

impl TemplateRegistry {
    /// Registry holding the built-in `default`, `code_generation` and `qa` templates.
    pub fn new() -> Self {
        let mut registry = Self {
            default: builtin(
                "{system_prompt}\n\n用户问题: {user_input}",
                "你是一个智能助手，回答用户的问题",
            ),
            templates: HashMap::new(),
        };
        registry.register(
            "code_generation",
            builtin(
                "{system_prompt}\n\n请基于Python语言，实现以下功能，要求代码可运行，并附带注释。\n\n功能描述: {user_input}",
                "你是一个专业的Python程序员",
            ),
        );
        registry.register(
            "qa",
            builtin(
                "{system_prompt}\n\n上下文信息:\n{context}\n\n用户问题: {user_input}",
                "请根据上下文信息，回答用户的问题",
            ),
        );
        registry
    }

    /// Built-ins plus every template declared under `[templates.*]`.
    pub fn from_config(
        templates: &HashMap<String, TemplateConfig>,
    ) -> Result<Self, TemplateError> {
        let mut registry = Self::new();
        for (name, config) in templates {
            let template =
                PromptTemplate::new(config.template.as_str(), config.system_prompt.as_str())?;
            registry.register(name, template);
        }
        Ok(registry)
    }

    /// Returns the named template, or the default one if `name` is unknown.
    pub fn get(&self, name: &str) -> &PromptTemplate {
        if name == DEFAULT_TEMPLATE {
            return &self.default;
        }
        self.templates.get(name).unwrap_or(&self.default)
    }

    pub fn contains(&self, name: &str) -> bool {
        name == DEFAULT_TEMPLATE || self.templates.contains_key(name)
    }

    /// Inserts or replaces a template.
    pub fn register(&mut self, name: impl Into<String>, template: PromptTemplate) {
        let name = name.into();
        debug!("Registering prompt template '{name}'");
        if name == DEFAULT_TEMPLATE {
            self.default = template;
        } else {
            self.templates.insert(name, template);
        }
    }

    /// Registered template names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.push(DEFAULT_TEMPLATE);
        names.sort_unstable();
        names
    }

    /// Looks up `name` (with fallback) and renders it.
    pub fn render(
        &self,
        name: &str,
        user_input: &str,
        context: Option<&[Turn]>,
    ) -> Result<String, TemplateError> {
        self.get(name).render(user_input, context)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin(template: &str, system_prompt: &str) -> PromptTemplate {
    PromptTemplate::new(template, system_prompt).expect("built-in template parses")
}

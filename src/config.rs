use std::collections::HashMap;

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::llm::SamplingParams;
use crate::prompt::DEFAULT_TEMPLATE;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    /// Extra prompt templates, keyed by name
    #[serde(default)]
    pub templates: HashMap<String, TemplateConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// "openai" or "deepseek" (case-insensitive)
    pub provider: String,
    /// Supports ${ENV_VAR} substitution; falls back to the provider's env var
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Overrides the provider's default model
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Template used for every turn
    #[serde(default = "default_template")]
    pub template: String,
    /// Typing this line ends the session
    #[serde(default = "default_exit_command")]
    pub exit_command: String,
    /// Typing this line forgets the conversation so far (disabled if unset)
    #[serde(default)]
    pub clear_command: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TemplateConfig {
    pub template: String,
    #[serde(default)]
    pub system_prompt: String,
}

fn default_temperature() -> f32 {
    SamplingParams::default().temperature
}

fn default_max_tokens() -> u32 {
    SamplingParams::default().max_tokens
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

fn default_exit_command() -> String {
    "退出".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            template: default_template(),
            exit_command: default_exit_command(),
            clear_command: None,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {path}"))?;
        Self::parse(&content).with_context(|| format!("invalid config file {path}"))
    }

    /// Parses and validates config text.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        // Expand environment variables like ${DEEPSEEK_API_KEY}
        let escaped = escape_bare_dollars(content);
        let expanded = shellexpand::env(&escaped)?;
        let config: Config = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let chat = &self.chat;
        if chat.max_tokens == 0 {
            bail!("chat.max_tokens must be greater than 0");
        }
        if !chat.temperature.is_finite() || !(0.0..=2.0).contains(&chat.temperature) {
            bail!(
                "chat.temperature must be between 0.0 and 2.0, got {}",
                chat.temperature
            );
        }
        if chat.exit_command.is_empty() {
            bail!("chat.exit_command must not be empty");
        }
        if chat.clear_command.as_deref() == Some(chat.exit_command.as_str()) {
            bail!("chat.clear_command must differ from chat.exit_command");
        }
        Ok(())
    }
}

/// Doubles every `$` that does not open a `${...}` reference.
///
/// The expander reads `$$` as a literal `$`, so prompt text like `$5`
/// or `$HOME` survives loading unchanged.
fn escape_bare_dollars(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        escaped.push(c);
        if c == '$' && chars.peek() != Some(&'{') {
            escaped.push('$');
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::parse(
            r#"
            [llm]
            provider = "deepseek"
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.provider, "deepseek");
        assert!(config.llm.api_key.is_none());
        assert!(config.llm.base_url.is_none());
        assert!(config.llm.model.is_none());
        assert_eq!(config.chat.temperature, 0.7);
        assert_eq!(config.chat.max_tokens, 1024);
        assert_eq!(config.chat.template, "default");
        assert_eq!(config.chat.exit_command, "退出");
        assert!(config.chat.clear_command.is_none());
        assert!(config.templates.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            [llm]
            provider = "OpenAI"
            api_key = "sk-inline"
            base_url = "http://localhost:8000/v1"
            model = "gpt-4o-mini"

            [chat]
            temperature = 0.2
            max_tokens = 512
            template = "translate"
            exit_command = "/quit"
            clear_command = "/clear"

            [templates.translate]
            system_prompt = "Translate to English"
            template = "{system_prompt}\n\n{user_input}"
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-inline"));
        assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:8000/v1"));
        assert_eq!(config.llm.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.chat.temperature, 0.2);
        assert_eq!(config.chat.max_tokens, 512);
        assert_eq!(config.chat.template, "translate");
        assert_eq!(config.chat.exit_command, "/quit");
        assert_eq!(config.chat.clear_command.as_deref(), Some("/clear"));
        let translate = &config.templates["translate"];
        assert_eq!(translate.system_prompt, "Translate to English");
        assert_eq!(translate.template, "{system_prompt}\n\n{user_input}");
    }

    #[test]
    fn test_env_var_expansion() {
        std::env::set_var("PROMPTLINE_TEST_CONFIG_KEY", "sk-from-env");
        let config = Config::parse(
            r#"
            [llm]
            provider = "deepseek"
            api_key = "${PROMPTLINE_TEST_CONFIG_KEY}"
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-from-env"));
    }

    #[test]
    fn test_bare_dollars_are_kept_verbatim() {
        std::env::set_var("PROMPTLINE_TEST_BARE_DOLLAR", "expanded");
        let config = Config::parse(
            r#"
            [llm]
            provider = "deepseek"

            [templates.price]
            system_prompt = "Prices are in $USD, $$ means expensive"
            template = "{user_input} costs $5 $PROMPTLINE_TEST_BARE_DOLLAR $"
            "#,
        )
        .unwrap();
        let price = &config.templates["price"];
        assert_eq!(
            price.template,
            "{user_input} costs $5 $PROMPTLINE_TEST_BARE_DOLLAR $"
        );
        assert_eq!(price.system_prompt, "Prices are in $USD, $$ means expensive");
    }

    #[test]
    fn test_escape_bare_dollars() {
        assert_eq!(escape_bare_dollars("no dollars"), "no dollars");
        assert_eq!(escape_bare_dollars("${KEY} $5 $"), "${KEY} $$5 $$");
        assert_eq!(escape_bare_dollars("$${KEY}"), "$$${KEY}");
    }

    #[test]
    fn test_shipped_example_config_loads() {
        std::env::set_var("DEEPSEEK_API_KEY", "sk-example");
        let config = Config::load(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/config/promptline.example.toml"
        ))
        .unwrap();
        assert_eq!(config.llm.provider, "deepseek");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-example"));
        assert_eq!(config.chat.template, "default");
        assert!(config.templates.is_empty());
    }

    #[test]
    fn test_unset_env_var_is_an_error() {
        let result = Config::parse(
            r#"
            [llm]
            provider = "deepseek"
            api_key = "${PROMPTLINE_TEST_SURELY_UNSET_VARIABLE}"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_llm_section_is_an_error() {
        assert!(Config::parse("[chat]\nmax_tokens = 10\n").is_err());
    }

    #[test]
    fn test_zero_max_tokens_rejected() {
        let err = Config::parse(
            r#"
            [llm]
            provider = "openai"
            [chat]
            max_tokens = 0
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn test_out_of_range_temperature_rejected() {
        let err = Config::parse(
            r#"
            [llm]
            provider = "openai"
            [chat]
            temperature = 3.5
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_empty_exit_command_rejected() {
        let err = Config::parse(
            r#"
            [llm]
            provider = "openai"
            [chat]
            exit_command = ""
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("exit_command"));
    }

    #[test]
    fn test_clear_command_equal_to_exit_rejected() {
        let err = Config::parse(
            r#"
            [llm]
            provider = "openai"
            [chat]
            exit_command = "bye"
            clear_command = "bye"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("clear_command"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[llm]\nprovider = \"openai\"\n\n[chat]\ntemperature = 1.0").unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.chat.temperature, 1.0);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = Config::load(path.to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("nope.toml"));
    }
}

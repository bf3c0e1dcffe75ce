mod chat;
mod config;
mod llm;
mod prompt;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::chat::{ChatSession, ResponseGenerator};
use crate::config::Config;
use crate::llm::{create_client, ClientOptions};
use crate::prompt::{TemplateRegistry, DEFAULT_TEMPLATE};

fn print_help() {
    println!(
        "\
promptline v{}

A terminal chat client for OpenAI-compatible LLM endpoints.

USAGE:
    promptline [OPTIONS] [CONFIG_PATH]

ARGUMENTS:
    CONFIG_PATH    Path to TOML configuration file [default: config/promptline.toml]

OPTIONS:
    -h, --help       Print this help message and exit
    -V, --version    Print version and exit

ENVIRONMENT VARIABLES:
    Variables can be referenced in the config file via ${{VAR_NAME}} syntax.

    RUST_LOG            Log level filter for tracing, written to stderr
                        (e.g. debug, promptline=info)
    OPENAI_API_KEY      API key for OpenAI, used when [llm] api_key is unset
    DEEPSEEK_API_KEY    API key for DeepSeek, used when [llm] api_key is unset

EXAMPLES:
    promptline                             # uses config/promptline.toml
    promptline ~/.config/promptline.toml   # custom config path
    RUST_LOG=debug promptline              # with debug logging",
        env!("CARGO_PKG_VERSION"),
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Handle --help / --version before anything else
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("promptline v{}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {}
        }
    }

    // Logs go to stderr so they stay out of the conversation
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("promptline=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/promptline.toml".to_string());

    info!("Loading configuration from {config_path}");
    let mut config = Config::load(&config_path)?;

    let llm = create_client(&config.llm.provider, ClientOptions::from(&config.llm))?;
    info!("LLM: {}", llm.description());

    let templates = TemplateRegistry::from_config(&config.templates)?;
    info!("Prompt templates: {}", templates.names().join(", "));
    if !templates.contains(&config.chat.template) {
        warn!(
            "Unknown template '{}', falling back to '{DEFAULT_TEMPLATE}'",
            config.chat.template
        );
        config.chat.template = DEFAULT_TEMPLATE.to_string();
    }

    let generator = ResponseGenerator::new(llm, templates);
    let mut session = ChatSession::new(generator, config.chat);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    session.run(stdin, tokio::io::stdout()).await
}

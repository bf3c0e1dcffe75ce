//! The interactive stdin/stdout loop.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

use crate::config::ChatConfig;
use crate::prompt::TemplateError;

use super::generator::ResponseGenerator;

/// Shown before each line of user input.
const INPUT_PROMPT: &str = "你: ";

/// Prefixed to every reply.
const REPLY_PREFIX: &str = "智能体: ";

const CLEARED_NOTICE: &str = "（对话上下文已清除）\n";

/// The interactive loop.
///
/// Reads one line per turn, hands it to the generator and prints the
/// reply. Ends on the configured exit command or at end of input.
pub struct ChatSession {
    generator: ResponseGenerator,
    config: ChatConfig,
}

impl ChatSession {
    pub fn new(generator: ResponseGenerator, config: ChatConfig) -> Self {
        Self { generator, config }
    }

    /// Main chat loop
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(
            "Chat session started with {} (template '{}')",
            self.generator.llm_description(),
            self.config.template
        );

        output
            .write_all(
                format!(
                    "欢迎进入智能体群聊！输入 '{}' 结束聊天。\n",
                    self.config.exit_command
                )
                .as_bytes(),
            )
            .await?;

        let mut lines = input.lines();
        loop {
            output.write_all(INPUT_PROMPT.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                info!("End of input, leaving chat");
                output.write_all(b"\n").await?;
                break;
            };

            if line == self.config.exit_command {
                info!("Exit command received, leaving chat");
                break;
            }

            if self.config.clear_command.as_deref() == Some(line.as_str()) {
                self.generator.clear_context();
                output.write_all(CLEARED_NOTICE.as_bytes()).await?;
                continue;
            }

            let result = self
                .generator
                .generate_response(
                    &line,
                    &self.config.template,
                    self.config.temperature,
                    self.config.max_tokens,
                )
                .await;

            output.write_all(reply_line(result).as_bytes()).await?;
        }

        info!(
            "Chat ended with {} turns of context",
            self.generator.history().len()
        );
        output.flush().await?;
        Ok(())
    }
}

/// Formats one turn's outcome for the terminal.
///
/// Templates are checked when they are built, so a rendering error here
/// means the registry and the history disagree; the turn is reported and
/// skipped.
fn reply_line(result: Result<String, TemplateError>) -> String {
    match result {
        Ok(reply) => format!("{REPLY_PREFIX}{reply}\n"),
        Err(e) => {
            error!("Could not build prompt: {e}");
            format!("{REPLY_PREFIX}抱歉，生成提示词时出错: {e}\n")
        }
    }
}

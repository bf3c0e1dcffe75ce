//! Prompt templates.
//!
//! A template is a string with `{slot}` placeholders. Three slots exist:
//! `system_prompt`, `user_input` and `context`. `{{` and `}}` produce
//! literal braces. The string is parsed once, when the template is built,
//! so a typo in a slot name is reported at startup rather than on the
//! first message.

use thiserror::Error;

use crate::chat::Turn;

/// Errors raised while parsing or rendering a template.
#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("unknown slot '{{{0}}}' in template")]
    UnknownSlot(String),

    #[error("unmatched '{{' at byte {0} in template")]
    UnclosedBrace(usize),

    #[error("single '}}' at byte {0} in template")]
    StrayBrace(usize),

    #[error("no value supplied for slot '{{{0}}}'")]
    MissingSlot(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    SystemPrompt,
    UserInput,
    Context,
}

impl Slot {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "system_prompt" => Some(Slot::SystemPrompt),
            "user_input" => Some(Slot::UserInput),
            "context" => Some(Slot::Context),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Slot(Slot),
}

/// A parsed prompt template with its fixed system prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    source: String,
    system_prompt: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn new(
        template: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Result<Self, TemplateError> {
        let source = template.into();
        let segments = parse(&source)?;
        Ok(Self {
            source,
            system_prompt: system_prompt.into(),
            segments,
        })
    }

    /// True if the template has a `{context}` placeholder.
    pub fn uses_context(&self) -> bool {
        self.segments.contains(&Segment::Slot(Slot::Context))
    }

    /// Renders the final prompt.
    ///
    /// `context` is only consulted when the template has a `{context}`
    /// slot; in that case `None` is an error. `Some(&[])` renders an
    /// empty context block.
    pub fn render(
        &self,
        user_input: &str,
        context: Option<&[Turn]>,
    ) -> Result<String, TemplateError> {
        let context_block = match context {
            Some(turns) if self.uses_context() => Some(render_context(turns)),
            None if self.uses_context() => return Err(TemplateError::MissingSlot("context")),
            _ => None,
        };

        let mut out = String::with_capacity(self.source.len() + user_input.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(Slot::SystemPrompt) => out.push_str(&self.system_prompt),
                Segment::Slot(Slot::UserInput) => out.push_str(user_input),
                Segment::Slot(Slot::Context) => {
                    out.push_str(context_block.as_deref().unwrap_or_default())
                }
            }
        }
        Ok(out)
    }
}

/// Formats turns as `"{role}: {content}"` lines, oldest first.
pub fn render_context(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse(source: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                literal.push('{');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(TemplateError::UnclosedBrace(pos));
                }
                let slot = Slot::parse(&name).ok_or(TemplateError::UnknownSlot(name))?;
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Slot(slot));
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                literal.push('}');
            }
            '}' => return Err(TemplateError::StrayBrace(pos)),
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

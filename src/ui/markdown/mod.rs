//! Turning transcript messages into terminal lines.
//!
//! Assistant text goes through [`segments::render`]: prose is rendered as
//! styled markdown, fenced code as numbered literal blocks that `/copy` can
//! address. User text is shown as typed, minus control characters.

mod code;
mod prose;
pub mod sanitize;
pub mod segments;

use std::fmt;
use std::io::Write;

use ratatui::text::{Line, Span};

use crate::core::message::{Message, Role};
use crate::ui::theme::Theme;
use crate::utils::clipboard::{copy_with_fallback_using, ClipboardMethod};

pub use sanitize::sanitize_display;
pub use segments::{render, RenderSegment, SegmentKind};

const USER_PREFIX: &str = "You: ";

/// A fenced block as it appears on screen, numbered from 1 across the
/// whole transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBlock {
    pub index: usize,
    pub language: String,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct RenderedTranscript {
    pub lines: Vec<Line<'static>>,
    pub code_blocks: Vec<CodeBlock>,
}

impl RenderedTranscript {
    pub fn code_block(&self, index: usize) -> Option<&CodeBlock> {
        self.code_blocks.iter().find(|block| block.index == index)
    }
}

/// Render every message, separated by blank lines.
pub fn render_transcript(
    messages: &[Message],
    theme: &Theme,
    syntax_enabled: bool,
) -> RenderedTranscript {
    let mut rendered = RenderedTranscript::default();
    for message in messages {
        if !rendered.lines.is_empty() {
            rendered.lines.push(Line::from(""));
        }
        render_message_into(message, theme, syntax_enabled, &mut rendered);
    }
    rendered
}

/// Render one message, numbering its code blocks after those already in `out`.
pub fn render_message_into(
    message: &Message,
    theme: &Theme,
    syntax_enabled: bool,
    out: &mut RenderedTranscript,
) {
    match message.role {
        Role::User => out.lines.extend(render_user_text(&message.content, theme)),
        Role::Assistant => {
            for (position, segment) in render(&message.content).into_iter().enumerate() {
                if position > 0 {
                    out.lines.push(Line::from(""));
                }
                match segment.kind {
                    SegmentKind::Prose => {
                        out.lines.extend(prose::render_prose(&segment.text, theme));
                    }
                    SegmentKind::Code => {
                        let index = out.code_blocks.len() + 1;
                        let language = segment.language.unwrap_or_default();
                        out.lines.extend(code::render_code_block(
                            index,
                            &language,
                            &segment.text,
                            theme,
                            syntax_enabled,
                        ));
                        out.code_blocks.push(CodeBlock {
                            index,
                            language,
                            text: segment.text,
                        });
                    }
                }
            }
        }
    }
}

fn render_user_text(content: &str, theme: &Theme) -> Vec<Line<'static>> {
    let content = sanitize_display(content);
    let continuation = " ".repeat(USER_PREFIX.len());
    content
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            let prefix = if i == 0 {
                Span::styled(USER_PREFIX, theme.user_prefix_style)
            } else {
                Span::raw(continuation.clone())
            };
            Line::from(vec![
                prefix,
                Span::styled(line.replace('\t', "    "), theme.user_text_style),
            ])
        })
        .collect()
}

/// Code blocks of the transcript, numbered the same way the screen shows them.
pub fn collect_code_blocks(messages: &[Message]) -> Vec<CodeBlock> {
    messages
        .iter()
        .filter(|message| message.role.is_assistant())
        .flat_map(|message| render(&message.content))
        .filter(RenderSegment::is_code)
        .enumerate()
        .map(|(i, segment)| CodeBlock {
            index: i + 1,
            language: segment.language.unwrap_or_default(),
            text: segment.text,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyError {
    NoSuchBlock { index: usize, available: usize },
    Clipboard(String),
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyError::NoSuchBlock { index, available: 0 } => {
                write!(f, "No code block [{index}]; the conversation has none")
            }
            CopyError::NoSuchBlock { index, available } => {
                write!(f, "No code block [{index}]; choose 1 to {available}")
            }
            CopyError::Clipboard(reason) => write!(f, "Copy failed: {reason}"),
        }
    }
}

impl std::error::Error for CopyError {}

/// Put the literal text of code block `index` on the clipboard.
pub fn copy_code_block<W: Write>(
    messages: &[Message],
    index: usize,
    terminal: &mut W,
) -> Result<ClipboardMethod, CopyError> {
    copy_code_block_using(messages, index, terminal, crate::utils::clipboard::copy_to_clipboard)
}

fn copy_code_block_using<W, F>(
    messages: &[Message],
    index: usize,
    terminal: &mut W,
    primary: F,
) -> Result<ClipboardMethod, CopyError>
where
    W: Write,
    F: FnOnce(&str) -> Result<(), String>,
{
    let blocks = collect_code_blocks(messages);
    let block = blocks
        .iter()
        .find(|block| block.index == index)
        .ok_or(CopyError::NoSuchBlock {
            index,
            available: blocks.len(),
        })?;
    copy_with_fallback_using(&block.text, terminal, primary).map_err(CopyError::Clipboard)
}

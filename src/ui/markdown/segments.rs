//! Splitting assistant text into prose and fenced code.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::core::answer::strip_reasoning;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    Prose,
    Code,
}

/// One displayable piece of an assistant message.
///
/// Code segments always carry a language, which is empty when the fence had
/// no tag. Prose segments carry none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderSegment {
    pub kind: SegmentKind,
    pub text: String,
    pub language: Option<String>,
}

impl RenderSegment {
    pub fn prose(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Prose,
            text: text.into(),
            language: None,
        }
    }

    pub fn code(language: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Code,
            text: text.into(),
            language: Some(language.into()),
        }
    }

    pub fn is_code(&self) -> bool {
        self.kind == SegmentKind::Code
    }
}

/// Strip reasoning and split `raw` into ordered segments.
pub fn render(raw: &str) -> Vec<RenderSegment> {
    split_segments(&strip_reasoning(raw))
}

/// Split on triple-backtick fences. Tilde fences and indented blocks stay
/// in the surrounding prose.
pub fn split_segments(text: &str) -> Vec<RenderSegment> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    let mut open: Option<OpenFence> = None;

    for (event, range) in Parser::new_ext(text, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) if open.is_none() => {
                if !text[range.start..].trim_start().starts_with("```") {
                    continue;
                }
                push_prose(&mut segments, &text[cursor..range.start]);
                open = Some(OpenFence {
                    language: info.split_ascii_whitespace().next().unwrap_or("").to_string(),
                    body: String::new(),
                    end: range.end,
                });
            }
            Event::Text(chunk) => {
                if let Some(fence) = open.as_mut() {
                    fence.body.push_str(&chunk);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(fence) = open.take() {
                    cursor = fence.end.min(text.len());
                    segments.push(RenderSegment::code(fence.language, trim_code(&fence.body)));
                }
            }
            _ => {}
        }
    }

    // The parser closes an unterminated fence at end of input, so this only
    // fires if the event stream was cut short.
    if let Some(fence) = open.take() {
        segments.push(RenderSegment::code(fence.language, trim_code(&fence.body)));
        cursor = text.len();
    }
    push_prose(&mut segments, &text[cursor..]);
    segments
}

struct OpenFence {
    language: String,
    body: String,
    end: usize,
}

fn push_prose(segments: &mut Vec<RenderSegment>, span: &str) {
    let trimmed = span.trim_matches(|c| c == '\n' || c == '\r');
    if !trimmed.trim().is_empty() {
        segments.push(RenderSegment::prose(trimmed));
    }
}

/// Drop blank leading lines and trailing whitespace, keep indentation.
pub(super) fn trim_code(body: &str) -> String {
    let mut rest = body;
    while let Some(newline) = rest.find('\n') {
        if rest[..newline].trim().is_empty() {
            rest = &rest[newline + 1..];
        } else {
            break;
        }
    }
    rest.trim_end().to_string()
}

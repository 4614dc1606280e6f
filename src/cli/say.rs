//! TUI-less "say" command

use std::error::Error;
use std::fmt;
use std::path::Path;

use ratatui::crossterm::terminal;
use ratatui::text::Line;

use crate::core::chat::{ChatOrchestrator, SendOutcome, SendRejected, FAILURE_REPLY};
use crate::core::message::{Message, Role};
use crate::core::upload::UploadRejection;
use crate::ui::markdown::render_transcript;
use crate::ui::theme::Theme;
use crate::utils::scroll::prewrap_lines;

#[derive(Debug)]
pub enum SayError {
    Upload(UploadRejection),
    Rejected(SendRejected),
    /// The request failed; the detail went to the log.
    Failed,
}

impl fmt::Display for SayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SayError::Upload(rejection) => write!(f, "{}", rejection.message()),
            SayError::Rejected(rejected) => write!(f, "{rejected}"),
            SayError::Failed => write!(f, "{FAILURE_REPLY}"),
        }
    }
}

impl Error for SayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SayError::Upload(rejection) => Some(rejection),
            SayError::Rejected(rejected) => Some(rejected),
            SayError::Failed => None,
        }
    }
}

/// Attach `file` if given, send `prompt`, and return the cleaned answer.
pub async fn say_once(
    chat: &mut ChatOrchestrator,
    prompt: &str,
    file: Option<&Path>,
) -> Result<String, SayError> {
    if let Some(path) = file {
        chat.uploads_mut().attach(path).await.map_err(SayError::Upload)?;
    }

    match chat.send(prompt).await.map_err(SayError::Rejected)? {
        SendOutcome::Answered { .. } => Ok(chat
            .log()
            .last()
            .map(|message| message.content.clone())
            .unwrap_or_default()),
        SendOutcome::Failed { .. } => Err(SayError::Failed),
    }
}

/// Render an answer the way the chat screen would, without colors.
pub fn render_plain(answer: &str, width: Option<u16>) -> Vec<String> {
    let message = Message {
        id: 0,
        role: Role::Assistant,
        content: answer.to_string(),
    };
    let lines = render_transcript(&[message], &Theme::monochrome(), false).lines;
    let lines: Vec<Line<'static>> = match width {
        Some(width) => prewrap_lines(&lines, width),
        None => lines,
    };
    lines.iter().map(|line| line.to_string()).collect()
}

pub async fn run_say(
    mut chat: ChatOrchestrator,
    prompt: Vec<String>,
    file: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() && file.is_none() {
        eprintln!("Usage: chatdesk say [--file PATH] <prompt>");
        std::process::exit(1);
    }

    match say_once(&mut chat, &prompt, file).await {
        Ok(answer) => {
            let width = terminal::size().ok().map(|(w, _)| w);
            for line in render_plain(&answer, width) {
                println!("{line}");
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    }
}

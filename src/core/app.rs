//! State of one interactive session: the chat itself plus what the screen
//! shows around it.

use crate::core::chat::ChatOrchestrator;
use crate::core::upload::AttachmentState;
use crate::ui::theme::Theme;
use crate::utils::scroll::ScrollState;
use tui_textarea::TextArea;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

/// A dismissable panel drawn over the transcript (help, model list).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub title: String,
    pub lines: Vec<String>,
}

pub struct UiState {
    pub theme: Theme,
    pub syntax_enabled: bool,
    pub status: Option<Status>,
    pub overlay: Option<Overlay>,
    pub textarea: TextArea<'static>,
    pub scroll: ScrollState,
    /// Wrapped transcript height from the last draw.
    pub transcript_lines: usize,
    /// Transcript viewport height from the last draw.
    pub viewport_height: u16,
    pub loading_frame: usize,
    pub exit_requested: bool,
}

impl UiState {
    pub fn new(theme: Theme, syntax_enabled: bool) -> Self {
        Self {
            theme,
            syntax_enabled,
            status: None,
            overlay: None,
            textarea: new_textarea(),
            scroll: ScrollState::default(),
            transcript_lines: 0,
            viewport_height: 0,
            loading_frame: 0,
            exit_requested: false,
        }
    }
}

fn new_textarea() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_cursor_line_style(ratatui::style::Style::default());
    textarea
}

pub struct App {
    pub chat: ChatOrchestrator,
    pub ui: UiState,
}

impl App {
    pub fn new(chat: ChatOrchestrator, theme: Theme, syntax_enabled: bool) -> Self {
        Self {
            chat,
            ui: UiState::new(theme, syntax_enabled),
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.ui.status = Some(Status {
            kind: StatusKind::Info,
            text: text.into(),
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.ui.status = Some(Status {
            kind: StatusKind::Error,
            text: text.into(),
        });
    }

    pub fn clear_status(&mut self) {
        self.ui.status = None;
        self.chat.clear_notice();
    }

    pub fn show_overlay(&mut self, title: impl Into<String>, lines: Vec<String>) {
        self.ui.overlay = Some(Overlay {
            title: title.into(),
            lines,
        });
    }

    /// Text currently in the input box.
    pub fn input_text(&self) -> String {
        self.ui.textarea.lines().join("\n")
    }

    /// Copy the input box into the orchestrator's draft.
    pub fn sync_input(&mut self) {
        let text = self.input_text();
        *self.chat.input_mut() = text;
    }

    pub fn clear_input(&mut self) {
        self.ui.textarea = new_textarea();
        self.chat.input_mut().clear();
    }

    pub fn request_exit(&mut self) {
        self.ui.exit_requested = true;
    }

    /// The message for the error banner, newest source first.
    pub fn banner(&self) -> Option<Status> {
        if let Some(notice) = self.chat.notice() {
            return Some(Status {
                kind: StatusKind::Error,
                text: notice.to_string(),
            });
        }
        if let Some(status) = &self.ui.status {
            return Some(status.clone());
        }
        self.chat.uploads().error().map(|error| Status {
            kind: StatusKind::Error,
            text: error.to_string(),
        })
    }

    /// One-line description of the attachment, if there is one.
    pub fn attachment_summary(&self) -> Option<String> {
        match self.chat.uploads().state() {
            AttachmentState::Empty => None,
            AttachmentState::Pending { name, size_bytes } => {
                Some(format!("Reading {name} ({size_bytes} bytes)..."))
            }
            AttachmentState::Ready(file) => Some(format!(
                "Attached: {} ({} bytes), /detach to remove",
                file.name, file.size_bytes
            )),
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        let ui = &mut self.ui;
        ui.scroll
            .scroll_up(lines, ui.transcript_lines, ui.viewport_height);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let ui = &mut self.ui;
        ui.scroll
            .scroll_down(lines, ui.transcript_lines, ui.viewport_height);
    }

    pub fn page_size(&self) -> u16 {
        self.ui.viewport_height.saturating_sub(1).max(1)
    }
}
